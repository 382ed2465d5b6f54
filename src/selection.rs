use tracing::debug;

use crate::geometry::{bounding_box, to_normalized, Point};
use crate::ocr::OcrResult;

/// Which block, if any, the user has picked. `Empty` is both the initial and a
/// resting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Empty,
    Selected(usize),
}

impl SelectionState {
    pub fn selected_index(&self) -> Option<usize> {
        match self {
            SelectionState::Empty => None,
            SelectionState::Selected(index) => Some(*index),
        }
    }

    pub fn reset(&mut self) {
        *self = SelectionState::Empty;
    }

    pub fn hit_test(&mut self, result: Option<&OcrResult>, x: f32, y: f32) -> bool {
        let Some(result) = result else {
            return false;
        };
        if result.image_width == 0 || result.image_height == 0 {
            return false;
        }
        let hit = find_block_at(result, Point::new(x, y));
        debug!("hit test at ({}, {}) -> {:?}", x, y, hit);
        *self = match hit {
            Some(index) => SelectionState::Selected(index),
            None => SelectionState::Empty,
        };
        hit.is_some()
    }

    pub fn hit_test_canvas(
        &mut self,
        result: Option<&OcrResult>,
        x: f32,
        y: f32,
        canvas_width: f32,
        canvas_height: f32,
    ) -> bool {
        let Some((ix, iy)) = canvas_to_image(result, x, y, canvas_width, canvas_height) else {
            return false;
        };
        self.hit_test(result, ix, iy)
    }
}

pub(crate) fn canvas_to_image(
    result: Option<&OcrResult>,
    x: f32,
    y: f32,
    canvas_width: f32,
    canvas_height: f32,
) -> Option<(f32, f32)> {
    let result = result?;
    if result.image_width == 0 || result.image_height == 0 {
        return None;
    }
    let usable = |extent: f32| extent.is_finite() && extent > 0.0;
    if !usable(canvas_width) || !usable(canvas_height) {
        return None;
    }
    Some((
        x * result.image_width as f32 / canvas_width,
        y * result.image_height as f32 / canvas_height,
    ))
}

/// First block whose normalized bounding box contains the point. Overlapping
/// boxes resolve to the lower index; polygon shape is not consulted.
pub fn find_block_at(result: &OcrResult, point: Point) -> Option<usize> {
    let (w, h) = (result.image_width, result.image_height);
    let touch = to_normalized(point, w, h)?;
    result.blocks.iter().position(|block| {
        let normalized = block
            .corner_points
            .iter()
            .filter_map(|corner| to_normalized(*corner, w, h))
            .collect::<Vec<_>>();
        bounding_box(&normalized).is_some_and(|bbox| bbox.contains(touch))
    })
}
