use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, sx: f32, sy: f32) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn contains(&self, point: Point) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_y..=self.max_y).contains(&point.y)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self {
            min_x: self.min_x * sx,
            min_y: self.min_y * sy,
            max_x: self.max_x * sx,
            max_y: self.max_y * sy,
        }
    }
}

/// Divides each axis by the image extent. `None` when either extent is zero.
pub fn to_normalized(point: Point, image_width: u32, image_height: u32) -> Option<Point> {
    if image_width == 0 || image_height == 0 {
        return None;
    }
    Some(Point {
        x: point.x / image_width as f32,
        y: point.y / image_height as f32,
    })
}

pub fn bounding_box(points: &[Point]) -> Option<BoundingBox> {
    let (first, rest) = points.split_first()?;
    let init = BoundingBox {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    Some(rest.iter().fold(init, |acc, point| BoundingBox {
        min_x: acc.min_x.min(point.x),
        min_y: acc.min_y.min(point.y),
        max_x: acc.max_x.max(point.x),
        max_y: acc.max_y.max(point.y),
    }))
}

pub fn point_in_bounding_box(point: Point, bbox: &BoundingBox) -> bool {
    bbox.contains(point)
}

pub fn scale_factor(source_extent: u32, target_extent: f32) -> f32 {
    if source_extent == 0 {
        return 1.0;
    }
    target_extent / source_extent as f32
}
