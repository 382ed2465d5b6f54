mod task;
mod tesseract;

use futures_util::future::BoxFuture;
use image::DynamicImage;
use serde::Serialize;
use std::sync::Arc;

use crate::geometry::{bounding_box, BoundingBox, Point};

pub use task::{RecognitionOutcome, RecognitionTask};
pub use tesseract::TesseractRecognizer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub text: String,
    pub corner_points: Vec<Point>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, corner_points: Vec<Point>) -> Self {
        Self {
            text: text.into(),
            corner_points,
        }
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        bounding_box(&self.corner_points)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrResult {
    pub blocks: Vec<TextBlock>,
    pub image_width: u32,
    pub image_height: u32,
}

impl OcrResult {
    pub fn new(blocks: Vec<TextBlock>, image_width: u32, image_height: u32) -> Self {
        Self {
            blocks,
            image_width,
            image_height,
        }
    }

    pub fn full_text(&self) -> String {
        join_block_text(&self.blocks)
    }
}

pub(crate) fn join_block_text(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguageMode {
    #[default]
    Latin,
    Korean,
}

/// Block shape produced by a recognizer before it is mapped into a [`TextBlock`].
/// Recognizers that cannot locate a block report `None` corners.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedBlock {
    pub text: String,
    pub corner_points: Option<Vec<Point>>,
}

impl From<RecognizedBlock> for TextBlock {
    fn from(block: RecognizedBlock) -> Self {
        TextBlock {
            text: block.text,
            corner_points: block.corner_points.unwrap_or_default(),
        }
    }
}

pub type RecognizerFuture = BoxFuture<'static, anyhow::Result<Vec<RecognizedBlock>>>;

pub trait Recognizer: Send + Sync {
    fn recognize(&self, image: Arc<DynamicImage>, mode: LanguageMode) -> RecognizerFuture;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_corners_map_to_empty_polygon() {
        let block: TextBlock = RecognizedBlock {
            text: "caption".to_string(),
            corner_points: None,
        }
        .into();
        assert_eq!(block.text, "caption");
        assert!(block.corner_points.is_empty());
        assert!(block.bounding_box().is_none());
    }

    #[test]
    fn full_text_joins_blocks_with_newlines() {
        let result = OcrResult::new(
            vec![
                TextBlock::new("first", Vec::new()),
                TextBlock::new("second", Vec::new()),
            ],
            10,
            10,
        );
        assert_eq!(result.full_text(), "first\nsecond");
        assert_eq!(OcrResult::new(Vec::new(), 1, 1).full_text(), "");
    }
}
