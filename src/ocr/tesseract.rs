use anyhow::{Context, anyhow};
use image::DynamicImage;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

use super::{LanguageMode, RecognizedBlock, Recognizer, RecognizerFuture};
use crate::geometry::Point;

#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: PathBuf,
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
        }
    }
}

impl TesseractRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl Recognizer for TesseractRecognizer {
    fn recognize(&self, image: Arc<DynamicImage>, mode: LanguageMode) -> RecognizerFuture {
        let binary = self.binary.clone();
        Box::pin(async move {
            let mut tmp = tempfile::Builder::new()
                .suffix(".png")
                .tempfile()
                .with_context(|| "failed to create temp file for OCR")?;
            image
                .write_to(&mut tmp, image::ImageFormat::Png)
                .with_context(|| "failed to write temp image for OCR")?;
            tmp.flush().ok();

            let languages = tesseract_languages(mode);
            debug!("running tesseract with languages {}", languages);
            let output = Command::new(&binary)
                .arg(tmp.path())
                .arg("stdout")
                .arg("-l")
                .arg(languages)
                .arg("--psm")
                .arg("3")
                .arg("tsv")
                .kill_on_drop(true)
                .output()
                .await
                .with_context(|| "failed to run tesseract (is it installed?)")?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(anyhow!("tesseract failed: {}", stderr.trim()));
            }
            let tsv = String::from_utf8_lossy(&output.stdout);
            Ok(parse_tsv_blocks(&tsv))
        })
    }
}

fn tesseract_languages(mode: LanguageMode) -> &'static str {
    match mode {
        LanguageMode::Latin => "eng",
        LanguageMode::Korean => "kor+eng",
    }
}

struct BlockAccumulator {
    lines: BTreeMap<(i32, i32), Vec<String>>,
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl BlockAccumulator {
    fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            lines: BTreeMap::new(),
            left,
            top,
            right,
            bottom,
        }
    }

    fn push(&mut self, key: (i32, i32), text: &str, left: u32, top: u32, right: u32, bottom: u32) {
        self.lines.entry(key).or_default().push(text.to_string());
        self.left = self.left.min(left);
        self.top = self.top.min(top);
        self.right = self.right.max(right);
        self.bottom = self.bottom.max(bottom);
    }

    fn finish(self) -> RecognizedBlock {
        let text = self
            .lines
            .into_values()
            .map(|words| words.join(" "))
            .collect::<Vec<_>>()
            .join("\n");
        let (l, t, r, b) = (
            self.left as f32,
            self.top as f32,
            self.right as f32,
            self.bottom as f32,
        );
        RecognizedBlock {
            text,
            corner_points: Some(vec![
                Point::new(l, t),
                Point::new(r, t),
                Point::new(r, b),
                Point::new(l, b),
            ]),
        }
    }
}

pub(crate) fn parse_tsv_blocks(tsv: &str) -> Vec<RecognizedBlock> {
    let mut blocks: BTreeMap<(i32, i32), BlockAccumulator> = BTreeMap::new();

    for (idx, row) in tsv.lines().enumerate() {
        if idx == 0 {
            continue;
        }
        let cols = row.split('\t').collect::<Vec<_>>();
        if cols.len() < 12 {
            continue;
        }
        let level: i32 = cols[0].parse().unwrap_or(0);
        if level != 5 {
            continue;
        }
        let page_num: i32 = cols[1].parse().unwrap_or(0);
        let block_num: i32 = cols[2].parse().unwrap_or(0);
        let par_num: i32 = cols[3].parse().unwrap_or(0);
        let line_num: i32 = cols[4].parse().unwrap_or(0);
        let left: u32 = cols[6].parse().unwrap_or(0);
        let top: u32 = cols[7].parse().unwrap_or(0);
        let width: u32 = cols[8].parse().unwrap_or(0);
        let height: u32 = cols[9].parse().unwrap_or(0);
        let conf: f32 = cols[10].parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let (right, bottom) = (left.saturating_add(width), top.saturating_add(height));
        blocks
            .entry((page_num, block_num))
            .or_insert_with(|| BlockAccumulator::new(left, top, right, bottom))
            .push((par_num, line_num), text, left, top, right, bottom);
    }

    blocks.into_values().map(BlockAccumulator::finish).collect()
}
