use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::ocr::{
    join_block_text, LanguageMode, OcrResult, RecognitionTask, Recognizer, TextBlock,
};
use crate::overlay::{render_overlay, OverlayFrame, OverlayStyle};
use crate::selection::{canvas_to_image, SelectionState};
use crate::settings::Settings;
use crate::text_service::{CredentialSource, TaskKind, TextService};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasHit {
    pub text: String,
    pub block_index: usize,
    pub canvas_x: f32,
    pub canvas_y: f32,
    pub image_x: f32,
    pub image_y: f32,
}

/// Owns the current OCR result and selection for one image at a time.
///
/// State changes take `&mut self` and happen on the caller's thread. Recognition
/// and text-service calls are async; they never touch the result or selection,
/// so callers apply their output with [`Engine::set_result`].
pub struct Engine {
    recognizer: Arc<dyn Recognizer>,
    text_service: TextService,
    style: OverlayStyle,
    result: Option<OcrResult>,
    selection: SelectionState,
}

impl Engine {
    pub fn new(recognizer: Arc<dyn Recognizer>, text_service: TextService) -> Self {
        Self {
            recognizer,
            text_service,
            style: OverlayStyle::default(),
            result: None,
            selection: SelectionState::Empty,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        recognizer: Arc<dyn Recognizer>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, EngineError> {
        let text_service = TextService::from_settings(&settings.text_service, credentials)?;
        Ok(Self::new(recognizer, text_service).with_style(settings.overlay.clone()))
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: OverlayStyle) {
        self.style = style;
    }

    // recognition

    pub fn recognize(
        &self,
        image_bytes: &[u8],
        mode: LanguageMode,
    ) -> Result<RecognitionTask, EngineError> {
        let image = decode_image(image_bytes)?;
        self.spawn_recognition(image, mode)
    }

    fn spawn_recognition(
        &self,
        image: Arc<DynamicImage>,
        mode: LanguageMode,
    ) -> Result<RecognitionTask, EngineError> {
        let (width, height) = image.dimensions();
        debug!("starting {:?} recognition on {}x{} image", mode, width, height);
        RecognitionTask::spawn(self.recognizer.recognize(image, mode))
    }

    pub async fn recognize_blocks(
        &self,
        image_bytes: &[u8],
        mode: LanguageMode,
    ) -> Result<Vec<TextBlock>, EngineError> {
        self.recognize(image_bytes, mode)?.await
    }

    pub async fn recognize_text(
        &self,
        image_bytes: &[u8],
        mode: LanguageMode,
    ) -> Result<String, EngineError> {
        let blocks = self.recognize_blocks(image_bytes, mode).await?;
        Ok(join_block_text(&blocks))
    }

    /// Full result with the source dimensions. Does not replace the current result.
    pub async fn extract_text(
        &self,
        image_bytes: &[u8],
        mode: LanguageMode,
    ) -> Result<OcrResult, EngineError> {
        let image = decode_image(image_bytes)?;
        let (width, height) = image.dimensions();
        let blocks = self.spawn_recognition(image, mode)?.await?;
        info!("recognized {} blocks in {}x{} image", blocks.len(), width, height);
        Ok(OcrResult::new(blocks, width, height))
    }

    /// Callback form of [`Engine::recognize`]. A decode failure or a missing
    /// runtime is reported through `on_failure` immediately and no task is started.
    pub fn recognize_blocks_with<S, F>(
        &self,
        image_bytes: &[u8],
        mode: LanguageMode,
        on_success: S,
        on_failure: F,
    ) -> Option<JoinHandle<()>>
    where
        S: FnOnce(Vec<TextBlock>) + Send + 'static,
        F: FnOnce(EngineError) + Send + 'static,
    {
        match self.recognize(image_bytes, mode) {
            Ok(task) => Some(task.on_complete(on_success, on_failure)),
            Err(err) => {
                on_failure(err);
                None
            }
        }
    }

    // result and selection

    pub fn set_result(&mut self, result: Option<OcrResult>) {
        match &result {
            Some(result) => debug!(
                "result replaced: {} blocks, {}x{}",
                result.blocks.len(),
                result.image_width,
                result.image_height
            ),
            None => debug!("result cleared"),
        }
        self.result = result;
        self.selection.reset();
    }

    pub fn result(&self) -> Option<&OcrResult> {
        self.result.as_ref()
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.selected_index()
    }

    pub fn selected_text(&self) -> Option<&str> {
        let index = self.selection.selected_index()?;
        self.result
            .as_ref()?
            .blocks
            .get(index)
            .map(|block| block.text.as_str())
    }

    pub fn touch(&mut self, x: f32, y: f32) -> bool {
        self.selection.hit_test(self.result.as_ref(), x, y)
    }

    /// Touch in the coordinates of a canvas showing the image stretched to
    /// `canvas_width` x `canvas_height`.
    pub fn touch_canvas(&mut self, x: f32, y: f32, canvas_width: f32, canvas_height: f32) -> bool {
        self.selection
            .hit_test_canvas(self.result.as_ref(), x, y, canvas_width, canvas_height)
    }

    pub fn touch_canvas_hit(
        &mut self,
        x: f32,
        y: f32,
        canvas_width: f32,
        canvas_height: f32,
    ) -> Option<CanvasHit> {
        let (image_x, image_y) =
            canvas_to_image(self.result.as_ref(), x, y, canvas_width, canvas_height)?;
        if !self.touch(image_x, image_y) {
            return None;
        }
        let block_index = self.selected_index()?;
        Some(CanvasHit {
            text: self.selected_text()?.to_string(),
            block_index,
            canvas_x: x,
            canvas_y: y,
            image_x,
            image_y,
        })
    }

    // drawing

    pub fn draw(&self, canvas_width: f32, canvas_height: f32) -> OverlayFrame {
        render_overlay(
            self.result.as_ref(),
            self.selection,
            &self.style,
            canvas_width,
            canvas_height,
        )
    }

    // text service

    pub async fn summarize_text(
        &self,
        text: &str,
        model: Option<&str>,
        lang_hint: Option<&str>,
    ) -> Result<String, EngineError> {
        self.text_service
            .complete(TaskKind::Summarize, text, model, lang_hint)
            .await
    }

    /// `None` without a result; an empty string, without any request, when the
    /// result has no blocks.
    pub async fn summarize_all(
        &self,
        model: Option<&str>,
        lang_hint: Option<&str>,
    ) -> Result<Option<String>, EngineError> {
        let Some(result) = self.result.as_ref() else {
            return Ok(None);
        };
        if result.blocks.is_empty() {
            return Ok(Some(String::new()));
        }
        let text = result.full_text();
        self.summarize_text(&text, model, lang_hint).await.map(Some)
    }

    pub async fn summarize_selected(
        &self,
        model: Option<&str>,
        lang_hint: Option<&str>,
    ) -> Result<Option<String>, EngineError> {
        self.complete_selected(TaskKind::Summarize, model, lang_hint)
            .await
    }

    pub async fn translate_selected(
        &self,
        model: Option<&str>,
        lang_hint: Option<&str>,
    ) -> Result<Option<String>, EngineError> {
        self.complete_selected(TaskKind::Translate, model, lang_hint)
            .await
    }

    async fn complete_selected(
        &self,
        task: TaskKind,
        model: Option<&str>,
        lang_hint: Option<&str>,
    ) -> Result<Option<String>, EngineError> {
        let Some(text) = self.selected_text().map(str::to_string) else {
            debug!("{} skipped: nothing selected", task.as_str());
            return Ok(None);
        };
        self.text_service
            .complete(task, &text, model, lang_hint)
            .await
            .map(Some)
    }
}

fn decode_image(image_bytes: &[u8]) -> Result<Arc<DynamicImage>, EngineError> {
    let image = image::load_from_memory(image_bytes)?;
    Ok(Arc::new(image))
}
