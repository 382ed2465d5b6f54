//! OCR result overlay and selection engine with a summarize/translate pipeline.
//!
//! [`Engine`] holds the current [`OcrResult`] and selection, renders overlay
//! primitives, resolves touches into blocks, and forwards block text to a
//! chat-completion endpoint through [`TextService`].

mod engine;
mod error;
pub mod geometry;
pub mod logging;
pub mod ocr;
pub mod overlay;
pub mod selection;
pub mod settings;
pub mod text_service;

pub use engine::{CanvasHit, Engine};
pub use error::{BoxError, EngineError};
pub use geometry::{BoundingBox, Point};
pub use ocr::{
    LanguageMode, OcrResult, RecognitionTask, RecognizedBlock, Recognizer, RecognizerFuture,
    TesseractRecognizer, TextBlock,
};
pub use overlay::{DrawOp, OverlayFrame, OverlayStyle, Rgb, Rgba, Shape};
pub use selection::SelectionState;
pub use settings::{load_settings, Settings, TextServiceSettings};
pub use text_service::{
    CompletionTransport, CredentialSource, EnvCredentials, HttpTransport, StaticCredentials,
    TaskKind, TextService, TransportResponse,
};
