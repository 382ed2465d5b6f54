use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("text recognition failed: {0}")]
    Recognition(#[source] anyhow::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("request could not be completed: {0}")]
    Transport(#[source] BoxError),

    #[error("completion service error {status}: {body}")]
    Service { status: u16, body: String },

    #[error("completion response contained no content")]
    EmptyResponse,

    #[error("completion response is not valid JSON: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

impl EngineError {
    pub(crate) fn transport(err: impl Into<BoxError>) -> Self {
        EngineError::Transport(err.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, EngineError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::EngineError;

    #[test]
    fn service_error_message_carries_status_and_body() {
        let err = EngineError::Service {
            status: 429,
            body: r#"{"error":"rate limited"}"#.to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains(r#"{"error":"rate limited"}"#));
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        let err = EngineError::transport(io);
        assert!(err.to_string().contains("read timed out"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
