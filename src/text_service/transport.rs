use futures_util::future::BoxFuture;
use tracing::debug;

use super::credentials::get_env;
use super::request::CompletionRequest;
use crate::error::EngineError;
use crate::settings::TextServiceSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub type TransportFuture = BoxFuture<'static, Result<TransportResponse, EngineError>>;

/// Delivers one completion request. Status interpretation is left to the caller;
/// only failures to obtain a response are errors here.
pub trait CompletionTransport: Send + Sync {
    fn send(&self, api_key: &str, request: &CompletionRequest) -> TransportFuture;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// `OPENAI_BASE_URL` overrides the configured base URL.
    pub fn new(settings: &TextServiceSettings) -> Result<Self, EngineError> {
        let base_url = get_env("OPENAI_BASE_URL").unwrap_or_else(|| settings.base_url.clone());
        Self::with_base_url(settings, &base_url)
    }

    pub fn with_base_url(settings: &TextServiceSettings, base_url: &str) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.read_timeout)
            .build()
            .map_err(EngineError::transport)?;
        Ok(Self {
            client,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CompletionTransport for HttpTransport {
    fn send(&self, api_key: &str, request: &CompletionRequest) -> TransportFuture {
        let builder = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request);
        let url = self.url.clone();
        Box::pin(async move {
            debug!("POST {}", url);
            let response = builder.send().await.map_err(EngineError::transport)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(EngineError::transport)?;
            debug!("completion endpoint answered {}", status);
            Ok(TransportResponse { status, body })
        })
    }
}
