mod credentials;
mod request;
mod transport;

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::settings::TextServiceSettings;

pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use request::{build_request, ChatMessage, CompletionRequest, Role, TaskKind, TEMPERATURE};
pub use transport::{CompletionTransport, HttpTransport, TransportFuture, TransportResponse};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Clone)]
pub struct TextService {
    transport: Arc<dyn CompletionTransport>,
    credentials: Arc<dyn CredentialSource>,
    fallback_model: String,
}

impl TextService {
    pub fn new(
        transport: Arc<dyn CompletionTransport>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            transport,
            credentials,
            fallback_model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn from_settings(
        settings: &TextServiceSettings,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, EngineError> {
        let transport = HttpTransport::new(settings)?;
        let mut service = Self::new(Arc::new(transport), credentials);
        if let Some(model) = settings.model.as_deref() {
            service = service.with_fallback_model(model);
        }
        Ok(service)
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.fallback_model = model;
        }
        self
    }

    fn resolve_model(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .map(str::to_string)
            .or_else(|| self.credentials.default_model())
            .unwrap_or_else(|| self.fallback_model.clone())
    }

    pub async fn complete(
        &self,
        task: TaskKind,
        text: &str,
        model: Option<&str>,
        lang_hint: Option<&str>,
    ) -> Result<String, EngineError> {
        let Some(api_key) = self.credentials.api_key() else {
            return Err(EngineError::Config(
                "no API key configured for the completion service".to_string(),
            ));
        };
        let request = build_request(task, text, self.resolve_model(model), lang_hint);
        info!(
            "requesting {} from model {} ({} chars)",
            task.as_str(),
            request.model,
            text.chars().count()
        );

        let response = self.transport.send(&api_key, &request).await?;
        if !response.is_success() {
            warn!("completion service returned status {}", response.status);
            return Err(EngineError::Service {
                status: response.status,
                body: response.body,
            });
        }
        request::extract_content(&response.body)
    }
}
