/// Supplies the API credential and default model. Consulted on every call;
/// nothing is cached by the text service.
pub trait CredentialSource: Send + Sync {
    fn api_key(&self) -> Option<String>;

    fn default_model(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn api_key(&self) -> Option<String> {
        get_env("OPENAI_API_KEY")
    }

    fn default_model(&self) -> Option<String> {
        get_env("OPENAI_MODEL")
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    api_key: Option<String>,
    model: Option<String>,
}

impl StaticCredentials {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn api_key(&self) -> Option<String> {
        non_blank(self.api_key.clone())
    }

    fn default_model(&self) -> Option<String> {
        non_blank(self.model.clone())
    }
}

pub(crate) fn get_env(key: &str) -> Option<String> {
    non_blank(std::env::var(key).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_static_values_count_as_absent() {
        let creds = StaticCredentials::new(Some("   ".to_string())).with_model("");
        assert_eq!(creds.api_key(), None);
        assert_eq!(creds.default_model(), None);

        let creds = StaticCredentials::new(Some("sk-test".to_string())).with_model("gpt-4o");
        assert_eq!(creds.api_key().as_deref(), Some("sk-test"));
        assert_eq!(creds.default_model().as_deref(), Some("gpt-4o"));
    }
}
