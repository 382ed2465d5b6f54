use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub const TEMPERATURE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Summarize,
    Translate,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Summarize => "summarize",
            TaskKind::Translate => "translate",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            TaskKind::Summarize => concat!(
                "You are a concise summarizer. Summarize the text in at most 3 to 4 sentences. ",
                "If the text is Korean or langHint is 'ko', respond in Korean."
            ),
            TaskKind::Translate => concat!(
                "Translate the text. ",
                "If the text is English, translate it to Korean. ",
                "If the text is Korean, translate it to English."
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f64,
    pub messages: Vec<ChatMessage>,
}

pub fn build_request(
    task: TaskKind,
    text: &str,
    model: impl Into<String>,
    lang_hint: Option<&str>,
) -> CompletionRequest {
    let mut messages = vec![ChatMessage {
        role: Role::System,
        content: task.instruction().to_string(),
    }];
    if let Some(hint) = lang_hint.map(str::trim).filter(|hint| !hint.is_empty()) {
        messages.push(ChatMessage {
            role: Role::User,
            content: format!("langHint={}", hint),
        });
    }
    messages.push(ChatMessage {
        role: Role::User,
        content: format!("{}\n{}", task.as_str(), text),
    });
    CompletionRequest {
        model: model.into(),
        temperature: TEMPERATURE,
        messages,
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

pub(crate) fn extract_content(body: &str) -> Result<String, EngineError> {
    let payload: CompletionResponse =
        serde_json::from_str(body).map_err(EngineError::MalformedResponse)?;
    let content = payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();
    if content.is_empty() {
        return Err(EngineError::EmptyResponse);
    }
    Ok(content)
}
