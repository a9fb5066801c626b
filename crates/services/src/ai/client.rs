use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AiError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-2025-04-14";
/// Upper bound for one chat completion, connect through last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl AiConfig {
    /// Reads `ACADEMY_OPENAI_*`. Returns `None` when no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("ACADEMY_OPENAI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("ACADEMY_OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("ACADEMY_OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let timeout = timeout_from_env("ACADEMY_OPENAI_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT);
        Some(Self {
            base_url,
            api_key,
            model,
            timeout,
        })
    }

    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Positive whole seconds from `key`, if set and parseable.
pub(crate) fn timeout_from_env(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// One system + user exchange with sampling limits.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    config: Option<AiConfig>,
}

impl OpenAiClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(AiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<AiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Run a chat completion and return the trimmed reply text.
    ///
    /// # Errors
    ///
    /// Returns `AiError` when the client is disabled, the request fails,
    /// or the response carries no content.
    pub async fn complete(&self, prompt: &ChatPrompt) -> Result<String, AiError> {
        let config = self.config.as_ref().ok_or(AiError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: &config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
        };

        tracing::debug!(model = %config.model, max_tokens = prompt.max_tokens, "chat completion request");
        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .timeout(config.timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AiError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AiError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> ChatPrompt {
        ChatPrompt {
            system: "s".into(),
            user: "u".into(),
            temperature: 0.3,
            max_tokens: 10,
        }
    }

    #[tokio::test]
    async fn silent_server_times_out_instead_of_hanging() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = AiConfig::new(format!("http://{addr}/v1"), "key")
            .with_timeout(Duration::from_millis(300));
        let client = OpenAiClient::new(Some(config));
        let result = tokio::time::timeout(Duration::from_secs(10), client.complete(&prompt()))
            .await
            .expect("complete() must give up on its own");

        match result {
            Err(AiError::Http(err)) => assert!(err.is_timeout()),
            other => panic!("expected a timeout error, got {other:?}"),
        }
        server.abort();
    }

    #[tokio::test]
    async fn disabled_client_refuses_requests() {
        let client = OpenAiClient::new(None);
        assert!(!client.enabled());
        assert!(matches!(
            client.complete(&prompt()).await,
            Err(AiError::Disabled)
        ));
    }

    #[test]
    fn request_serializes_system_then_user() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "tutor",
                },
                ChatMessage {
                    role: "user",
                    content: "question",
                },
            ],
            temperature: 0.3,
            max_tokens: 800,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4.1-2025-04-14");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "question");
        assert_eq!(value["max_tokens"], 800);
    }
}
