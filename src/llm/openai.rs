use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::llm::client::{
    http_client, resolve_endpoint, send_with_retry, ChatMessage, CompletionRequest, LlmProvider,
};

const DEFAULT_GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1";
const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// Client for any OpenAI-compatible `/chat/completions` API (Groq, OpenAI, local routers).
pub struct OpenAiCompatibleClient {
    http: Client,
    name: &'static str,
    api_key: String,
    model: String,
    endpoint: String,
    max_retries: u32,
}

impl OpenAiCompatibleClient {
    pub fn groq(settings: &Settings) -> Result<Self> {
        Self::from_settings(settings, "groq", DEFAULT_GROQ_ENDPOINT)
    }

    pub fn openai(settings: &Settings) -> Result<Self> {
        Self::from_settings(settings, "openai", DEFAULT_OPENAI_ENDPOINT)
    }

    fn from_settings(settings: &Settings, name: &'static str, default_endpoint: &str) -> Result<Self> {
        let api_key = settings.llm.api_key.trim().to_string();
        if api_key.is_empty() {
            anyhow::bail!(
                "{} API key is missing. Set llm.api_key in config, SOAPNOTE_API_KEY or GROQ_API_KEY.",
                name
            );
        }

        let model = settings.llm.model.trim();
        if model.is_empty() {
            anyhow::bail!("llm.model must not be empty for provider '{}'", name);
        }

        Ok(Self {
            http: http_client(settings)?,
            name,
            api_key,
            model: model.to_string(),
            endpoint: resolve_endpoint(&settings.llm.endpoint, default_endpoint),
            max_retries: settings.llm.max_retries,
        })
    }

    fn request_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = self.request_url();
        debug!("Requesting completion from {} model {}", self.name, self.model);

        let response = send_with_retry(self.name, self.max_retries, || {
            self.http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", self.name))?;

        Ok(payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
