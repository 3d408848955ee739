use std::time::Duration;

use async_openai::{config::OpenAIConfig, error::OpenAIError, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use tokio::time::error::Elapsed;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    services::prompt_builder::PromptMessages,
};

/// Sends a prompt to the model provider and hands back its text untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &PromptMessages) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionBody {
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

pub struct OpenAiModelService {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiModelService {
    pub fn new(config: &Config) -> Self {
        let mut openai_config =
            OpenAIConfig::new().with_api_key(config.openai_api_key.expose_secret());
        if let Some(api_base) = &config.openai_api_base {
            openai_config = openai_config.with_api_base(api_base);
        }

        Self {
            client: Client::with_config(openai_config),
            model: config.openai_model.clone(),
            timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiModelService {
    async fn complete(&self, prompt: &PromptMessages) -> AppResult<String> {
        let request = json!({
            "model": self.model,
            "messages": prompt.to_chat_messages(),
        });

        log::debug!("Requesting completion from model {}", self.model);

        let outcome: Result<Result<ChatCompletionBody, OpenAIError>, Elapsed> =
            tokio::time::timeout(self.timeout, self.client.chat().create_byot(request)).await;

        let body = outcome
            .map_err(|_| AppError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| AppError::ProviderError(e.to_string()))?;

        first_choice_text(body)
    }
}

fn first_choice_text(body: ChatCompletionBody) -> AppResult<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AppError::ProviderError("Model returned no completion text".to_string()))
}
