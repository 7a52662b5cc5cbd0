//! OpenAI-backed implementation of [CompleteChat](crate::utils::llm::CompleteChat).
//!
//! Model selection goes through a display-name mapping ([resolve_model_id]): the UI-facing names
//! ("GPT-4.0", "GPT-03", "GPT-4.1") resolve to API model ids, and anything unrecognized falls
//! back to [FALLBACK_MODEL] rather than erroring.

use std::collections::HashMap;
use std::env;

use anyhow::Result;
use async_openai::config::OpenAIConfig;
use async_openai::types::{ChatCompletionRequestMessage, CreateChatCompletionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::warn;

use crate::utils::llm::CompleteChat;

/// Environment variable the credential is read from by [OpenAiChat::from_env].
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// API model id used for display names with no mapping entry.
pub const FALLBACK_MODEL: &str = "gpt-3.5-turbo";

lazy_static! {
    /// Mapping from UI-facing model display names to API model ids.
    pub static ref MODEL_DISPLAY_TO_ID: HashMap<&'static str, &'static str> = HashMap::from([
        ("GPT-4.0", "gpt-4"),
        ("GPT-03", "gpt-3.5-turbo"),
        ("GPT-4.1", "gpt-4-turbo"),
    ]);
}

/// Resolve a model display name to the API model id, falling back to [FALLBACK_MODEL] for
/// unknown names.
pub fn resolve_model_id(display_name: &str) -> &'static str {
    MODEL_DISPLAY_TO_ID.get(display_name).copied().unwrap_or(FALLBACK_MODEL)
}

/// Per-conversation request parameters.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Model display name, resolved via [resolve_model_id] when the request is built.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on response tokens.
    pub max_response_tokens: u16,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            model: "GPT-4.0".to_string(),
            temperature: 0.7,
            max_response_tokens: 2000,
        }
    }
}

/// Chat completion client backed by the OpenAI API.
pub struct OpenAiChat {
    client: Client<OpenAIConfig>,
    has_key: bool,
}

impl OpenAiChat {
    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        let has_key = !api_key.is_empty();
        Self {
            client: Client::with_config(OpenAIConfig::new().with_api_key(api_key)),
            has_key,
        }
    }

    /// Create a client from the `OPENAI_API_KEY` environment variable. A missing or empty
    /// variable is not an error here: it surfaces later as a precondition refusal.
    pub fn from_env() -> Self {
        Self::new(env::var(API_KEY_ENV_VAR).unwrap_or_default())
    }
}

#[async_trait]
impl CompleteChat for OpenAiChat {
    fn has_credential(&self) -> bool {
        self.has_key
    }

    async fn complete(&self,
                      messages: Vec<ChatCompletionRequestMessage>,
                      config: &ConversationConfig) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(resolve_model_id(&config.model))
            .messages(messages)
            .temperature(config.temperature)
            .max_tokens(config.max_response_tokens)
            .build()?;
        let response = self.client.chat().create(request).await?;
        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        match reply {
            Some(text) => Ok(text),
            None => {
                warn!("completion response carried no content");
                Ok(String::new())
            }
        }
    }
}

#[cfg(test)]
mod test_openai {
    use super::{resolve_model_id, ConversationConfig, OpenAiChat, FALLBACK_MODEL};
    use crate::utils::llm::CompleteChat;

    #[test]
    fn test_model_mapping() {
        assert_eq!("gpt-4", resolve_model_id("GPT-4.0"));
        assert_eq!("gpt-3.5-turbo", resolve_model_id("GPT-03"));
        assert_eq!("gpt-4-turbo", resolve_model_id("GPT-4.1"));
    }

    #[test]
    fn test_unknown_display_name_falls_back() {
        assert_eq!(FALLBACK_MODEL, resolve_model_id("GPT-7 Ultra"));
        assert_eq!(FALLBACK_MODEL, resolve_model_id(""));
    }

    #[test]
    fn test_default_config() {
        let config = ConversationConfig::default();
        assert_eq!("GPT-4.0", config.model);
        assert_eq!(0.7, config.temperature);
        assert_eq!(2000, config.max_response_tokens);
    }

    #[test]
    fn test_empty_key_means_no_credential() {
        assert!(!OpenAiChat::new("").has_credential());
        assert!(OpenAiChat::new("sk-test").has_credential());
    }
}
