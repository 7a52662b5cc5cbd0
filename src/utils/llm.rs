//! The chat completion endpoint seam.
//!
//! [CompleteChat] is the only place the pipeline touches the network. The conversation driver
//! checks [CompleteChat::has_credential] before dispatching and issues at most one
//! [CompleteChat::complete] call per query; everything else in the crate is pure and offline,
//! so tests swap in mock implementations.

use anyhow::Result;
use async_openai::types::ChatCompletionRequestMessage;
use async_trait::async_trait;

use crate::utils::llm::openai::ConversationConfig;

pub mod openai;

/// A chat completion service that turns a prepared message list into one reply text.
#[async_trait]
pub trait CompleteChat {
    /// Whether an access credential is configured. Dispatch is refused without one.
    fn has_credential(&self) -> bool;

    /// Issue one blocking request and return the reply text.
    /// No retries, no timeout, no cancellation: the call runs to completion or error.
    async fn complete(&self,
                      messages: Vec<ChatCompletionRequestMessage>,
                      config: &ConversationConfig) -> Result<String>;
}
