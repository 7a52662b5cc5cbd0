//! # Conversation
//! The driver that turns user queries into completion requests and an append-only transcript.
//!
//! ## Turn and Transcript
//! A [Turn] is one message (user or assistant) and is immutable once created. A [Transcript] is an
//! owned, append-only ordered log of turns scoped to one session. Order is chronological; nothing
//! is ever deleted within a session.
//!
//! ## ComparisonSession
//! The session is a two-state machine: *idle* and *awaiting-response*. [ComparisonSession::ask]
//! performs the idle→awaiting transition, gated on two preconditions that must both hold: the
//! endpoint reports a credential, and both documents are attached. A refused transition returns a
//! [PreconditionFailed](errors::PreconditionFailed), appends nothing and issues no request.
//!
//! Once dispatched, the request is a single blocking round trip. The transition back to idle is
//! unconditional: endpoint success and endpoint failure both land as the assistant turn, tagged
//! apart via [Reply] so callers can log failures distinctly. Every completed round trip appends
//! exactly two entries (user, assistant).
//!
//! The request never carries prior transcript turns, only the optional instruction, the context
//! block rebuilt from the current documents, and the new query. The transcript is for display.
//! While a request is in flight the session is mutably borrowed, so a second query cannot start
//! until the transition back to idle completes.

use anyhow::Result;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use log::error;
use serde::{Deserialize, Serialize};

use crate::context::assemble_context;
use crate::conversation::errors::PreconditionFailed;
use crate::document::Document;
use crate::utils::llm::openai::ConversationConfig;
use crate::utils::llm::CompleteChat;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the transcript. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Turn { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Turn { role: Role::Assistant, content: content.into() }
    }
}

/// Append-only ordered log of turns. The only mutation is [Transcript::record].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn. Turns are never reordered or removed.
    pub fn record(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Tagged outcome of one round trip. Both variants render as text at the boundary, but callers
/// can tell a real answer from a swallowed endpoint failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(String),
    Failure(String),
}

impl Reply {
    /// The display text of the reply, whichever way the round trip went.
    pub fn text(&self) -> &str {
        match self {
            Reply::Answer(text) | Reply::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Reply::Failure(_))
    }
}

/// One dual-document comparison conversation: two attached documents, an optional custom
/// instruction, the request config and the transcript.
#[derive(Debug, Default)]
pub struct ComparisonSession {
    config: ConversationConfig,
    instruction: Option<String>,
    first: Option<Document>,
    second: Option<Document>,
    transcript: Transcript,
}

impl ComparisonSession {
    pub fn new(config: ConversationConfig) -> Self {
        Self {
            config,
            instruction: None,
            first: None,
            second: None,
            transcript: Transcript::new(),
        }
    }

    /// Set or replace the custom instruction sent as the leading system turn.
    pub fn set_instruction(&mut self, instruction: impl Into<String>) -> &mut Self {
        self.instruction = Some(instruction.into());
        self
    }

    /// Attach or replace the first document.
    pub fn attach_first(&mut self, document: Document) -> &mut Self {
        self.first = Some(document);
        self
    }

    /// Attach or replace the second document.
    pub fn attach_second(&mut self, document: Document) -> &mut Self {
        self.second = Some(document);
        self
    }

    /// Whether both documents are attached.
    pub fn documents_ready(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    /// The context block that would ride along with the next query, rebuilt from the current
    /// documents. None until both documents are attached.
    pub fn context_block(&self) -> Option<String> {
        match (&self.first, &self.second) {
            (Some(first), Some(second)) => Some(assemble_context(&first.content, &second.content)),
            _ => None,
        }
    }

    /// Submit one user query: check preconditions, issue one request, append the (user,
    /// assistant) pair.
    ///
    /// A precondition refusal returns `Err`, appends nothing and issues nothing. Endpoint
    /// failures are not errors to the caller: they come back as [Reply::Failure] with the
    /// failure text recorded as the assistant turn.
    pub async fn ask(&mut self,
                     chat: &impl CompleteChat,
                     query: impl Into<String>) -> Result<Reply, PreconditionFailed> {
        let query = query.into();
        if !chat.has_credential() {
            return Err(PreconditionFailed::MissingCredential);
        }
        let (Some(first), Some(second)) = (&self.first, &self.second) else {
            return Err(PreconditionFailed::MissingDocuments);
        };
        let context_block = assemble_context(&first.content, &second.content);
        let outcome = match self.build_request(&context_block, &query) {
            Ok(messages) => chat.complete(messages, &self.config).await,
            Err(e) => Err(e),
        };
        let reply = match outcome {
            Ok(text) => Reply::Answer(text),
            Err(e) => {
                error!("completion request failed: {:#}", e);
                Reply::Failure(format!("Error: {}", e))
            }
        };
        self.transcript.record(Turn::user(query));
        self.transcript.record(Turn::assistant(reply.text()));
        Ok(reply)
    }

    /// Build the outbound message list: optional instruction turn, context turn, query turn.
    /// Prior transcript turns are deliberately absent.
    fn build_request(&self,
                     context_block: &str,
                     query: &str) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(3);
        if let Some(instruction) = &self.instruction {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(instruction.as_str())
                    .build()?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(context_block)
                .build()?
                .into(),
        );
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(query)
                .build()?
                .into(),
        );
        Ok(messages)
    }
}

pub mod errors {
    use std::error::Error;
    use std::fmt;
    use std::fmt::Formatter;

    /// A query was refused before any request was issued. The display text is the user-visible
    /// message shown in place of an assistant reply.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PreconditionFailed {
        MissingCredential,
        MissingDocuments,
    }

    impl fmt::Display for PreconditionFailed {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            match self {
                PreconditionFailed::MissingCredential => {
                    write!(f, "Please provide an API key before starting the chat.")
                }
                PreconditionFailed::MissingDocuments => {
                    write!(f, "Please upload both files before asking a question.")
                }
            }
        }
    }

    impl Error for PreconditionFailed {}
}
