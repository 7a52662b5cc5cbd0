//! # Document
//! An uploaded file on its way into the context block.
//!
//! ## Decoding
//! Uploads arrive as raw bytes with no declared encoding. [decode_bytes] runs an ordered chain of
//! strict decoders ([DECODER_CHAIN]) and takes the first one that succeeds. If none does, it
//! collapses to a lossy UTF-8 rendering of the bytes, so decoding never fails. The pipeline is
//! best-effort by contract and a garbled document is still a document.
//!
//! ## Budgeting
//! A [Document] is created with a token budget. Text over budget is cut on the tokenized
//! representation via [BudgetTokens](crate::utils::token::BudgetTokens), never on raw characters,
//! and the document records the resulting token count and whether it was truncated.
//! If `truncated` is set, `token_count` equals the budget it was trimmed against.

use anyhow::Result;
use log::warn;

use crate::utils::token::BudgetTokens;

/// Token budget applied to each uploaded document when no other cap is given.
pub const DEFAULT_DOCUMENT_TOKEN_BUDGET: usize = 3000;

/// A strict, fallible text decoder. Tried in order; see [DECODER_CHAIN].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDecoder {
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// The ordered decoder candidates tried before falling back to lossy UTF-8.
pub const DECODER_CHAIN: [TextDecoder; 3] = [
    TextDecoder::Utf8,
    TextDecoder::Utf16Le,
    TextDecoder::Utf16Be,
];

impl TextDecoder {
    /// Attempt a strict decoding of `bytes`. Returns None if the bytes are not valid in this
    /// encoding. A matching byte order mark is stripped.
    pub fn try_decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextDecoder::Utf8 => {
                let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            TextDecoder::Utf16Le => {
                // a big-endian byte order mark means this is not our stream
                if bytes.starts_with(&[0xFE, 0xFF]) {
                    return None;
                }
                let bytes = bytes.strip_prefix(&[0xFF, 0xFE]).unwrap_or(bytes);
                Self::decode_utf16(bytes, u16::from_le_bytes)
            }
            TextDecoder::Utf16Be => {
                if bytes.starts_with(&[0xFF, 0xFE]) {
                    return None;
                }
                let bytes = bytes.strip_prefix(&[0xFE, 0xFF]).unwrap_or(bytes);
                Self::decode_utf16(bytes, u16::from_be_bytes)
            }
        }
    }

    fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
        if bytes.len() % 2 != 0 {
            return None;
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| unit([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).ok()
    }
}

/// Decode uploaded bytes with the first decoder in [DECODER_CHAIN] that accepts them, falling
/// back to a lossy UTF-8 rendering. Always returns a string.
pub fn decode_bytes(bytes: &[u8]) -> String {
    for decoder in DECODER_CHAIN {
        if let Some(text) = decoder.try_decode(bytes) {
            return text;
        }
    }
    String::from_utf8_lossy(bytes).to_string()
}

/// One uploaded document, decoded and trimmed to its token budget.
#[derive(Debug, Clone)]
#[readonly::make]
pub struct Document {
    /// The filename the document was uploaded under. read-only.
    pub name: String,
    /// The decoded, possibly trimmed text. read-only.
    pub content: String,
    /// Token count of `content`. read-only.
    pub token_count: usize,
    /// Whether the text was cut down to the budget. read-only.
    pub truncated: bool,
}

impl Document {
    /// Create a document from already-decoded text, trimming it to `max_tokens`.
    pub fn from_text(name: impl Into<String>,
                     text: impl Into<String>,
                     max_tokens: usize,
                     tokenizer: &impl BudgetTokens) -> Result<Self> {
        let name = name.into();
        let trimmed = tokenizer.trim_to_budget(&text.into(), max_tokens)?;
        if trimmed.truncated {
            warn!("document {} was over the token budget and trimmed to {} tokens", name, max_tokens);
        }
        Ok(Document {
            name,
            content: trimmed.text,
            token_count: trimmed.token_count,
            truncated: trimmed.truncated,
        })
    }

    /// Create a document from raw uploaded bytes: decode best-effort, then trim to `max_tokens`.
    pub fn from_bytes(name: impl Into<String>,
                      bytes: &[u8],
                      max_tokens: usize,
                      tokenizer: &impl BudgetTokens) -> Result<Self> {
        let text = decode_bytes(bytes);
        Self::from_text(name, text, max_tokens, tokenizer)
    }
}
