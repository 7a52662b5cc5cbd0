//! # duodoc
//!
//! Dual-document comparison chat pipeline for LLM applications in Rust
//!
//! **Note: `duodoc` is still evolving, so the APIs are subject to change.**
//!
//! ## Usage
//! Add a dependency in `Cargo.toml`
//! ```toml
//! duodoc = { git = "https://github.com/duodoc-rs/duodoc.git", branch = "main"}
//! ```
//!
//! ## Why `duodoc`
//!
//! Because "upload two files and ask questions about them" keeps getting rewritten as a pile of
//! script glue where the interesting invariants (token budgets, append-only history, what actually
//! goes over the wire) live in nobody's head. `duodoc` makes each stage of that pipeline an
//! explicit, owned value you can test without a network.
//!
//! ## Concepts and Design
//! The overall of `duodoc` follows data-driven design. The APIs are designed to be as explicit as
//! possible, so users should easily track every step from raw uploaded bytes to the outbound
//! request. Cycle speed is NOT a top priority since the LLM round trip dominates everything.
//!
//! ### Document
//!
//! A [`Document`](crate::document::Document) is decoded text plus its token count and a flag saying
//! whether it was cut down to the token budget. Decoding is best-effort: an ordered chain of strict
//! decoders is tried first, and a lossy fallback guarantees you always get a string back. Budgeting
//! operates on the tokenized representation, never on raw characters, so a trimmed document is
//! still valid text.
//!
//! ### Context Block
//!
//! The [`context`](crate::context) module concatenates the two documents into one labeled block
//! ("File 1" / "File 2"). It is a pure function, recomputed from the current documents on every
//! query, so nothing is cached and nothing can go stale.
//!
//! ### Transcript and Session
//!
//! A [`Transcript`](crate::conversation::Transcript) is an owned, append-only log of
//! [`Turn`](crate::conversation::Turn)s scoped to one
//! [`ComparisonSession`](crate::conversation::ComparisonSession), not process-wide state. The
//! session is a two-state machine: idle, and awaiting a response. Asking a question is refused with
//! a user-visible message unless a credential is present and both documents are attached; a refusal
//! appends nothing and sends nothing. A completed round trip appends exactly two turns (user,
//! assistant), whether the endpoint succeeded or failed.
//!
//! Note that prior turns are NOT resent to the endpoint: each request carries only the optional
//! instruction, the context block and the latest query. The transcript exists for display and
//! bookkeeping. This mirrors the system `duodoc` was extracted from and is deliberate.
//!
//! ### Endpoint or LLM
//!
//! The endpoint of the pipeline is a chat completion service behind the
//! [`CompleteChat`](crate::utils::llm::CompleteChat) trait. The library ships an OpenAI-backed
//! implementation; tests plug in mocks. The outcome of a round trip is a tagged
//! [`Reply`](crate::conversation::Reply), answer or failure reason, so callers can log failures
//! distinctly while still rendering both as text.
//!
//! You can do any post-processing on the reply, e.g. pulling a JSON value out of a chatty or
//! fenced answer, with [utilities](crate::utils).
//!
//! ## License
//!
//! `duodoc` will always remain free under Apache license.
//!
//! ## Attribution
//! * `async_openai`: request/response types and the client used by [crate::utils::llm::openai].
//! * `tiktoken-rs`: re-exported in [crate::utils::token::tiktoken] for token counting and budget
//!   trimming.


pub mod document;
pub mod context;
pub mod conversation;
pub mod utils;
