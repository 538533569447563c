// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM reply synthesizer for the Autolote sales assistant.
//!
//! Wraps the Anthropic Messages API behind the [`ReplySynthesizer`] seam:
//! persona prompt assembly, one-retry transport handling with overload
//! detection, and a strict structured-output contract that repairs or
//! defaults malformed model output instead of propagating parse errors.
//!
//! [`ReplySynthesizer`]: autolote_core::ReplySynthesizer

pub mod client;
pub mod parser;
pub mod prompt;
pub mod synthesizer;
pub mod types;

pub use client::AnthropicClient;
pub use synthesizer::{ClaudeSynthesizer, DEFAULT_MAX_REPLY_CHARS};
