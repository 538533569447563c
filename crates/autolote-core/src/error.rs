// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Autolote sales assistant.

use thiserror::Error;

/// The primary error type used across all Autolote components.
#[derive(Debug, Error)]
pub enum AutoloteError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Lead store errors (database connection, query failure, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging gateway errors (send failure, malformed payload, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM provider errors (API failure, malformed transport response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Speech synthesis, audio storage, or transcription errors.
    #[error("speech error: {message}")]
    Speech {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced record or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Typed failure from the reply synthesizer.
///
/// `Overloaded` is recognized by the turn controller and routed to a
/// dedicated apology table; everything else follows the generic failure
/// path. Malformed model output is NOT an error -- the synthesizer repairs
/// it internally and only transport-level failures surface here.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The model reported itself overloaded or unavailable.
    #[error("model overloaded: {0}")]
    Overloaded(String),

    /// Transport-level failure (network, HTTP error status, bad envelope).
    #[error("provider transport error: {0}")]
    Transport(String),
}

impl From<LlmError> for AutoloteError {
    fn from(err: LlmError) -> Self {
        AutoloteError::Provider {
            message: err.to_string(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_message() {
        let err = AutoloteError::Channel {
            message: "send failed".into(),
            source: None,
        };
        assert_eq!(err.to_string(), "channel error: send failed");
    }

    #[test]
    fn llm_error_converts_to_provider_variant() {
        let err: AutoloteError = LlmError::Overloaded("529".into()).into();
        assert!(matches!(err, AutoloteError::Provider { .. }));
        assert!(err.to_string().contains("overloaded"));
    }
}
