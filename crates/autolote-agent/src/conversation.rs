// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-sender conversation buffer state and batching policy.

use autolote_core::{BatchPolicy, PendingMessage};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// In-process buffer state for one sender.
///
/// State machine: IDLE (no pending, no timer) -> BUFFERING (pending +
/// timer armed) -> PROCESSING (`in_flight`) -> IDLE. Messages arriving
/// during PROCESSING start a fresh BUFFERING phase; they are never merged
/// into the running turn.
#[derive(Debug, Default)]
pub(crate) struct Conversation {
    pub pending: Vec<PendingMessage>,
    pub in_flight: bool,
    pub timer_armed: bool,
    pub last_activity: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this entry can be evicted: nothing buffered, nothing running.
    pub fn is_idle(&self) -> bool {
        !self.in_flight && !self.timer_armed && self.pending.is_empty()
    }
}

/// Read-only view of one conversation entry, for the admin endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub phone: String,
    pub queued_messages: usize,
    pub in_flight: bool,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Merge a drained buffer into one working text per the configured policy.
///
/// This is the single point of truth for the batching decision.
pub fn select_text(batch: &[PendingMessage], policy: BatchPolicy) -> String {
    match policy {
        BatchPolicy::LatestOnly => batch
            .last()
            .map(|m| m.text.trim().to_string())
            .unwrap_or_default(),
        BatchPolicy::JoinAll => batch
            .iter()
            .map(|m| m.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str) -> PendingMessage {
        PendingMessage {
            text: text.into(),
            is_audio: false,
            media_url: None,
            received_at: Utc::now(),
        }
    }

    #[test]
    fn latest_only_takes_the_most_recent_text() {
        let batch = vec![msg("primero"), msg("segundo"), msg("tercero")];
        assert_eq!(select_text(&batch, BatchPolicy::LatestOnly), "tercero");
    }

    #[test]
    fn join_all_concatenates_in_arrival_order() {
        let batch = vec![msg("hola"), msg(""), msg("busco carro")];
        assert_eq!(select_text(&batch, BatchPolicy::JoinAll), "hola busco carro");
    }

    #[test]
    fn empty_batch_selects_empty_text() {
        assert_eq!(select_text(&[], BatchPolicy::LatestOnly), "");
        assert_eq!(select_text(&[], BatchPolicy::JoinAll), "");
    }

    #[test]
    fn fresh_conversation_is_idle() {
        assert!(Conversation::new().is_idle());
        let mut busy = Conversation::new();
        busy.in_flight = true;
        assert!(!busy.is_idle());
    }
}
