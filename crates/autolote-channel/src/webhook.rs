// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook payload model, event filtering, and authorization.
//!
//! Decides whether an incoming UltraMSG event should reach the turn
//! controller: self-sent messages, delivery acks, and non-message events
//! are acknowledged and dropped; everything else is extracted into a
//! channel-agnostic [`InboundMessage`].

use autolote_core::canonical_phone;
use serde::Deserialize;
use tracing::debug;

/// Raw webhook event as posted by the messaging provider.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub data: Option<WebhookData>,
}

/// Message payload inside a webhook event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, rename = "fromMe")]
    pub from_me: bool,
    #[serde(default, rename = "self")]
    pub is_self: bool,
    /// Message type tag ("chat", "audio", "ptt", "image", ...).
    #[serde(default, rename = "type")]
    pub message_type: Option<String>,
    #[serde(default)]
    pub media: Option<String>,
}

/// A webhook event reduced to what the turn controller needs.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Raw sender identifier as the provider reported it.
    pub sender: String,
    pub text: String,
    pub is_audio: bool,
    pub media_url: Option<String>,
}

/// Extract a processable inbound message from a webhook event.
///
/// Returns `None` for events the webhook acknowledges without processing:
/// self-sent messages, acks, non-"message_received" events, and events
/// with no sender.
pub fn extract_inbound(event: &WebhookEvent) -> Option<InboundMessage> {
    let data = event.data.as_ref()?;
    let sender = data.from.as_deref()?.to_string();

    if data.from_me || data.is_self {
        debug!("ignoring self-sent message");
        return None;
    }

    match event.event_type.as_deref() {
        Some("message_ack") => {
            debug!("ignoring delivery ack");
            return None;
        }
        Some("message_received") => {}
        other => {
            debug!(event_type = ?other, "ignoring non-message event");
            return None;
        }
    }

    let is_audio = matches!(
        data.message_type.as_deref(),
        Some("audio") | Some("ptt") | Some("voice")
    );

    Some(InboundMessage {
        sender,
        text: data.body.as_deref().unwrap_or("").trim().to_string(),
        is_audio,
        media_url: data.media.clone(),
    })
}

/// Checks whether a sender is on the static allow-list.
///
/// Both sides are canonicalized before comparing, so the list can hold any
/// phone format. An empty list rejects everyone (secure default).
pub fn is_authorized(sender: &str, authorized_numbers: &[String]) -> bool {
    if authorized_numbers.is_empty() {
        return false;
    }
    let canonical = canonical_phone(sender);
    authorized_numbers
        .iter()
        .any(|number| canonical_phone(number) == canonical)
}
