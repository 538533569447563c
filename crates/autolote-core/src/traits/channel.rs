// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging gateway trait for outbound WhatsApp delivery.

use async_trait::async_trait;

use crate::error::AutoloteError;

/// Fire-and-forget outbound message delivery.
///
/// The gateway offers no delivery guarantees; callers treat a returned `Ok`
/// as "accepted by the provider", nothing more.
#[async_trait]
pub trait MessagingChannel: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, to: &str, body: &str) -> Result<(), AutoloteError>;

    /// Send an audio message referenced by a public URL.
    async fn send_audio_url(&self, to: &str, audio_url: &str) -> Result<(), AutoloteError>;

    /// Send an image referenced by a public URL, with a caption.
    async fn send_image_url(
        &self,
        to: &str,
        image_url: &str,
        caption: &str,
    ) -> Result<(), AutoloteError>;
}
