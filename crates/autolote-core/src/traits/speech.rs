// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Speech synthesis and transcription traits.

use async_trait::async_trait;

use crate::error::AutoloteError;
use crate::types::{Tone, VoiceAsset};

/// Text-to-speech rendering backed by transient public-URL storage.
///
/// Every synthesized asset is time-boxed: the caller schedules
/// [`delete_asset`](SpeechSynthesizer::delete_asset) a bounded time after
/// dispatch, on success and failure paths alike.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` to audio with the given prosody preset and store it
    /// behind a public URL.
    async fn synthesize(&self, text: &str, tone: Tone) -> Result<VoiceAsset, AutoloteError>;

    /// Remove a previously synthesized asset from the audio store.
    async fn delete_asset(&self, object_name: &str) -> Result<(), AutoloteError>;

    /// Pick a prosody preset from lexical cues in the message text.
    fn classify_tone(&self, text: &str) -> Tone;
}

/// Speech-to-text over a media URL.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio behind `media_url` into plain text.
    async fn transcribe(&self, media_url: &str) -> Result<String, AutoloteError>;
}
