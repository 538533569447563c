// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voice pipeline for the Autolote sales assistant.
//!
//! Covers both audio directions: rendering replies to speech (text cleanup,
//! ElevenLabs synthesis, transient public-URL storage) and transcribing
//! inbound voice notes (Whisper).

pub mod audio_store;
pub mod cleanup;
pub mod elevenlabs;
pub mod renderer;
pub mod tone;
pub mod transcriber;

pub use audio_store::AudioStoreClient;
pub use elevenlabs::ElevenLabsClient;
pub use renderer::VoiceRenderer;
pub use tone::{classify_tone, settings_for_tone, VoiceSettings, VoiceSettingsUpdate};
pub use transcriber::WhisperTranscriber;
