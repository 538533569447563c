// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic mocks for Autolote integration tests.
//!
//! Every seam trait has a scriptable implementation here, enabling fast,
//! CI-runnable tests without external API calls.

pub mod memory_store;
pub mod mock_channel;
pub mod mock_inventory;
pub mod mock_notifier;
pub mod mock_synthesizer;
pub mod mock_voice;

pub use memory_store::MemoryLeadStore;
pub use mock_channel::RecordingChannel;
pub use mock_inventory::StaticInventory;
pub use mock_notifier::CountingNotifier;
pub use mock_synthesizer::{
    appointment_reply, consultation_reply, images_reply, ScriptedSynthesizer,
};
pub use mock_voice::{ScriptedTranscriber, ScriptedVoice};
