// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the turn controller and its collaborators.
//!
//! Each external service the pipeline touches sits behind one of these
//! traits so tests can substitute deterministic mocks.

pub mod channel;
pub mod inventory;
pub mod notify;
pub mod speech;
pub mod store;
pub mod synthesizer;

pub use channel::MessagingChannel;
pub use inventory::InventoryProvider;
pub use notify::AppointmentNotifier;
pub use speech::{SpeechSynthesizer, Transcriber};
pub use store::LeadStore;
pub use synthesizer::ReplySynthesizer;
