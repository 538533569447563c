// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Autolote sales assistant.
//!
//! This crate provides the error type, domain types, phone canonicalization,
//! and the seam traits implemented by the adapter crates in this workspace.

pub mod error;
pub mod phone;
pub mod tasks;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{AutoloteError, LlmError};
pub use phone::canonical_phone;
pub use tasks::TaskRegistry;
pub use types::{
    BatchPolicy, ClientInfo, HistoryEntry, Interest, InventorySnapshot, Lead, LeadStatus,
    PendingMessage, ResponseKind, SalesProcess, SellerReply, StoreHealth, Tone, Vehicle,
    VoiceAsset, HISTORY_CAP,
};

pub use traits::{
    AppointmentNotifier, InventoryProvider, LeadStore, MessagingChannel, ReplySynthesizer,
    SpeechSynthesizer, Transcriber,
};
