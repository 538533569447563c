// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn controller for the Autolote sales assistant.
//!
//! Owns the per-sender debounce queue, the processing flag, and the turn
//! pipeline; orchestrates the store, synthesizer, inventory, voice, and
//! notification collaborators and encodes the failure/fallback policy.
//!
//! Debounce timing runs on tokio's clock, so tests drive it
//! deterministically with `#[tokio::test(start_paused = true)]`.

pub mod controller;
pub mod conversation;
pub mod lead;
pub mod persona;

pub use controller::{TurnController, TurnControllerConfig};
pub use conversation::{select_text, ConversationSnapshot};
pub use lead::{find_or_create, new_lead, new_lead_id, DEFAULT_CLIENT_NAME, INITIAL_STEP};
pub use persona::{opening_message, ApologyPicker, GENERAL_APOLOGIES, OVERLOAD_APOLOGIES};
