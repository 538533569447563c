// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead persistence for the Autolote sales assistant.
//!
//! SQLite primary storage with an in-process fallback map that takes over
//! when the primary is unreachable. See [`SqliteLeadStore`].

pub mod database;
pub mod store;

pub use store::SqliteLeadStore;
