// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spreadsheet-backed vehicle inventory for the Autolote sales assistant.
//!
//! The inventory sheet is fetched through the Sheets values API and served
//! from a TTL cache; see [`InventoryService`].

pub mod service;
pub mod sheets;

pub use service::{InventoryService, InventoryStats, SearchCriteria};
pub use sheets::SheetsClient;
