// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inventory read-access trait.

use async_trait::async_trait;

use crate::error::AutoloteError;
use crate::types::{InventorySnapshot, Vehicle};

/// Time-cached read-through view of the vehicle listings.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    /// Current snapshot, refreshed when the cache TTL has elapsed.
    async fn snapshot(&self) -> Result<InventorySnapshot, AutoloteError>;

    /// Look up one vehicle by its unique reference code.
    async fn vehicle_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Vehicle>, AutoloteError>;
}
