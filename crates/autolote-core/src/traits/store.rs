// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead persistence trait.

use async_trait::async_trait;

use crate::error::AutoloteError;
use crate::types::{Lead, StoreHealth};

/// Key-value persistence for lead records, keyed by canonical phone.
///
/// Implementations canonicalize the phone argument before every lookup and
/// write. Find-or-create idempotency is the caller's responsibility:
/// check [`find_by_phone`](LeadStore::find_by_phone) before
/// [`create`](LeadStore::create).
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Look up the lead for a sender, if one exists.
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Lead>, AutoloteError>;

    /// Persist a new lead record. The caller supplies a fully formed lead
    /// (id already assigned); the store writes it under the canonical key.
    async fn create(&self, lead: Lead) -> Result<Lead, AutoloteError>;

    /// Replace the stored record for an existing lead.
    ///
    /// Fails with [`AutoloteError::NotFound`] when no record exists for the
    /// canonical key.
    async fn update(&self, phone: &str, lead: &Lead) -> Result<Lead, AutoloteError>;

    /// All known leads, merging primary and fallback results and preferring
    /// the primary on key collision.
    async fn list_all(&self) -> Result<Vec<Lead>, AutoloteError>;

    /// Delete a lead. Returns whether anything was removed.
    async fn delete(&self, phone: &str) -> Result<bool, AutoloteError>;

    /// Availability and occupancy summary for the health endpoint.
    async fn health_check(&self) -> StoreHealth;
}
