// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Purely in-memory lead store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use autolote_core::{canonical_phone, AutoloteError, Lead, LeadStore, StoreHealth};

/// HashMap-backed [`LeadStore`] with the same canonicalization behavior as
/// the production store.
#[derive(Default)]
pub struct MemoryLeadStore {
    leads: Mutex<HashMap<String, Lead>>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.leads.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Lead>, AutoloteError> {
        let key = canonical_phone(phone);
        Ok(self.leads.lock().unwrap().get(&key).cloned())
    }

    async fn create(&self, mut lead: Lead) -> Result<Lead, AutoloteError> {
        let key = canonical_phone(&lead.client.phone);
        lead.client.phone = key.clone();
        self.leads.lock().unwrap().insert(key, lead.clone());
        Ok(lead)
    }

    async fn update(&self, phone: &str, lead: &Lead) -> Result<Lead, AutoloteError> {
        let key = canonical_phone(phone);
        let mut leads = self.leads.lock().unwrap();
        if !leads.contains_key(&key) {
            return Err(AutoloteError::NotFound(format!("lead {key}")));
        }
        let mut updated = lead.clone();
        updated.client.phone = key.clone();
        leads.insert(key, updated.clone());
        Ok(updated)
    }

    async fn list_all(&self) -> Result<Vec<Lead>, AutoloteError> {
        Ok(self.leads.lock().unwrap().values().cloned().collect())
    }

    async fn delete(&self, phone: &str) -> Result<bool, AutoloteError> {
        let key = canonical_phone(phone);
        Ok(self.leads.lock().unwrap().remove(&key).is_some())
    }

    async fn health_check(&self) -> StoreHealth {
        let total = self.len();
        StoreHealth {
            primary_available: true,
            fallback_count: 0,
            total_count: total,
        }
    }
}
