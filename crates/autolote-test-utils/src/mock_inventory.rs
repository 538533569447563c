// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-snapshot inventory provider.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use autolote_core::{AutoloteError, InventoryProvider, InventorySnapshot, Vehicle};

/// Serves a fixed set of vehicles; can be flipped into a failing state to
/// simulate the sheet being unreachable.
pub struct StaticInventory {
    vehicles: Vec<Vehicle>,
    failing: AtomicBool,
}

impl StaticInventory {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicles,
            failing: AtomicBool::new(false),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Make every subsequent read fail.
    pub fn fail(&self, fail: bool) {
        self.failing.store(fail, Ordering::Relaxed);
    }

    fn guard(&self) -> Result<(), AutoloteError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(AutoloteError::Internal("scripted inventory failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryProvider for StaticInventory {
    async fn snapshot(&self) -> Result<InventorySnapshot, AutoloteError> {
        self.guard()?;
        let mut brands: Vec<String> = self.vehicles.iter().map(|v| v.brand.clone()).collect();
        brands.sort();
        brands.dedup();
        let mut models: Vec<String> = self.vehicles.iter().map(|v| v.model.clone()).collect();
        models.sort();
        models.dedup();

        Ok(InventorySnapshot {
            vehicles: self.vehicles.clone(),
            brands,
            models,
            types: Vec::new(),
            last_update: chrono::Utc::now(),
        })
    }

    async fn vehicle_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Vehicle>, AutoloteError> {
        self.guard()?;
        Ok(self
            .vehicles
            .iter()
            .find(|v| v.reference == reference)
            .cloned())
    }
}
