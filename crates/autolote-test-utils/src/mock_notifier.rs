// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording appointment notifier.

use std::sync::Mutex;

use async_trait::async_trait;
use autolote_core::{AppointmentNotifier, AutoloteError, Lead};

/// Records every lead passed to `notify_appointment`.
#[derive(Default)]
pub struct CountingNotifier {
    notified: Mutex<Vec<Lead>>,
}

impl CountingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.notified.lock().unwrap().len()
    }

    /// Every lead the fan-out was invoked with, in order.
    pub fn notified(&self) -> Vec<Lead> {
        self.notified.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppointmentNotifier for CountingNotifier {
    async fn notify_appointment(&self, lead: &Lead) -> Result<(), AutoloteError> {
        self.notified.lock().unwrap().push(lead.clone());
        Ok(())
    }
}
