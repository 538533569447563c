// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment notification fan-out trait.

use async_trait::async_trait;

use crate::error::AutoloteError;
use crate::types::Lead;

/// Side-channel notification when a lead confirms an appointment.
///
/// Invoked fire-and-forget from a scheduled background task; failures are
/// logged by the caller and never retried.
#[async_trait]
pub trait AppointmentNotifier: Send + Sync {
    /// Notify the dealership (email + lead sheet) about a scheduled
    /// appointment, using the freshly persisted record.
    async fn notify_appointment(&self, lead: &Lead) -> Result<(), AutoloteError>;
}
