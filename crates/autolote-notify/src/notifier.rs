// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out of appointment notifications to every configured target.

use async_trait::async_trait;
use tracing::{debug, warn};

use autolote_core::{AppointmentNotifier, AutoloteError, Lead};

use crate::email::ResendClient;
use crate::sheet::LeadSheetClient;

/// Sends the appointment notification to email and the lead sheet.
///
/// Targets are independent: one failing does not stop the other. The call
/// errors only when every configured target failed.
#[derive(Default)]
pub struct AppointmentFanout {
    email: Option<ResendClient>,
    sheet: Option<LeadSheetClient>,
}

impl AppointmentFanout {
    pub fn new(email: Option<ResendClient>, sheet: Option<LeadSheetClient>) -> Self {
        Self { email, sheet }
    }
}

#[async_trait]
impl AppointmentNotifier for AppointmentFanout {
    async fn notify_appointment(&self, lead: &Lead) -> Result<(), AutoloteError> {
        let mut attempted = 0usize;
        let mut succeeded = 0usize;

        if let Some(email) = &self.email {
            attempted += 1;
            match email.send_appointment_notification(lead).await {
                Ok(()) => succeeded += 1,
                Err(e) => warn!(lead_id = %lead.id, error = %e, "appointment email failed"),
            }
        }

        if let Some(sheet) = &self.sheet {
            attempted += 1;
            match sheet.append_lead(lead).await {
                Ok(()) => succeeded += 1,
                Err(e) => warn!(lead_id = %lead.id, error = %e, "lead sheet append failed"),
            }
        }

        if attempted == 0 {
            debug!(lead_id = %lead.id, "no notification targets configured");
            return Ok(());
        }
        if succeeded == 0 {
            return Err(AutoloteError::Internal(
                "every notification target failed".into(),
            ));
        }
        Ok(())
    }
}
