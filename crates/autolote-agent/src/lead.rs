// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead construction and idempotent find-or-create.

use autolote_core::{
    canonical_phone, AutoloteError, ClientInfo, Lead, LeadStore, SalesProcess,
};
use chrono::Utc;

/// Initial conversation step for a brand-new lead.
pub const INITIAL_STEP: &str = "saludo_inicial";

/// Placeholder name until the model extracts a real one.
pub const DEFAULT_CLIENT_NAME: &str = "Cliente Potencial";

/// Generate an opaque lead id.
pub fn new_lead_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("LEAD_{}_{}", Utc::now().timestamp_millis(), &suffix[..9])
}

/// Build a fresh lead record for a sender.
pub fn new_lead(phone: &str) -> Lead {
    let now = Utc::now();
    Lead {
        id: new_lead_id(),
        client: ClientInfo {
            phone: canonical_phone(phone),
            name: DEFAULT_CLIENT_NAME.to_string(),
            email: None,
            first_contact_at: now,
        },
        interest: Default::default(),
        process: SalesProcess {
            current_step: INITIAL_STEP.to_string(),
            status: Default::default(),
            started_at: now,
            last_activity_at: now,
            appointment_date: None,
            appointment_time: None,
            appointment_vehicle: None,
            history: Vec::new(),
        },
    }
}

/// Find the lead for a sender, creating it on first contact.
///
/// Idempotent for a given canonical phone: the existence check runs before
/// the create, and per-sender turns are serialized by the controller, so at
/// most one record ever exists per key.
pub async fn find_or_create(store: &dyn LeadStore, phone: &str) -> Result<Lead, AutoloteError> {
    if let Some(existing) = store.find_by_phone(phone).await? {
        return Ok(existing);
    }
    store.create(new_lead(phone)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lead_ids_are_unique_and_prefixed() {
        let a = new_lead_id();
        let b = new_lead_id();
        assert!(a.starts_with("LEAD_"));
        assert_ne!(a, b);
    }

    #[test]
    fn new_lead_starts_at_the_greeting_step() {
        let lead = new_lead("3001234567");
        assert_eq!(lead.client.phone, "573001234567");
        assert_eq!(lead.process.current_step, INITIAL_STEP);
        assert!(lead.process.history.is_empty());
    }
}
