// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead log append over the Google Sheets values API.

use std::time::Duration;

use autolote_core::{AutoloteError, Lead};
use serde::Serialize;
use tracing::debug;

/// Base URL for the Sheets API.
const API_BASE_URL: &str = "https://sheets.googleapis.com";

#[derive(Debug, Serialize)]
struct AppendBody {
    values: Vec<Vec<String>>,
}

/// Append-only client for the lead log sheet.
#[derive(Debug, Clone)]
pub struct LeadSheetClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    range: String,
    api_token: Option<String>,
}

impl LeadSheetClient {
    pub fn new(
        spreadsheet_id: String,
        range: String,
        api_token: Option<String>,
    ) -> Result<Self, AutoloteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AutoloteError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            spreadsheet_id,
            range,
            api_token,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Append one row describing the lead to the log sheet.
    pub async fn append_lead(&self, lead: &Lead) -> Result<(), AutoloteError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.base_url, self.spreadsheet_id, self.range
        );

        let body = AppendBody {
            values: vec![lead_row(lead)],
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AutoloteError::Internal(format!("sheet append failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutoloteError::Internal(format!(
                "sheets API returned {status}: {body}"
            )));
        }

        debug!(lead_id = %lead.id, "lead appended to sheet");
        Ok(())
    }
}

/// One spreadsheet row for a lead, column order fixed by the sheet header.
fn lead_row(lead: &Lead) -> Vec<String> {
    let interest = &lead.interest;
    let process = &lead.process;
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();

    vec![
        lead.id.clone(),
        chrono::Utc::now().to_rfc3339(),
        lead.client.phone.clone(),
        lead.client.name.clone(),
        opt(&lead.client.email),
        opt(&interest.brand),
        opt(&interest.model),
        opt(&interest.vehicle_type),
        interest
            .max_budget
            .map(|b| b.to_string())
            .unwrap_or_default(),
        opt(&interest.favorite_vehicle),
        process.status.to_string(),
        opt(&process.appointment_date),
        opt(&process.appointment_time),
        opt(&process.appointment_vehicle),
        interest.consulted_vehicles.join(", "),
        opt(&interest.notes),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use autolote_core::{ClientInfo, Interest, LeadStatus, SalesProcess};
    use chrono::Utc;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn appointment_lead() -> Lead {
        let now = Utc::now();
        Lead {
            id: "LEAD_42".into(),
            client: ClientInfo {
                phone: "573001234567".into(),
                name: "Cliente Potencial".into(),
                email: None,
                first_contact_at: now,
            },
            interest: Interest {
                brand: Some("Mazda".into()),
                max_budget: Some(95_000_000),
                consulted_vehicles: vec!["VEH002".into(), "VEH005".into()],
                ..Default::default()
            },
            process: SalesProcess {
                current_step: "cita_confirmada".into(),
                status: LeadStatus::AppointmentScheduled,
                started_at: now,
                last_activity_at: now,
                appointment_date: Some("2026-08-10".into()),
                appointment_time: None,
                appointment_vehicle: None,
                history: Vec::new(),
            },
        }
    }

    #[tokio::test]
    async fn appends_lead_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/leads-1/values/Leads!A:P:append"))
            .and(query_param("valueInputOption", "USER_ENTERED"))
            .and(body_string_contains("LEAD_42"))
            .and(body_string_contains("appointment_scheduled"))
            .and(body_string_contains("VEH002, VEH005"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "updates": {"updatedRows": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LeadSheetClient::new("leads-1".into(), "Leads!A:P".into(), None)
            .unwrap()
            .with_base_url(server.uri());
        client.append_lead(&appointment_lead()).await.unwrap();
    }

    #[tokio::test]
    async fn api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("no access"))
            .mount(&server)
            .await;

        let client = LeadSheetClient::new("leads-1".into(), "Leads!A:P".into(), None)
            .unwrap()
            .with_base_url(server.uri());
        assert!(client.append_lead(&appointment_lead()).await.is_err());
    }

    #[test]
    fn lead_row_has_fixed_width() {
        let row = lead_row(&appointment_lead());
        assert_eq!(row.len(), 16);
        assert_eq!(row[0], "LEAD_42");
        assert_eq!(row[8], "95000000");
    }
}
