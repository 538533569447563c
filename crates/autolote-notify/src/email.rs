// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment notification email over the Resend API.

use std::time::Duration;

use autolote_core::{AutoloteError, Lead};
use serde::Serialize;
use tracing::debug;

/// Base URL for the Resend API.
const API_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: String,
    text: String,
}

/// Email client for appointment notifications.
#[derive(Debug, Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
    recipients: Vec<String>,
}

impl ResendClient {
    pub fn new(
        api_key: String,
        domain: &str,
        recipients: Vec<String>,
    ) -> Result<Self, AutoloteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AutoloteError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            api_key,
            from: format!("Bot Concesionario <noreply@{domain}>"),
            recipients,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Send the appointment notification for a freshly persisted lead.
    pub async fn send_appointment_notification(&self, lead: &Lead) -> Result<(), AutoloteError> {
        let payload = EmailPayload {
            from: &self.from,
            to: &self.recipients,
            subject: format!("🚗 Nueva cita agendada - {}", lead.client.name),
            text: appointment_email_text(lead),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AutoloteError::Internal(format!("email send failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutoloteError::Internal(format!(
                "email API returned {status}: {body}"
            )));
        }

        debug!(lead_id = %lead.id, "appointment email sent");
        Ok(())
    }
}

/// Plain-text body of the appointment notification.
fn appointment_email_text(lead: &Lead) -> String {
    let unspecified = "No especificado".to_string();
    let interest = &lead.interest;
    let process = &lead.process;

    format!(
        "Nueva Cita Agendada - Concesionario\n\
         ID Lead: {id}\n\n\
         === INFORMACIÓN DEL CLIENTE ===\n\
         Teléfono: {phone}\n\
         Nombre: {name}\n\
         Email: {email}\n\n\
         === INTERÉS DEL CLIENTE ===\n\
         Marca de interés: {brand}\n\
         Modelo de interés: {model}\n\
         Tipo de vehículo: {vehicle_type}\n\
         Presupuesto máximo: {budget}\n\
         Vehículo favorito: {favorite}\n\n\
         === INFORMACIÓN DE LA CITA ===\n\
         Fecha: {date}\n\
         Hora: {time}\n\
         Vehículo a ver: {appointment_vehicle}\n\
         Status: {status}\n\n\
         === VEHÍCULOS CONSULTADOS ===\n\
         {consulted}\n\n\
         === INFORMACIÓN DEL PROCESO ===\n\
         Fecha de contacto inicial: {first_contact}\n\
         Última actividad: {last_activity}\n\n\
         ---\n\
         Bot Concesionario - Sistema Automático de Gestión de Leads",
        id = lead.id,
        phone = lead.client.phone,
        name = lead.client.name,
        email = lead.client.email.clone().unwrap_or_else(|| "No proporcionado".into()),
        brand = interest.brand.clone().unwrap_or_else(|| unspecified.clone()),
        model = interest.model.clone().unwrap_or_else(|| unspecified.clone()),
        vehicle_type = interest.vehicle_type.clone().unwrap_or_else(|| unspecified.clone()),
        budget = interest
            .max_budget
            .map(|b| format!("${b}"))
            .unwrap_or_else(|| unspecified.clone()),
        favorite = interest.favorite_vehicle.clone().unwrap_or_else(|| unspecified.clone()),
        date = process.appointment_date.clone().unwrap_or_else(|| "No especificada".into()),
        time = process.appointment_time.clone().unwrap_or_else(|| "No especificada".into()),
        appointment_vehicle = process
            .appointment_vehicle
            .clone()
            .unwrap_or_else(|| unspecified.clone()),
        status = process.status,
        consulted = if interest.consulted_vehicles.is_empty() {
            "Ninguno registrado".to_string()
        } else {
            interest.consulted_vehicles.join("\n")
        },
        first_contact = lead.client.first_contact_at.to_rfc3339(),
        last_activity = process.last_activity_at.to_rfc3339(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use autolote_core::{ClientInfo, Interest, LeadStatus, SalesProcess};
    use chrono::Utc;
    use wiremock::matchers::{body_string_contains, header, method, path};
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
                consulted_vehicles: vec!["VEH002".into()],
                ..Default::default()
            },
            process: SalesProcess {
                current_step: "cita_confirmada".into(),
                status: LeadStatus::AppointmentScheduled,
                started_at: now,
                last_activity_at: now,
                appointment_date: Some("2026-08-10".into()),
                appointment_time: Some("15:00".into()),
                appointment_vehicle: Some("VEH002".into()),
                history: Vec::new(),
            },
        }
    }

    #[tokio::test]
    async fn sends_notification_with_lead_details() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re-key"))
            .and(body_string_contains("LEAD_42"))
            .and(body_string_contains("Mazda"))
            .and(body_string_contains("2026-08-10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "email_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ResendClient::new(
            "re-key".into(),
            "lote.example",
            vec!["ventas@lote.example".into()],
        )
        .unwrap()
        .with_base_url(server.uri());

        client
            .send_appointment_notification(&appointment_lead())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
            .mount(&server)
            .await;

        let client = ResendClient::new("re-key".into(), "lote.example", vec![])
            .unwrap()
            .with_base_url(server.uri());
        let result = client.send_appointment_notification(&appointment_lead()).await;
        assert!(result.is_err());
    }

    #[test]
    fn email_text_handles_missing_fields() {
        let mut lead = appointment_lead();
        lead.interest = Interest::default();
        lead.process.appointment_date = None;

        let text = appointment_email_text(&lead);
        assert!(text.contains("Marca de interés: No especificado"));
        assert!(text.contains("Fecha: No especificada"));
        assert!(text.contains("Ninguno registrado"));
    }
}
