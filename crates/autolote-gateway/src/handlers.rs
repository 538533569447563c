// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! The webhook and start-conversation paths gate on the sender allow-list;
//! everything else is a thin read/write over the components in
//! [`GatewayState`](crate::server::GatewayState).

use std::collections::BTreeMap;

use autolote_agent::{find_or_create, opening_message, ConversationSnapshot};
use autolote_channel::{extract_inbound, is_authorized, DeliveryOptions, WebhookEvent};
use autolote_core::{
    canonical_phone, InventoryProvider, Lead, LeadStatus, LeadStore, MessagingChannel,
    StoreHealth, Tone,
};
use autolote_inventory::InventoryStats;
use autolote_voice::{classify_tone, VoiceSettingsUpdate};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::server::GatewayState;

/// Default image used by the test-image endpoint.
const TEST_IMAGE_URL: &str =
    "https://storage.googleapis.com/cluvi/Autos-ST/Vehicle_Images/pilot_out.jpg";

// --- Response/request bodies ---

/// Generic acknowledgment body.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    fn with_message(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Request body for POST /start-conversation.
#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    pub phone_number: String,
}

/// Response body for POST /start-conversation.
#[derive(Debug, Serialize)]
pub struct StartConversationResponse {
    pub success: bool,
    pub message: String,
    pub lead_id: String,
    pub phone_number: String,
}

/// 403 body listing the allow-list, mirroring the original API.
#[derive(Debug, Serialize)]
pub struct UnauthorizedResponse {
    pub error: String,
    pub authorized_numbers: Vec<String>,
}

/// One row of GET /leads.
#[derive(Debug, Serialize)]
pub struct LeadSummary {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub brand: Option<String>,
    pub vehicle_type: Option<String>,
    pub max_budget: Option<u64>,
    pub status: LeadStatus,
    pub last_activity_at: chrono::DateTime<chrono::Utc>,
    pub appointment_date: Option<String>,
    pub authorized: bool,
    pub conversations: usize,
}

/// Response body for GET /leads.
#[derive(Debug, Serialize)]
pub struct LeadsResponse {
    pub leads: Vec<LeadSummary>,
    pub total: usize,
    pub authorized_leads: usize,
    pub active_leads: usize,
    pub appointment_scheduled: usize,
}

/// Response body for GET /lead/{phone}.
#[derive(Debug, Serialize)]
pub struct LeadDetailResponse {
    #[serde(flatten)]
    pub lead: Lead,
    pub authorized: bool,
    pub current_step: String,
}

/// Response body for GET /inventory and GET /admin/test-inventory.
#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub success: bool,
    pub total: usize,
    pub brands: Vec<String>,
    pub models: Vec<String>,
    pub vehicles: Vec<autolote_core::Vehicle>,
}

/// One row of GET /conversations.
#[derive(Debug, Serialize)]
pub struct ConversationView {
    #[serde(flatten)]
    pub snapshot: ConversationSnapshot,
    pub authorized: bool,
}

/// Response body for GET /conversations.
#[derive(Debug, Serialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<ConversationView>,
    pub total: usize,
}

/// Response body for GET /stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_leads: usize,
    pub active_leads: usize,
    pub appointment_scheduled: usize,
    pub completed: usize,
    pub popular_brands: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<InventoryStats>,
    pub active_conversations: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub active_conversations: usize,
    pub store: StoreHealth,
    pub inventory_loaded: bool,
    pub total_vehicles: usize,
}

/// Request body for POST /admin/analyze-tone.
#[derive(Debug, Deserialize)]
pub struct AnalyzeToneRequest {
    pub message: String,
}

/// Response body for POST /admin/analyze-tone.
#[derive(Debug, Serialize)]
pub struct AnalyzeToneResponse {
    pub tone: Tone,
}

/// Request body for POST /admin/test-image.
#[derive(Debug, Deserialize)]
pub struct TestImageRequest {
    pub phone_number: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

// --- Handlers ---

/// POST /webhook
///
/// Acknowledges every well-formed event with 200; only authorized
/// "message_received" events from other parties reach the turn controller.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    Json(event): Json<WebhookEvent>,
) -> Response {
    let Some(inbound) = extract_inbound(&event) else {
        return (StatusCode::OK, Json(Ack::ok())).into_response();
    };

    if !is_authorized(&inbound.sender, &state.authorized_numbers) {
        info!(sender = %inbound.sender, "unauthorized sender acknowledged and ignored");
        return (
            StatusCode::OK,
            Json(Ack::with_message("unauthorized sender")),
        )
            .into_response();
    }

    state.controller.enqueue(
        &inbound.sender,
        inbound.text,
        inbound.is_audio,
        inbound.media_url,
    );
    (StatusCode::OK, Json(Ack::ok())).into_response()
}

/// POST /start-conversation
///
/// Creates/finds the lead and sends the persona's opening message.
/// Unauthorized numbers are rejected with 403 and the allow-list.
pub async fn post_start_conversation(
    State(state): State<GatewayState>,
    Json(body): Json<StartConversationRequest>,
) -> Response {
    if body.phone_number.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "phone_number is required");
    }
    if !autolote_core::phone::is_valid_phone(&body.phone_number) {
        return error_response(StatusCode::BAD_REQUEST, "phone_number is not a valid mobile number");
    }

    let phone = canonical_phone(&body.phone_number);
    if !is_authorized(&phone, &state.authorized_numbers) {
        info!(phone = %phone, "start-conversation rejected: unauthorized");
        return (
            StatusCode::FORBIDDEN,
            Json(UnauthorizedResponse {
                error: "unauthorized phone number".into(),
                authorized_numbers: state.authorized_numbers.as_ref().clone(),
            }),
        )
            .into_response();
    }

    let lead = match find_or_create(state.store.as_ref(), &phone).await {
        Ok(lead) => lead,
        Err(e) => {
            warn!(phone = %phone, error = %e, "start-conversation lead creation failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "could not create lead");
        }
    };

    let inventory = state.inventory.snapshot().await.ok();
    let greeting = opening_message(state.controller.persona_name(), inventory.as_ref());

    if let Err(e) = state
        .dispatcher
        .deliver(
            &phone,
            &greeting,
            DeliveryOptions {
                as_audio: true,
                tone: Some(Tone::Greeting),
            },
        )
        .await
    {
        warn!(phone = %phone, error = %e, "opening message delivery failed");
        return error_response(StatusCode::BAD_GATEWAY, "could not deliver opening message");
    }

    info!(phone = %phone, lead_id = %lead.id, "conversation started");
    (
        StatusCode::OK,
        Json(StartConversationResponse {
            success: true,
            message: "conversation started".into(),
            lead_id: lead.id,
            phone_number: phone,
        }),
    )
        .into_response()
}

/// GET /leads
pub async fn get_leads(State(state): State<GatewayState>) -> Response {
    let leads = match state.store.list_all().await {
        Ok(leads) => leads,
        Err(e) => {
            warn!(error = %e, "lead listing failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "could not list leads");
        }
    };

    let summaries: Vec<LeadSummary> = leads
        .iter()
        .map(|lead| LeadSummary {
            id: lead.id.clone(),
            name: lead.client.name.clone(),
            phone: lead.client.phone.clone(),
            brand: lead.interest.brand.clone(),
            vehicle_type: lead.interest.vehicle_type.clone(),
            max_budget: lead.interest.max_budget,
            status: lead.process.status,
            last_activity_at: lead.process.last_activity_at,
            appointment_date: lead.process.appointment_date.clone(),
            authorized: is_authorized(&lead.client.phone, &state.authorized_numbers),
            conversations: lead.process.history.len(),
        })
        .collect();

    let response = LeadsResponse {
        total: summaries.len(),
        authorized_leads: summaries.iter().filter(|l| l.authorized).count(),
        active_leads: summaries
            .iter()
            .filter(|l| l.status == LeadStatus::Active)
            .count(),
        appointment_scheduled: summaries
            .iter()
            .filter(|l| l.status == LeadStatus::AppointmentScheduled)
            .count(),
        leads: summaries,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /lead/{phone}
pub async fn get_lead(
    State(state): State<GatewayState>,
    Path(phone): Path<String>,
) -> Response {
    match state.store.find_by_phone(&phone).await {
        Ok(Some(lead)) => {
            let current_step = lead.process.current_step.clone();
            let authorized = is_authorized(&lead.client.phone, &state.authorized_numbers);
            (
                StatusCode::OK,
                Json(LeadDetailResponse {
                    lead,
                    authorized,
                    current_step,
                }),
            )
                .into_response()
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "lead not found"),
        Err(e) => {
            warn!(error = %e, "lead lookup failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "could not read lead")
        }
    }
}

/// DELETE /admin/clear-data/{phone}
pub async fn delete_clear_data(
    State(state): State<GatewayState>,
    Path(phone): Path<String>,
) -> Response {
    let deleted = match state.store.delete(&phone).await {
        Ok(deleted) => deleted,
        Err(e) => {
            warn!(error = %e, "lead deletion failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "could not delete lead");
        }
    };
    let buffer_dropped = state.controller.remove_conversation(&phone);

    info!(phone = %canonical_phone(&phone), deleted, buffer_dropped, "sender data cleared");
    (
        StatusCode::OK,
        Json(Ack::with_message(if deleted || buffer_dropped {
            "data cleared"
        } else {
            "nothing to clear"
        })),
    )
        .into_response()
}

/// GET /inventory
pub async fn get_inventory(State(state): State<GatewayState>) -> Response {
    match state.inventory.snapshot().await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(InventoryResponse {
                success: true,
                total: snapshot.vehicles.len(),
                brands: snapshot.brands,
                models: snapshot.models,
                vehicles: snapshot.vehicles,
            }),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "inventory read failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /admin/test-inventory
///
/// Forces a fresh fetch past the cache and reports what loaded.
pub async fn get_test_inventory(State(state): State<GatewayState>) -> Response {
    state.inventory.invalidate().await;
    get_inventory(State(state)).await
}

/// POST /admin/clear-inventory-cache
pub async fn post_clear_inventory_cache(State(state): State<GatewayState>) -> Response {
    state.inventory.invalidate().await;
    (StatusCode::OK, Json(Ack::with_message("cache cleared"))).into_response()
}

/// GET /conversations
pub async fn get_conversations(State(state): State<GatewayState>) -> Response {
    let conversations: Vec<ConversationView> = state
        .controller
        .conversations()
        .into_iter()
        .map(|snapshot| ConversationView {
            authorized: is_authorized(&snapshot.phone, &state.authorized_numbers),
            snapshot,
        })
        .collect();

    let response = ConversationsResponse {
        total: conversations.len(),
        conversations,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /stats
pub async fn get_stats(State(state): State<GatewayState>) -> Response {
    let leads = match state.store.list_all().await {
        Ok(leads) => leads,
        Err(e) => {
            warn!(error = %e, "stats lead listing failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "could not read leads");
        }
    };

    let mut popular_brands: BTreeMap<String, usize> = BTreeMap::new();
    for lead in &leads {
        if let Some(brand) = &lead.interest.brand {
            *popular_brands.entry(brand.clone()).or_default() += 1;
        }
    }

    let count_status = |status: LeadStatus| {
        leads
            .iter()
            .filter(|l| l.process.status == status)
            .count()
    };

    let response = StatsResponse {
        total_leads: leads.len(),
        active_leads: count_status(LeadStatus::Active),
        appointment_scheduled: count_status(LeadStatus::AppointmentScheduled),
        completed: count_status(LeadStatus::Completed),
        popular_brands,
        inventory: state.inventory.stats().await.ok(),
        active_conversations: state.controller.conversations().len(),
        timestamp: chrono::Utc::now(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let store = state.store.health_check().await;
    let inventory = state.inventory.snapshot().await;
    let inventory_loaded = inventory.is_ok();
    let total_vehicles = inventory.map(|s| s.vehicles.len()).unwrap_or(0);

    let status = if store.primary_available && inventory_loaded {
        "OK"
    } else {
        "PARTIAL"
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_conversations: state.controller.conversations().len(),
        store,
        inventory_loaded,
        total_vehicles,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /admin/voice-settings
pub async fn post_voice_settings(
    State(state): State<GatewayState>,
    Json(update): Json<VoiceSettingsUpdate>,
) -> Response {
    let Some(voice) = &state.voice else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "voice is not configured");
    };
    voice.update_settings(update);
    (StatusCode::OK, Json(Ack::with_message("voice settings updated"))).into_response()
}

/// POST /admin/analyze-tone
pub async fn post_analyze_tone(Json(body): Json<AnalyzeToneRequest>) -> Response {
    (
        StatusCode::OK,
        Json(AnalyzeToneResponse {
            tone: classify_tone(&body.message),
        }),
    )
        .into_response()
}

/// POST /admin/test-image
pub async fn post_test_image(
    State(state): State<GatewayState>,
    Json(body): Json<TestImageRequest>,
) -> Response {
    let phone = canonical_phone(&body.phone_number);
    let image_url = body.image_url.as_deref().unwrap_or(TEST_IMAGE_URL);
    let caption = "🧪 Imagen de prueba del sistema de concesionario";

    match state.channel.send_image_url(&phone, image_url, caption).await {
        Ok(()) => (StatusCode::OK, Json(Ack::with_message("image sent"))).into_response(),
        Err(e) => {
            warn!(phone = %phone, error = %e, "test image send failed");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_event_deserializes_from_provider_payload() {
        let json = r#"{
            "event_type": "message_received",
            "data": {
                "from": "573001234567@c.us",
                "body": "hola",
                "fromMe": false,
                "type": "chat"
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(json).unwrap();
        let inbound = extract_inbound(&event).unwrap();
        assert_eq!(inbound.text, "hola");
    }

    #[test]
    fn start_conversation_request_deserializes() {
        let json = r#"{"phone_number": "3001234567"}"#;
        let req: StartConversationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.phone_number, "3001234567");
    }

    #[test]
    fn ack_serializes_without_empty_message() {
        let json = serde_json::to_string(&Ack::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
        let json = serde_json::to_string(&Ack::with_message("hi")).unwrap();
        assert!(json.contains("\"message\":\"hi\""));
    }

    #[test]
    fn unauthorized_response_carries_allow_list() {
        let resp = UnauthorizedResponse {
            error: "unauthorized phone number".into(),
            authorized_numbers: vec!["573001234567".into()],
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("573001234567"));
    }

    #[test]
    fn analyze_tone_response_serializes_tone_tag() {
        let resp = AnalyzeToneResponse {
            tone: Tone::Greeting,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"tone":"greeting"}"#);
    }

    #[test]
    fn test_image_request_defaults_optional_url() {
        let req: TestImageRequest =
            serde_json::from_str(r#"{"phone_number": "3001234567"}"#).unwrap();
        assert!(req.image_url.is_none());
    }
}
