// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorization gating on the webhook and start-conversation paths.
//!
//! Unauthorized sender IDs must never reach lead creation or the turn
//! controller, on either path.

use std::sync::Arc;
use std::time::Duration;

use autolote_agent::{TurnController, TurnControllerConfig};
use autolote_channel::{Dispatcher, WebhookEvent};
use autolote_core::{LeadStore, TaskRegistry};
use autolote_gateway::handlers;
use autolote_gateway::GatewayState;
use autolote_inventory::{InventoryService, SheetsClient};
use autolote_test_utils::{
    CountingNotifier, MemoryLeadStore, RecordingChannel, ScriptedSynthesizer, StaticInventory,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

const AUTHORIZED: &str = "573001111111";

struct TestGateway {
    state: GatewayState,
    channel: Arc<RecordingChannel>,
    store: Arc<MemoryLeadStore>,
    synthesizer: Arc<ScriptedSynthesizer>,
    tasks: TaskRegistry,
}

fn build_gateway() -> TestGateway {
    let channel = Arc::new(RecordingChannel::new());
    let store = Arc::new(MemoryLeadStore::new());
    let synthesizer = Arc::new(ScriptedSynthesizer::new());
    let tasks = TaskRegistry::new();

    let dispatcher = Dispatcher::new(
        channel.clone(),
        None,
        false,
        Duration::ZERO,
        tasks.clone(),
    );
    let controller = TurnController::new(
        TurnControllerConfig::default(),
        store.clone(),
        synthesizer.clone(),
        Arc::new(StaticInventory::empty()),
        dispatcher.clone(),
        None,
        Arc::new(CountingNotifier::new()),
        tasks.clone(),
    );

    // Inventory client pointing nowhere; no test here touches the sheet.
    let inventory = Arc::new(InventoryService::new(
        SheetsClient::new("unused".into(), None).unwrap(),
        "Inventario",
        Duration::from_secs(300),
    ));

    let state = GatewayState {
        controller,
        store: store.clone(),
        inventory,
        dispatcher,
        channel: channel.clone(),
        voice: None,
        authorized_numbers: Arc::new(vec![AUTHORIZED.to_string()]),
        start_time: std::time::Instant::now(),
    };

    TestGateway {
        state,
        channel,
        store,
        synthesizer,
        tasks,
    }
}

fn message_event(from: &str, body: &str) -> WebhookEvent {
    serde_json::from_value(serde_json::json!({
        "event_type": "message_received",
        "data": {
            "from": from,
            "body": body,
            "fromMe": false,
            "type": "chat"
        }
    }))
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn unauthorized_webhook_sender_is_acknowledged_but_ignored() {
    let gw = build_gateway();

    let event = message_event("573009999999@c.us", "hola");
    let response =
        handlers::post_webhook(State(gw.state.clone()), Json(event)).await;

    // Acknowledged with success, but nothing buffered, no lead, no LLM.
    assert_eq!(response.status(), StatusCode::OK);
    assert!(gw.state.controller.conversations().is_empty());
    gw.tasks.flush().await;
    assert!(gw.store.is_empty());
    assert_eq!(gw.synthesizer.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn authorized_webhook_sender_reaches_the_controller() {
    let gw = build_gateway();

    let event = message_event("3001111111@c.us", "hola");
    let response =
        handlers::post_webhook(State(gw.state.clone()), Json(event)).await;
    assert_eq!(response.status(), StatusCode::OK);

    gw.tasks.flush().await;
    assert_eq!(gw.synthesizer.calls(), 1);
    assert!(gw.store.find_by_phone(AUTHORIZED).await.unwrap().is_some());
    assert_eq!(gw.channel.texts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn self_and_ack_events_never_reach_the_controller() {
    let gw = build_gateway();

    let mut event = message_event(&format!("{AUTHORIZED}@c.us"), "eco");
    if let Some(data) = event.data.as_mut() {
        data.from_me = true;
    }
    handlers::post_webhook(State(gw.state.clone()), Json(event)).await;

    let mut ack = message_event(&format!("{AUTHORIZED}@c.us"), "x");
    ack.event_type = Some("message_ack".into());
    handlers::post_webhook(State(gw.state.clone()), Json(ack)).await;

    assert!(gw.state.controller.conversations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unauthorized_start_conversation_is_rejected_with_the_allow_list() {
    let gw = build_gateway();

    let body = handlers::StartConversationRequest {
        phone_number: "3009999999".into(),
    };
    let response =
        handlers::post_start_conversation(State(gw.state.clone()), Json(body)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(gw.store.is_empty(), "no lead for unauthorized numbers");
    assert!(gw.channel.texts().is_empty(), "no opening message sent");
}

#[tokio::test(start_paused = true)]
async fn authorized_start_conversation_creates_lead_and_greets() {
    let gw = build_gateway();

    let body = handlers::StartConversationRequest {
        phone_number: "300 111 1111".into(),
    };
    let response =
        handlers::post_start_conversation(State(gw.state.clone()), Json(body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let lead = gw.store.find_by_phone(AUTHORIZED).await.unwrap().unwrap();
    assert!(lead.id.starts_with("LEAD_"));

    let texts = gw.channel.texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, AUTHORIZED);
    assert!(texts[0].1.contains("Soy Carlos"));
}

#[tokio::test(start_paused = true)]
async fn malformed_phone_number_is_rejected_early() {
    let gw = build_gateway();

    let body = handlers::StartConversationRequest {
        phone_number: "123".into(),
    };
    let response =
        handlers::post_start_conversation(State(gw.state.clone()), Json(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(gw.store.is_empty());
}
