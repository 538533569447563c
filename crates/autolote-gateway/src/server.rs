// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the webhook and the
//! admin/query endpoints.

use std::sync::Arc;

use autolote_agent::TurnController;
use autolote_channel::Dispatcher;
use autolote_core::{AutoloteError, LeadStore, MessagingChannel};
use autolote_inventory::InventoryService;
use autolote_voice::VoiceRenderer;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub controller: TurnController,
    pub store: Arc<dyn LeadStore>,
    pub inventory: Arc<InventoryService>,
    pub dispatcher: Dispatcher,
    pub channel: Arc<dyn MessagingChannel>,
    /// Voice renderer, present only when audio replies are configured.
    pub voice: Option<Arc<VoiceRenderer>>,
    /// Static allow-list gating the webhook and start-conversation paths.
    pub authorized_numbers: Arc<Vec<String>>,
    pub start_time: std::time::Instant,
}

/// Gateway server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the full gateway router over the shared state.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/webhook", post(handlers::post_webhook))
        .route("/start-conversation", post(handlers::post_start_conversation))
        .route("/leads", get(handlers::get_leads))
        .route("/lead/{phone}", get(handlers::get_lead))
        .route("/inventory", get(handlers::get_inventory))
        .route("/conversations", get(handlers::get_conversations))
        .route("/stats", get(handlers::get_stats))
        .route("/health", get(handlers::get_health))
        .route("/admin/clear-data/{phone}", delete(handlers::delete_clear_data))
        .route("/admin/test-inventory", get(handlers::get_test_inventory))
        .route(
            "/admin/clear-inventory-cache",
            post(handlers::post_clear_inventory_cache),
        )
        .route("/admin/voice-settings", post(handlers::post_voice_settings))
        .route("/admin/analyze-tone", post(handlers::post_analyze_tone))
        .route("/admin/test-image", post(handlers::post_test_image))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve the gateway until the process exits.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), AutoloteError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AutoloteError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| AutoloteError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }
}
