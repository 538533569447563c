// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `autolote serve` command implementation.
//!
//! Wires the lead store, inventory, synthesizer, voice pipeline, messaging
//! channel, and notification fan-out into the turn controller, then runs
//! the HTTP gateway. Required integrations fail startup with a config
//! error; optional ones (voice, transcription, notifications) degrade to
//! disabled with a warning.

use std::sync::Arc;
use std::time::Duration;

use autolote_agent::{TurnController, TurnControllerConfig};
use autolote_channel::{Dispatcher, UltraMsgChannel};
use autolote_config::AutoloteConfig;
use autolote_core::{
    AutoloteError, InventoryProvider, LeadStore, MessagingChannel, SpeechSynthesizer,
    TaskRegistry, Transcriber,
};
use autolote_engine::{AnthropicClient, ClaudeSynthesizer};
use autolote_gateway::{GatewayState, ServerConfig};
use autolote_inventory::{InventoryService, SheetsClient};
use autolote_notify::{AppointmentFanout, LeadSheetClient, ResendClient};
use autolote_store::SqliteLeadStore;
use autolote_voice::{AudioStoreClient, ElevenLabsClient, VoiceRenderer, WhisperTranscriber};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Interval of the idle-conversation eviction sweep.
const EVICTION_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Interval of the stale-audio cleanup sweep.
const AUDIO_CLEANUP_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Age past which stored audio objects are deleted by the sweep.
const AUDIO_CLEANUP_MAX_AGE_HOURS: u64 = 6;

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn require(value: Option<String>, key: &str) -> Result<String, AutoloteError> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        AutoloteError::Config(format!("{key} is required (set it in autolote.toml or env)"))
    })
}

/// Runs the `autolote serve` command.
pub async fn run_serve(config: AutoloteConfig) -> Result<(), AutoloteError> {
    init_tracing(&config.agent.log_level);
    info!("starting autolote serve");

    // Lead store.
    let store = Arc::new(SqliteLeadStore::open(&config.storage.database_path).await?);
    let store_health = store.health_check().await;
    info!(
        primary = store_health.primary_available,
        leads = store_health.total_count,
        "lead store ready"
    );

    // Inventory.
    let spreadsheet_id = require(
        config.inventory.spreadsheet_id.clone(),
        "inventory.spreadsheet_id",
    )?;
    let sheets = SheetsClient::new(spreadsheet_id, config.inventory.api_token.clone())?;
    let inventory = Arc::new(InventoryService::new(
        sheets,
        &config.inventory.sheet_name,
        Duration::from_secs(config.inventory.cache_ttl_secs),
    ));
    match inventory.snapshot().await {
        Ok(snapshot) => info!(
            vehicles = snapshot.vehicles.len(),
            brands = snapshot.brands.len(),
            "inventory loaded"
        ),
        Err(e) => warn!(error = %e, "inventory unavailable at startup, will retry on demand"),
    }

    // Messaging channel.
    let instance_id = require(config.whatsapp.instance_id.clone(), "whatsapp.instance_id")?;
    let whatsapp_token = require(config.whatsapp.token.clone(), "whatsapp.token")?;
    let channel: Arc<dyn MessagingChannel> = Arc::new(
        UltraMsgChannel::new(instance_id, whatsapp_token)?
            .with_base_url(config.whatsapp.base_url.clone()),
    );
    if config.whatsapp.authorized_numbers.is_empty() {
        warn!("whatsapp.authorized_numbers is empty: every sender will be ignored");
    }

    // Reply synthesizer.
    let api_key = require(config.anthropic.api_key.clone(), "anthropic.api_key")?;
    let anthropic = AnthropicClient::new(&api_key, &config.anthropic.api_version)
        .map_err(AutoloteError::from)?;
    let synthesizer = Arc::new(ClaudeSynthesizer::new(
        anthropic,
        config.agent.persona_name.clone(),
        config.anthropic.model.clone(),
        config.anthropic.max_tokens,
    ));

    // Voice pipeline (optional).
    let mut audio_store_sweep: Option<AudioStoreClient> = None;
    let voice: Option<Arc<VoiceRenderer>> = if config.voice.enabled {
        match (config.voice.api_key.clone(), config.voice.bucket.clone()) {
            (Some(api_key), Some(bucket)) => {
                let tts = ElevenLabsClient::new(
                    &api_key,
                    config.voice.voice_id.clone(),
                    config.voice.model_id.clone(),
                )?;
                let audio_store = AudioStoreClient::new(
                    bucket,
                    config.voice.folder.clone(),
                    config.voice.store_token.clone(),
                )?;
                audio_store_sweep = Some(audio_store.clone());
                info!("voice replies enabled");
                Some(Arc::new(VoiceRenderer::new(tts, audio_store)))
            }
            _ => {
                warn!("voice.enabled is set but api_key/bucket are missing; replies go as text");
                None
            }
        }
    } else {
        info!("voice replies disabled");
        None
    };

    // Transcription (optional).
    let transcriber: Option<Arc<dyn Transcriber>> = match config.transcription.api_key.clone() {
        Some(api_key) => Some(Arc::new(WhisperTranscriber::new(api_key)?)),
        None => {
            warn!("transcription.api_key missing: audio messages get the please-type reply");
            None
        }
    };

    // Appointment fan-out (both targets optional).
    let email = match (
        config.notify.resend_api_key.clone(),
        config.notify.domain.clone(),
    ) {
        (Some(key), Some(domain)) => {
            Some(ResendClient::new(key, &domain, config.notify.recipients.clone())?)
        }
        _ => {
            warn!("email notifications disabled (notify.resend_api_key/domain missing)");
            None
        }
    };
    let sheet = match config.notify.leads_spreadsheet_id.clone() {
        Some(id) => Some(LeadSheetClient::new(
            id,
            config.notify.leads_range.clone(),
            config.notify.api_token.clone(),
        )?),
        None => {
            warn!("lead sheet logging disabled (notify.leads_spreadsheet_id missing)");
            None
        }
    };
    let notifier = Arc::new(AppointmentFanout::new(email, sheet));

    // Turn controller.
    let tasks = TaskRegistry::new();
    let dispatcher = Dispatcher::new(
        Arc::clone(&channel),
        voice
            .clone()
            .map(|v| v as Arc<dyn SpeechSynthesizer>),
        config.voice.enabled,
        Duration::from_secs(config.voice.cleanup_delay_secs),
        tasks.clone(),
    );
    let controller = TurnController::new(
        TurnControllerConfig {
            persona_name: config.agent.persona_name.clone(),
            debounce_window: Duration::from_millis(config.agent.debounce_ms),
            batch_policy: config.agent.batch_policy,
            notification_delay: Duration::from_millis(config.agent.notification_delay_ms),
            idle_eviction: Duration::from_secs(config.agent.idle_eviction_hours * 60 * 60),
        },
        store.clone() as Arc<dyn LeadStore>,
        synthesizer,
        inventory.clone() as Arc<dyn InventoryProvider>,
        dispatcher.clone(),
        transcriber,
        notifier,
        tasks.clone(),
    );

    // Background sweeps.
    tokio::spawn(controller.clone().run_eviction_sweep(EVICTION_SWEEP_INTERVAL));
    if let Some(audio_store) = audio_store_sweep {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(AUDIO_CLEANUP_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = audio_store.clean_old(AUDIO_CLEANUP_MAX_AGE_HOURS).await {
                    warn!(error = %e, "stale audio cleanup failed");
                }
            }
        });
    }

    info!(
        persona = %config.agent.persona_name,
        authorized = config.whatsapp.authorized_numbers.len(),
        debounce_ms = config.agent.debounce_ms,
        "turn controller ready"
    );

    // HTTP gateway.
    let state = GatewayState {
        controller,
        store: store as Arc<dyn LeadStore>,
        inventory,
        dispatcher,
        channel,
        voice,
        authorized_numbers: Arc::new(config.whatsapp.authorized_numbers.clone()),
        start_time: std::time::Instant::now(),
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    autolote_gateway::start_server(&server_config, state).await
}
