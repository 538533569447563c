// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Autolote sales assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use autolote_core::BatchPolicy;
use serde::{Deserialize, Serialize};

/// Top-level Autolote configuration.
///
/// Loaded from a TOML file with `AUTOLOTE_*` environment variable overrides.
/// All sections are optional and default to sensible values; secrets
/// (API keys, tokens) default to `None` and must come from config or env.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AutoloteConfig {
    /// Persona identity and turn-controller policy settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP gateway bind settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// WhatsApp messaging gateway (UltraMSG) settings.
    #[serde(default)]
    pub whatsapp: WhatsappConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Lead store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Inventory sheet settings.
    #[serde(default)]
    pub inventory: InventoryConfig,

    /// Voice synthesis and audio storage settings.
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Audio transcription settings.
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Appointment notification settings.
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Persona identity and turn-controller policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the salesperson persona.
    #[serde(default = "default_persona_name")]
    pub persona_name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Debounce window between the first buffered message and turn start.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How a drained buffer is merged into one working text.
    #[serde(default)]
    pub batch_policy: BatchPolicy,

    /// Delay before the appointment notification fan-out fires, letting the
    /// lead persistence land first.
    #[serde(default = "default_notification_delay_ms")]
    pub notification_delay_ms: u64,

    /// Hours of inactivity after which a sender's in-memory conversation
    /// entry is evicted.
    #[serde(default = "default_idle_eviction_hours")]
    pub idle_eviction_hours: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            persona_name: default_persona_name(),
            log_level: default_log_level(),
            debounce_ms: default_debounce_ms(),
            batch_policy: BatchPolicy::default(),
            notification_delay_ms: default_notification_delay_ms(),
            idle_eviction_hours: default_idle_eviction_hours(),
        }
    }
}

fn default_persona_name() -> String {
    "Carlos".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_debounce_ms() -> u64 {
    2000
}

fn default_notification_delay_ms() -> u64 {
    2000
}

fn default_idle_eviction_hours() -> u64 {
    6
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// WhatsApp messaging gateway (UltraMSG) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsappConfig {
    /// UltraMSG instance token. `None` disables outbound sending.
    #[serde(default)]
    pub token: Option<String>,

    /// UltraMSG instance identifier.
    #[serde(default)]
    pub instance_id: Option<String>,

    /// API base URL (overridable for tests).
    #[serde(default = "default_ultramsg_base_url")]
    pub base_url: String,

    /// Static allow-list of sender phone numbers. Messages from anyone else
    /// are acknowledged and ignored. Empty list rejects everyone.
    #[serde(default)]
    pub authorized_numbers: Vec<String>,
}

impl Default for WhatsappConfig {
    fn default() -> Self {
        Self {
            token: None,
            instance_id: None,
            base_url: default_ultramsg_base_url(),
            authorized_numbers: Vec::new(),
        }
    }
}

fn default_ultramsg_base_url() -> String {
    "https://api.ultramsg.com".to_string()
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires the environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier for reply generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1200
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Lead store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("autolote").join("autolote.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("autolote.db"))
        .to_string_lossy()
        .into_owned()
}

/// Inventory sheet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryConfig {
    /// Google Sheets spreadsheet id holding the vehicle inventory.
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// Sheet tab name.
    #[serde(default = "default_inventory_sheet")]
    pub sheet_name: String,

    /// OAuth bearer token for the Sheets API.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Cache time-to-live in seconds; the whole snapshot is refreshed when
    /// this elapses.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            sheet_name: default_inventory_sheet(),
            api_token: None,
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_inventory_sheet() -> String {
    "Inventario".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

/// Voice synthesis and audio storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VoiceConfig {
    /// Globally enable audio replies. When false, every reply goes as text.
    #[serde(default)]
    pub enabled: bool,

    /// ElevenLabs API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// ElevenLabs voice identifier.
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// TTS model identifier.
    #[serde(default = "default_tts_model")]
    pub model_id: String,

    /// Seconds after dispatch before a synthesized asset is deleted.
    #[serde(default = "default_cleanup_delay_secs")]
    pub cleanup_delay_secs: u64,

    /// Object store bucket for synthesized audio.
    #[serde(default)]
    pub bucket: Option<String>,

    /// Folder prefix inside the bucket.
    #[serde(default = "default_audio_folder")]
    pub folder: String,

    /// OAuth bearer token for the object store.
    #[serde(default)]
    pub store_token: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            voice_id: default_voice_id(),
            model_id: default_tts_model(),
            cleanup_delay_secs: default_cleanup_delay_secs(),
            bucket: None,
            folder: default_audio_folder(),
            store_token: None,
        }
    }
}

fn default_voice_id() -> String {
    "pNInz6obpgDQGcFmaJgB".to_string()
}

fn default_tts_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_cleanup_delay_secs() -> u64 {
    2 * 60 * 60
}

fn default_audio_folder() -> String {
    "Autos-ST".to_string()
}

/// Audio transcription configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriptionConfig {
    /// OpenAI API key for Whisper transcription. `None` makes every audio
    /// message fall back to the "please type" reply.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Appointment notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    /// Resend API key. `None` disables email notifications.
    #[serde(default)]
    pub resend_api_key: Option<String>,

    /// Sender domain for the notification email.
    #[serde(default)]
    pub domain: Option<String>,

    /// Recipient addresses for appointment notifications.
    #[serde(default)]
    pub recipients: Vec<String>,

    /// Spreadsheet id for the lead log.
    #[serde(default)]
    pub leads_spreadsheet_id: Option<String>,

    /// Append range for lead rows.
    #[serde(default = "default_leads_range")]
    pub leads_range: String,

    /// OAuth bearer token for the Sheets API.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            domain: None,
            recipients: Vec::new(),
            leads_spreadsheet_id: None,
            leads_range: default_leads_range(),
            api_token: None,
        }
    }
}

fn default_leads_range() -> String {
    "Leads!A:P".to_string()
}
