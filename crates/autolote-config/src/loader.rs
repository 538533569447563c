// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order: compiled defaults, then `./autolote.toml` or an explicit
//! path, then `AUTOLOTE_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::AutoloteConfig;

/// Load configuration from the default locations with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `~/.config/autolote/autolote.toml` (user XDG config)
/// 3. `./autolote.toml` (local directory)
/// 4. `AUTOLOTE_*` environment variables
pub fn load_config() -> Result<AutoloteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AutoloteConfig::default()))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("autolote/autolote.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("autolote.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string (testing and tooling).
pub fn load_config_from_str(toml_content: &str) -> Result<AutoloteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AutoloteConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AutoloteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AutoloteConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `AUTOLOTE_ANTHROPIC_API_KEY` must map to
/// `anthropic.api_key`, not `anthropic.api.key`.
fn env_provider() -> Env {
    Env::prefixed("AUTOLOTE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("whatsapp_", "whatsapp.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("inventory_", "inventory.", 1)
            .replacen("voice_", "voice.", 1)
            .replacen("transcription_", "transcription.", 1)
            .replacen("notify_", "notify.", 1);
        mapped.into()
    })
}
