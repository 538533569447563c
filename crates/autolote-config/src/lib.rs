// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Autolote sales assistant.
//!
//! TOML configuration with environment variable overrides, loaded through
//! Figment with compiled defaults as the base layer.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::AutoloteConfig;
