// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./corvid.toml` > `~/.config/corvid/corvid.toml` > `/etc/corvid/corvid.toml`
//! with environment variable overrides via `CORVID_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CorvidConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/corvid/corvid.toml` (system-wide)
/// 3. `~/.config/corvid/corvid.toml` (user XDG config)
/// 4. `./corvid.toml` (local directory)
/// 5. `CORVID_*` environment variables
pub fn load_config() -> Result<CorvidConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CorvidConfig::default()))
        .merge(Toml::file("/etc/corvid/corvid.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("corvid/corvid.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("corvid.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<CorvidConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CorvidConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CorvidConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CorvidConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CORVID_CONNECTION_RECONNECT_DELAY_MS`
/// must map to `connection.reconnect_delay_ms`, not `connection.reconnect.delay.ms`.
fn env_provider() -> Env {
    Env::prefixed("CORVID_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CORVID_BOT_LOG_LEVEL -> "bot_log_level"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("bot_", "bot.", 1)
            .replacen("connection_", "connection.", 1)
            .replacen("commands_", "commands.", 1)
            .replacen("moderation_", "moderation.", 1);
        mapped.into()
    })
}
