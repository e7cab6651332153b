// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Corvid bot runtime.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Corvid configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CorvidConfig {
    /// Bot identity and behavior settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Connection lifecycle and reconnect policy settings.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Command dispatch settings.
    #[serde(default)]
    pub commands: CommandsConfig,

    /// Flood and spam screening settings.
    #[serde(default)]
    pub moderation: ModerationConfig,
}

/// Bot identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Leading character(s) that mark text as a command invocation.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Sender identity of the bot operator. Enables owner-only commands
    /// and operator notices. `None` disables both.
    #[serde(default)]
    pub owner: Option<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Send transient ack/done reactions around command execution.
    #[serde(default = "default_feedback")]
    pub feedback: bool,

    /// Observe the bot's own outgoing messages to detect self-issued
    /// commands. Ordinary self-authored text is still ignored.
    #[serde(default)]
    pub observe_self: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            prefix: default_prefix(),
            owner: None,
            log_level: default_log_level(),
            feedback: default_feedback(),
            observe_self: false,
        }
    }
}

fn default_bot_name() -> String {
    "corvid".to_string()
}

fn default_prefix() -> String {
    ".".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_feedback() -> bool {
    true
}

/// Connection lifecycle and reconnect policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Maximum automatic reconnect attempts after a retryable close.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Flat delay between reconnect attempts, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_delay_ms() -> u64 {
    5000
}

/// Command dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommandsConfig {
    /// Per-sender-per-command minimum interval between executions, in
    /// milliseconds.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

fn default_cooldown_ms() -> u64 {
    3000
}

/// Flood and spam screening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModerationConfig {
    /// Trailing window for per-sender flood detection, in seconds.
    #[serde(default = "default_flood_window_secs")]
    pub flood_window_secs: u64,

    /// Messages within the window above which a sender is flooding.
    #[serde(default = "default_flood_threshold")]
    pub flood_threshold: usize,

    /// Confidence above which a message is marked suspicious.
    #[serde(default = "default_suspicious_threshold")]
    pub suspicious_threshold: u32,

    /// Confidence checkpoint after URL analysis that forces a spam verdict.
    #[serde(default = "default_url_force_threshold")]
    pub url_force_threshold: u32,

    /// Confidence above which a message is spam.
    #[serde(default = "default_spam_threshold")]
    pub spam_threshold: u32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            flood_window_secs: default_flood_window_secs(),
            flood_threshold: default_flood_threshold(),
            suspicious_threshold: default_suspicious_threshold(),
            url_force_threshold: default_url_force_threshold(),
            spam_threshold: default_spam_threshold(),
        }
    }
}

fn default_flood_window_secs() -> u64 {
    60
}

fn default_flood_threshold() -> usize {
    10
}

fn default_suspicious_threshold() -> u32 {
    50
}

fn default_url_force_threshold() -> u32 {
    60
}

fn default_spam_threshold() -> u32 {
    70
}
