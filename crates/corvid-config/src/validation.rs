// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty prefixes and correctly ordered thresholds.

use crate::diagnostic::ConfigError;
use crate::model::CorvidConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CorvidConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.bot.prefix.is_empty() {
        errors.push(ConfigError::Validation {
            message: "bot.prefix must not be empty".to_string(),
        });
    }

    if config.bot.prefix.chars().any(char::is_whitespace) {
        errors.push(ConfigError::Validation {
            message: format!(
                "bot.prefix `{}` must not contain whitespace",
                config.bot.prefix
            ),
        });
    }

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "bot.log_level `{}` is not one of {}",
                config.bot.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if let Some(owner) = &config.bot.owner
        && owner.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "bot.owner must not be blank when set".to_string(),
        });
    }

    if config.connection.max_reconnect_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "connection.max_reconnect_attempts must be at least 1".to_string(),
        });
    }

    if config.connection.reconnect_delay_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "connection.reconnect_delay_ms must be positive".to_string(),
        });
    }

    if config.commands.cooldown_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "commands.cooldown_ms must be positive".to_string(),
        });
    }

    if config.moderation.flood_window_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "moderation.flood_window_secs must be positive".to_string(),
        });
    }

    if config.moderation.flood_threshold == 0 {
        errors.push(ConfigError::Validation {
            message: "moderation.flood_threshold must be at least 1".to_string(),
        });
    }

    let m = &config.moderation;
    if !(m.suspicious_threshold < m.url_force_threshold
        && m.url_force_threshold < m.spam_threshold)
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "moderation thresholds must be strictly increasing: \
                 suspicious ({}) < url_force ({}) < spam ({})",
                m.suspicious_threshold, m.url_force_threshold, m.spam_threshold
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = CorvidConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_prefix_fails_validation() {
        let mut config = CorvidConfig::default();
        config.bot.prefix = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("prefix"))));
    }

    #[test]
    fn whitespace_prefix_fails_validation() {
        let mut config = CorvidConfig::default();
        config.bot.prefix = ". ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn bad_log_level_fails_validation() {
        let mut config = CorvidConfig::default();
        config.bot.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
    }

    #[test]
    fn unordered_thresholds_fail_validation() {
        let mut config = CorvidConfig::default();
        config.moderation.spam_threshold = 40;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("strictly increasing"))));
    }

    #[test]
    fn zero_cooldown_fails_validation() {
        let mut config = CorvidConfig::default();
        config.commands.cooldown_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_reconnect_attempts_fails_validation() {
        let mut config = CorvidConfig::default();
        config.connection.max_reconnect_attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn blank_owner_fails_validation() {
        let mut config = CorvidConfig::default();
        config.bot.owner = Some("   ".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn custom_valid_config_passes() {
        let mut config = CorvidConfig::default();
        config.bot.prefix = "!".to_string();
        config.bot.owner = Some("1555123@c.example".to_string());
        config.commands.cooldown_ms = 1500;
        config.moderation.flood_threshold = 20;
        assert!(validate_config(&config).is_ok());
    }
}
