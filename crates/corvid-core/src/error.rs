// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Corvid bot runtime.

use thiserror::Error;

/// The primary error type used across all Corvid traits and core operations.
#[derive(Debug, Error)]
pub enum CorvidError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport errors (connection failure, send failure, malformed frames).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A command body failed during execution.
    #[error("command `{name}` failed: {source}")]
    Command {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The bounded reconnect policy ran out of attempts; a manual restart
    /// is required before the connection can be re-established.
    #[error("reconnect attempts exhausted after {attempts} tries, manual restart required")]
    ReconnectExhausted { attempts: u32 },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CorvidError {
    /// Convenience constructor for transport errors without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        CorvidError::Transport {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconnect_exhausted_mentions_manual_restart() {
        let err = CorvidError::ReconnectExhausted { attempts: 5 };
        let msg = err.to_string();
        assert!(msg.contains("5"));
        assert!(msg.contains("manual restart"));
    }

    #[test]
    fn transport_helper_sets_message() {
        let err = CorvidError::transport("socket closed");
        assert_eq!(err.to_string(), "transport error: socket closed");
    }
}
