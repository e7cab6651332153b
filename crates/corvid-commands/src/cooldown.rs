// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-sender-per-command cooldown gating.
//!
//! The gate reserves the cooldown window atomically at check time, so two
//! near-simultaneous invocations can never both pass. A reservation is
//! released if the command body fails, and reaped after expiry either lazily
//! on the next lookup or by the deferred delete the dispatcher schedules --
//! the map never accumulates stale entries.

use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;

use corvid_core::types::SenderId;

/// Outcome of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    /// No active window; a new one has been reserved.
    Ready,
    /// An unexpired window exists.
    Blocked { remaining: Duration },
}

/// Map of (sender, command) to cooldown expiry.
pub struct CooldownGate {
    entries: DashMap<(SenderId, String), Instant>,
    duration: Duration,
}

impl CooldownGate {
    /// Create a gate with the given cooldown window.
    pub fn new(duration: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            duration,
        }
    }

    /// The configured cooldown window.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Atomically check and reserve the cooldown for (sender, command).
    ///
    /// Expired entries are treated as vacant and replaced in the same pass.
    pub fn try_acquire(&self, sender: &SenderId, command: &str) -> CooldownDecision {
        let now = Instant::now();
        let key = (sender.clone(), command.to_string());
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                let expiry = *occupied.get();
                if expiry > now {
                    CooldownDecision::Blocked {
                        remaining: expiry - now,
                    }
                } else {
                    occupied.insert(now + self.duration);
                    CooldownDecision::Ready
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(now + self.duration);
                CooldownDecision::Ready
            }
        }
    }

    /// Release a reservation early (the command body failed).
    pub fn release(&self, sender: &SenderId, command: &str) {
        self.entries.remove(&(sender.clone(), command.to_string()));
    }

    /// Remove the entry iff its window has elapsed.
    ///
    /// Used by the dispatcher's deferred delete; a fresher reservation made
    /// in the meantime is left alone.
    pub fn remove_if_expired(&self, sender: &SenderId, command: &str) {
        let now = Instant::now();
        self.entries
            .remove_if(&(sender.clone(), command.to_string()), |_, expiry| {
                *expiry <= now
            });
    }

    /// Number of live entries (including not-yet-reaped expired ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries are held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
