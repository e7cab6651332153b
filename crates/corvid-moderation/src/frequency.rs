// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-sender sliding-window activity tracking for flood detection.
//!
//! Every access prunes the sender's window to the trailing horizon, so a
//! window's length is always a function solely of activity within the last
//! `window` duration -- the map never grows with stale timestamps.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use corvid_core::types::SenderId;

/// Tracks recent message activity per sender over a trailing time window.
///
/// Owned exclusively by the moderation layer; other components interact with
/// it only through [`record`](FrequencyTracker::record) and
/// [`is_flooding`](FrequencyTracker::is_flooding).
pub struct FrequencyTracker {
    windows: DashMap<SenderId, VecDeque<Instant>>,
    window: Duration,
    threshold: usize,
}

impl FrequencyTracker {
    /// Create a tracker with the given trailing window and flood threshold.
    pub fn new(window: Duration, threshold: usize) -> Self {
        Self {
            windows: DashMap::new(),
            window,
            threshold,
        }
    }

    /// Record one message from `sender` at the current instant.
    pub fn record(&self, sender: &SenderId) {
        self.record_at(sender, Instant::now());
    }

    /// Whether `sender` currently exceeds the flood threshold.
    ///
    /// True iff the count of activity timestamps within the trailing window
    /// is strictly greater than the threshold.
    pub fn is_flooding(&self, sender: &SenderId) -> bool {
        self.is_flooding_at(sender, Instant::now())
    }

    /// Number of senders with a tracked window (pruned or not).
    pub fn tracked_senders(&self) -> usize {
        self.windows.len()
    }

    fn record_at(&self, sender: &SenderId, now: Instant) {
        let mut entry = self.windows.entry(sender.clone()).or_default();
        Self::prune(&mut entry, now, self.window);
        entry.push_back(now);
    }

    fn is_flooding_at(&self, sender: &SenderId, now: Instant) -> bool {
        match self.windows.get_mut(sender) {
            Some(mut entry) => {
                Self::prune(&mut entry, now, self.window);
                entry.len() > self.threshold
            }
            None => false,
        }
    }

    /// Drop timestamps older than `now - window` from the front.
    fn prune(entries: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        // Early in process lifetime `now - window` can underflow; nothing
        // can be stale in that case.
        let Some(cutoff) = now.checked_sub(window) else {
            return;
        };
        while let Some(front) = entries.front() {
            if *front < cutoff {
                entries.pop_front();
            } else {
                break;
            }
        }
    }
}
