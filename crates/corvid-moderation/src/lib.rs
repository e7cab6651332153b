// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flood tracking and multi-signal spam scoring for the Corvid bot runtime.
//!
//! Two components, both process-local and concurrency-safe:
//! - [`FrequencyTracker`]: per-sender sliding window of recent activity,
//!   pruned to a trailing horizon on every access.
//! - [`ScoringEngine`]: deterministic aggregation of independent content
//!   signals into a [`SpamAnalysis`] verdict, plus per-sender warning
//!   counters feeding the third-strike auto-block rule.

pub mod engine;
pub mod frequency;
mod patterns;

pub use engine::{ScoringEngine, Severity, SpamAnalysis, Thresholds};
pub use frequency::FrequencyTracker;
