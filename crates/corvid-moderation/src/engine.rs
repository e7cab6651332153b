// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-signal spam scoring engine.
//!
//! [`ScoringEngine::analyze`] aggregates independent content signals into an
//! unclamped confidence accumulator, forcing the spam verdict early when a
//! signal combination is conclusive on its own. The engine also owns the
//! per-sender warning counters behind the third-strike auto-block rule;
//! counters never decay for the life of the process.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use corvid_core::types::SenderId;

use crate::frequency::FrequencyTracker;
use crate::patterns;

/// Graded spam classification driving response strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Result of analyzing one message. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct SpamAnalysis {
    pub is_spam: bool,
    pub is_suspicious: bool,
    /// Unclamped confidence accumulator; only ever compared to thresholds.
    pub confidence: u32,
    pub severity: Severity,
    /// Triggered signals, in evaluation order.
    pub reasons: Vec<String>,
}

/// Confidence thresholds for the final verdict and the URL checkpoint.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Above this the message is suspicious.
    pub suspicious: u32,
    /// URL-checkpoint value above which URL hits force a spam verdict.
    pub url_force: u32,
    /// Above this the message is spam.
    pub spam: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            suspicious: 50,
            url_force: 60,
            spam: 70,
        }
    }
}

/// Deterministic message classifier with per-sender warning counters.
pub struct ScoringEngine {
    tracker: Arc<FrequencyTracker>,
    warnings: DashMap<SenderId, u32>,
    thresholds: Thresholds,
}

impl ScoringEngine {
    /// Create an engine reading flood state from `tracker`.
    pub fn new(tracker: Arc<FrequencyTracker>, thresholds: Thresholds) -> Self {
        Self {
            tracker,
            warnings: DashMap::new(),
            thresholds,
        }
    }

    /// Classify `text` from `sender`.
    ///
    /// Signals are evaluated in a fixed order and each contributes to the
    /// confidence accumulator and the reasons list when triggered. The
    /// accumulator is never clamped; the final verdict compares it against
    /// the configured thresholds.
    pub fn analyze(&self, text: &str, sender: &SenderId) -> SpamAnalysis {
        let mut confidence = 0u32;
        let mut severity = Severity::Low;
        let mut is_spam = false;
        let mut is_suspicious = false;
        let mut reasons = Vec::new();

        // Flood: conclusive on its own.
        if self.tracker.is_flooding(sender) {
            confidence += 30;
            severity = Severity::High;
            is_spam = true;
            reasons.push("message flood: rate threshold exceeded".to_string());
        }

        let lower = text.to_lowercase();

        // Topic-family pattern matches.
        let families = patterns::matched_category_families(&lower);
        for family in &families {
            confidence += 15;
            reasons.push(format!("{family} spam phrasing"));
        }
        if families.len() >= 3 {
            is_spam = true;
            severity = Severity::High;
        } else if families.len() == 2 {
            severity = severity.max(Severity::Medium);
        }

        // Explicit fraud vocabulary.
        let keywords = patterns::matched_fraud_keywords(&lower);
        for keyword in &keywords {
            confidence += 20;
            reasons.push(format!("fraud keyword `{keyword}`"));
        }
        if keywords.len() >= 2 {
            is_spam = true;
            severity = Severity::High;
        }

        // Suspicious URLs, with the mid-scoring checkpoint.
        let url_hits = patterns::suspicious_url_hits(&lower);
        for hit in &url_hits {
            confidence += 25;
            reasons.push(hit.clone());
        }
        if !url_hits.is_empty() && confidence > self.thresholds.url_force {
            is_spam = true;
            severity = severity.max(Severity::Medium);
        }

        // Excessive capitalization.
        if text.chars().count() > 10 && patterns::uppercase_ratio(text) > 0.7 {
            confidence += 10;
            reasons.push("excessive capitalization".to_string());
        }

        // Special-character density.
        if patterns::special_char_ratio(text) > 0.3 {
            confidence += 15;
            reasons.push("excessive special characters".to_string());
        }

        // Abuse/explicit vocabulary.
        let abuse = patterns::matched_abuse_families(&lower);
        for family in &abuse {
            confidence += 30;
            reasons.push(format!("{family} vocabulary"));
        }
        if abuse.len() >= 2 {
            is_spam = true;
            severity = Severity::High;
        } else if abuse.len() == 1 {
            severity = severity.max(Severity::Medium);
        }

        // Repeated-character runs.
        if patterns::has_repeated_run(text, 5) {
            confidence += 10;
            reasons.push("repeated character run".to_string());
        }

        // Multiple embedded phone-number-like tokens.
        if patterns::phone_token_count(&lower) >= 2 {
            confidence += 20;
            reasons.push("multiple phone numbers".to_string());
        }

        // Final verdict against the thresholds.
        if confidence > self.thresholds.spam {
            is_spam = true;
            severity = Severity::High;
        } else if confidence > self.thresholds.suspicious {
            is_suspicious = true;
            severity = severity.max(Severity::Medium);
        }

        if is_spam || is_suspicious {
            debug!(
                sender = %sender,
                confidence,
                severity = %severity,
                spam = is_spam,
                "message flagged"
            );
        }

        SpamAnalysis {
            is_spam,
            is_suspicious,
            confidence,
            severity,
            reasons,
        }
    }

    /// Record a spam warning against `sender` and return the new count.
    pub fn record_warning(&self, sender: &SenderId) -> u32 {
        let mut entry = self.warnings.entry(sender.clone()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current warning count for `sender`.
    pub fn warning_count(&self, sender: &SenderId) -> u32 {
        self.warnings.get(sender).map(|e| *e).unwrap_or(0)
    }

    /// Whether `sender` should be auto-blocked for this analysis.
    ///
    /// True iff the analysis is high-severity spam and the sender already
    /// has at least two recorded warnings -- i.e. this message is the third
    /// strike. Callers must evaluate this *before* recording the current
    /// message's warning.
    pub fn should_auto_block(&self, analysis: &SpamAnalysis, sender: &SenderId) -> bool {
        analysis.is_spam
            && analysis.severity == Severity::High
            && self.warning_count(sender) >= 2
    }
}
