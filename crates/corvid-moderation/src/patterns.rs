// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern vocabularies and text heuristics for the scoring engine.
//!
//! Vocabularies cover English, Portuguese, and Spanish -- the languages the
//! deployed bots actually see abuse in. All matching is done against a
//! pre-lowercased copy of the message text.

use std::sync::LazyLock;

use regex::Regex;

/// Topic families of spam phrasing. A family counts at most once per message.
const CATEGORY_FAMILIES: &[(&str, &[&str])] = &[
    (
        "financial",
        &[
            "investment opportunity",
            "double your money",
            "guaranteed returns",
            "guaranteed profit",
            "binary options",
            "crypto giveaway",
            "forex signals",
            "ganhe dinheiro",
            "renda extra",
            "lucro garantido",
            "inversión garantizada",
            "gana dinero",
        ],
    ),
    (
        "phishing",
        &[
            "verify your account",
            "account suspended",
            "confirm your password",
            "unusual activity",
            "click here to verify",
            "your account will be closed",
            "sua conta foi bloqueada",
            "confirme sua senha",
            "verifique su cuenta",
            "su cuenta será suspendida",
        ],
    ),
    (
        "job-offer",
        &[
            "work from home",
            "earn from home",
            "no experience needed",
            "be your own boss",
            "hiring immediately",
            "trabalhe em casa",
            "vaga urgente",
            "sem experiência",
            "trabaja desde casa",
        ],
    ),
    (
        "romance",
        &[
            "looking for love",
            "my dear beloved",
            "lonely and looking",
            "soulmate",
            "widow of the late",
            "procuro um amor",
            "alma gêmea",
            "busco el amor",
        ],
    ),
    (
        "miracle-product",
        &[
            "miracle cure",
            "lose weight fast",
            "100% natural",
            "no side effects",
            "secret formula",
            "doctors hate",
            "emagreça rápido",
            "cura milagrosa",
            "pierde peso rápido",
        ],
    ),
    (
        "generic",
        &[
            "limited time offer",
            "act now",
            "don't miss out",
            "exclusive deal",
            "you have been selected",
            "congratulations you won",
            "claim your prize",
            "oferta imperdível",
            "promoção exclusiva",
            "você foi selecionado",
            "oferta limitada",
            "reclama tu premio",
        ],
    ),
];

/// Explicit fraud/scam/malware vocabulary.
const FRAUD_KEYWORDS: &[&str] = &[
    "scam",
    "fraud",
    "hacked account",
    "hacking service",
    "malware",
    "ransomware",
    "spyware",
    "keylogger",
    "stolen card",
    "cloned card",
    "carding",
    "cvv for sale",
    "golpe",
    "fraude",
    "cartão clonado",
    "estafa",
    "tarjeta clonada",
];

/// Abuse and explicit-content families. A family counts at most once.
const ABUSE_FAMILIES: &[(&str, &[&str])] = &[
    (
        "harassment",
        &[
            "you idiot",
            "you moron",
            "pathetic loser",
            "shut up stupid",
            "seu idiota",
            "sua burra",
            "imbecil",
            "eres un idiota",
            "estúpido",
        ],
    ),
    (
        "explicit",
        &[
            "send nudes",
            "leaked nudes",
            "porn link",
            "xxx video",
            "conteúdo adulto vazado",
            "fotos íntimas vazadas",
            "video prohibido",
        ],
    ),
    (
        "threat",
        &[
            "i will kill you",
            "i will hurt you",
            "i know where you live",
            "vou te matar",
            "sei onde você mora",
            "te voy a matar",
        ],
    ),
];

/// Known link-shortener hosts.
const URL_SHORTENERS: &[&str] = &[
    "bit.ly/",
    "tinyurl.com/",
    "goo.gl/",
    "t.co/",
    "is.gd/",
    "cutt.ly/",
    "rb.gy/",
    "shorturl.at/",
    "encurtador.com.br/",
];

/// URLs pointing straight at an IP address.
static IP_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("static pattern")
});

/// Hostnames under throwaway top-level domains.
static THROWAWAY_TLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[a-z0-9][a-z0-9-]*\.(?:xyz|top|click|buzz|work|loan|rest|gq|cf|tk|ml)(?:/|\b)")
        .expect("static pattern")
});

/// Loose phone-number-like token.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d()\s.-]{7,}\d").expect("static pattern"));

/// Names of category families matched by `text` (lowercased input).
pub(crate) fn matched_category_families(text: &str) -> Vec<&'static str> {
    CATEGORY_FAMILIES
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|p| text.contains(p)))
        .map(|(name, _)| *name)
        .collect()
}

/// Fraud keywords contained in `text` (lowercased input).
pub(crate) fn matched_fraud_keywords(text: &str) -> Vec<&'static str> {
    FRAUD_KEYWORDS
        .iter()
        .filter(|k| text.contains(*k))
        .copied()
        .collect()
}

/// Names of abuse families matched by `text` (lowercased input).
pub(crate) fn matched_abuse_families(text: &str) -> Vec<&'static str> {
    ABUSE_FAMILIES
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|p| text.contains(p)))
        .map(|(name, _)| *name)
        .collect()
}

/// Descriptions of suspicious-URL hits in `text` (lowercased input).
///
/// Each shortener host, raw-IP URL, and throwaway-TLD hostname counts as one
/// hit.
pub(crate) fn suspicious_url_hits(text: &str) -> Vec<String> {
    let mut hits = Vec::new();
    for host in URL_SHORTENERS {
        if text.contains(host) {
            hits.push(format!("link shortener {}", host.trim_end_matches('/')));
        }
    }
    for m in IP_URL_RE.find_iter(text) {
        hits.push(format!("raw IP address URL {}", m.as_str()));
    }
    for m in THROWAWAY_TLD_RE.find_iter(text) {
        hits.push(format!(
            "throwaway domain {}",
            m.as_str().trim_end_matches('/')
        ));
    }
    hits
}

/// Ratio of uppercase letters to total character count.
pub(crate) fn uppercase_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    upper as f64 / total as f64
}

/// Ratio of non-alphanumeric, non-whitespace characters to total count.
pub(crate) fn special_char_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let special = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .count();
    special as f64 / total as f64
}

/// Whether `text` contains the same character `run` or more times in a row.
pub(crate) fn has_repeated_run(text: &str, run: usize) -> bool {
    let mut count = 0usize;
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if Some(c) == prev {
            count += 1;
        } else {
            count = 1;
            prev = Some(c);
        }
        if count >= run {
            return true;
        }
    }
    false
}

/// Number of phone-number-like tokens in `text`.
pub(crate) fn phone_token_count(text: &str) -> usize {
    PHONE_RE.find_iter(text).count()
}
