//! Tier pre-dispatch classifier (C5): `classify(message, snapshot) ->
//! Classification`, a pure rule function run before any LLM call (spec
//! §4.5). No network, no model call — the classification itself never
//! touches a provider.

#![deny(missing_docs)]

use aide_snapshot::Snapshot;
use serde::{Deserialize, Serialize};

/// One of the three model sizes a turn may be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// The fast/compiler tier.
    Fast,
    /// The structural/architect tier.
    Structural,
    /// The heavy/analyst tier.
    Analyst,
}

impl Tier {
    /// The tier's name as it appears in `tier_trace` and telemetry.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Fast => "fast",
            Tier::Structural => "structural",
            Tier::Analyst => "analyst",
        }
    }

    /// Parse a tier name back from its `as_str()` form, e.g. the
    /// free-text `tier` field of an `escalate` signal. Unknown names
    /// yield `None` — callers decide the fallback.
    pub fn parse(name: &str) -> Option<Tier> {
        match name {
            "fast" => Some(Tier::Fast),
            "structural" => Some(Tier::Structural),
            "analyst" => Some(Tier::Analyst),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The classifier's output: a tier plus a confidence score. Confidence
/// is never used to block dispatch (spec §4.5) — it is written to
/// telemetry only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// The chosen tier.
    pub tier: Tier,
    /// A confidence score in `[0.0, 1.0]`, informational only.
    pub confidence: f64,
}

const QUESTION_OPENERS: &[&str] = &[
    "how many", "what", "who", "when", "do we", "is there", "which",
];
const ANALYST_KEYWORDS: &[&str] = &["enough", "missing", "ready", "compare", "recommend", "sufficient"];
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "add a section",
    "create a",
    "reorganize",
    "restructure",
    "set up",
];
const FAST_WEAKNESS_KEYWORDS: &[&str] = &[
    "first one",
    "second one",
    "third one",
    "last one",
    "on the left",
    "on the right",
    "above",
    "below",
    "not the",
    "instead of",
    "compared to",
    "versus",
];

/// Classify one user message against the current snapshot. Pure and
/// total: the same `(message, snapshot)` pair always returns the same
/// [`Classification`] (spec §8, classifier determinism).
pub fn classify(message: &str, snapshot: &Snapshot, has_image_attachment: bool) -> Classification {
    let lower = message.to_lowercase();
    let trimmed = lower.trim();

    if is_question(trimmed) {
        return Classification { tier: Tier::Analyst, confidence: 0.85 };
    }

    if snapshot.has_no_non_root_entities() {
        return Classification { tier: Tier::Structural, confidence: 0.9 };
    }
    if has_image_attachment {
        return Classification { tier: Tier::Structural, confidence: 0.75 };
    }
    if STRUCTURAL_KEYWORDS.iter().any(|kw| trimmed.contains(kw)) {
        return Classification { tier: Tier::Structural, confidence: 0.8 };
    }
    if introduces_new_category(trimmed) {
        return Classification { tier: Tier::Structural, confidence: 0.65 };
    }
    if FAST_WEAKNESS_KEYWORDS.iter().any(|kw| trimmed.contains(kw)) {
        return Classification { tier: Tier::Structural, confidence: 0.6 };
    }

    Classification { tier: Tier::Fast, confidence: 0.7 }
}

fn is_question(trimmed: &str) -> bool {
    if trimmed.ends_with('?') {
        return true;
    }
    if QUESTION_OPENERS.iter().any(|opener| trimmed.starts_with(opener)) {
        return true;
    }
    ANALYST_KEYWORDS.iter().any(|kw| trimmed.contains(kw))
}

/// Heuristic for "three-plus comma-separated items introducing a new
/// category" (spec §4.5 rule 2): at least three comma-separated
/// segments, each non-trivial.
fn introduces_new_category(trimmed: &str) -> bool {
    let segments: Vec<&str> = trimmed.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    segments.len() >= 3
}
