//! The configuration surface (spec §6.5). Passed into the orchestrator at
//! construction time — no singletons, no process-wide constants.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-million-token pricing for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPricing {
    /// Price per million input tokens.
    pub price_in_per_mtok: Decimal,
    /// Price per million output tokens.
    pub price_out_per_mtok: Decimal,
    /// Price per million cache-read tokens.
    pub price_cache_read_per_mtok: Decimal,
    /// Price per million cache-write tokens.
    pub price_cache_write_per_mtok: Decimal,
}

impl Default for TierPricing {
    fn default() -> Self {
        Self {
            price_in_per_mtok: Decimal::ZERO,
            price_out_per_mtok: Decimal::ZERO,
            price_cache_read_per_mtok: Decimal::ZERO,
            price_cache_write_per_mtok: Decimal::ZERO,
        }
    }
}

/// Full configuration surface for the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Concrete provider model id for the fast tier.
    pub model_fast: String,
    /// Concrete provider model id for the structural tier.
    pub model_structural: String,
    /// Concrete provider model id for the analyst tier.
    pub model_analyst: String,

    /// Pricing per tier, keyed by tier name (`"fast"`, `"structural"`,
    /// `"analyst"`).
    pub pricing: HashMap<String, TierPricing>,

    /// Max conversation tail length (default 9).
    pub history_window_turns: usize,

    /// Per-tier wall-clock budget in milliseconds.
    pub tier_timeout_ms_fast: u64,
    /// Per-tier wall-clock budget in milliseconds.
    pub tier_timeout_ms_structural: u64,
    /// Per-tier wall-clock budget in milliseconds.
    pub tier_timeout_ms_analyst: u64,

    /// Safety flush for an unclosed batch (default 30000).
    pub batch_flush_timeout_ms: u64,

    /// Consecutive malformed lines before the splitter aborts (default 3).
    pub parse_failure_streak_limit: u32,

    /// Swap in the replay adapter instead of a live provider.
    pub use_mock_llm: bool,

    /// Byte tag at the top of the system prompt. Changing it invalidates
    /// the provider's cached prefix.
    pub prompt_version: String,

    /// Structured-log verbosity, as a `tracing` filter directive (e.g.
    /// `"info"`, `"aide_orchestrator=debug"`).
    pub log_level: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model_fast: String::new(),
            model_structural: String::new(),
            model_analyst: String::new(),
            pricing: HashMap::new(),
            history_window_turns: 9,
            tier_timeout_ms_fast: 30_000,
            tier_timeout_ms_structural: 60_000,
            tier_timeout_ms_analyst: 90_000,
            batch_flush_timeout_ms: 30_000,
            parse_failure_streak_limit: 3,
            use_mock_llm: false,
            prompt_version: "v1".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Wall-clock budget in milliseconds for the given tier name
    /// (`"fast"`, `"structural"`, `"analyst"`). Unknown tier names fall
    /// back to the fast-tier budget.
    pub fn timeout_ms_for(&self, tier: &str) -> u64 {
        match tier {
            "structural" => self.tier_timeout_ms_structural,
            "analyst" => self.tier_timeout_ms_analyst,
            _ => self.tier_timeout_ms_fast,
        }
    }

    /// Model id for the given tier name. Unknown tier names fall back to
    /// the fast-tier model.
    pub fn model_for(&self, tier: &str) -> &str {
        match tier {
            "structural" => &self.model_structural,
            "analyst" => &self.model_analyst,
            _ => &self.model_fast,
        }
    }

    /// Build a config from `AIDE_*` environment variables, falling back
    /// to [`Default`] for anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("AIDE_MODEL_FAST") {
            cfg.model_fast = v;
        }
        if let Ok(v) = std::env::var("AIDE_MODEL_STRUCTURAL") {
            cfg.model_structural = v;
        }
        if let Ok(v) = std::env::var("AIDE_MODEL_ANALYST") {
            cfg.model_analyst = v;
        }
        if let Ok(v) = std::env::var("AIDE_HISTORY_WINDOW_TURNS") {
            if let Ok(n) = v.parse() {
                cfg.history_window_turns = n;
            }
        }
        if let Ok(v) = std::env::var("AIDE_USE_MOCK_LLM") {
            cfg.use_mock_llm = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(v) = std::env::var("AIDE_PROMPT_VERSION") {
            cfg.prompt_version = v;
        }
        if let Ok(v) = std::env::var("AIDE_LOG_LEVEL") {
            cfg.log_level = v;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeouts_match_spec() {
        let cfg = OrchestratorConfig::default();
        assert_eq!(cfg.timeout_ms_for("fast"), 30_000);
        assert_eq!(cfg.timeout_ms_for("structural"), 60_000);
        assert_eq!(cfg.timeout_ms_for("analyst"), 90_000);
        assert_eq!(cfg.history_window_turns, 9);
        assert_eq!(cfg.parse_failure_streak_limit, 3);
        assert_eq!(cfg.batch_flush_timeout_ms, 30_000);
    }

    #[test]
    fn unknown_tier_falls_back_to_fast() {
        let cfg = OrchestratorConfig::default();
        assert_eq!(cfg.timeout_ms_for("bogus"), cfg.tier_timeout_ms_fast);
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = OrchestratorConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: OrchestratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
