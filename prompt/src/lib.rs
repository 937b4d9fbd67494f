//! Cache-aware system prompt and message assembly (C4, spec §4.4).
//!
//! [`assemble_system_blocks`] builds the three ordered system content
//! blocks; [`tools::build_tool_schemas`] builds the per-tier tool list;
//! [`history::assemble_messages`] builds the bounded conversation tail
//! plus the live user message. The orchestrator composes all three into
//! one [`aide_llm::StreamRequest`] per pass.

#![deny(missing_docs)]

pub mod blocks;
pub mod history;
pub mod tools;

pub use history::{assemble_messages, bound_conversation_tail, HistoryTurn};
pub use tools::build_tool_schemas;

use aide_classify::Tier;
use aide_llm::{CacheControl, CacheTtl, SystemBlock};
use aide_snapshot::Snapshot;

/// Build the three ordered system content blocks for one pass (spec
/// §4.4):
///
/// 1. The shared prefix (voice rules, wire format, primitives, display
///    hints), prefixed with the `prompt_version` byte tag so bumping the
///    version invalidates the provider's cached prefix. Cacheable with a
///    long TTL.
/// 2. The tier-specific instruction block. Cacheable with a long TTL.
/// 3. The current snapshot, canonically serialized. Never cached — it
///    changes every turn.
///
/// `today` is the caller-supplied date context (spec: "date context");
/// it is passed in rather than read from the system clock here so that
/// assembly stays a pure function of its arguments.
pub fn assemble_system_blocks(
    tier: Tier,
    snapshot: &Snapshot,
    prompt_version: &str,
    today: &str,
) -> Vec<SystemBlock> {
    let long_ttl = CacheControl { ttl: CacheTtl::OneHour };

    let shared_text = format!(
        "prompt_version: {prompt_version}\ntoday: {today}\n\n{}",
        blocks::SHARED_PREFIX
    );
    let shared = SystemBlock { text: shared_text, cache_control: Some(long_ttl) };

    let tier_text = blocks::tier_block(tier).to_string();
    let tier_block = SystemBlock { text: tier_text, cache_control: Some(long_ttl) };

    let snapshot_json = snapshot.to_canonical_json();
    let snapshot_text = serde_json::to_string(&snapshot_json)
        .unwrap_or_else(|_| "{}".to_string());
    let snapshot_block = SystemBlock::uncached(snapshot_text);

    vec![shared, tier_block, snapshot_block]
}
