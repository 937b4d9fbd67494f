//! Internal types for the streaming LLM client (C6, spec §4.6).
//!
//! These are the orchestration kernel's lingua franca for talking to a
//! provider — not the wire format of any one vendor's API. Grounded on
//! `neuron-turn/src/types.rs`'s `ProviderRequest`/`ToolSchema` shape,
//! reshaped around two things its single-shot `complete()` didn't need:
//! content blocks with per-block cache markers (spec §4.4), and a
//! streaming event sequence instead of one returned response.

use serde::{Deserialize, Serialize};

/// How long a provider may reuse a cached prefix for a content block.
/// Grounded on `neuron-provider-anthropic/src/mapping.rs`'s
/// `CacheControl`/`map_cache_control` — today every TTL maps to the
/// same `"ephemeral"` wire marker, but the type keeps the distinction
/// for when providers support more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheTtl {
    /// Five-minute cache window.
    FiveMinutes,
    /// One-hour cache window.
    OneHour,
}

/// A cache marker attached to a content block or tool definition (spec
/// §4.4, §4.9 "tool-list caching"). Absence means "do not cache this
/// block" — the orchestrator must emit it on the *last* byte of a
/// prefix it wants reused, never in the middle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheControl {
    /// The requested TTL.
    pub ttl: CacheTtl,
}

impl CacheControl {
    /// The common case: a five-minute ephemeral cache marker.
    pub fn ephemeral() -> Self {
        Self { ttl: CacheTtl::FiveMinutes }
    }
}

/// One block of the system prompt (spec §4.4): the shared prefix, the
/// tier-specific block, or the uncached snapshot block. Order matters —
/// blocks are sent to the provider in the order they appear in the
/// `Vec`, and a cache marker on block *N* covers every byte up to and
/// including block N.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemBlock {
    /// The block's text.
    pub text: String,
    /// Present if the provider may cache this prefix.
    pub cache_control: Option<CacheControl>,
}

impl SystemBlock {
    /// A block with no cache marker (e.g. the per-turn snapshot block).
    pub fn uncached(text: impl Into<String>) -> Self {
        Self { text: text.into(), cache_control: None }
    }

    /// A block marked cacheable with the standard ephemeral TTL.
    pub fn cached(text: impl Into<String>) -> Self {
        Self { text: text.into(), cache_control: Some(CacheControl::ephemeral()) }
    }
}

/// Role of a conversation message. System content travels separately as
/// [`SystemBlock`]s, not as a message with this role (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A past or current user utterance.
    User,
    /// A past assistant turn, summarized per spec §4.4 ("N operations
    /// applied") rather than replayed verbatim.
    Assistant,
}

/// One message in the bounded conversation tail plus the live user
/// message (spec §4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Who said it.
    pub role: Role,
    /// Plain text content. The kernel only ever sends/receives text —
    /// no tool-use content blocks travel over this boundary, since
    /// mutations arrive as JSONL text the splitter (C3) parses, not as
    /// structured tool calls.
    pub text: String,
}

/// JSON Schema description of one tool definition (spec §4.4: "one per
/// mutation primitive and one for the voice signal"). The model is
/// never actually invoked to call these as tools — they exist to pin
/// down the operation shapes the system prompt describes, the same way
/// `neuron-provider-anthropic` forwards `ToolDefinition`s for real
/// function-calling. Only the last tool in the list should carry a
/// cache marker, covering every earlier byte (spec §4.9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name, e.g. `"entity_create"`.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the operation's payload.
    pub input_schema: serde_json::Value,
    /// Present only on the last tool in a tier's list.
    pub cache_control: Option<CacheControl>,
}

/// Sampling parameters for one pass (spec §4.6: `temperature=0` by
/// default).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum output tokens.
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self { temperature: 0.0, max_tokens: 4096 }
    }
}

/// Everything one streaming call needs (spec §4.6, §6.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRequest {
    /// Concrete provider model id for the chosen tier.
    pub model: String,
    /// Ordered system content blocks (spec §4.4).
    pub system_blocks: Vec<SystemBlock>,
    /// Bounded conversation tail plus the live user message.
    pub messages: Vec<ConversationMessage>,
    /// Tool definitions for the chosen tier.
    pub tools: Vec<ToolSchema>,
    /// Sampling parameters.
    pub sampling: SamplingParams,
}

/// Token usage for one pass (spec §4.9, §6.4).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens consumed (not counting cached prefix reuse).
    pub input_tokens: u64,
    /// Output tokens generated.
    pub output_tokens: u64,
    /// Tokens served from a cached prefix.
    pub cache_read_tokens: u64,
    /// Tokens newly written to the cache by this call.
    pub cache_write_tokens: u64,
}

impl TokenUsage {
    /// Add another usage sample into this one in place (running sum
    /// across passes, spec §4.7 `usage_sum`).
    pub fn add_assign(&mut self, other: &TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
        self.cache_write_tokens += other.cache_write_tokens;
    }
}

/// One event from a streaming call (spec §4.6): `(text-chunk | usage-
/// stats | end)`, plus a terminal error variant this crate adds to keep
/// the event sequence total (every stream ends in exactly one of `End`
/// or `ProviderError`).
#[derive(Debug, Clone, PartialEq)]
pub enum LlmEvent {
    /// A chunk of raw assistant text. Concatenating every `TextChunk`
    /// in arrival order yields the full assistant output for the pass.
    TextChunk(String),
    /// Usage statistics, normally emitted once near the end of the
    /// stream.
    UsageStats(TokenUsage),
    /// The stream ended normally.
    End,
    /// The stream ended because of a provider-side failure.
    ProviderError(aide_core::ProviderErrorKind),
}
