//! Deterministic replay LLM client (C10, spec §4.10).
//!
//! Replays the exact bytes a past successful run produced — a "golden"
//! JSONL script — one line per `TextChunk`, with a configurable
//! pre-first-chunk delay and per-line delay (spec §4.6: "four pacing
//! profiles"). Required by the test suite to exercise the orchestrator
//! end-to-end without network or nondeterminism. Grounded on
//! `layer0::test_utils::EchoTurn`'s role (a trivial, deterministic
//! stand-in wired through the same trait real implementations use) and
//! on the line-pacing idea in `neuron-provider-ollama/src/streaming.rs`.

#![deny(missing_docs)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use aide_llm::{BoxLlmStream, LlmClient, LlmEvent, StreamRequest, TokenUsage};

/// One of the four pacing profiles spec §4.6 names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingProfile {
    /// No delay at all — every line is emitted back to back.
    Instant,
    /// ~200ms before the first chunk, ~50ms between subsequent lines.
    FastL2,
    /// ~800ms before the first chunk, ~100ms between subsequent lines.
    StructuralL3,
    /// A slow profile for exercising client-side timeouts.
    Slow,
}

impl PacingProfile {
    /// Parse from the `set_profile` session message's `profile` string
    /// (spec §6.1). Unknown names fall back to [`PacingProfile::Instant`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "fast-l2" => PacingProfile::FastL2,
            "structural-l3" => PacingProfile::StructuralL3,
            "slow" => PacingProfile::Slow,
            _ => PacingProfile::Instant,
        }
    }

    fn delays(self) -> (Duration, Duration) {
        match self {
            PacingProfile::Instant => (Duration::ZERO, Duration::ZERO),
            PacingProfile::FastL2 => (Duration::from_millis(200), Duration::from_millis(50)),
            PacingProfile::StructuralL3 => (Duration::from_millis(800), Duration::from_millis(100)),
            PacingProfile::Slow => (Duration::from_millis(5000), Duration::from_millis(2000)),
        }
    }
}

/// Lets a caller holding only `Arc<dyn PacingControl>` retune a running
/// mock's pacing after construction — needed for the session protocol's
/// test-only `set_profile` message (spec §6.1), without teaching the
/// abstract [`LlmClient`] trait about a mock-specific concept.
pub trait PacingControl: Send + Sync {
    /// Replace the pacing profile used by every subsequent `stream` call.
    fn set_pacing(&self, pacing: PacingProfile);
}

/// Replays a fixed script of JSONL lines as a sequence of [`LlmEvent`]s.
pub struct MockLlmClient {
    lines: Vec<String>,
    pacing: Mutex<PacingProfile>,
    usage: TokenUsage,
}

impl MockLlmClient {
    /// Build a replay client from an in-memory script (already split
    /// into lines, newlines stripped).
    pub fn new(lines: Vec<String>, pacing: PacingProfile) -> Self {
        Self { lines, pacing: Mutex::new(pacing), usage: TokenUsage::default() }
    }

    /// Build a replay client by splitting a raw golden JSONL blob on
    /// `\n`, dropping any trailing empty line.
    pub fn from_script(script: &str, pacing: PacingProfile) -> Self {
        let lines = script
            .lines()
            .map(|l| l.to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self::new(lines, pacing)
    }

    /// Load a golden JSONL file from disk and build a replay client
    /// from its contents.
    pub async fn from_file(
        path: impl AsRef<std::path::Path>,
        pacing: PacingProfile,
    ) -> std::io::Result<Self> {
        let script = tokio::fs::read_to_string(path).await?;
        Ok(Self::from_script(&script, pacing))
    }

    /// Override the token usage stats reported at the end of the
    /// replay (defaults to all-zero).
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn stream(&self, _request: StreamRequest) -> BoxLlmStream {
        let lines = self.lines.clone();
        let pacing = *self.pacing.lock().expect("pacing mutex poisoned");
        let (first_delay, per_line_delay) = pacing.delays();
        let usage = self.usage;

        Box::pin(async_stream::stream! {
            if !first_delay.is_zero() {
                tokio::time::sleep(first_delay).await;
            }
            for (i, line) in lines.iter().enumerate() {
                if i > 0 && !per_line_delay.is_zero() {
                    tokio::time::sleep(per_line_delay).await;
                }
                yield LlmEvent::TextChunk(format!("{line}\n"));
            }
            yield LlmEvent::UsageStats(usage);
            yield LlmEvent::End;
        })
    }
}

impl PacingControl for MockLlmClient {
    fn set_pacing(&self, pacing: PacingProfile) {
        *self.pacing.lock().expect("pacing mutex poisoned") = pacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn req() -> StreamRequest {
        StreamRequest {
            model: "mock".to_string(),
            system_blocks: vec![],
            messages: vec![],
            tools: vec![],
            sampling: Default::default(),
        }
    }

    #[tokio::test]
    async fn replays_lines_then_usage_then_end() {
        let client = MockLlmClient::from_script(
            "{\"t\":\"voice\",\"text\":\"hi\"}\n{\"t\":\"batch.start\"}\n",
            PacingProfile::Instant,
        );
        let events: Vec<LlmEvent> = client.stream(req()).await.collect().await;
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], LlmEvent::TextChunk(_)));
        assert!(matches!(events[1], LlmEvent::TextChunk(_)));
        assert!(matches!(events[2], LlmEvent::UsageStats(_)));
        assert_eq!(events[3], LlmEvent::End);
    }

    #[test]
    fn unknown_profile_name_falls_back_to_instant() {
        assert_eq!(PacingProfile::from_name("bogus"), PacingProfile::Instant);
        assert_eq!(PacingProfile::from_name("fast-l2"), PacingProfile::FastL2);
    }

    #[tokio::test]
    async fn dropping_the_stream_stops_further_replay() {
        let client = MockLlmClient::from_script(
            "{\"t\":\"batch.start\"}\n{\"t\":\"batch.end\"}\n",
            PacingProfile::Slow,
        );
        let mut stream = client.stream(req()).await;
        let first = stream.next().await;
        assert!(matches!(first, Some(LlmEvent::TextChunk(_))));
        drop(stream);
    }

    #[tokio::test(start_paused = true)]
    async fn set_pacing_retunes_a_running_mock() {
        let client = MockLlmClient::from_script("{\"t\":\"batch.start\"}\n", PacingProfile::Slow);
        client.set_pacing(PacingProfile::Instant);
        let events: Vec<LlmEvent> = client.stream(req()).await.collect().await;
        assert_eq!(events.len(), 3);
    }
}
