//! JSONL line splitter (C3): byte/text-chunk stream to a lazy, finite,
//! non-restartable sequence of [`ParsedLine`] items in arrival order.
//!
//! Grounded on `neuron-provider-anthropic/src/streaming.rs`'s
//! `parse_sse_stream`: pin the input stream, accumulate a `String` line
//! buffer across chunks, split on `\n`, strip `\r`, dispatch complete
//! lines. Adapted here from SSE event/data framing to raw
//! newline-delimited JSON, with no `event:`/`data:` prefixes to track.
//!
//! Deserializing a line directly into [`aide_reducer::Operation`] or
//! [`aide_reducer::Signal`] *is* spec §4.3's "abbreviation expander":
//! each variant's `#[serde(rename = ...)]` attributes read the wire's
//! abbreviated field names straight into their expanded Rust field
//! names, so nothing downstream of this crate ever sees a `t`/`p`/`ref`
//! key again.

#![deny(missing_docs)]

use futures_core::Stream;
use futures_util::StreamExt;

use aide_reducer::{Operation, Signal};

const OPERATION_TAGS: &[&str] = &[
    "meta.set",
    "entity.create",
    "entity.update",
    "entity.remove",
    "entity.move",
    "entity.reorder",
    "rel.set",
    "rel.remove",
    "style.set",
    "style.entity",
    "meta.annotate",
];

const SIGNAL_TAGS: &[&str] = &["voice", "escalate", "clarify", "batch.start", "batch.end"];

/// One item yielded by [`split_lines`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// A complete, well-formed mutating operation.
    Operation(Operation),
    /// A complete, well-formed non-mutating signal.
    Signal(Signal),
    /// Three consecutive lines failed to decode. The stream ends after
    /// this item; the orchestrator treats it as a stream abort (spec §7,
    /// `Stream.ParseFailureStreak`).
    ParseFailure,
}

/// Default consecutive-failure limit before the splitter aborts (spec
/// §6.5 `parse_failure_streak_limit`, default 3). Use
/// [`split_lines_with_limit`] to override it from configuration.
pub const DEFAULT_PARSE_FAILURE_STREAK_LIMIT: u32 = 3;

/// Adapt a stream of raw text chunks into a stream of [`ParsedLine`]s
/// using the default consecutive-failure limit.
pub fn split_lines(
    chunks: impl Stream<Item = String> + Send + 'static,
) -> impl Stream<Item = ParsedLine> + Send + 'static {
    split_lines_with_limit(chunks, DEFAULT_PARSE_FAILURE_STREAK_LIMIT)
}

/// Adapt a stream of raw text chunks into a stream of [`ParsedLine`]s.
///
/// Maintains a line buffer across chunks; every `\n` flushes a complete
/// line, which is trimmed, skipped if empty or fenced (a defensive
/// measure — prompts forbid code fences but models emit them
/// occasionally), then decoded. `limit` consecutive decode failures
/// (invalid JSON, unknown `t` tag, or a value that fails to match its
/// tag's expected shape) yield exactly one [`ParsedLine::ParseFailure`]
/// and end the stream; any successful decode resets the streak to zero.
pub fn split_lines_with_limit(
    chunks: impl Stream<Item = String> + Send + 'static,
    limit: u32,
) -> impl Stream<Item = ParsedLine> + Send + 'static {
    async_stream::stream! {
        let mut buf = String::new();
        let mut streak = 0u32;
        let mut chunks = std::pin::pin!(chunks);

        while let Some(chunk) = chunks.next().await {
            buf.push_str(&chunk);
            while let Some(nl) = buf.find('\n') {
                let line: String = buf[..nl].trim_end_matches('\r').to_string();
                buf.drain(..=nl);
                if let Some(item) = decode_line(&line, &mut streak, limit) {
                    let abort = matches!(item, ParsedLine::ParseFailure);
                    yield item;
                    if abort {
                        return;
                    }
                }
            }
        }

        let tail = buf.trim();
        if !tail.is_empty() {
            if let Some(item) = decode_line(tail, &mut streak, limit) {
                yield item;
            }
        }
    }
}

/// Decode one complete line, updating `streak` in place. Returns `None`
/// for lines that produce no item at all (blank, fenced, or a discarded
/// below-limit failure).
fn decode_line(line: &str, streak: &mut u32, limit: u32) -> Option<ParsedLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("```") {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => return record_failure(streak, limit),
    };

    let Some(tag) = value.get("t").and_then(|v| v.as_str()) else {
        return record_failure(streak, limit);
    };

    if OPERATION_TAGS.contains(&tag) {
        return match serde_json::from_value::<Operation>(value) {
            Ok(op) => {
                *streak = 0;
                Some(ParsedLine::Operation(op))
            }
            Err(_) => record_failure(streak, limit),
        };
    }

    if SIGNAL_TAGS.contains(&tag) {
        return match serde_json::from_value::<Signal>(value) {
            Ok(sig) => {
                *streak = 0;
                Some(ParsedLine::Signal(sig))
            }
            Err(_) => record_failure(streak, limit),
        };
    }

    record_failure(streak, limit)
}

fn record_failure(streak: &mut u32, limit: u32) -> Option<ParsedLine> {
    *streak += 1;
    if *streak >= limit {
        Some(ParsedLine::ParseFailure)
    } else {
        None
    }
}
