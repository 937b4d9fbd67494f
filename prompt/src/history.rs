//! Bounded conversation tail (spec §4.4, §6.3).
//!
//! "History is not memory — the snapshot is": only the last
//! `history_window_turns` prior entries travel verbatim, and prior
//! assistant turns that mutated the page are summarized rather than
//! replayed, since the mutations themselves already live in the
//! snapshot block.

use aide_llm::{ConversationMessage, Role};
use serde::{Deserialize, Serialize};

/// One entry of a session's persisted conversation history, as handed
/// back by the store collaborator's `load_turn_context` (spec §6.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryTurn {
    /// A verbatim user utterance.
    User {
        /// The message text.
        text: String,
    },
    /// A prior assistant pass that accepted one or more mutations.
    /// Summarized on replay rather than shown verbatim.
    AssistantMutation {
        /// Count of accepted operations in that pass.
        operations_applied: usize,
    },
    /// A prior assistant pass that only emitted chat text (an analyst
    /// reply, or a fast/structural pass that chose not to mutate).
    AssistantVoice {
        /// The text shown to the user at the time.
        text: String,
    },
}

fn to_message(turn: &HistoryTurn) -> ConversationMessage {
    match turn {
        HistoryTurn::User { text } => ConversationMessage { role: Role::User, text: text.clone() },
        HistoryTurn::AssistantMutation { operations_applied } => ConversationMessage {
            role: Role::Assistant,
            text: format!("{operations_applied} operations applied"),
        },
        HistoryTurn::AssistantVoice { text } => {
            ConversationMessage { role: Role::Assistant, text: text.clone() }
        }
    }
}

/// Keep the last `window` entries of `history`, mapping each to its
/// wire-ready [`ConversationMessage`] form.
pub fn bound_conversation_tail(history: &[HistoryTurn], window: usize) -> Vec<ConversationMessage> {
    let start = history.len().saturating_sub(window);
    history[start..].iter().map(to_message).collect()
}

/// The full messages array for one pass: the bounded tail followed by
/// the live user message (spec §4.4).
pub fn assemble_messages(
    history: &[HistoryTurn],
    window: usize,
    current_user_message: &str,
) -> Vec<ConversationMessage> {
    let mut messages = bound_conversation_tail(history, window);
    messages.push(ConversationMessage { role: Role::User, text: current_user_message.to_string() });
    messages
}
