//! In-memory [`aide_core::SnapshotStore`] test double (spec §6.3).
//!
//! A durable store is an explicit non-goal of this kernel; this crate
//! exists only so the orchestrator and its tests have a concrete
//! collaborator to run against. Grounded on `neuron-state-memory/src/
//! lib.rs`'s `MemoryStore`: a `HashMap` behind a lock, one entry per
//! scope — here the scope is simply the aide id, since this store's
//! surface is the three spec-mandated whole-snapshot operations rather
//! than a generic keyed read/write.

#![deny(missing_docs)]

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use aide_core::store::{ConversationTailEntry, SnapshotStore, StoreError};
use aide_core::AideId;
use aide_reducer::Operation;
use aide_snapshot::Snapshot;

/// Conversation-tail entries beyond this count are dropped from the
/// oldest end on every append (spec §6.3: "bounded (≤9 entries)").
pub const DEFAULT_HISTORY_CAP: usize = 9;

struct AideRecord {
    snapshot: Snapshot,
    conversation_tail: Vec<ConversationTailEntry>,
}

impl AideRecord {
    fn new() -> Self {
        Self { snapshot: Snapshot::empty(), conversation_tail: Vec::new() }
    }

    fn push_bounded(&mut self, entry: ConversationTailEntry, cap: usize) {
        self.conversation_tail.push(entry);
        if self.conversation_tail.len() > cap {
            let excess = self.conversation_tail.len() - cap;
            self.conversation_tail.drain(0..excess);
        }
    }
}

/// In-memory store backed by a `HashMap<AideId, AideRecord>` behind a
/// `tokio::sync::RwLock`. Every aide not yet seen starts from an empty
/// snapshot with no history — there is no "aide not found" case.
pub struct MemoryStore {
    aides: RwLock<HashMap<AideId, AideRecord>>,
    history_cap: usize,
}

impl MemoryStore {
    /// A new, empty store using [`DEFAULT_HISTORY_CAP`].
    pub fn new() -> Self {
        Self { aides: RwLock::new(HashMap::new()), history_cap: DEFAULT_HISTORY_CAP }
    }

    /// A new, empty store with a custom conversation-tail cap (for tests
    /// that want to exercise the bounding behavior directly).
    pub fn with_history_cap(history_cap: usize) -> Self {
        Self { aides: RwLock::new(HashMap::new()), history_cap }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load_turn_context(
        &self,
        aide_id: &AideId,
    ) -> Result<(Snapshot, Vec<ConversationTailEntry>), StoreError> {
        let aides = self.aides.read().await;
        match aides.get(aide_id) {
            Some(record) => Ok((record.snapshot.clone(), record.conversation_tail.clone())),
            None => Ok((Snapshot::empty(), Vec::new())),
        }
    }

    async fn append_turn(
        &self,
        aide_id: &AideId,
        _turn_id: &str,
        user_message: &str,
        operations: &[Operation],
        final_snapshot: &Snapshot,
    ) -> Result<(), StoreError> {
        let mut aides = self.aides.write().await;
        let record = aides.entry(aide_id.clone()).or_insert_with(AideRecord::new);
        record.snapshot = final_snapshot.clone();
        record.push_bounded(
            ConversationTailEntry::User { text: user_message.to_string() },
            self.history_cap,
        );
        record.push_bounded(
            ConversationTailEntry::AssistantSummary {
                summary: format!("{} operations applied", operations.len()),
            },
            self.history_cap,
        );
        Ok(())
    }

    async fn append_direct_edit(
        &self,
        aide_id: &AideId,
        _op: &Operation,
        result_snapshot: &Snapshot,
    ) -> Result<(), StoreError> {
        let mut aides = self.aides.write().await;
        let record = aides.entry(aide_id.clone()).or_insert_with(AideRecord::new);
        record.snapshot = result_snapshot.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aide_snapshot::{Display, Entity, EntityId, ROOT};

    fn page_snapshot() -> Snapshot {
        let mut snap = Snapshot::empty();
        snap.entities.insert(
            EntityId::new("page"),
            Entity {
                id: EntityId::new("page"),
                parent: ROOT.to_string(),
                display: Some(Display::Page),
                props: serde_json::Map::new(),
                removed: false,
                created_seq: 0,
                updated_seq: 0,
            },
        );
        snap.creation_order.push(EntityId::new("page"));
        snap
    }

    #[tokio::test]
    async fn unseen_aide_starts_empty() {
        let store = MemoryStore::new();
        let (snap, tail) = store.load_turn_context(&AideId::new("a1")).await.unwrap();
        assert!(snap.entities.is_empty());
        assert!(tail.is_empty());
    }

    #[tokio::test]
    async fn append_turn_persists_snapshot_and_history() {
        let store = MemoryStore::new();
        let aide = AideId::new("a1");
        store
            .append_turn(&aide, "t1", "hello", &[], &page_snapshot())
            .await
            .unwrap();

        let (snap, tail) = store.load_turn_context(&aide).await.unwrap();
        assert_eq!(snap.entities.len(), 1);
        assert_eq!(tail.len(), 2);
        assert!(matches!(&tail[0], ConversationTailEntry::User { text } if text == "hello"));
        assert!(matches!(
            &tail[1],
            ConversationTailEntry::AssistantSummary { summary } if summary == "0 operations applied"
        ));
    }

    #[tokio::test]
    async fn conversation_tail_is_bounded() {
        let store = MemoryStore::with_history_cap(4);
        let aide = AideId::new("a1");
        for i in 0..5 {
            store
                .append_turn(&aide, "t", &format!("msg {i}"), &[], &Snapshot::empty())
                .await
                .unwrap();
        }
        let (_, tail) = store.load_turn_context(&aide).await.unwrap();
        assert_eq!(tail.len(), 4);
        assert!(matches!(&tail[0], ConversationTailEntry::AssistantSummary { .. }));
    }

    #[tokio::test]
    async fn append_direct_edit_updates_snapshot_without_touching_history() {
        let store = MemoryStore::new();
        let aide = AideId::new("a1");
        store
            .append_turn(&aide, "t1", "hello", &[], &Snapshot::empty())
            .await
            .unwrap();
        store
            .append_direct_edit(
                &aide,
                &Operation::MetaSet { props: serde_json::Map::new() },
                &page_snapshot(),
            )
            .await
            .unwrap();

        let (snap, tail) = store.load_turn_context(&aide).await.unwrap();
        assert_eq!(snap.entities.len(), 1);
        assert_eq!(tail.len(), 2);
    }
}
