//! The snapshot value itself and its pure helpers (C1).
//!
//! A [`Snapshot`] is plain data: no mutation helpers live here, only
//! transformations that return a new value. Invariant enforcement
//! (parent-before-child, id uniqueness, cardinality, acyclicity, ...)
//! belongs to the reducer, not this crate — this crate only knows how to
//! read and clone itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, ROOT};
use crate::relationship::{Cardinality, Relationship};

/// Free-form page metadata (title, identity, timezone, and anything else
/// a `meta.set` operation has merged in).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meta(pub serde_json::Map<String, serde_json::Value>);

impl Meta {
    /// The page title, if set.
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(|v| v.as_str())
    }
}

/// The full entity-tree value at a point in time.
///
/// Cloning a `Snapshot` is a deep clone (every field owns its data); this
/// is the "deep-clone for speculative reduction" helper spec §4.1 asks
/// for — callers needing a working copy before a speculative reduction
/// just call `.clone()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All entities, including removed (tombstoned) ones.
    pub entities: HashMap<EntityId, Entity>,
    /// Global creation order of every entity ever created. Removed
    /// entities keep their position (their id is never reused).
    pub creation_order: Vec<EntityId>,
    /// Every relationship ever set, including ones later removed.
    pub relationships: Vec<Relationship>,
    /// Cardinality recorded per relationship type, first-set-wins.
    pub relationship_types: HashMap<String, Cardinality>,
    /// Page-level metadata.
    pub meta: Meta,
    /// Monotonic counter: the sequence number of the next entity created.
    pub creation_seq: u64,
    /// Monotonic counter: the sequence number of the next update applied.
    pub update_seq: u64,
}

impl Snapshot {
    /// An empty snapshot: no entities, no relationships, zeroed counters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up an entity by id, including removed ones.
    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Look up a non-removed entity by id.
    pub fn get_living(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id).filter(|e| !e.removed)
    }

    /// The single top-level (`parent == "root"`) entity, if one exists.
    pub fn root_entity(&self) -> Option<&Entity> {
        self.creation_order
            .iter()
            .filter_map(|id| self.entities.get(id))
            .find(|e| e.is_top_level())
    }

    /// Every entity whose `parent` equals `parent_id`, in insertion
    /// order, including removed ones.
    pub fn children_of(&self, parent_id: &str) -> Vec<&Entity> {
        self.creation_order
            .iter()
            .filter_map(|id| self.entities.get(id))
            .filter(|e| e.parent == parent_id)
            .collect()
    }

    /// Every non-removed entity whose `parent` equals `parent_id`, in
    /// insertion order.
    pub fn living_children_of(&self, parent_id: &str) -> Vec<&Entity> {
        self.children_of(parent_id)
            .into_iter()
            .filter(|e| !e.removed)
            .collect()
    }

    /// Every non-removed descendant of `id` (not including `id` itself),
    /// in a pre-order walk.
    pub fn living_descendants_of(&self, id: &str) -> Vec<&Entity> {
        let mut out = Vec::new();
        let mut frontier = vec![id.to_string()];
        while let Some(cur) = frontier.pop() {
            for child in self.living_children_of(&cur) {
                frontier.push(child.id.as_str().to_string());
                out.push(child);
            }
        }
        out
    }

    /// Whether `maybe_ancestor` is `id` itself or a (possibly indirect)
    /// ancestor of `id`. Used by the reducer to reject cyclic moves.
    pub fn is_ancestor_or_self(&self, maybe_ancestor: &str, id: &str) -> bool {
        if maybe_ancestor == id {
            return true;
        }
        let mut cur = id.to_string();
        loop {
            let Some(entity) = self.entities.get(&EntityId::new(cur.clone())) else {
                return false;
            };
            if entity.parent == ROOT {
                return false;
            }
            if entity.parent == maybe_ancestor {
                return true;
            }
            cur = entity.parent.clone();
        }
    }

    /// Resolve an `entity.update`-style `ref` string to a concrete entity
    /// id. A bare id (no `/`) resolves to itself. A path of the form
    /// `id/field/child_id` resolves to `child_id`, provided `child_id` is
    /// actually a child of `id` — this is the "single-field-typed child
    /// collection" addressing spec §4.1 describes; `field` is accepted
    /// but not otherwise validated against the parent's props.
    pub fn resolve_ref(&self, r: &str) -> Option<EntityId> {
        if !r.contains('/') {
            return Some(EntityId::new(r));
        }
        let parts: Vec<&str> = r.splitn(3, '/').collect();
        let [parent_id, _field, child_id] = parts.as_slice() else {
            return None;
        };
        let child = EntityId::new(*child_id);
        let entity = self.entities.get(&child)?;
        if entity.parent == *parent_id {
            Some(child)
        } else {
            None
        }
    }

    /// First entity (in creation order) with any string prop containing
    /// `needle` as a substring (case-sensitive). Classifier-heuristic
    /// only — the reducer never matches fuzzily.
    pub fn find_by_substring(&self, needle: &str) -> Option<&Entity> {
        self.creation_order
            .iter()
            .filter_map(|id| self.entities.get(id))
            .find(|e| {
                e.props
                    .values()
                    .any(|v| matches!(v.as_str(), Some(s) if s.contains(needle)))
            })
    }

    /// Whether the snapshot has no entities at all other than the page
    /// root (used by the classifier to detect "first turn on this
    /// aide").
    pub fn has_no_non_root_entities(&self) -> bool {
        self.creation_order
            .iter()
            .filter_map(|id| self.entities.get(id))
            .all(|e| e.is_top_level())
    }

    /// Canonical JSON serialization with keys in the fixed order spec
    /// §6.2 defines, for cache-stable prompt embedding and for the
    /// external store. Entities are emitted in creation order (stable
    /// prefix across turns: existing entities never change position,
    /// new ones append).
    pub fn to_canonical_json(&self) -> serde_json::Value {
        let mut entities = serde_json::Map::new();
        for id in &self.creation_order {
            if let Some(entity) = self.entities.get(id) {
                entities.insert(
                    id.as_str().to_string(),
                    serde_json::to_value(entity).expect("Entity always serializes"),
                );
            }
        }

        let relationships: Vec<serde_json::Value> = self
            .relationships
            .iter()
            .map(|r| serde_json::to_value(r).expect("Relationship always serializes"))
            .collect();

        let mut relationship_types = serde_json::Map::new();
        for (t, card) in &self.relationship_types {
            relationship_types.insert(
                t.clone(),
                serde_json::json!({ "cardinality": card }),
            );
        }

        let mut out = serde_json::Map::new();
        out.insert("meta".to_string(), serde_json::Value::Object(self.meta.0.clone()));
        out.insert("entities".to_string(), serde_json::Value::Object(entities));
        out.insert("relationships".to_string(), serde_json::Value::Array(relationships));
        out.insert(
            "relationship_types".to_string(),
            serde_json::Value::Object(relationship_types),
        );
        serde_json::Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, parent: &str, seq: u64) -> Entity {
        Entity {
            id: EntityId::new(id),
            parent: parent.to_string(),
            display: None,
            props: serde_json::Map::new(),
            removed: false,
            created_seq: seq,
            updated_seq: seq,
        }
    }

    #[test]
    fn empty_snapshot_has_no_non_root_entities() {
        assert!(Snapshot::empty().has_no_non_root_entities());
    }

    #[test]
    fn children_of_preserves_insertion_order() {
        let mut snap = Snapshot::empty();
        for (i, id) in ["c", "a", "b"].iter().enumerate() {
            snap.entities.insert(EntityId::new(*id), entity(id, "page", i as u64));
            snap.creation_order.push(EntityId::new(*id));
        }
        let kids = snap.children_of("page");
        let ids: Vec<&str> = kids.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn living_children_excludes_tombstones() {
        let mut snap = Snapshot::empty();
        let mut removed = entity("x", "page", 0);
        removed.removed = true;
        snap.entities.insert(EntityId::new("x"), removed);
        snap.entities.insert(EntityId::new("y"), entity("y", "page", 1));
        snap.creation_order = vec![EntityId::new("x"), EntityId::new("y")];
        let living = snap.living_children_of("page");
        assert_eq!(living.len(), 1);
        assert_eq!(living[0].id.as_str(), "y");
    }

    #[test]
    fn is_ancestor_or_self_detects_indirect_ancestry() {
        let mut snap = Snapshot::empty();
        snap.entities.insert(EntityId::new("page"), entity("page", ROOT, 0));
        snap.entities.insert(EntityId::new("section"), entity("section", "page", 1));
        snap.entities.insert(EntityId::new("card"), entity("card", "section", 2));
        assert!(snap.is_ancestor_or_self("page", "card"));
        assert!(snap.is_ancestor_or_self("card", "card"));
        assert!(!snap.is_ancestor_or_self("card", "page"));
    }

    #[test]
    fn resolve_ref_bare_id() {
        let snap = Snapshot::empty();
        assert_eq!(snap.resolve_ref("guest_linda"), Some(EntityId::new("guest_linda")));
    }

    #[test]
    fn resolve_ref_path_resolves_to_child() {
        let mut snap = Snapshot::empty();
        snap.entities.insert(EntityId::new("row_3"), entity("row_3", "roster", 0));
        assert_eq!(
            snap.resolve_ref("roster/rows/row_3"),
            Some(EntityId::new("row_3"))
        );
    }

    #[test]
    fn resolve_ref_path_rejects_mismatched_parent() {
        let mut snap = Snapshot::empty();
        snap.entities.insert(EntityId::new("row_3"), entity("row_3", "other", 0));
        assert_eq!(snap.resolve_ref("roster/rows/row_3"), None);
    }

    #[test]
    fn canonical_json_has_fixed_top_level_keys() {
        let snap = Snapshot::empty();
        let json = snap.to_canonical_json();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["meta", "entities", "relationships", "relationship_types"]);
    }

    #[test]
    fn canonical_json_roundtrips_via_serde() {
        let mut snap = Snapshot::empty();
        snap.entities.insert(EntityId::new("page"), entity("page", ROOT, 0));
        snap.creation_order.push(EntityId::new("page"));
        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }
}
