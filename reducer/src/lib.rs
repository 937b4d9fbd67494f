//! Pure entity-tree reducer (C2).
//!
//! [`reduce`] is the only entry point: `(snapshot, op) -> (snapshot',
//! outcome)`, total and deterministic, no I/O, never panics. Malformed
//! or invariant-violating operations are [`Outcome::Rejected`], not an
//! error — there is no fallible path here at all.
//!
//! This crate also owns [`Operation`] and [`Signal`], the expanded
//! (post-abbreviation) wire vocabulary spec §4.2/§4.3 define, since they
//! are the reducer's input alphabet. `aide-parse` depends on this crate
//! to decode JSONL lines directly into them.

#![deny(missing_docs)]

mod operation;
mod outcome;
mod reduce;

pub use operation::{Operation, Signal};
pub use outcome::{Outcome, RejectionReason};
pub use reduce::reduce;

#[cfg(test)]
mod tests {
    use super::*;
    use aide_snapshot::{Cardinality, Display, EntityId, Snapshot, ROOT};
    use serde_json::json;

    fn create(id: &str, parent: &str, display: Option<Display>) -> Operation {
        Operation::EntityCreate {
            id: id.to_string(),
            parent: parent.to_string(),
            display,
            props: Default::default(),
        }
    }

    #[test]
    fn creates_root_page() {
        let snap = Snapshot::empty();
        let (next, outcome) = reduce(&snap, &create("page", ROOT, Some(Display::Page)));
        assert_eq!(outcome, Outcome::Accepted);
        assert!(next.root_entity().is_some());
        assert_eq!(next.creation_seq, 1);
    }

    #[test]
    fn rejects_second_root() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("page", ROOT, None));
        let (_, outcome) = reduce(&snap, &create("page2", ROOT, None));
        assert_eq!(
            outcome,
            Outcome::Rejected { reason: RejectionReason::InvariantViolation }
        );
    }

    #[test]
    fn rejects_create_with_missing_parent() {
        let snap = Snapshot::empty();
        let (_, outcome) = reduce(&snap, &create("card", "nope", None));
        assert_eq!(outcome, Outcome::Rejected { reason: RejectionReason::MissingParent });
    }

    #[test]
    fn rejects_duplicate_id_even_if_tombstoned() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("page", ROOT, None));
        let (snap, _) = reduce(&snap, &create("card", "page", None));
        let (snap, _) = reduce(
            &snap,
            &Operation::EntityRemove { r#ref: "card".to_string() },
        );
        let (_, outcome) = reduce(&snap, &create("card", "page", None));
        assert_eq!(outcome, Outcome::Rejected { reason: RejectionReason::DuplicateId });
    }

    #[test]
    fn update_merges_props_and_is_idempotent_on_repeat() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("page", ROOT, None));
        let op = Operation::EntityUpdate {
            r#ref: "page".to_string(),
            props: serde_json::from_value(json!({"title": "Hi"})).unwrap(),
        };
        let (snap, outcome) = reduce(&snap, &op);
        assert_eq!(outcome, Outcome::Accepted);
        let (snap2, outcome2) = reduce(&snap, &op);
        assert_eq!(outcome2, Outcome::Accepted);
        assert_eq!(
            snap.get(&EntityId::new("page")).unwrap().props,
            snap2.get(&EntityId::new("page")).unwrap().props
        );
    }

    #[test]
    fn update_rejects_missing_ref() {
        let snap = Snapshot::empty();
        let op = Operation::EntityUpdate { r#ref: "nope".to_string(), props: Default::default() };
        let (_, outcome) = reduce(&snap, &op);
        assert_eq!(outcome, Outcome::Rejected { reason: RejectionReason::MissingRef });
    }

    #[test]
    fn update_rejects_removed_ref() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("page", ROOT, None));
        let (snap, _) = reduce(&snap, &Operation::EntityRemove { r#ref: "page".to_string() });
        let op = Operation::EntityUpdate { r#ref: "page".to_string(), props: Default::default() };
        let (_, outcome) = reduce(&snap, &op);
        assert_eq!(outcome, Outcome::Rejected { reason: RejectionReason::RefRemoved });
    }

    #[test]
    fn remove_tombstones_whole_subtree() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("page", ROOT, None));
        let (snap, _) = reduce(&snap, &create("section", "page", None));
        let (snap, _) = reduce(&snap, &create("card", "section", None));
        let (snap, _) = reduce(&snap, &Operation::EntityRemove { r#ref: "section".to_string() });
        assert!(snap.get(&EntityId::new("section")).unwrap().removed);
        assert!(snap.get(&EntityId::new("card")).unwrap().removed);
        // No resurrection: a second remove on the already-removed id rejects.
        let (_, outcome) = reduce(&snap, &Operation::EntityRemove { r#ref: "section".to_string() });
        assert_eq!(outcome, Outcome::Rejected { reason: RejectionReason::RefRemoved });
    }

    #[test]
    fn move_rejects_cyclic_reparent() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("page", ROOT, None));
        let (snap, _) = reduce(&snap, &create("section", "page", None));
        let (snap, _) = reduce(&snap, &create("card", "section", None));
        let op = Operation::EntityMove {
            r#ref: "section".to_string(),
            parent: "card".to_string(),
            position: None,
        };
        let (_, outcome) = reduce(&snap, &op);
        assert_eq!(outcome, Outcome::Rejected { reason: RejectionReason::CyclicMove });
    }

    #[test]
    fn move_rejects_self_reparent() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("page", ROOT, None));
        let op = Operation::EntityMove {
            r#ref: "page".to_string(),
            parent: "page".to_string(),
            position: None,
        };
        let (_, outcome) = reduce(&snap, &op);
        assert_eq!(outcome, Outcome::Rejected { reason: RejectionReason::CyclicMove });
    }

    #[test]
    fn move_repositions_among_new_siblings() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("page", ROOT, None));
        let (snap, _) = reduce(&snap, &create("a", "page", None));
        let (snap, _) = reduce(&snap, &create("b", "page", None));
        let (snap, _) = reduce(&snap, &create("other", "page", None));
        let op = Operation::EntityMove {
            r#ref: "other".to_string(),
            parent: "page".to_string(),
            position: Some(1),
        };
        let (snap, outcome) = reduce(&snap, &op);
        assert_eq!(outcome, Outcome::Accepted);
        let ids: Vec<&str> = snap.living_children_of("page").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "other", "b"]);
    }

    #[test]
    fn reorder_rejects_mismatched_child_set() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("page", ROOT, None));
        let (snap, _) = reduce(&snap, &create("a", "page", None));
        let (snap, _) = reduce(&snap, &create("b", "page", None));
        let op = Operation::EntityReorder {
            r#ref: "page".to_string(),
            children: vec!["a".to_string()],
        };
        let (_, outcome) = reduce(&snap, &op);
        assert_eq!(outcome, Outcome::Rejected { reason: RejectionReason::ReorderMismatch });
    }

    #[test]
    fn reorder_accepts_full_permutation() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("page", ROOT, None));
        let (snap, _) = reduce(&snap, &create("a", "page", None));
        let (snap, _) = reduce(&snap, &create("b", "page", None));
        let op = Operation::EntityReorder {
            r#ref: "page".to_string(),
            children: vec!["b".to_string(), "a".to_string()],
        };
        let (snap, outcome) = reduce(&snap, &op);
        assert_eq!(outcome, Outcome::Accepted);
        let ids: Vec<&str> = snap.living_children_of("page").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn many_to_one_replaces_prior_edge_from_same_source() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("a", ROOT, None));
        let (snap, _) = reduce(&snap, &create("b", "a", None));
        let (snap, _) = reduce(&snap, &create("c", "a", None));
        let set_b = Operation::RelSet {
            from: "a".to_string(),
            to: "b".to_string(),
            rel_type: "owner".to_string(),
            cardinality: Some(Cardinality::ManyToOne),
            data: Value::Null,
        };
        let (snap, _) = reduce(&snap, &set_b);
        let set_c = Operation::RelSet {
            from: "a".to_string(),
            to: "c".to_string(),
            rel_type: "owner".to_string(),
            cardinality: Some(Cardinality::ManyToOne),
            data: Value::Null,
        };
        let (snap, outcome) = reduce(&snap, &set_c);
        assert_eq!(outcome, Outcome::Accepted);
        let edges: Vec<_> = snap
            .relationships
            .iter()
            .filter(|r| r.from.as_str() == "a" && r.rel_type == "owner")
            .collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to.as_str(), "c");
    }

    #[test]
    fn cardinality_is_first_set_wins() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("a", ROOT, None));
        let (snap, _) = reduce(&snap, &create("b", "a", None));
        let (snap, _) = reduce(&snap, &create("c", "a", None));
        let first = Operation::RelSet {
            from: "a".to_string(),
            to: "b".to_string(),
            rel_type: "tag".to_string(),
            cardinality: Some(Cardinality::ManyToMany),
            data: Value::Null,
        };
        let (snap, _) = reduce(&snap, &first);
        // Later op asks for many_to_one, but first-set-wins keeps many_to_many.
        let second = Operation::RelSet {
            from: "a".to_string(),
            to: "c".to_string(),
            rel_type: "tag".to_string(),
            cardinality: Some(Cardinality::ManyToOne),
            data: Value::Null,
        };
        let (snap, _) = reduce(&snap, &second);
        let edges: Vec<_> = snap.relationships.iter().filter(|r| r.rel_type == "tag").collect();
        assert_eq!(edges.len(), 2);
    }

    use serde_json::Value;

    #[test]
    fn rel_set_rejects_missing_to() {
        let snap = Snapshot::empty();
        let (snap, _) = reduce(&snap, &create("a", ROOT, None));
        let op = Operation::RelSet {
            from: "a".to_string(),
            to: "nope".to_string(),
            rel_type: "owner".to_string(),
            cardinality: None,
            data: Value::Null,
        };
        let (_, outcome) = reduce(&snap, &op);
        assert_eq!(outcome, Outcome::Rejected { reason: RejectionReason::MissingRef });
    }

    #[test]
    fn deterministic_for_fixed_input() {
        let snap = Snapshot::empty();
        let op = create("page", ROOT, Some(Display::Page));
        let (next_a, outcome_a) = reduce(&snap, &op);
        let (next_b, outcome_b) = reduce(&snap, &op);
        assert_eq!(outcome_a, outcome_b);
        assert_eq!(next_a, next_b);
    }

    #[test]
    fn operation_deserializes_abbreviated_wire_form() {
        let line = json!({"t": "entity.create", "id": "page", "parent": "root", "display": "page", "p": {"title": "Hi"}});
        let op: Operation = serde_json::from_value(line).unwrap();
        assert_eq!(op.type_tag(), "entity.create");
        match op {
            Operation::EntityCreate { id, parent, display, props } => {
                assert_eq!(id, "page");
                assert_eq!(parent, "root");
                assert_eq!(display, Some(Display::Page));
                assert_eq!(props.get("title").unwrap(), "Hi");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn rel_set_deserializes_without_key_collision() {
        let line = json!({"t": "rel.set", "from": "a", "to": "b", "type": "owner"});
        let op: Operation = serde_json::from_value(line).unwrap();
        match op {
            Operation::RelSet { rel_type, .. } => assert_eq!(rel_type, "owner"),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn signal_deserializes_from_wire_form() {
        let line = json!({"t": "escalate", "tier": "structural", "reason": "structural_signal"});
        let sig: Signal = serde_json::from_value(line).unwrap();
        match sig {
            Signal::Escalate { tier, reason, extract } => {
                assert_eq!(tier, "structural");
                assert_eq!(reason, "structural_signal");
                assert!(extract.is_none());
            }
            _ => panic!("wrong variant"),
        }
    }
}
