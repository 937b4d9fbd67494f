//! The pure reducer (C2): `reduce(snapshot, op) -> (snapshot', outcome)`.
//!
//! Total and deterministic (spec §4.2): every `(snapshot, op)` pair
//! produces a defined outcome, never panics, never performs I/O.
//! Malformed or invariant-violating input is `Rejected`, not an `Err` —
//! there is no error type here at all.

use std::collections::HashSet;

use aide_snapshot::{Cardinality, Display, Entity, EntityId, Relationship, Snapshot, ROOT};
use serde_json::{Map, Value};

use crate::operation::Operation;
use crate::outcome::{Outcome, RejectionReason};

/// Apply one operation to one snapshot, returning the (possibly
/// unchanged) resulting snapshot and the outcome.
///
/// On `Rejected`, the returned snapshot is byte-identical to the input
/// (same value, not just equal) — callers never need to special-case
/// rejection to avoid a phantom mutation.
pub fn reduce(snapshot: &Snapshot, op: &Operation) -> (Snapshot, Outcome) {
    match op {
        Operation::MetaSet { props } => reduce_meta_set(snapshot, props),
        Operation::EntityCreate { id, parent, display, props } => {
            reduce_entity_create(snapshot, id, parent, *display, props)
        }
        Operation::EntityUpdate { r#ref, props } => reduce_entity_update(snapshot, r#ref, props),
        Operation::EntityRemove { r#ref } => reduce_entity_remove(snapshot, r#ref),
        Operation::EntityMove { r#ref, parent, position } => {
            reduce_entity_move(snapshot, r#ref, parent, *position)
        }
        Operation::EntityReorder { r#ref, children } => {
            reduce_entity_reorder(snapshot, r#ref, children)
        }
        Operation::RelSet { from, to, rel_type, cardinality, data } => {
            reduce_rel_set(snapshot, from, to, rel_type, *cardinality, data)
        }
        Operation::RelRemove { from, to, rel_type } => reduce_rel_remove(snapshot, from, to, rel_type),
        Operation::StyleSet { props } => reduce_merge_meta_nested(snapshot, "style", props),
        Operation::StyleEntity { r#ref, props } => {
            reduce_entity_nested_merge(snapshot, r#ref, "_style", props)
        }
        Operation::MetaAnnotate { props } => reduce_merge_meta_nested(snapshot, "annotations", props),
    }
}

fn rejected(snapshot: &Snapshot, reason: RejectionReason) -> (Snapshot, Outcome) {
    (snapshot.clone(), Outcome::Rejected { reason })
}

fn merge_props(target: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (k, v) in incoming {
        target.insert(k.clone(), v.clone());
    }
}

fn reduce_meta_set(snapshot: &Snapshot, props: &Map<String, Value>) -> (Snapshot, Outcome) {
    let mut next = snapshot.clone();
    merge_props(&mut next.meta.0, props);
    (next, Outcome::Accepted)
}

/// Merge `props` into a nested object living under `meta.<key>`,
/// creating the nested object if it does not exist yet. Backs
/// `style.set` and `meta.annotate`, which spec §4.2 leaves otherwise
/// unspecified in terms of snapshot placement.
fn reduce_merge_meta_nested(
    snapshot: &Snapshot,
    key: &str,
    props: &Map<String, Value>,
) -> (Snapshot, Outcome) {
    let mut next = snapshot.clone();
    let entry = next
        .meta
        .0
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(nested) = entry {
        merge_props(nested, props);
    } else {
        *entry = Value::Object(props.clone());
    }
    (next, Outcome::Accepted)
}

fn reduce_entity_nested_merge(
    snapshot: &Snapshot,
    r#ref: &str,
    key: &str,
    props: &Map<String, Value>,
) -> (Snapshot, Outcome) {
    let Some(id) = snapshot.resolve_ref(r#ref) else {
        return rejected(snapshot, RejectionReason::MissingRef);
    };
    let Some(entity) = snapshot.entities.get(&id) else {
        return rejected(snapshot, RejectionReason::MissingRef);
    };
    if entity.removed {
        return rejected(snapshot, RejectionReason::RefRemoved);
    }

    let mut next = snapshot.clone();
    let seq = next.update_seq;
    let entity = next.entities.get_mut(&id).expect("looked up above");
    let entry = entity
        .props
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(nested) = entry {
        merge_props(nested, props);
    } else {
        *entry = Value::Object(props.clone());
    }
    entity.updated_seq = seq;
    next.update_seq += 1;
    (next, Outcome::Accepted)
}

fn reduce_entity_create(
    snapshot: &Snapshot,
    id: &str,
    parent: &str,
    display: Option<Display>,
    props: &Map<String, Value>,
) -> (Snapshot, Outcome) {
    let new_id = EntityId::new(id);

    // ID uniqueness: tombstoned ids are not reusable either.
    if snapshot.entities.contains_key(&new_id) {
        return rejected(snapshot, RejectionReason::DuplicateId);
    }

    if parent == ROOT {
        if snapshot.root_entity().is_some() {
            return rejected(snapshot, RejectionReason::InvariantViolation);
        }
    } else {
        match snapshot.get(&EntityId::new(parent)) {
            None => return rejected(snapshot, RejectionReason::MissingParent),
            Some(p) if p.removed => return rejected(snapshot, RejectionReason::MissingParent),
            Some(_) => {}
        }
    }

    let mut next = snapshot.clone();
    let seq = next.creation_seq;
    let entity = Entity {
        id: new_id.clone(),
        parent: parent.to_string(),
        display,
        props: props.clone(),
        removed: false,
        created_seq: seq,
        updated_seq: seq,
    };
    next.entities.insert(new_id.clone(), entity);
    next.creation_order.push(new_id);
    next.creation_seq += 1;
    (next, Outcome::Accepted)
}

fn reduce_entity_update(
    snapshot: &Snapshot,
    r#ref: &str,
    props: &Map<String, Value>,
) -> (Snapshot, Outcome) {
    let Some(id) = snapshot.resolve_ref(r#ref) else {
        return rejected(snapshot, RejectionReason::MissingRef);
    };
    match snapshot.entities.get(&id) {
        None => return rejected(snapshot, RejectionReason::MissingRef),
        Some(e) if e.removed => return rejected(snapshot, RejectionReason::RefRemoved),
        Some(_) => {}
    }

    let mut next = snapshot.clone();
    let seq = next.update_seq;
    let entity = next.entities.get_mut(&id).expect("looked up above");
    merge_props(&mut entity.props, props);
    entity.updated_seq = seq;
    next.update_seq += 1;
    (next, Outcome::Accepted)
}

fn reduce_entity_remove(snapshot: &Snapshot, r#ref: &str) -> (Snapshot, Outcome) {
    let Some(id) = snapshot.resolve_ref(r#ref) else {
        return rejected(snapshot, RejectionReason::MissingRef);
    };
    match snapshot.entities.get(&id) {
        None => return rejected(snapshot, RejectionReason::MissingRef),
        Some(e) if e.removed => return rejected(snapshot, RejectionReason::RefRemoved),
        Some(_) => {}
    }

    let mut next = snapshot.clone();
    let seq = next.update_seq;
    let mut to_remove = vec![id.as_str().to_string()];
    to_remove.extend(
        next.living_descendants_of(id.as_str())
            .into_iter()
            .map(|e| e.id.as_str().to_string()),
    );
    for tid in to_remove {
        if let Some(e) = next.entities.get_mut(&EntityId::new(tid)) {
            e.removed = true;
            e.updated_seq = seq;
        }
    }
    next.update_seq += 1;
    (next, Outcome::Accepted)
}

fn reduce_entity_move(
    snapshot: &Snapshot,
    r#ref: &str,
    parent: &str,
    position: Option<usize>,
) -> (Snapshot, Outcome) {
    let Some(id) = snapshot.resolve_ref(r#ref) else {
        return rejected(snapshot, RejectionReason::MissingRef);
    };
    match snapshot.entities.get(&id) {
        None => return rejected(snapshot, RejectionReason::MissingRef),
        Some(e) if e.removed => return rejected(snapshot, RejectionReason::RefRemoved),
        Some(_) => {}
    }

    if parent != ROOT {
        match snapshot.entities.get(&EntityId::new(parent)) {
            None => return rejected(snapshot, RejectionReason::MissingRef),
            Some(p) if p.removed => return rejected(snapshot, RejectionReason::RefRemoved),
            Some(_) => {}
        }
        if snapshot.is_ancestor_or_self(id.as_str(), parent) {
            return rejected(snapshot, RejectionReason::CyclicMove);
        }
    }

    let mut next = snapshot.clone();
    {
        let entity = next.entities.get_mut(&id).expect("looked up above");
        entity.parent = parent.to_string();
        let seq = next.update_seq;
        entity.updated_seq = seq;
    }
    next.update_seq += 1;
    reposition_sibling(&mut next.creation_order, &next.entities, &id, parent, position);
    (next, Outcome::Accepted)
}

fn reduce_entity_reorder(
    snapshot: &Snapshot,
    r#ref: &str,
    children: &[String],
) -> (Snapshot, Outcome) {
    let Some(id) = snapshot.resolve_ref(r#ref) else {
        return rejected(snapshot, RejectionReason::MissingRef);
    };
    match snapshot.entities.get(&id) {
        None => return rejected(snapshot, RejectionReason::MissingRef),
        Some(e) if e.removed => return rejected(snapshot, RejectionReason::RefRemoved),
        Some(_) => {}
    }

    let living: Vec<EntityId> = snapshot
        .living_children_of(id.as_str())
        .into_iter()
        .map(|e| e.id.clone())
        .collect();
    let living_set: HashSet<&EntityId> = living.iter().collect();
    let given: Vec<EntityId> = children.iter().map(|c| EntityId::new(c.as_str())).collect();
    let given_set: HashSet<&EntityId> = given.iter().collect();

    if given.len() != living.len() || living_set != given_set {
        return rejected(snapshot, RejectionReason::ReorderMismatch);
    }

    let mut next = snapshot.clone();
    let mut positions: Vec<usize> = next
        .creation_order
        .iter()
        .enumerate()
        .filter(|(_, eid)| living_set.contains(eid))
        .map(|(i, _)| i)
        .collect();
    positions.sort_unstable();
    let anchor = positions[0];
    // Remove from the back so earlier indices stay valid.
    for &i in positions.iter().rev() {
        next.creation_order.remove(i);
    }
    for (offset, child_id) in given.into_iter().enumerate() {
        next.creation_order.insert(anchor + offset, child_id);
    }
    (next, Outcome::Accepted)
}

fn reduce_rel_set(
    snapshot: &Snapshot,
    from: &str,
    to: &str,
    rel_type: &str,
    cardinality: Option<Cardinality>,
    data: &Value,
) -> (Snapshot, Outcome) {
    let from_id = EntityId::new(from);
    let to_id = EntityId::new(to);
    match snapshot.entities.get(&from_id) {
        None => return rejected(snapshot, RejectionReason::MissingRef),
        Some(e) if e.removed => return rejected(snapshot, RejectionReason::RefRemoved),
        Some(_) => {}
    }
    match snapshot.entities.get(&to_id) {
        None => return rejected(snapshot, RejectionReason::MissingRef),
        Some(e) if e.removed => return rejected(snapshot, RejectionReason::RefRemoved),
        Some(_) => {}
    }

    let mut next = snapshot.clone();
    // First-set wins: once recorded, the type's cardinality never
    // changes regardless of what a later `rel.set` asks for.
    let effective = *next
        .relationship_types
        .entry(rel_type.to_string())
        .or_insert(cardinality.unwrap_or(Cardinality::ManyToMany));

    match effective {
        Cardinality::ManyToOne => {
            next.relationships
                .retain(|r| !(r.from == from_id && r.rel_type == rel_type));
        }
        Cardinality::OneToOne => {
            next.relationships.retain(|r| {
                !((r.from == from_id || r.to == to_id) && r.rel_type == rel_type)
            });
        }
        Cardinality::ManyToMany => {
            // Replace an exact duplicate edge rather than stacking it.
            next.relationships
                .retain(|r| !(r.from == from_id && r.to == to_id && r.rel_type == rel_type));
        }
    }

    let seq = next.update_seq;
    next.relationships.push(Relationship {
        from: from_id,
        to: to_id,
        rel_type: rel_type.to_string(),
        data: data.clone(),
        seq,
    });
    next.update_seq += 1;
    (next, Outcome::Accepted)
}

fn reduce_rel_remove(snapshot: &Snapshot, from: &str, to: &str, rel_type: &str) -> (Snapshot, Outcome) {
    let from_id = EntityId::new(from);
    let to_id = EntityId::new(to);
    match snapshot.entities.get(&from_id) {
        None => return rejected(snapshot, RejectionReason::MissingRef),
        Some(e) if e.removed => return rejected(snapshot, RejectionReason::RefRemoved),
        Some(_) => {}
    }
    match snapshot.entities.get(&to_id) {
        None => return rejected(snapshot, RejectionReason::MissingRef),
        Some(e) if e.removed => return rejected(snapshot, RejectionReason::RefRemoved),
        Some(_) => {}
    }

    let mut next = snapshot.clone();
    next.relationships
        .retain(|r| !(r.from == from_id && r.to == to_id && r.rel_type == rel_type));
    (next, Outcome::Accepted)
}

/// Reposition `id` within `creation_order` so it lands at sibling index
/// `position` (clamped, or appended if `None`) among `parent`'s other
/// living children. Other entities' relative order is untouched.
fn reposition_sibling(
    creation_order: &mut Vec<EntityId>,
    entities: &std::collections::HashMap<EntityId, Entity>,
    id: &EntityId,
    parent: &str,
    position: Option<usize>,
) {
    let Some(cur) = creation_order.iter().position(|e| e == id) else {
        return;
    };
    let moved = creation_order.remove(cur);

    let sibling_positions: Vec<usize> = creation_order
        .iter()
        .enumerate()
        .filter(|(_, eid)| {
            entities
                .get(*eid)
                .map(|e| e.parent == parent && !e.removed)
                .unwrap_or(false)
        })
        .map(|(i, _)| i)
        .collect();

    let insert_at = match position {
        None => sibling_positions.last().map(|&i| i + 1).unwrap_or(creation_order.len()),
        Some(p) => {
            let clamped = p.min(sibling_positions.len());
            if clamped < sibling_positions.len() {
                sibling_positions[clamped]
            } else {
                sibling_positions.last().map(|&i| i + 1).unwrap_or(creation_order.len())
            }
        }
    };
    creation_order.insert(insert_at, moved);
}
