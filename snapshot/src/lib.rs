//! Pure entity-tree snapshot model (C1).
//!
//! A [`Snapshot`] is plain data with no I/O and no mutation helpers —
//! only transformations that return a new value. It is used
//! single-threaded per turn; invariant enforcement lives in the reducer
//! crate, not here.

mod entity;
mod relationship;
mod snapshot;

pub use entity::{Display, Entity, EntityId, ROOT};
pub use relationship::{Cardinality, Relationship};
pub use snapshot::{Meta, Snapshot};
