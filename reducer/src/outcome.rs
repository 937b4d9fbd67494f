//! The closed set of rejection reasons and the reducer's outcome type
//! (spec §4.2).

use serde::{Deserialize, Serialize};

/// Why the reducer rejected an operation. Closed set per spec §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RejectionReason {
    /// The `t` tag did not match a known operation or signal.
    UnknownType,
    /// The line decoded as JSON but was missing required fields or had
    /// a value of the wrong shape for its declared type.
    MalformedPayload,
    /// `entity.create`'s `parent` is neither `"root"` nor an existing
    /// non-removed entity.
    MissingParent,
    /// `entity.create`'s `id` is already in use by a non-removed entity.
    DuplicateId,
    /// A referenced id does not exist at all.
    MissingRef,
    /// A referenced id exists but is tombstoned.
    RefRemoved,
    /// `entity.move`'s new parent is a descendant of the moved entity.
    CyclicMove,
    /// `entity.reorder`'s child list is not exactly the set of living
    /// children.
    ReorderMismatch,
    /// A `rel.set` cardinality conflicts with the type's first-recorded
    /// cardinality in a way that can't be resolved by edge replacement.
    CardinalityClash,
    /// Any other invariant violation not covered by a more specific
    /// reason above.
    InvariantViolation,
}

/// The result of reducing one operation against one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// The operation was applied; the returned snapshot reflects it.
    Accepted,
    /// The operation was not applied; the returned snapshot is
    /// unchanged.
    Rejected {
        /// Why.
        reason: RejectionReason,
    },
}

impl Outcome {
    /// Whether this outcome is `Accepted`.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }

    /// The rejection reason, if rejected.
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            Outcome::Rejected { reason } => Some(*reason),
            Outcome::Accepted => None,
        }
    }
}
