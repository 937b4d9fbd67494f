//! Typed ID wrappers for aides, turns, sessions, entities, and users.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed IDs prevent mixing up an entity id with a turn id or a session
/// id. They are plain strings underneath — no UUID enforcement, no
/// format requirement.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(AideId, "Unique identifier for a living page (an aide).");
typed_id!(UserId, "Unique identifier for the end user who owns an aide.");
typed_id!(SessionId, "Unique identifier for a connected client session.");
typed_id!(TurnId, "Unique identifier for a turn, stable across escalation passes.");
