// crates/mutant-lab-core/src/core/identifiers.rs
// ============================================================================
// Module: Mutant Lab Identifiers
// Description: Canonical opaque identifiers for inventory elements.
// Purpose: Provide a strongly typed, serializable ID with a stable string form.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Element identifiers are opaque strings. Built-in elements use stable slugs
//! (`fire`, `wolf-dna`), user-authored elements use `user-<stamp>`, and
//! synthesized creatures use a slug derived from their name. Uniqueness is
//! enforced by the inventory, not by this wrapper.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Borrow;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Element identifier, immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Creates a new element identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the identifier was issued for a user-authored element.
    #[must_use]
    pub fn is_user_authored(&self) -> bool {
        self.0.starts_with(USER_ID_PREFIX)
    }
}

/// Prefix for identifiers of user-authored elements.
pub(crate) const USER_ID_PREFIX: &str = "user-";

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
