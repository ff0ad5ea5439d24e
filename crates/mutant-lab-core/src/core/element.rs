// crates/mutant-lab-core/src/core/element.rs
// ============================================================================
// Module: Mutant Lab Elements
// Description: The element record and its language-dependent display text.
// Purpose: Define the unit of combination stored in the inventory.
// Dependencies: serde, crate::core::identifiers
// ============================================================================

//! ## Overview
//! An [`Element`] pairs a stable [`ElementId`] with display text. Only the
//! text is language dependent; the id never changes after insertion.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ElementId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A discovered element.
///
/// # Invariants
/// - `id` is never rewritten once the element is in an inventory.
/// - `name` and `description` follow the active display language when a
///   translation exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Stable element identifier.
    pub id: ElementId,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
}

impl Element {
    /// Creates an element from an id and display text.
    #[must_use]
    pub fn new(id: ElementId, text: ElementText) -> Self {
        Self {
            id,
            name: text.name,
            description: text.description,
        }
    }

    /// Returns the display text of the element.
    #[must_use]
    pub fn text(&self) -> ElementText {
        ElementText {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Language-dependent display text for an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementText {
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
}

impl ElementText {
    /// Creates display text from a name and description.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}
