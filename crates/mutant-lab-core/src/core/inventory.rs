// crates/mutant-lab-core/src/core/inventory.rs
// ============================================================================
// Module: Discovery Inventory
// Description: The inventory aggregate and its invariant-preserving mutations.
// Purpose: Own the set of discovered elements and the order they were unlocked.
// Dependencies: serde, thiserror, crate::core
// ============================================================================

//! ## Overview
//! [`Inventory`] is an immutable snapshot. Every mutation returns a new value
//! (or borrows the input when nothing changed), which leaves "current state"
//! and persistence to the hosting layer.
//!
//! ## Invariants
//! - Every id in the discovery order has an element and vice versa, and the
//!   discovery order holds no duplicates.
//! - The discovery order only grows, by appending.
//! - Names are unique case-insensitively at the moment of insertion. A later
//!   relabel may produce a collision; that is accepted.
//! - Ids never change; relabel rewrites only name and description.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::catalog::BuiltinCatalog;
use crate::core::catalog::ElementTranslations;
use crate::core::catalog::STARTER_ELEMENT_IDS;
use crate::core::collation::sort_key;
use crate::core::element::Element;
use crate::core::element::ElementText;
use crate::core::identifiers::ElementId;
use crate::core::identifiers::USER_ID_PREFIX;
use crate::core::language::Language;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a user-authored element name, in characters.
pub const MAX_NAME_CHARS: usize = 50;
/// Maximum length of a user-authored element description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 150;
/// Id seed used when a synthesized name yields an empty slug.
const FALLBACK_SLUG: &str = "creature";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rejections from user-authored element creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// An element with the same name already exists (case-insensitive).
    #[error("an element named {name:?} already exists")]
    DuplicateName {
        /// The rejected name, trimmed.
        name: String,
    },
    /// The name is empty after trimming.
    #[error("element name must not be empty")]
    EmptyName,
    /// A field exceeds its length limit.
    #[error("element {field} is {actual} characters (max {max})")]
    TooLong {
        /// Field label.
        field: &'static str,
        /// Maximum allowed characters.
        max: usize,
        /// Actual characters.
        actual: usize,
    },
}

/// A persisted inventory document that violates the inventory invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("corrupt inventory document: {0}")]
pub struct CorruptInventoryError(pub String);

// ============================================================================
// SECTION: Inventory
// ============================================================================

/// The discovery inventory.
///
/// Serializes as `{ "elements": { id: element }, "discoveryOrder": [id] }`.
/// Deserialization validates the invariants and rejects documents that break
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "InventoryDocument")]
pub struct Inventory {
    /// Elements keyed by id.
    elements: BTreeMap<ElementId, Element>,
    /// Ids in the order they were discovered.
    discovery_order: Vec<ElementId>,
}

/// Result of folding a synthesized creature into the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion<'a> {
    /// The resulting inventory; borrowed when nothing was inserted.
    pub inventory: Cow<'a, Inventory>,
    /// Id of the inserted or matched element.
    pub id: ElementId,
    /// True when a new element was appended.
    pub is_new: bool,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            elements: BTreeMap::new(),
            discovery_order: Vec::new(),
        }
    }

    /// Builds the starter inventory with display text in `language`.
    #[must_use]
    pub fn seed(language: Language) -> Self {
        Self::seed_with(STARTER_ELEMENT_IDS, &BuiltinCatalog, language)
    }

    /// Builds an inventory from `starter_ids`, resolving text through `catalog`.
    ///
    /// Ids the catalog cannot resolve get a placeholder name (the id with
    /// separators replaced by spaces) and an empty description. Repeated ids
    /// are kept once, at their first position.
    #[must_use]
    pub fn seed_with<T>(starter_ids: &[&str], catalog: &T, language: Language) -> Self
    where
        T: ElementTranslations + ?Sized,
    {
        let mut inventory = Self::empty();
        for raw in starter_ids {
            let id = ElementId::new(*raw);
            if inventory.elements.contains_key(&id) {
                continue;
            }
            let text = catalog
                .lookup(&id, language)
                .or_else(|| catalog.lookup(&id, Language::FALLBACK))
                .unwrap_or_else(|| placeholder_text(&id));
            inventory.push(Element::new(id, text));
        }
        inventory
    }

    /// Returns the starter inventory, discarding all prior state.
    #[must_use]
    pub fn reset(language: Language) -> Self {
        Self::seed(language)
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.discovery_order.len()
    }

    /// Returns true when the inventory has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.discovery_order.is_empty()
    }

    /// Returns the element with the given id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Returns true when an element with the given id exists.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Returns ids in discovery order.
    #[must_use]
    pub fn discovery_order(&self) -> &[ElementId] {
        &self.discovery_order
    }

    /// Iterates elements in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.discovery_order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Returns the first element whose trimmed name matches `name`
    /// case-insensitively. Inner whitespace is compared as written.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Element> {
        let key = user_name_key(name);
        self.iter().find(|element| user_name_key(&element.name) == key)
    }

    /// Returns the first element matching `name` under [`name_key`].
    fn find_by_name_key(&self, name: &str) -> Option<&Element> {
        let key = name_key(name);
        self.iter().find(|element| name_key(&element.name) == key)
    }

    /// Rewrites element text to follow `language`.
    ///
    /// Elements whose translated name differs from the current one take the
    /// translated name and description; untranslated elements are left alone.
    /// Returns the input borrowed when nothing changed, so repeated calls
    /// with the same language are no-ops.
    #[must_use]
    pub fn relabel<'a, T>(&'a self, language: Language, resolver: &T) -> Cow<'a, Self>
    where
        T: ElementTranslations + ?Sized,
    {
        let mut relabeled: Option<Self> = None;
        for (id, element) in &self.elements {
            let Some(text) = resolver.lookup(id, language) else {
                continue;
            };
            if text.name == element.name {
                continue;
            }
            let next = relabeled.get_or_insert_with(|| self.clone());
            if let Some(slot) = next.elements.get_mut(id) {
                slot.name = text.name;
                slot.description = text.description;
            }
        }
        relabeled.map_or(Cow::Borrowed(self), Cow::Owned)
    }

    /// Adds a user-authored element.
    ///
    /// Both fields are trimmed. The new id is `user-<stamp>`; when that id is
    /// taken the stamp is bumped until a free id is found.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::DuplicateName`] when an existing element has
    /// the same name case-insensitively, and [`InventoryError::EmptyName`] or
    /// [`InventoryError::TooLong`] for invalid input. The inventory is never
    /// modified on error.
    pub fn insert_user_element(
        &self,
        name: &str,
        description: &str,
        stamp: u64,
    ) -> Result<(Self, ElementId), InventoryError> {
        let name = name.trim();
        let description = description.trim();
        if name.is_empty() {
            return Err(InventoryError::EmptyName);
        }
        check_length("name", name, MAX_NAME_CHARS)?;
        check_length("description", description, MAX_DESCRIPTION_CHARS)?;
        if self.find_by_name(name).is_some() {
            return Err(InventoryError::DuplicateName {
                name: name.to_string(),
            });
        }

        let mut stamp = stamp;
        let id = loop {
            let candidate = ElementId::new(format!("{USER_ID_PREFIX}{stamp}"));
            if !self.elements.contains_key(&candidate) {
                break candidate;
            }
            stamp = stamp.wrapping_add(1);
        };

        let mut next = self.clone();
        next.push(Element::new(id.clone(), ElementText::new(name, description)));
        Ok((next, id))
    }

    /// Folds a synthesized creature into the inventory.
    ///
    /// Creatures are identified by normalized name: a second synthesis of the
    /// same name (any case or spacing) converges on the existing element. New
    /// creatures get an id derived from the name; if that id is already used
    /// by a differently named element, a numeric suffix is appended.
    #[must_use]
    pub fn insert_synthesized_element(&self, name: &str, description: &str) -> Insertion<'_> {
        let name = name.trim();
        if let Some(existing) = self.find_by_name_key(name) {
            return Insertion {
                inventory: Cow::Borrowed(self),
                id: existing.id.clone(),
                is_new: false,
            };
        }

        let mut seed = derive_slug(name);
        if seed.is_empty() {
            seed = FALLBACK_SLUG.to_string();
        }
        let mut id = ElementId::new(seed.clone());
        let mut suffix: u64 = 2;
        while self.elements.contains_key(&id) {
            id = ElementId::new(format!("{seed}-{suffix}"));
            suffix = suffix.saturating_add(1);
        }

        let mut next = self.clone();
        next.push(Element::new(id.clone(), ElementText::new(name, description.trim())));
        Insertion {
            inventory: Cow::Owned(next),
            id,
            is_new: true,
        }
    }

    /// Returns elements ordered for display in `language`.
    ///
    /// Elements are sorted by a language-aware name key, ties broken by id.
    /// A non-empty `filter` keeps names containing it case-insensitively.
    #[must_use]
    pub fn display_order(&self, language: Language, filter: Option<&str>) -> Vec<&Element> {
        let needle = filter.map(str::to_lowercase).filter(|needle| !needle.is_empty());
        let mut keyed: Vec<(String, &Element)> = self
            .iter()
            .filter(|element| {
                needle.as_ref().is_none_or(|needle| element.name.to_lowercase().contains(needle))
            })
            .map(|element| (sort_key(&element.name, language), element))
            .collect();
        keyed.sort_by(|(key_a, a), (key_b, b)| key_a.cmp(key_b).then_with(|| a.id.cmp(&b.id)));
        keyed.into_iter().map(|(_, element)| element).collect()
    }

    /// Appends an element whose id is known to be free.
    fn push(&mut self, element: Element) {
        self.discovery_order.push(element.id.clone());
        self.elements.insert(element.id.clone(), element);
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// SECTION: Persisted Document
// ============================================================================

/// Wire shape of a persisted inventory, validated into [`Inventory`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryDocument {
    /// Elements keyed by id.
    elements: BTreeMap<String, Element>,
    /// Ids in discovery order.
    discovery_order: Vec<ElementId>,
}

impl TryFrom<InventoryDocument> for Inventory {
    type Error = CorruptInventoryError;

    fn try_from(document: InventoryDocument) -> Result<Self, Self::Error> {
        let mut elements = BTreeMap::new();
        for (key, element) in document.elements {
            if key != element.id.as_str() {
                return Err(CorruptInventoryError(format!(
                    "element key {key:?} does not match id {:?}",
                    element.id.as_str()
                )));
            }
            elements.insert(element.id.clone(), element);
        }
        let mut seen = BTreeSet::new();
        for id in &document.discovery_order {
            if !seen.insert(id) {
                return Err(CorruptInventoryError(format!("id {:?} discovered twice", id.as_str())));
            }
            if !elements.contains_key(id) {
                return Err(CorruptInventoryError(format!("discovered id {:?} has no element", id.as_str())));
            }
        }
        if seen.len() != elements.len() {
            return Err(CorruptInventoryError(
                "elements missing from discovery order".to_string(),
            ));
        }
        Ok(Self {
            elements,
            discovery_order: document.discovery_order,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the comparison key for user-authored names: trimmed, lowercased.
pub(crate) fn user_name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Returns the comparison key for synthesized names: trimmed, whitespace
/// collapsed, lowercased.
pub(crate) fn name_key(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Derives an id slug from a creature name.
///
/// Lowercases, turns whitespace runs into a single `-`, and drops characters
/// outside `[a-z0-9_-]`. Names without Latin letters or digits yield an empty
/// slug.
pub(crate) fn derive_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.trim().chars() {
        if ch.is_whitespace() {
            pending_separator = true;
            continue;
        }
        for lower in ch.to_lowercase() {
            if !(lower.is_ascii_alphanumeric() || lower == '_' || lower == '-') {
                continue;
            }
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(lower);
        }
    }
    slug
}

/// Placeholder text for ids without any translation.
fn placeholder_text(id: &ElementId) -> ElementText {
    ElementText::new(id.as_str().replace(['-', '_'], " "), String::new())
}

/// Rejects values longer than `max` characters.
fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), InventoryError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(InventoryError::TooLong {
            field,
            max,
            actual,
        });
    }
    Ok(())
}
