// crates/mutant-lab-core/src/core/mod.rs
// ============================================================================
// Module: Mutant Lab Core Types
// Description: Canonical element, inventory, and synthesis structures.
// Purpose: Provide stable, serializable types for the discovery inventory.
// Dependencies: serde, base64
// ============================================================================

//! ## Overview
//! Core types define elements, the inventory aggregate, the localization
//! catalog for built-in elements, and the synthesis request/record contract.
//! These types are the source of truth for the persisted document layout.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod collation;
pub mod element;
pub mod identifiers;
pub mod inventory;
pub mod language;
pub mod synthesis;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::BuiltinCatalog;
pub use catalog::ElementTranslations;
pub use catalog::STARTER_ELEMENT_IDS;
pub use element::Element;
pub use element::ElementText;
pub use identifiers::ElementId;
pub use inventory::CorruptInventoryError;
pub use inventory::Insertion;
pub use inventory::Inventory;
pub use inventory::InventoryError;
pub use inventory::MAX_DESCRIPTION_CHARS;
pub use inventory::MAX_NAME_CHARS;
pub use language::Language;
pub use language::SUPPORTED_LANGUAGES;
pub use synthesis::CreatureDetails;
pub use synthesis::CreatureImage;
pub use synthesis::ExperimentType;
pub use synthesis::Gender;
pub use synthesis::MAX_DANGER_LEVEL;
pub use synthesis::SynthesisError;
pub use synthesis::SynthesisRecord;
pub use synthesis::SynthesisRequest;
