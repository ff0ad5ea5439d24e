// crates/mutant-lab-core/src/core/catalog.rs
// ============================================================================
// Module: Element Translation Catalog
// Description: Static name/description tables for built-in elements.
// Purpose: Resolve display text for starter elements in each language.
// Dependencies: Standard library collections, crate::core
// ============================================================================

//! ## Overview
//! Built-in elements carry translations in every supported language. The
//! catalog is pure data: lookups fall back to English, and ids absent from
//! the tables (user-authored or synthesized elements) resolve to `None`.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Every starter id has an English entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::core::element::ElementText;
use crate::core::identifiers::ElementId;
use crate::core::language::Language;

// ============================================================================
// SECTION: Starter Set
// ============================================================================

/// Element ids every fresh inventory starts with, in discovery order.
pub const STARTER_ELEMENT_IDS: &[&str] = &[
    "fire",
    "water",
    "earth",
    "air",
    "lightning",
    "ice",
    "metal",
    "poison",
    "shadow",
    "light",
    "human-dna",
    "wolf-dna",
    "spider-dna",
    "serpent-dna",
    "radiation",
    "nanobots",
];

// ============================================================================
// SECTION: Translation Source
// ============================================================================

/// Source of translated display text for element ids.
pub trait ElementTranslations {
    /// Returns the display text for `id` in `language`, if any is known.
    fn lookup(&self, id: &ElementId, language: Language) -> Option<ElementText>;
}

impl<F> ElementTranslations for F
where
    F: Fn(&ElementId, Language) -> Option<ElementText>,
{
    fn lookup(&self, id: &ElementId, language: Language) -> Option<ElementText> {
        self(id, language)
    }
}

/// Translation source backed by the built-in tables.
///
/// # Invariants
/// - Lookups try the requested language first, then [`Language::FALLBACK`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl ElementTranslations for BuiltinCatalog {
    fn lookup(&self, id: &ElementId, language: Language) -> Option<ElementText> {
        catalog_for(language)
            .get(id.as_str())
            .or_else(|| catalog_for(Language::FALLBACK).get(id.as_str()))
            .map(|(name, description)| ElementText::new(*name, *description))
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English element entries: `(id, name, description)`.
const CATALOG_EN: &[(&str, &str, &str)] = &[
    ("fire", "Fire", "Searing energy that consumes everything it touches."),
    ("water", "Water", "The adaptable fluid of life."),
    ("earth", "Earth", "Solid, fertile ground."),
    ("air", "Air", "An invisible but powerful current."),
    ("lightning", "Lightning", "Fast and violent electrical energy."),
    ("ice", "Ice", "Bitter cold that halts all motion."),
    ("metal", "Metal", "A hard material that shrugs off impact."),
    ("poison", "Poison", "A corrosive substance hostile to living tissue."),
    ("shadow", "Shadow", "Hidden, mysterious darkness."),
    ("light", "Light", "Pure radiance that drives back the dark."),
    ("human-dna", "Human DNA", "The adaptable genetic code of humankind."),
    ("wolf-dna", "Wolf DNA", "The genes of a fierce predator loyal to its pack."),
    ("spider-dna", "Spider DNA", "The genes of a patient weaver."),
    ("serpent-dna", "Serpent DNA", "The genes of a sinuous, venomous reptile."),
    ("radiation", "Radiation", "Invisible energy that warps genetic material."),
    ("nanobots", "Nanobots", "Tiny machines that repair and rewrite tissue."),
];

/// Thai element entries: `(id, name, description)`.
const CATALOG_TH: &[(&str, &str, &str)] = &[
    ("fire", "ไฟ", "พลังงานร้อนแรงที่เผาผลาญทุกสิ่งที่สัมผัส"),
    ("water", "น้ำ", "ของเหลวแห่งชีวิตที่ปรับตัวได้ทุกรูปแบบ"),
    ("earth", "ดิน", "ผืนดินที่มั่นคงและอุดมสมบูรณ์"),
    ("air", "ลม", "กระแสอากาศที่มองไม่เห็นแต่ทรงพลัง"),
    ("lightning", "สายฟ้า", "พลังงานไฟฟ้าที่รวดเร็วและรุนแรง"),
    ("ice", "น้ำแข็ง", "ความเย็นยะเยือกที่หยุดทุกการเคลื่อนไหว"),
    ("metal", "โลหะ", "วัสดุแข็งแกร่งที่ทนทานต่อแรงกระแทก"),
    ("poison", "พิษ", "สารอันตรายที่กัดกร่อนเนื้อเยื่อของสิ่งมีชีวิต"),
    ("shadow", "เงา", "ความมืดที่ซ่อนเร้นและลึกลับ"),
    ("light", "แสง", "ความสว่างบริสุทธิ์ที่ขับไล่ความมืด"),
    ("human-dna", "ดีเอ็นเอมนุษย์", "รหัสพันธุกรรมของมนุษย์ที่ปรับตัวเก่ง"),
    ("wolf-dna", "ดีเอ็นเอหมาป่า", "รหัสพันธุกรรมของนักล่าที่ดุร้ายและภักดีต่อฝูง"),
    ("spider-dna", "ดีเอ็นเอแมงมุม", "รหัสพันธุกรรมของนักถักใยผู้อดทน"),
    ("serpent-dna", "ดีเอ็นเองู", "รหัสพันธุกรรมของสัตว์เลื้อยคลานที่ลื่นไหลและมีพิษ"),
    ("radiation", "กัมมันตรังสี", "พลังงานที่มองไม่เห็นซึ่งบิดเบือนสารพันธุกรรม"),
    ("nanobots", "นาโนบอท", "หุ่นยนต์จิ๋วที่ซ่อมแซมและดัดแปลงเนื้อเยื่อได้"),
];

/// Lookup map from element id to `(name, description)`.
type CatalogMap = HashMap<&'static str, (&'static str, &'static str)>;

/// Returns the element table for the requested language.
fn catalog_for(language: Language) -> &'static CatalogMap {
    static CATALOG_EN_MAP: OnceLock<CatalogMap> = OnceLock::new();
    static CATALOG_TH_MAP: OnceLock<CatalogMap> = OnceLock::new();
    match language {
        Language::En => CATALOG_EN_MAP.get_or_init(|| build_map(CATALOG_EN)),
        Language::Th => CATALOG_TH_MAP.get_or_init(|| build_map(CATALOG_TH)),
    }
}

/// Builds a lookup map from a static entry table.
fn build_map(entries: &'static [(&'static str, &'static str, &'static str)]) -> CatalogMap {
    entries.iter().map(|(id, name, description)| (*id, (*name, *description))).collect()
}

/// Returns the element ids with an entry for `language`.
#[must_use]
pub fn catalog_ids(language: Language) -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = catalog_for(language).keys().copied().collect();
    ids.sort_unstable();
    ids
}
