// crates/mutant-lab-core/src/core/language.rs
// ============================================================================
// Module: Display Languages
// Description: Supported display languages and tag parsing.
// Purpose: Select element translations and the language of generated text.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Mutant Lab ships English and Thai. English is the fallback for any lookup
//! that has no entry in the requested language.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported display languages.
///
/// # Invariants
/// - Variants are stable for config parsing and catalog lookup.
/// - [`Language::En`] is the fallback language.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (fallback).
    #[default]
    En,
    /// Thai.
    Th,
}

impl Language {
    /// Language used when a translation is missing.
    pub const FALLBACK: Self = Self::En;

    /// Returns the canonical language tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Th => "th",
        }
    }

    /// Returns the English name of the language, as used in backend prompts.
    #[must_use]
    pub const fn english_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Th => "Thai",
        }
    }

    /// Parses a language tag (case-insensitive, tolerant of region subtags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "th" => Some(Self::Th),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of supported languages.
pub const SUPPORTED_LANGUAGES: &[Language] = &[Language::En, Language::Th];
