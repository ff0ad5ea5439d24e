// crates/mutant-lab-core/src/core/collation.rs
// ============================================================================
// Module: Display Collation
// Description: Language-aware sort keys for element names.
// Purpose: Order the inventory projection the way a reader of the language expects.
// Dependencies: crate::core::language
// ============================================================================

//! ## Overview
//! Sort keys are case-folded. Thai writes five vowels (เ แ โ ใ ไ) before the
//! consonant they follow in speech, and dictionaries file words under that
//! consonant, so the Thai key swaps a leading vowel with the next consonant.
//! Tone marks keep their code point order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::language::Language;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Thai vowels written before their consonant (U+0E40..=U+0E44).
const THAI_LEADING_VOWELS: std::ops::RangeInclusive<char> = '\u{0E40}' ..= '\u{0E44}';
/// Thai consonants (U+0E01..=U+0E2E).
const THAI_CONSONANTS: std::ops::RangeInclusive<char> = '\u{0E01}' ..= '\u{0E2E}';

// ============================================================================
// SECTION: Sort Keys
// ============================================================================

/// Returns the sort key for `text` under `language`.
#[must_use]
pub fn sort_key(text: &str, language: Language) -> String {
    let folded = text.trim().to_lowercase();
    match language {
        Language::En => folded,
        Language::Th => reorder_thai_leading_vowels(&folded),
    }
}

/// Swaps each Thai leading vowel with the consonant that follows it.
fn reorder_thai_leading_vowels(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if THAI_LEADING_VOWELS.contains(&ch)
            && let Some(next) = chars.peek().copied()
            && THAI_CONSONANTS.contains(&next)
        {
            chars.next();
            out.push(next);
        }
        out.push(ch);
    }
    out
}
