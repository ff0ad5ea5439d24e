// crates/mutant-lab-core/src/core/synthesis.rs
// ============================================================================
// Module: Synthesis Contract
// Description: Request and record types for creature synthesis, with boundary validation.
// Purpose: Turn untrusted backend JSON into strongly typed creature records.
// Dependencies: serde, serde_json, base64, thiserror, crate::core::language
// ============================================================================

//! ## Overview
//! A synthesis request names the selected elements plus two steering flags
//! (experiment type and gender) and the display language. The backend answers
//! with loosely typed JSON; [`CreatureDetails::from_json_text`] validates it
//! against the expected shape before anything reaches the inventory.
//! Security posture: backend output is untrusted and fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::language::Language;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Highest accepted danger level.
pub const MAX_DANGER_LEVEL: u8 = 100;

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// Creature archetype steering the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentType {
    /// Mutant (default).
    #[default]
    Mutant,
    /// Hero.
    Hero,
    /// God.
    God,
    /// Monster.
    Monster,
    /// Demon.
    Demon,
    /// Demi-human.
    DemiHuman,
}

impl ExperimentType {
    /// All experiment types in presentation order.
    pub const ALL: [Self; 6] =
        [Self::Mutant, Self::Hero, Self::God, Self::Monster, Self::Demon, Self::DemiHuman];

    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mutant => "mutant",
            Self::Hero => "hero",
            Self::God => "god",
            Self::Monster => "monster",
            Self::Demon => "demon",
            Self::DemiHuman => "demi-human",
        }
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creature gender steering the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male.
    Male,
    /// Female (default).
    #[default]
    Female,
}

impl Gender {
    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to synthesize a creature from selected elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Display names of the selected elements, in selection order.
    pub element_names: Vec<String>,
    /// Creature archetype.
    pub experiment: ExperimentType,
    /// Creature gender.
    pub gender: Gender,
    /// Language the generated text must use.
    pub language: Language,
}

// ============================================================================
// SECTION: Record Types
// ============================================================================

/// Validated creature text fields returned by the backend.
///
/// # Invariants
/// - `name` is non-empty and trimmed.
/// - `danger_level` is at most [`MAX_DANGER_LEVEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureDetails {
    /// Creature name.
    pub name: String,
    /// Lore summary.
    pub description: String,
    /// Abilities.
    pub abilities: Vec<String>,
    /// Weaknesses.
    pub weaknesses: Vec<String>,
    /// Natural habitat.
    pub habitat: String,
    /// Danger level, 0 to 100.
    pub danger_level: u8,
    /// Simulated health points.
    pub simulated_hp: u32,
    /// How the creature attacks.
    pub attack_pattern: String,
    /// What happens to a target that is hit.
    pub on_hit_effect: String,
    /// English prompt for the image generator.
    pub image_prompt: String,
}

impl CreatureDetails {
    /// Parses and validates the backend's JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::Malformed`] when the text is not a JSON
    /// object, a required field is missing or mistyped, or a number is out
    /// of range.
    pub fn from_json_text(text: &str) -> Result<Self, SynthesisError> {
        let value: Value = serde_json::from_str(text.trim())
            .map_err(|err| SynthesisError::Malformed(format!("response is not json: {err}")))?;
        Self::from_json(&value)
    }

    /// Validates an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::Malformed`] on any shape violation.
    pub fn from_json(value: &Value) -> Result<Self, SynthesisError> {
        let Value::Object(map) = value else {
            return Err(SynthesisError::Malformed("response must be a json object".to_string()));
        };
        let name = required_string(map, "name")?;
        if name.is_empty() {
            return Err(SynthesisError::Malformed("name must not be empty".to_string()));
        }
        let image_prompt = required_string(map, "imagePrompt")?;
        if image_prompt.is_empty() {
            return Err(SynthesisError::Malformed("imagePrompt must not be empty".to_string()));
        }
        let danger_level = required_integer(map, "dangerLevel")?;
        let danger_level = u8::try_from(danger_level)
            .ok()
            .filter(|level| *level <= MAX_DANGER_LEVEL)
            .ok_or_else(|| {
                SynthesisError::Malformed(format!(
                    "dangerLevel {danger_level} outside 0..={MAX_DANGER_LEVEL}"
                ))
            })?;
        let simulated_hp = required_integer(map, "simulatedHP")?;
        let simulated_hp = u32::try_from(simulated_hp).map_err(|_| {
            SynthesisError::Malformed(format!("simulatedHP {simulated_hp} out of range"))
        })?;
        Ok(Self {
            name,
            description: required_string(map, "description")?,
            abilities: required_string_list(map, "abilities")?,
            weaknesses: required_string_list(map, "weaknesses")?,
            habitat: required_string(map, "habitat")?,
            danger_level,
            simulated_hp,
            attack_pattern: required_string(map, "attackPattern")?,
            on_hit_effect: required_string(map, "onHitEffect")?,
            image_prompt,
        })
    }
}

/// Generated creature artwork.
#[derive(Clone, PartialEq, Eq)]
pub struct CreatureImage {
    /// Image MIME type (for example `image/jpeg`).
    pub mime_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl CreatureImage {
    /// Decodes a base64 image payload.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::Malformed`] when the payload is empty or not
    /// valid base64.
    pub fn from_base64(mime_type: impl Into<String>, encoded: &str) -> Result<Self, SynthesisError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|err| SynthesisError::Malformed(format!("image is not base64: {err}")))?;
        if bytes.is_empty() {
            return Err(SynthesisError::Malformed("image payload is empty".to_string()));
        }
        Ok(Self {
            mime_type: mime_type.into(),
            bytes,
        })
    }

    /// Returns the image as a `data:` URL for direct display.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for CreatureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatureImage")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// A complete synthesis result: validated text plus artwork.
///
/// Only `details.name` and `details.description` enter the inventory; the
/// rest is display-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRecord {
    /// Validated creature text fields.
    pub details: CreatureDetails,
    /// Generated artwork.
    pub image: CreatureImage,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Terminal failure of one synthesis attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// Network or client failure before a response arrived.
    #[error("synthesis transport error: {0}")]
    Transport(String),
    /// Upstream quota or rate limit exhausted.
    #[error("synthesis quota exceeded: {0}")]
    Quota(String),
    /// Upstream returned a non-success status.
    #[error("synthesis upstream error (status {status}): {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Upstream message, truncated.
        message: String,
    },
    /// Upstream response failed validation.
    #[error("malformed synthesis response: {0}")]
    Malformed(String),
    /// The request or client configuration is invalid.
    #[error("invalid synthesis configuration: {0}")]
    Config(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a required string field, trimmed.
fn required_string(map: &Map<String, Value>, field: &str) -> Result<String, SynthesisError> {
    match map.get(field) {
        Some(Value::String(value)) => Ok(value.trim().to_string()),
        Some(_) => Err(SynthesisError::Malformed(format!("{field} must be a string"))),
        None => Err(SynthesisError::Malformed(format!("missing field {field}"))),
    }
}

/// Reads a required array of strings.
fn required_string_list(
    map: &Map<String, Value>,
    field: &str,
) -> Result<Vec<String>, SynthesisError> {
    let Some(value) = map.get(field) else {
        return Err(SynthesisError::Malformed(format!("missing field {field}")));
    };
    let Value::Array(items) = value else {
        return Err(SynthesisError::Malformed(format!("{field} must be an array")));
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(text) => Ok(text.trim().to_string()),
            _ => Err(SynthesisError::Malformed(format!("{field} entries must be strings"))),
        })
        .collect()
}

/// Reads a required integer; integral floats such as `42.0` are accepted.
fn required_integer(map: &Map<String, Value>, field: &str) -> Result<i64, SynthesisError> {
    let Some(value) = map.get(field) else {
        return Err(SynthesisError::Malformed(format!("missing field {field}")));
    };
    let Value::Number(number) = value else {
        return Err(SynthesisError::Malformed(format!("{field} must be an integer")));
    };
    if let Some(integer) = number.as_i64() {
        return Ok(integer);
    }
    number
        .as_f64()
        .filter(|float| float.fract() == 0.0 && float.abs() < 9.0e15)
        .map(|float| {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Value is integral and below 2^53, so the cast is exact."
            )]
            let integer = float as i64;
            integer
        })
        .ok_or_else(|| SynthesisError::Malformed(format!("{field} must be an integer")))
}
