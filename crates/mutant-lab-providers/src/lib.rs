// crates/mutant-lab-providers/src/lib.rs
// ============================================================================
// Module: Mutant Lab Providers
// Description: Generative backends implementing the synthesis contract.
// Purpose: Turn selected elements into creature records via remote models.
// Dependencies: mutant-lab-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! This crate ships the Gemini synthesizer: a blocking HTTP client that asks
//! a text model for creature details as schema-constrained JSON, then asks an
//! image model for artwork. Responses are untrusted; they are size-bounded,
//! validated into strongly typed records, and fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod gemini;
pub mod prompt;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gemini::DEFAULT_ENDPOINT;
pub use gemini::DEFAULT_IMAGE_MODEL;
pub use gemini::DEFAULT_TEXT_MODEL;
pub use gemini::GeminiConfig;
pub use gemini::GeminiSynthesizer;
