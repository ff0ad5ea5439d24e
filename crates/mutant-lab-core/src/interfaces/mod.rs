// crates/mutant-lab-core/src/interfaces/mod.rs
// ============================================================================
// Module: Mutant Lab Interfaces
// Description: Backend-agnostic interfaces for durable storage and synthesis.
// Purpose: Define the contract surfaces the lab runtime depends on.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Mutant Lab reaches external systems without embedding
//! backend-specific details. A [`SlotStore`] persists one text document per
//! key; a [`Synthesizer`] turns a synthesis request into a validated record.
//! Implementations must fail closed on missing or invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::synthesis::SynthesisError;
use crate::core::synthesis::SynthesisRecord;
use crate::core::synthesis::SynthesisRequest;

// ============================================================================
// SECTION: Slot Store
// ============================================================================

/// Slot store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("slot store io error: {0}")]
    Io(String),
    /// Store backend reported an error.
    #[error("slot store error: {0}")]
    Store(String),
    /// Key or payload is invalid.
    #[error("slot store invalid data: {0}")]
    Invalid(String),
    /// Payload exceeds the store's size limit.
    #[error("slot payload exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload bytes.
        actual_bytes: usize,
    },
}

/// Durable key/value storage holding one text document per slot.
///
/// # Invariants
/// - `write` replaces the whole slot; readers never observe partial writes.
/// - `remove` on an absent slot succeeds.
pub trait SlotStore {
    /// Reads the slot, returning `None` when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrites the slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or the payload is too large.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot be updated.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S> SlotStore for &S
where
    S: SlotStore + ?Sized,
{
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

impl<S> SlotStore for Box<S>
where
    S: SlotStore + ?Sized,
{
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

// ============================================================================
// SECTION: Synthesizer
// ============================================================================

/// Generative backend producing a creature from selected elements.
///
/// One call is one attempt: implementations do not retry internally.
pub trait Synthesizer {
    /// Synthesizes a creature for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError`] when the backend is unreachable, refuses
    /// the request, or returns data that fails validation.
    fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisRecord, SynthesisError>;
}
