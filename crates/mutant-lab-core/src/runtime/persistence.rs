// crates/mutant-lab-core/src/runtime/persistence.rs
// ============================================================================
// Module: Inventory Persistence Codec
// Description: JSON encoding of the inventory into a single durable slot.
// Purpose: Save and restore the inventory, discarding corrupt documents.
// Dependencies: serde_json, tracing, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The inventory lives in one slot as
//! `{ "elements": { id: element }, "discoveryOrder": [id] }`. Loading is
//! forgiving: anything that fails to decode or breaks the inventory
//! invariants is logged, removed from the slot, and reported as absent so the
//! caller reseeds. Saving is best-effort; the in-memory inventory stays
//! authoritative when a write fails.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::inventory::Inventory;
use crate::interfaces::SlotStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Slot key used when none is configured.
pub const DEFAULT_SLOT_KEY: &str = "mutantLabSaveData";
/// Maximum encoded inventory size in bytes (5 MiB).
pub const MAX_SLOT_BYTES: usize = 5 * 1024 * 1024;

// ============================================================================
// SECTION: Codec
// ============================================================================

/// Reads and writes the inventory document in one named slot.
#[derive(Debug, Clone)]
pub struct InventoryCodec<S> {
    /// Backing slot store.
    store: S,
    /// Slot key holding the document.
    slot_key: String,
}

impl<S: SlotStore> InventoryCodec<S> {
    /// Creates a codec over the default slot.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_slot_key(store, DEFAULT_SLOT_KEY)
    }

    /// Creates a codec over a named slot.
    #[must_use]
    pub fn with_slot_key(store: S, slot_key: impl Into<String>) -> Self {
        Self {
            store,
            slot_key: slot_key.into(),
        }
    }

    /// Returns the slot key.
    #[must_use]
    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Encodes and writes the inventory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when encoding fails, the document exceeds
    /// [`MAX_SLOT_BYTES`], or the store rejects the write.
    pub fn try_save(&self, inventory: &Inventory) -> Result<(), StoreError> {
        let encoded =
            serde_json::to_string(inventory).map_err(|err| StoreError::Invalid(err.to_string()))?;
        if encoded.len() > MAX_SLOT_BYTES {
            return Err(StoreError::TooLarge {
                max_bytes: MAX_SLOT_BYTES,
                actual_bytes: encoded.len(),
            });
        }
        self.store.write(&self.slot_key, &encoded)
    }

    /// Writes the inventory, logging and swallowing any failure.
    pub fn save(&self, inventory: &Inventory) {
        if let Err(err) = self.try_save(inventory) {
            tracing::warn!(
                slot = %self.slot_key,
                elements = inventory.len(),
                error = %err,
                "failed to save inventory"
            );
        }
    }

    /// Loads the inventory.
    ///
    /// Returns `None` when the slot is absent, unreadable, or corrupt. Corrupt
    /// documents are removed from the slot; an unreadable store is left
    /// untouched.
    #[must_use]
    pub fn load(&self) -> Option<Inventory> {
        let raw = match self.store.read(&self.slot_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(slot = %self.slot_key, error = %err, "failed to read inventory slot");
                return None;
            }
        };
        match serde_json::from_str::<Inventory>(&raw) {
            Ok(inventory) => Some(inventory),
            Err(err) => {
                tracing::warn!(
                    slot = %self.slot_key,
                    error = %err,
                    "discarding corrupt inventory document"
                );
                self.clear();
                None
            }
        }
    }

    /// Removes the slot, logging any failure.
    pub fn clear(&self) {
        if let Err(err) = self.store.remove(&self.slot_key) {
            tracing::warn!(slot = %self.slot_key, error = %err, "failed to clear inventory slot");
        }
    }
}
