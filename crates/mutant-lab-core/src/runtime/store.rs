// crates/mutant-lab-core/src/runtime/store.rs
// ============================================================================
// Module: Mutant Lab In-Memory Slot Store
// Description: Process-local slot store for tests and embedding hosts.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemorySlotStore`] keeps slots in a shared map. Clones share the same
//! map, so a test can hand one clone to a lab and inspect another.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::interfaces::SlotStore;
use crate::interfaces::StoreError;
use crate::runtime::persistence::MAX_SLOT_BYTES;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory slot store.
#[derive(Debug, Clone)]
pub struct InMemorySlotStore {
    /// Slot map protected by a mutex.
    slots: Arc<Mutex<BTreeMap<String, String>>>,
    /// Maximum allowed payload size in bytes.
    max_value_bytes: usize,
}

impl Default for InMemorySlotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySlotStore {
    /// Creates an empty store with the default payload limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(MAX_SLOT_BYTES)
    }

    /// Creates an empty store with an explicit payload limit.
    #[must_use]
    pub fn with_limit(max_value_bytes: usize) -> Self {
        Self {
            slots: Arc::new(Mutex::new(BTreeMap::new())),
            max_value_bytes,
        }
    }
}

impl SlotStore for InMemorySlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let guard =
            self.slots.lock().map_err(|_| StoreError::Store("slot store mutex poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::Invalid("slot key must not be empty".to_string()));
        }
        if value.len() > self.max_value_bytes {
            return Err(StoreError::TooLarge {
                max_bytes: self.max_value_bytes,
                actual_bytes: value.len(),
            });
        }
        self.slots
            .lock()
            .map_err(|_| StoreError::Store("slot store mutex poisoned".to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.slots
            .lock()
            .map_err(|_| StoreError::Store("slot store mutex poisoned".to_string()))?
            .remove(key);
        Ok(())
    }
}
