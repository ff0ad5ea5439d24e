// crates/mutant-lab-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Slot Store
// Description: Durable SlotStore backend using SQLite.
// Purpose: Keep the Mutant Lab inventory across process restarts.
// Dependencies: mutant-lab-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`mutant_lab_core::SlotStore`]. Each
//! slot is one row keyed by name; writes replace the row in a single
//! transaction. Database contents are untrusted and size-checked on read.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteSlotStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
