// crates/mutant-lab-core/src/runtime/mod.rs
// ============================================================================
// Module: Mutant Lab Runtime
// Description: Session host, persistence codec, and in-memory slot store.
// Purpose: Hold the current inventory and keep durable storage in step with it.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! Runtime modules own the mutable side of the lab: the [`Lab`] session holds
//! the current inventory, the selection tray and the in-flight synthesis
//! guard, and writes every change through an [`InventoryCodec`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod lab;
pub mod persistence;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use lab::Completion;
pub use lab::Lab;
pub use lab::LabError;
pub use lab::MAX_SELECTION;
pub use lab::MIN_SELECTION;
pub use lab::SynthesisTicket;
pub use persistence::DEFAULT_SLOT_KEY;
pub use persistence::InventoryCodec;
pub use persistence::MAX_SLOT_BYTES;
pub use store::InMemorySlotStore;
