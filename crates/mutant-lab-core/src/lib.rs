// crates/mutant-lab-core/src/lib.rs
// ============================================================================
// Module: Mutant Lab Core Library
// Description: Public API surface for the Mutant Lab core.
// Purpose: Expose inventory types, interfaces, and the lab session runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Mutant Lab core owns the discovery inventory of an element-combining game:
//! the set of unlocked elements, their discovery order, and the rules for
//! adding user-authored and synthesized elements. Everything outside the
//! inventory (durable storage, the generative backend) is reached through the
//! traits in [`interfaces`], so hosts can plug in their own backends.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::SlotStore;
pub use interfaces::StoreError;
pub use interfaces::Synthesizer;
pub use runtime::Completion;
pub use runtime::DEFAULT_SLOT_KEY;
pub use runtime::InMemorySlotStore;
pub use runtime::InventoryCodec;
pub use runtime::Lab;
pub use runtime::LabError;
pub use runtime::MAX_SELECTION;
pub use runtime::MAX_SLOT_BYTES;
pub use runtime::MIN_SELECTION;
pub use runtime::SynthesisTicket;
