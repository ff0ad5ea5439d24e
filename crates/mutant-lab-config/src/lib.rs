// crates/mutant-lab-config/src/lib.rs
// ============================================================================
// Module: Mutant Lab Config Library
// Description: Configuration model for hosts embedding the lab.
// Purpose: Load, validate, and convert TOML configuration.
// Dependencies: mutant-lab-core, mutant-lab-providers, mutant-lab-store-sqlite
// ============================================================================

//! ## Overview
//! Hosts describe their slot store, synthesis backend, and default language
//! in one TOML file. [`MutantLabConfig::load`] reads it under strict limits
//! and validates every section before the host builds anything from it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::LocaleConfig;
pub use config::MutantLabConfig;
pub use config::StoreConfig;
pub use config::StoreType;
pub use config::SynthesisConfig;
