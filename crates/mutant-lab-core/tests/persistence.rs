// crates/mutant-lab-core/tests/persistence.rs
// ============================================================================
// Module: Persistence Codec Tests
// Description: Tests for saving and loading the inventory document.
// Purpose: Validate round-trips and fail-closed handling of corrupt slots.
// Dependencies: mutant-lab-core
// ============================================================================
//! ## Overview
//! Corrupt, partial, or inconsistent documents must load as absent and be
//! removed from the slot. Store failures must never panic or propagate out
//! of the best-effort save path.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use mutant_lab_core::DEFAULT_SLOT_KEY;
use mutant_lab_core::InMemorySlotStore;
use mutant_lab_core::Inventory;
use mutant_lab_core::InventoryCodec;
use mutant_lab_core::Language;
use mutant_lab_core::SlotStore;
use mutant_lab_core::StoreError;
use serde_json::Value;
use serde_json::json;

mod common;
use crate::common::BrokenStore;
use crate::common::with_captured_logs;

fn codec_with(document: &str) -> InventoryCodec<InMemorySlotStore> {
    let store = InMemorySlotStore::new();
    store.write(DEFAULT_SLOT_KEY, document).unwrap();
    InventoryCodec::new(store)
}

#[test]
fn seed_save_load_round_trips() {
    let codec = InventoryCodec::new(InMemorySlotStore::new());
    let (inventory, _) =
        Inventory::seed(Language::Th).insert_user_element("Ember", "hot", 5).unwrap();
    codec.save(&inventory);
    assert_eq!(codec.load(), Some(inventory));
}

#[test]
fn document_uses_camel_case_layout() {
    let codec = InventoryCodec::new(InMemorySlotStore::new());
    codec.save(&Inventory::seed(Language::En));
    let raw = codec.store().read(DEFAULT_SLOT_KEY).unwrap().unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["discoveryOrder"][0], json!("fire"));
    assert_eq!(
        value["elements"]["fire"],
        json!({"id": "fire", "name": "Fire", "description": "Searing energy that consumes everything it touches."})
    );
    assert!(value.get("version").is_none());
}

#[test]
fn absent_slot_loads_as_none() {
    let codec = InventoryCodec::new(InMemorySlotStore::new());
    assert_eq!(codec.load(), None);
}

#[test]
fn corrupt_documents_are_discarded_and_cleared() {
    let element = json!({"id": "fire", "name": "Fire", "description": ""});
    let cases = vec![
        "not json".to_string(),
        "[]".to_string(),
        json!({"elements": {"fire": element}}).to_string(),
        json!({"discoveryOrder": ["fire"]}).to_string(),
        json!({"elements": {"fire": element}, "discoveryOrder": ["fire", "fire"]}).to_string(),
        json!({"elements": {"fire": element}, "discoveryOrder": ["fire", "water"]}).to_string(),
        json!({"elements": {"fire": element}, "discoveryOrder": []}).to_string(),
        json!({"elements": {"water": element}, "discoveryOrder": ["water"]}).to_string(),
        json!({"elements": {"fire": {"id": "fire"}}, "discoveryOrder": ["fire"]}).to_string(),
    ];
    for (index, case) in cases.iter().enumerate() {
        let codec = codec_with(case);
        assert_eq!(codec.load(), None, "case {index} should load as absent");
        assert_eq!(
            codec.store().read(DEFAULT_SLOT_KEY).unwrap(),
            None,
            "case {index} should clear the slot"
        );
    }
}

#[test]
fn corrupt_discard_is_logged() {
    let codec = codec_with("{");
    let (loaded, logs) = with_captured_logs(|| codec.load());
    assert_eq!(loaded, None);
    assert!(logs.contains("discarding corrupt inventory document"), "logs: {logs}");
    assert!(logs.contains(DEFAULT_SLOT_KEY), "logs: {logs}");
}

#[test]
fn unreadable_store_is_not_cleared() {
    let codec = InventoryCodec::new(BrokenStore::default());
    assert_eq!(codec.load(), None);
    assert_eq!(*codec.store().removals.lock().unwrap(), 0);
}

#[test]
fn save_failure_is_swallowed() {
    let codec = InventoryCodec::new(BrokenStore::default());
    let inventory = Inventory::seed(Language::En);
    assert!(matches!(codec.try_save(&inventory), Err(StoreError::Io(_))));
    let ((), logs) = with_captured_logs(|| codec.save(&inventory));
    assert!(logs.contains("failed to save inventory"), "logs: {logs}");
}

#[test]
fn oversized_payload_is_rejected_by_store() {
    let codec = InventoryCodec::new(InMemorySlotStore::with_limit(64));
    let err = codec.try_save(&Inventory::seed(Language::En)).unwrap_err();
    assert!(matches!(err, StoreError::TooLarge { max_bytes: 64, .. }));
    assert_eq!(codec.load(), None);
}

#[test]
fn custom_slot_key_is_isolated() {
    let store = InMemorySlotStore::new();
    let primary = InventoryCodec::new(store.clone());
    let secondary = InventoryCodec::with_slot_key(store, "otherSave");
    secondary.save(&Inventory::seed(Language::En));
    assert_eq!(primary.load(), None);
    assert!(secondary.load().is_some());
    secondary.clear();
    assert_eq!(secondary.load(), None);
}
