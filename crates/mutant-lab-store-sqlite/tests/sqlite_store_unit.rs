// crates/mutant-lab-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Slot Store Unit Tests
// Description: Targeted tests for the SQLite slot store.
// Purpose: Validate path safety, schema versioning, size limits, and
//          durability across reopen.
// ============================================================================

//! ## Overview
//! Unit-level tests for `SQLite` slot store invariants:
//! - Path safety checks (empty/component/directory rejection)
//! - Schema version validation
//! - Size limits on write and on read
//! - Inventory persistence across store reopen

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
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;
use std::path::PathBuf;

use mutant_lab_core::ElementId;
use mutant_lab_core::InventoryCodec;
use mutant_lab_core::Lab;
use mutant_lab_core::Language;
use mutant_lab_core::SlotStore;
use mutant_lab_core::StoreError;
use mutant_lab_store_sqlite::SqliteSlotStore;
use mutant_lab_store_sqlite::SqliteStoreConfig;
use mutant_lab_store_sqlite::SqliteStoreError;
use mutant_lab_store_sqlite::SqliteStoreMode;
use mutant_lab_store_sqlite::SqliteSyncMode;
use proptest::prelude::*;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("lab").join("mutant-lab.sqlite")
}

fn store_for(path: &Path) -> SqliteSlotStore {
    SqliteSlotStore::new(SqliteStoreConfig::new(path)).unwrap()
}

// ============================================================================
// SECTION: Path Validation
// ============================================================================

#[test]
fn sqlite_store_rejects_directory_path() {
    let dir = TempDir::new().unwrap();
    let err = SqliteSlotStore::new(SqliteStoreConfig::new(dir.path())).unwrap_err();
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_empty_path() {
    let err = SqliteSlotStore::new(SqliteStoreConfig::new("")).unwrap_err();
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_overlong_component() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a".repeat(300)).join("store.sqlite");
    let err = SqliteSlotStore::new(SqliteStoreConfig::new(path)).unwrap_err();
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_zero_value_limit() {
    let dir = TempDir::new().unwrap();
    let config = SqliteStoreConfig {
        max_value_bytes: 0,
        ..SqliteStoreConfig::new(db_path(&dir))
    };
    assert!(matches!(SqliteSlotStore::new(config), Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn sqlite_store_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let store = store_for(&path);
    store.readiness().unwrap();
    assert!(path.exists());
}

// ============================================================================
// SECTION: Schema
// ============================================================================

#[test]
fn sqlite_store_rejects_unknown_schema_version() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    drop(store_for(&path));
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = ?1", params![99]).unwrap();
    drop(connection);

    let err = SqliteSlotStore::new(SqliteStoreConfig::new(&path)).unwrap_err();
    assert!(matches!(err, SqliteStoreError::VersionMismatch(_)));
}

// ============================================================================
// SECTION: Slots
// ============================================================================

#[test]
fn sqlite_store_read_missing_slot_returns_none() {
    let dir = TempDir::new().unwrap();
    let store = store_for(&db_path(&dir));
    assert_eq!(store.read("missing").unwrap(), None);
}

#[test]
fn sqlite_store_write_replaces_and_remove_deletes() {
    let dir = TempDir::new().unwrap();
    let store = store_for(&db_path(&dir));
    store.write("slot", "first").unwrap();
    store.write("slot", "second").unwrap();
    assert_eq!(store.read("slot").unwrap().as_deref(), Some("second"));
    store.remove("slot").unwrap();
    assert_eq!(store.read("slot").unwrap(), None);
    store.remove("slot").unwrap();
}

#[test]
fn sqlite_store_rejects_empty_key() {
    let dir = TempDir::new().unwrap();
    let store = store_for(&db_path(&dir));
    assert!(matches!(store.write("", "value"), Err(StoreError::Invalid(_))));
}

#[test]
fn sqlite_store_rejects_oversized_value_on_write() {
    let dir = TempDir::new().unwrap();
    let config = SqliteStoreConfig {
        max_value_bytes: 16,
        journal_mode: SqliteStoreMode::Delete,
        sync_mode: SqliteSyncMode::Normal,
        ..SqliteStoreConfig::new(db_path(&dir))
    };
    let store = SqliteSlotStore::new(config).unwrap();
    let err = store.write("slot", &"x".repeat(17)).unwrap_err();
    assert_eq!(
        err,
        StoreError::TooLarge {
            max_bytes: 16,
            actual_bytes: 17
        }
    );
    assert_eq!(store.read("slot").unwrap(), None);
}

#[test]
fn sqlite_store_rejects_oversized_value_on_read() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    drop(store_for(&path));
    let connection = Connection::open(&path).unwrap();
    connection
        .execute(
            "INSERT INTO slots (slot_key, value, updated_at) VALUES (?1, ?2, 0)",
            params!["slot", "y".repeat(64)],
        )
        .unwrap();
    drop(connection);

    let config = SqliteStoreConfig {
        max_value_bytes: 32,
        ..SqliteStoreConfig::new(&path)
    };
    let store = SqliteSlotStore::new(config).unwrap();
    let err = store.read_slot("slot").unwrap_err();
    assert_eq!(
        err,
        SqliteStoreError::TooLarge {
            max_bytes: 32,
            actual_bytes: 64
        }
    );
}

#[test]
fn sqlite_store_counts_utf8_bytes() {
    let dir = TempDir::new().unwrap();
    let config = SqliteStoreConfig {
        max_value_bytes: 8,
        ..SqliteStoreConfig::new(db_path(&dir))
    };
    let store = SqliteSlotStore::new(config).unwrap();
    // Each Thai character is three bytes in UTF-8.
    assert!(store.write("slot", "ไฟ").is_ok());
    assert!(matches!(store.write("slot", "ไฟไฟ"), Err(StoreError::TooLarge { .. })));
}

// ============================================================================
// SECTION: Durability
// ============================================================================

#[test]
fn inventory_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);

    let created = {
        let mut lab = Lab::open(InventoryCodec::new(store_for(&path)), Language::En);
        lab.create_element("Ember", "hot").unwrap()
    };

    let lab = Lab::open(InventoryCodec::new(store_for(&path)), Language::Th);
    assert_eq!(lab.inventory().get(&created).unwrap().name, "Ember");
    assert_eq!(lab.inventory().get(&ElementId::from("fire")).unwrap().name, "ไฟ");
}

#[test]
fn corrupt_row_is_cleared_on_load() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let store = store_for(&path);
    store.write(mutant_lab_core::DEFAULT_SLOT_KEY, "{\"elements\":").unwrap();

    let codec = InventoryCodec::new(store.clone());
    assert_eq!(codec.load(), None);
    assert_eq!(store.read(mutant_lab_core::DEFAULT_SLOT_KEY).unwrap(), None);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sqlite_store_round_trips_text(key in "[a-zA-Z0-9_-]{1,64}", value in "\\PC{0,256}") {
        let dir = TempDir::new().unwrap();
        let store = store_for(&db_path(&dir));
        store.write(&key, &value).unwrap();
        prop_assert_eq!(store.read(&key).unwrap(), Some(value));
    }
}
