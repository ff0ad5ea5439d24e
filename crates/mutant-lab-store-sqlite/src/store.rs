// crates/mutant-lab-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Slot Store
// Description: Durable SlotStore backed by a single SQLite table.
// Purpose: Persist named text slots with bounded payload sizes.
// Dependencies: mutant-lab-core, rusqlite, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! This module implements a durable [`SlotStore`] using `SQLite`. Slots live
//! in one table keyed by name; a write replaces the whole row. Reads check
//! the stored size before materializing the payload so an oversized row
//! cannot be pulled into memory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use mutant_lab_core::MAX_SLOT_BYTES;
use mutant_lab_core::SlotStore;
use mutant_lab_core::StoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum slot key length in bytes.
const MAX_SLOT_KEY_LENGTH: usize = 256;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode.
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode.
    #[default]
    Full,
    /// Normal synchronous mode.
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` slot store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `max_value_bytes` is greater than zero and at most [`MAX_SLOT_BYTES`].
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Maximum slot payload size in bytes.
    #[serde(default = "default_max_value_bytes")]
    pub max_value_bytes: usize,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default settings.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_value_bytes: default_max_value_bytes(),
        }
    }
}

/// Returns the default busy timeout in milliseconds.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default slot payload limit.
const fn default_max_value_bytes() -> usize {
    MAX_SLOT_BYTES
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` slot store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid configuration, key, or stored data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Payload exceeded the configured size limit.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::VersionMismatch(message) => {
                Self::Store(format!("version mismatch: {message}"))
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::TooLarge {
                max_bytes,
                actual_bytes,
            },
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed slot store.
///
/// Clones share one connection.
#[derive(Debug, Clone)]
pub struct SqliteSlotStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Connection guarded for serialized access.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteSlotStore {
    /// Opens an `SQLite`-backed slot store, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path or limits are invalid, or
    /// the database cannot be opened or initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        validate_limits(&config)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        tracing::debug!(path = %config.path.display(), "sqlite slot store opened");
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Verifies the store can execute a simple SQL statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database is unavailable.
    pub fn readiness(&self) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .query_row("SELECT 1", params![], |row| row.get::<_, i64>(0))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Reads a slot.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails or the stored value
    /// exceeds `max_value_bytes`.
    pub fn read_slot(&self, key: &str) -> Result<Option<String>, SqliteStoreError> {
        validate_key(key)?;
        let max_bytes = i64::try_from(self.config.max_value_bytes)
            .map_err(|_| SqliteStoreError::Invalid("max_value_bytes out of range".to_string()))?;
        let row: Option<(i64, Option<String>)> = {
            let guard = self.lock()?;
            guard
                .query_row(
                    "SELECT length(CAST(value AS BLOB)),
                            CASE WHEN length(CAST(value AS BLOB)) <= ?2 THEN value END
                     FROM slots WHERE slot_key = ?1",
                    params![key, max_bytes],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?
        };
        let Some((stored_bytes, value)) = row else {
            return Ok(None);
        };
        match value {
            Some(value) => Ok(Some(value)),
            None => Err(SqliteStoreError::TooLarge {
                max_bytes: self.config.max_value_bytes,
                actual_bytes: usize::try_from(stored_bytes).unwrap_or(usize::MAX),
            }),
        }
    }

    /// Replaces a slot.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the key is invalid, the value is too
    /// large, or the write fails.
    pub fn write_slot(&self, key: &str, value: &str) -> Result<(), SqliteStoreError> {
        validate_key(key)?;
        if value.len() > self.config.max_value_bytes {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: self.config.max_value_bytes,
                actual_bytes: value.len(),
            });
        }
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.execute(
            "INSERT INTO slots (slot_key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(slot_key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
            params![key, value, unix_millis()],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(())
    }

    /// Deletes a slot. Absent slots are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the delete fails.
    pub fn remove_slot(&self, key: &str) -> Result<(), SqliteStoreError> {
        validate_key(key)?;
        let guard = self.lock()?;
        guard
            .execute("DELETE FROM slots WHERE slot_key = ?1", params![key])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(())
    }

    /// Acquires the connection lock.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("sqlite connection mutex poisoned".to_string()))
    }
}

impl SlotStore for SqliteSlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.read_slot(key).map_err(StoreError::from)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write_slot(key, value).map_err(StoreError::from)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_slot(key).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Validates configured size limits.
fn validate_limits(config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    if config.max_value_bytes == 0 || config.max_value_bytes > MAX_SLOT_BYTES {
        return Err(SqliteStoreError::Invalid(format!(
            "max_value_bytes must be between 1 and {MAX_SLOT_BYTES}"
        )));
    }
    Ok(())
}

/// Validates a slot key.
fn validate_key(key: &str) -> Result<(), SqliteStoreError> {
    if key.is_empty() {
        return Err(SqliteStoreError::Invalid("slot key must not be empty".to_string()));
    }
    if key.len() > MAX_SLOT_KEY_LENGTH {
        return Err(SqliteStoreError::Invalid(format!(
            "slot key exceeds {MAX_SLOT_KEY_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS slots (
                    slot_key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Milliseconds since the Unix epoch for `updated_at`.
fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
