//! SQLite cache backend.
//!
//! All entries live in one `objects` table keyed by fingerprint. Writes use
//! `INSERT OR IGNORE`, so an existing row is never touched and concurrent
//! first writers resolve to whichever commits first.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use geox_common::{DomainKind, Fingerprint};

use crate::error::CacheError;
use crate::store::{CacheBackend, CacheEntry, InsertOutcome};

const CREATE_OBJECTS: &str = r#"
CREATE TABLE IF NOT EXISTS objects (
    uniquekey TEXT PRIMARY KEY,
    class TEXT NOT NULL,
    principal TEXT NOT NULL,
    created_at TEXT NOT NULL,
    value TEXT NOT NULL,
    secure_value BLOB
);
"#;

/// Cache backend storing entries in a SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

type ObjectRow = (String, String, String, String, Option<Vec<u8>>);

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| CacheError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        let conn = Connection::open(path).map_err(CacheError::unavailable)?;
        Self::init(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory().map_err(CacheError::unavailable)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, CacheError> {
        conn.execute(CREATE_OBJECTS, [])
            .map_err(CacheError::unavailable)?;
        Ok(Self { conn })
    }
}

impl CacheBackend for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn fetch(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>, CacheError> {
        let row: Option<ObjectRow> = self
            .conn
            .query_row(
                "SELECT class, principal, created_at, value, secure_value FROM objects WHERE uniquekey = ?1",
                params![fingerprint.to_hex()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .optional()
            .map_err(CacheError::unavailable)?;

        let Some((class, principal, created_at, value, secure_value)) = row else {
            return Ok(None);
        };
        let Ok(owner_kind) = class.parse::<DomainKind>() else {
            debug!(%fingerprint, %class, "ignoring row with unknown class");
            return Ok(None);
        };
        let Ok(created_at) = DateTime::parse_from_rfc3339(&created_at) else {
            debug!(%fingerprint, "ignoring row with malformed timestamp");
            return Ok(None);
        };

        Ok(Some(CacheEntry {
            fingerprint: *fingerprint,
            owner_kind,
            principal,
            created_at: created_at.with_timezone(&Utc),
            payload: value,
            secure_payload: secure_value,
        }))
    }

    fn insert(&self, entry: &CacheEntry) -> Result<InsertOutcome, CacheError> {
        let changed = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO objects (uniquekey, class, principal, created_at, value, secure_value) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.fingerprint.to_hex(),
                    entry.owner_kind.as_str(),
                    entry.principal,
                    entry.created_at.to_rfc3339(),
                    entry.payload,
                    entry.secure_payload,
                ],
            )
            .map_err(|e| CacheError::StoreWriteFailed {
                reason: e.to_string(),
            })?;
        Ok(if changed == 0 {
            InsertOutcome::AlreadyPresent
        } else {
            InsertOutcome::Inserted
        })
    }
}
