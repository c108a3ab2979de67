//! One-file-per-entry cache backend.
//!
//! Entries live at `<root>/entries/<fingerprint>.entry`. Each file starts
//! with a 4-byte little-endian header length, then a bincode header (magic
//! bytes, format version, owner kind, principal, creation time, section
//! lengths, and a SHA-256 checksum of the body), then the payload and the
//! optional secure payload. Reads are fail-safe: a file that is corrupt,
//! truncated, foreign, or written by another format version reads as a miss.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use geox_common::{DomainKind, Fingerprint};

use crate::error::CacheError;
use crate::store::{CacheBackend, CacheEntry, InsertOutcome};

/// Magic bytes identifying a geox cache entry.
const ENTRY_MAGIC: [u8; 4] = *b"GXCE";

/// Current entry format version. Increment on breaking changes to the header
/// or body layout.
const ENTRY_FORMAT_VERSION: u32 = 1;

/// Subdirectory holding entry files.
const ENTRIES_SUBDIR: &str = "entries";

/// File extension for entry files.
const ENTRY_EXT: &str = "entry";

/// Header prepended to every entry file for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryHeader {
    magic: [u8; 4],
    format_version: u32,
    fingerprint: [u8; 32],
    owner_kind: DomainKind,
    principal: String,
    created_at_ms: i64,
    payload_len: u64,
    secure_len: Option<u64>,
    checksum: [u8; 32],
}

/// Cache backend storing one validated file per fingerprint.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `root`, creating its directories.
    pub fn open(root: &Path) -> Result<Self, CacheError> {
        let store = Self {
            root: root.to_path_buf(),
        };
        let dir = store.entries_dir();
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::Io {
            path: dir,
            source: e,
        })?;
        Ok(store)
    }

    fn entries_dir(&self) -> PathBuf {
        self.root.join(ENTRIES_SUBDIR)
    }

    /// Returns the file path for an entry.
    pub fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.entries_dir().join(format!("{fingerprint}.{ENTRY_EXT}"))
    }

    fn encode_entry(entry: &CacheEntry) -> Result<Vec<u8>, CacheError> {
        let secure = entry.secure_payload.as_deref().unwrap_or_default();
        let header = EntryHeader {
            magic: ENTRY_MAGIC,
            format_version: ENTRY_FORMAT_VERSION,
            fingerprint: *entry.fingerprint.as_bytes(),
            owner_kind: entry.owner_kind,
            principal: entry.principal.clone(),
            created_at_ms: entry.created_at.timestamp_millis(),
            payload_len: entry.payload.len() as u64,
            secure_len: entry.secure_payload.as_ref().map(|s| s.len() as u64),
            checksum: body_checksum(entry.payload.as_bytes(), secure),
        };

        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(CacheError::codec)?;

        // 4-byte header length (little-endian) + header + payload + secure payload
        let header_len = header_bytes.len() as u32;
        let mut output =
            Vec::with_capacity(4 + header_bytes.len() + entry.payload.len() + secure.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(entry.payload.as_bytes());
        output.extend_from_slice(secure);
        Ok(output)
    }

    /// Parses and validates raw entry bytes.
    fn decode_entry(raw: &[u8], expected: &Fingerprint) -> Option<CacheEntry> {
        if raw.len() < 4 {
            return None;
        }
        let header_len = u32::from_le_bytes(raw[..4].try_into().ok()?) as usize;
        let body_start = 4usize.checked_add(header_len)?;
        if raw.len() < body_start {
            return None;
        }

        let header: EntryHeader =
            bincode::serde::decode_from_slice(&raw[4..body_start], bincode::config::standard())
                .ok()?
                .0;

        if header.magic != ENTRY_MAGIC || header.format_version != ENTRY_FORMAT_VERSION {
            return None;
        }
        if header.fingerprint != *expected.as_bytes() {
            return None;
        }

        let body = &raw[body_start..];
        let payload_len = usize::try_from(header.payload_len).ok()?;
        let secure_len = match header.secure_len {
            Some(n) => usize::try_from(n).ok()?,
            None => 0,
        };
        if body.len() != payload_len.checked_add(secure_len)? {
            return None;
        }
        let (payload, secure) = body.split_at(payload_len);
        if body_checksum(payload, secure) != header.checksum {
            return None;
        }

        Some(CacheEntry {
            fingerprint: *expected,
            owner_kind: header.owner_kind,
            principal: header.principal,
            created_at: DateTime::<Utc>::from_timestamp_millis(header.created_at_ms)?,
            payload: String::from_utf8(payload.to_vec()).ok()?,
            secure_payload: header.secure_len.map(|_| secure.to_vec()),
        })
    }
}

fn body_checksum(payload: &[u8], secure: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hasher.update(secure);
    hasher.finalize().into()
}

impl CacheBackend for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn fetch(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(fingerprint);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io { path, source: e }),
        };
        let entry = Self::decode_entry(&raw, fingerprint);
        if entry.is_none() {
            debug!(path = %path.display(), "ignoring invalid cache entry file");
        }
        Ok(entry)
    }

    fn insert(&self, entry: &CacheEntry) -> Result<InsertOutcome, CacheError> {
        let path = self.entry_path(&entry.fingerprint);
        if path.exists() {
            return Ok(InsertOutcome::AlreadyPresent);
        }
        let bytes = Self::encode_entry(entry)?;

        let dir = self.entries_dir();
        let io_err = |source: std::io::Error| CacheError::Io {
            path: dir.clone(),
            source,
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;

        match tmp.persist_noclobber(&path) {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                Ok(InsertOutcome::AlreadyPresent)
            }
            Err(e) => Err(CacheError::StoreWriteFailed {
                reason: format!("cannot persist {}: {}", path.display(), e.error),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::entry;

    fn make_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn write_with_header(store: &FileStore, fp: &Fingerprint, header: &EntryHeader, body: &[u8]) {
        let header_bytes =
            bincode::serde::encode_to_vec(header, bincode::config::standard()).unwrap();
        let mut output = Vec::new();
        output.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(body);
        std::fs::write(store.entry_path(fp), &output).unwrap();
    }

    fn valid_header(fp: &Fingerprint, body: &[u8]) -> EntryHeader {
        EntryHeader {
            magic: ENTRY_MAGIC,
            format_version: ENTRY_FORMAT_VERSION,
            fingerprint: *fp.as_bytes(),
            owner_kind: DomainKind::Economics,
            principal: "tester".to_string(),
            created_at_ms: 1_700_000_000_000,
            payload_len: body.len() as u64,
            secure_len: None,
            checksum: body_checksum(body, &[]),
        }
    }

    #[test]
    fn insert_and_fetch_roundtrip() {
        let (_dir, store) = make_store();
        let mut e = entry(1);
        e.secure_payload = Some(vec![9, 8, 7]);
        assert_eq!(store.insert(&e).unwrap(), InsertOutcome::Inserted);

        let back = store.fetch(&e.fingerprint).unwrap().unwrap();
        assert_eq!(back.payload, e.payload);
        assert_eq!(back.secure_payload, Some(vec![9, 8, 7]));
        assert_eq!(back.owner_kind, DomainKind::Economics);
        assert_eq!(back.principal, "tester");
        assert_eq!(
            back.created_at.timestamp_millis(),
            e.created_at.timestamp_millis()
        );
    }

    #[test]
    fn second_insert_keeps_first_writer() {
        let (_dir, store) = make_store();
        let first = entry(2);
        let mut second = entry(2);
        second.payload = "{\"late\":true}".to_string();
        assert_eq!(store.insert(&first).unwrap(), InsertOutcome::Inserted);
        assert_eq!(store.insert(&second).unwrap(), InsertOutcome::AlreadyPresent);
        assert_eq!(
            store.fetch(&first.fingerprint).unwrap().unwrap().payload,
            first.payload
        );
    }

    #[test]
    fn fetch_missing_returns_none() {
        let (_dir, store) = make_store();
        assert!(store.fetch(&entry(3).fingerprint).unwrap().is_none());
    }

    #[test]
    fn fetch_corrupt_data_returns_none() {
        let (_dir, store) = make_store();
        let fp = entry(4).fingerprint;
        std::fs::write(store.entry_path(&fp), b"garbage data").unwrap();
        assert!(store.fetch(&fp).unwrap().is_none());
    }

    #[test]
    fn fetch_truncated_header_returns_none() {
        let (_dir, store) = make_store();
        let fp = entry(5).fingerprint;
        std::fs::write(store.entry_path(&fp), b"GX").unwrap();
        assert!(store.fetch(&fp).unwrap().is_none());
    }

    #[test]
    fn fetch_wrong_magic_returns_none() {
        let (_dir, store) = make_store();
        let fp = entry(6).fingerprint;
        let mut header = valid_header(&fp, b"{}");
        header.magic = *b"BAAD";
        write_with_header(&store, &fp, &header, b"{}");
        assert!(store.fetch(&fp).unwrap().is_none());
    }

    #[test]
    fn fetch_wrong_version_returns_none() {
        let (_dir, store) = make_store();
        let fp = entry(7).fingerprint;
        let mut header = valid_header(&fp, b"{}");
        header.format_version = 999;
        write_with_header(&store, &fp, &header, b"{}");
        assert!(store.fetch(&fp).unwrap().is_none());
    }

    #[test]
    fn fetch_checksum_mismatch_returns_none() {
        let (_dir, store) = make_store();
        let fp = entry(8).fingerprint;
        let header = valid_header(&fp, b"{}");
        write_with_header(&store, &fp, &header, b"[]");
        assert!(store.fetch(&fp).unwrap().is_none());
    }

    #[test]
    fn fetch_foreign_fingerprint_returns_none() {
        let (_dir, store) = make_store();
        let fp = entry(9).fingerprint;
        let other = entry(10).fingerprint;
        let header = valid_header(&other, b"{}");
        write_with_header(&store, &fp, &header, b"{}");
        assert!(store.fetch(&fp).unwrap().is_none());
    }

    #[test]
    fn handcrafted_valid_file_is_read() {
        let (_dir, store) = make_store();
        let fp = entry(11).fingerprint;
        let header = valid_header(&fp, b"{}");
        write_with_header(&store, &fp, &header, b"{}");
        let back = store.fetch(&fp).unwrap().unwrap();
        assert_eq!(back.payload, "{}");
        assert!(back.secure_payload.is_none());
    }

    #[test]
    fn entry_path_format() {
        let (_dir, store) = make_store();
        let fp = entry(12).fingerprint;
        let path = store.entry_path(&fp);
        assert!(path.ends_with(format!("entries/{fp}.entry")));
    }
}
