//! Key material and the encrypt-then-compress payload wrapper.
//!
//! A sealed payload is `zlib(nonce || AES-256-GCM(payload))` with a fresh
//! random 96-bit nonce per seal. The key is a single 256-bit secret stored as
//! hex in a key file, created once and shared by every process using the
//! same cache.

use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use rand::RngCore;
use tracing::{debug, info};

use crate::error::CacheError;

/// Length of the AES-GCM nonce prefixed to every ciphertext.
const NONCE_LEN: usize = 12;

/// A 256-bit symmetric secret.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    key: [u8; 32],
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(..)")
    }
}

impl KeyMaterial {
    /// Generates a fresh random key.
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Parses a hex-encoded key file body.
    pub fn from_hex(path: &Path, text: &str) -> Result<Self, CacheError> {
        let fail = |reason: String| CacheError::KeyProvisioningFailed {
            path: path.to_path_buf(),
            reason,
        };
        let bytes = hex::decode(text.trim()).map_err(|e| fail(e.to_string()))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| fail(format!("expected 32 key bytes, found {}", b.len())))?;
        Ok(Self { key })
    }

    /// Reads the key at `path` without ever creating it.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CacheError::KeyProvisioningFailed {
                path: path.to_path_buf(),
                reason: "key material not found".to_string(),
            },
            _ => provisioning(path, e),
        })?;
        Self::from_hex(path, &text)
    }

    /// Reads the key at `path`, creating it first if absent.
    ///
    /// Creation writes a temporary file and persists it without clobbering,
    /// so when several processes race the first one wins and the others read
    /// its key.
    pub fn load_or_create(path: &Path) -> Result<Self, CacheError> {
        match std::fs::read_to_string(path) {
            Ok(text) => return Self::from_hex(path, &text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(provisioning(path, e)),
        }

        let dir = key_dir(path);
        std::fs::create_dir_all(&dir).map_err(|e| provisioning(path, e))?;
        let key = Self::generate();
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| provisioning(path, e))?;
        tmp.write_all(hex::encode(key.key).as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|e| provisioning(path, e))?;

        match tmp.persist_noclobber(path) {
            Ok(_) => {
                info!(path = %path.display(), "created cache key material");
                Ok(key)
            }
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "key material created concurrently, reusing it");
                let text = std::fs::read_to_string(path).map_err(|e| provisioning(path, e))?;
                Self::from_hex(path, &text)
            }
            Err(e) => Err(provisioning(path, e.error)),
        }
    }

    /// Encrypts then compresses `payload`.
    pub fn seal(&self, payload: &[u8]) -> Result<Vec<u8>, CacheError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, payload)
            .map_err(|e| CacheError::codec(format!("encryption failed: {e}")))?;

        let mut framed = nonce.to_vec();
        framed.extend_from_slice(&ciphertext);

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&framed).map_err(CacheError::codec)?;
        encoder.finish().map_err(CacheError::codec)
    }

    /// Decompresses then decrypts a sealed payload.
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CacheError> {
        let mut framed = Vec::new();
        ZlibDecoder::new(sealed)
            .read_to_end(&mut framed)
            .map_err(CacheError::codec)?;
        if framed.len() < NONCE_LEN {
            return Err(CacheError::codec("sealed payload too short"));
        }
        let (nonce, ciphertext) = framed.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CacheError::codec("decryption failed (wrong key or corrupt payload)"))
    }
}

fn key_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn provisioning(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::KeyProvisioningFailed {
        path: path.to_path_buf(),
        reason: source.to_string(),
    }
}
