//! Content fingerprints used as cache primary keys.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 256-bit content fingerprint of a domain object's inputs and code marker.
///
/// Two objects with the same `Fingerprint` are assumed to produce identical
/// outputs. Rendered and serialized as 64 lowercase hex characters, which is
/// also the form stored as the backing store's primary key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Wraps a finalized 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the fingerprint as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({}..)", hex::encode(&self.0[..4]))
    }
}

/// Error returned when a string is not a valid 64-character hex fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFingerprintError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseFingerprintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fingerprint: '{}'", self.input)
    }
}

impl std::error::Error for ParseFingerprintError {}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFingerprintError {
            input: s.to_string(),
        };
        let bytes = hex::decode(s.trim()).map_err(|_| err())?;
        let digest: [u8; 32] = bytes.try_into().map_err(|_| err())?;
        Ok(Self(digest))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Fingerprint {
        let mut digest = [0u8; 32];
        for (i, b) in digest.iter_mut().enumerate() {
            *b = i as u8 * 7;
        }
        Fingerprint::from_digest(digest)
    }

    #[test]
    fn display_is_64_hex_chars() {
        let s = sample().to_string();
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn parse_roundtrip() {
        let fp = sample();
        let parsed: Fingerprint = fp.to_hex().parse().unwrap();
        assert_eq!(parsed, fp);
    }

    #[test]
    fn display_matches_hex_encoding() {
        let fp = sample();
        assert_eq!(fp.to_string(), hex::encode(fp.as_bytes()));
        assert!(fp.to_string().starts_with("00070e15"));
        assert_eq!(format!("{fp:?}"), "Fingerprint(00070e15..)");
    }

    #[test]
    fn parse_rejects_short_input() {
        let err = "abcd".parse::<Fingerprint>().unwrap_err();
        assert_eq!(err.input, "abcd");
    }

    #[test]
    fn parse_rejects_non_hex() {
        let bad = "z".repeat(64);
        assert!(bad.parse::<Fingerprint>().is_err());
    }

    #[test]
    fn debug_abbreviated() {
        let s = format!("{:?}", sample());
        assert!(s.starts_with("Fingerprint("));
        assert!(s.ends_with("..)"));
    }

    #[test]
    fn serde_as_hex_string() {
        let fp = sample();
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{fp}\""));
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
    }
}
