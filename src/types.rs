//! Core types for the content-addressed namespace.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of a content hash digest.
pub const HASH_LEN: usize = 32;

/// ContentHash: 256-bit digest naming one immutable blob.
///
/// The same hash always resolves to the same bytes for the lifetime of a
/// store; hashes are never reused for different content. Serialized and
/// logged as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; HASH_LEN]);

impl ContentHash {
    /// Compute the hash of a blob.
    pub fn of(blob: &[u8]) -> Self {
        ContentHash(*blake3::hash(blob).as_bytes())
    }

    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        ContentHash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Lowercase hex form, as used in serialized records and on disk.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Error parsing a hex digest into a [`ContentHash`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHashError(String);

impl fmt::Display for ParseHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid content hash: {}", self.0)
    }
}

impl std::error::Error for ParseHashError {}

impl FromStr for ContentHash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s).map_err(|e| ParseHashError(format!("{}: {}", s, e)))?;
        let bytes: [u8; HASH_LEN] = raw
            .try_into()
            .map_err(|_| ParseHashError(format!("{}: wrong length", s)))?;
        Ok(ContentHash(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_round_trips_through_hex() {
        let sum = ContentHash::of(b"some blob");
        let parsed: ContentHash = sum.to_hex().parse().unwrap();
        assert_eq!(sum, parsed);
    }

    #[test]
    fn test_same_bytes_same_hash() {
        assert_eq!(ContentHash::of(b"x"), ContentHash::of(b"x"));
        assert_ne!(ContentHash::of(b"x"), ContentHash::of(b"y"));
    }

    #[test]
    fn test_rejects_bad_hex() {
        assert!("not hex".parse::<ContentHash>().is_err());
        assert!("abcd".parse::<ContentHash>().is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let sum = ContentHash::of(b"blob");
        let json = serde_json::to_string(&sum).unwrap();
        assert_eq!(json, format!("\"{}\"", sum.to_hex()));
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(sum, back);
    }
}
