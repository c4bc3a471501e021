//! File metadata records
//!
//! Immutable, content-addressed descriptions of one logical file. A record is
//! never mutated in place; a changed file produces a new record under a new
//! hash, logically superseding the old one. The old blob may remain in the
//! store indefinitely.

use crate::error::RecordError;
use crate::types::ContentHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One chunk of file content, addressed by hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk within the file.
    pub index: u64,
    /// Content hash of the chunk bytes.
    pub sum: ContentHash,
}

/// Metadata record for one logical file at the time it was last written.
///
/// `path` is the logical identity used for namespace placement. Serialized as
/// self-describing JSON; see [`FileRecord::from_bytes`] for the validation
/// applied before a record is allowed to mutate the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Full path of the file, slash-separated.
    pub path: String,
    /// Size of the file content in bytes.
    pub size: u64,
    /// Last-modified time. A missing field deserializes to the epoch, which
    /// validation rejects as unset.
    #[serde(default = "unix_epoch")]
    pub modified: DateTime<Utc>,
    /// Content hashes needed to reconstruct the file data, in order.
    #[serde(default)]
    pub chunks: Vec<Chunk>,
}

impl FileRecord {
    /// Deserialize and validate a raw blob.
    ///
    /// A record is invalid if its path is empty or its modified time is
    /// unset. Validity is checked here, before the record can reach the
    /// namespace cache.
    pub fn from_bytes(blob: &[u8]) -> Result<FileRecord, RecordError> {
        let record: FileRecord = serde_json::from_slice(blob)?;
        if record.path.trim_matches('/').is_empty() {
            return Err(RecordError::EmptyPath);
        }
        if record.modified == unix_epoch() {
            return Err(RecordError::ModifiedUnset);
        }
        Ok(record)
    }

    /// Serialize the record to its canonical blob form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Content hash of the serialized record, the name it is stored under.
    pub fn sum(&self) -> Result<ContentHash, RecordError> {
        Ok(ContentHash::of(&self.to_bytes()?))
    }
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(path: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            size: 42,
            modified: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            chunks: vec![Chunk {
                index: 0,
                sum: ContentHash::of(b"chunk zero"),
            }],
        }
    }

    #[test]
    fn test_round_trip() {
        let r = record("photos/2024/beach.jpg");
        let blob = r.to_bytes().unwrap();
        let back = FileRecord::from_bytes(&blob).unwrap();
        assert_eq!(r, back);
    }

    #[test]
    fn test_sum_is_stable() {
        let r = record("a/b");
        assert_eq!(r.sum().unwrap(), r.sum().unwrap());
        let mut other = record("a/b");
        other.size = 43;
        assert_ne!(r.sum().unwrap(), other.sum().unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            FileRecord::from_bytes(b"definitely not json"),
            Err(RecordError::Malformed(_))
        ));
    }

    #[test]
    fn test_rejects_empty_path() {
        let mut r = record("x");
        r.path = String::new();
        let blob = r.to_bytes().unwrap();
        assert!(matches!(
            FileRecord::from_bytes(&blob),
            Err(RecordError::EmptyPath)
        ));
        // A path of only slashes is empty too.
        r.path = "///".to_string();
        let blob = r.to_bytes().unwrap();
        assert!(matches!(
            FileRecord::from_bytes(&blob),
            Err(RecordError::EmptyPath)
        ));
    }

    #[test]
    fn test_rejects_missing_modified() {
        let blob = br#"{"path":"x","size":1}"#;
        assert!(matches!(
            FileRecord::from_bytes(blob),
            Err(RecordError::ModifiedUnset)
        ));
    }

    #[test]
    fn test_rejects_epoch_modified() {
        let blob = br#"{"path":"x","size":1,"modified":"1970-01-01T00:00:00Z"}"#;
        assert!(matches!(
            FileRecord::from_bytes(blob),
            Err(RecordError::ModifiedUnset)
        ));
    }

    #[test]
    fn test_accepts_missing_chunks_field() {
        let blob = br#"{"path":"a","size":0,"modified":"2024-05-01T12:00:00Z"}"#;
        let r = FileRecord::from_bytes(blob).unwrap();
        assert!(r.chunks.is_empty());
    }
}
