//! In-memory storage provider
//!
//! Keeps records and chunks in two hash-keyed maps. Useful as a test double
//! and as the reference implementation of the [`Drive`] contract.

use super::{verify_sum, Drive, DriveConfig};
use crate::error::DriveError;
use crate::types::ContentHash;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct Blobs {
    records: HashMap<ContentHash, Vec<u8>>,
    chunks: HashMap<ContentHash, Vec<u8>>,
}

/// In-memory [`Drive`] implementation.
pub struct MemoryDrive {
    config: DriveConfig,
    blobs: RwLock<Blobs>,
}

impl MemoryDrive {
    /// Registry constructor.
    pub fn create(config: DriveConfig) -> Result<Arc<dyn Drive>, DriveError> {
        Ok(Arc::new(MemoryDrive {
            config,
            blobs: RwLock::new(Blobs::default()),
        }))
    }

    /// Convenience constructor for tests and embedding.
    pub fn new() -> MemoryDrive {
        MemoryDrive {
            config: DriveConfig {
                provider: "memory".to_string(),
                ..Default::default()
            },
            blobs: RwLock::new(Blobs::default()),
        }
    }
}

impl Default for MemoryDrive {
    fn default() -> Self {
        Self::new()
    }
}

impl Drive for MemoryDrive {
    fn list_records(&self) -> Result<Vec<ContentHash>, DriveError> {
        Ok(self.blobs.read().records.keys().copied().collect())
    }

    fn fetch_blob(&self, sum: &ContentHash) -> Result<Vec<u8>, DriveError> {
        let blobs = self.blobs.read();
        blobs
            .records
            .get(sum)
            .or_else(|| blobs.chunks.get(sum))
            .cloned()
            .ok_or(DriveError::NotFound(*sum))
    }

    fn store_record(&self, sum: &ContentHash, blob: &[u8]) -> Result<(), DriveError> {
        verify_sum(sum, blob)?;
        self.blobs.write().records.insert(*sum, blob.to_vec());
        Ok(())
    }

    fn store_blob(&self, sum: &ContentHash, blob: &[u8]) -> Result<(), DriveError> {
        verify_sum(sum, blob)?;
        self.blobs.write().chunks.insert(*sum, blob.to_vec());
        Ok(())
    }

    fn describe(&self) -> &DriveConfig {
        &self.config
    }
}
