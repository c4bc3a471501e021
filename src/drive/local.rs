//! Local-disk storage provider
//!
//! Stores each blob as one file named by its hex digest, records and chunks
//! under separate directory roots so records can be enumerated without
//! touching chunk data. Optional caps bound the number of records and the
//! total chunk bytes.

use super::{verify_sum, Drive, DriveConfig};
use crate::error::DriveError;
use crate::types::ContentHash;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// [`Drive`] implementation backed by a pair of local directories.
pub struct LocalDrive {
    config: DriveConfig,
    record_root: PathBuf,
    chunk_root: PathBuf,
}

impl LocalDrive {
    /// Registry constructor. Fails if either root is missing from the config
    /// or cannot be created.
    pub fn create(config: DriveConfig) -> Result<Arc<dyn Drive>, DriveError> {
        let record_root = config
            .record_root
            .clone()
            .ok_or_else(|| DriveError::InvalidConfig("localdisk requires record_root".into()))?;
        let chunk_root = config
            .chunk_root
            .clone()
            .ok_or_else(|| DriveError::InvalidConfig("localdisk requires chunk_root".into()))?;
        for root in [&record_root, &chunk_root] {
            fs::create_dir_all(root).map_err(|e| DriveError::Unavailable {
                provider: "localdisk".to_string(),
                reason: format!("creating {:?}: {}", root, e),
            })?;
        }
        Ok(Arc::new(LocalDrive {
            config,
            record_root,
            chunk_root,
        }))
    }

    fn unavailable(&self, reason: String) -> DriveError {
        DriveError::Unavailable {
            provider: "localdisk".to_string(),
            reason,
        }
    }

    fn read_blob(&self, dir: &Path, sum: &ContentHash) -> Result<Option<Vec<u8>>, DriveError> {
        match fs::read(dir.join(sum.to_hex())) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.unavailable(format!("reading {}: {}", sum, e))),
        }
    }

    fn write_blob(&self, dir: &Path, sum: &ContentHash, blob: &[u8]) -> Result<(), DriveError> {
        verify_sum(sum, blob)?;
        let path = dir.join(sum.to_hex());
        // Content-addressed: an existing file already holds these bytes.
        if path.exists() {
            debug!(sum = %sum, "blob already stored");
            return Ok(());
        }
        fs::write(&path, blob).map_err(|e| self.unavailable(format!("writing {}: {}", sum, e)))
    }

    fn record_count(&self) -> Result<u64, DriveError> {
        let entries = fs::read_dir(&self.record_root)
            .map_err(|e| self.unavailable(format!("reading {:?}: {}", self.record_root, e)))?;
        Ok(entries.count() as u64)
    }

    fn chunk_bytes(&self) -> Result<u64, DriveError> {
        let entries = fs::read_dir(&self.chunk_root)
            .map_err(|e| self.unavailable(format!("reading {:?}: {}", self.chunk_root, e)))?;
        let mut total = 0;
        for entry in entries {
            let entry = entry.map_err(|e| self.unavailable(e.to_string()))?;
            total += entry
                .metadata()
                .map_err(|e| self.unavailable(e.to_string()))?
                .len();
        }
        Ok(total)
    }
}

impl Drive for LocalDrive {
    fn list_records(&self) -> Result<Vec<ContentHash>, DriveError> {
        let entries = fs::read_dir(&self.record_root)
            .map_err(|e| self.unavailable(format!("listing {:?}: {}", self.record_root, e)))?;
        let mut sums = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.unavailable(e.to_string()))?;
            let name = entry.file_name();
            match name.to_string_lossy().parse::<ContentHash>() {
                Ok(sum) => sums.push(sum),
                // Stray files are not records; leave them alone.
                Err(_) => debug!(file = ?name, "ignoring non-digest file in record root"),
            }
        }
        Ok(sums)
    }

    fn fetch_blob(&self, sum: &ContentHash) -> Result<Vec<u8>, DriveError> {
        if let Some(blob) = self.read_blob(&self.record_root, sum)? {
            return Ok(blob);
        }
        if let Some(blob) = self.read_blob(&self.chunk_root, sum)? {
            return Ok(blob);
        }
        Err(DriveError::NotFound(*sum))
    }

    fn store_record(&self, sum: &ContentHash, blob: &[u8]) -> Result<(), DriveError> {
        // Re-storing an existing record stays idempotent even at the cap.
        let novel = !self.record_root.join(sum.to_hex()).exists();
        if let Some(max) = self.config.max_files {
            if novel && self.record_count()? >= max {
                return Err(DriveError::OverCapacity {
                    provider: "localdisk".to_string(),
                    reason: format!("at max_files ({})", max),
                });
            }
        }
        self.write_blob(&self.record_root, sum, blob)
    }

    fn store_blob(&self, sum: &ContentHash, blob: &[u8]) -> Result<(), DriveError> {
        let novel = !self.chunk_root.join(sum.to_hex()).exists();
        if let Some(max) = self.config.max_bytes {
            if novel && self.chunk_bytes()? + blob.len() as u64 > max {
                return Err(DriveError::OverCapacity {
                    provider: "localdisk".to_string(),
                    reason: format!("at max_bytes ({})", max),
                });
            }
        }
        self.write_blob(&self.chunk_root, sum, blob)
    }

    fn describe(&self) -> &DriveConfig {
        &self.config
    }
}
