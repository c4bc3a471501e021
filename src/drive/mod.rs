//! Storage provider contract
//!
//! Every backend (in-memory, local disk, remote drive API) implements
//! [`Drive`]; the namespace cache is provider-agnostic and consumes the
//! contract uniformly. Providers are constructed through an explicit
//! [`DriveRegistry`] built at startup; there is no implicit registration.

pub mod local;
pub mod memory;

use crate::error::DriveError;
use crate::types::ContentHash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for constructing one storage provider.
///
/// `provider` selects the constructor from the registry; the remaining fields
/// are provider-specific and optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Registry name of the provider, e.g. "memory" or "localdisk".
    pub provider: String,
    /// Directory holding file metadata records (localdisk).
    #[serde(default)]
    pub record_root: Option<PathBuf>,
    /// Directory holding content chunks (localdisk).
    #[serde(default)]
    pub chunk_root: Option<PathBuf>,
    /// Cap on the number of stored records.
    #[serde(default)]
    pub max_files: Option<u64>,
    /// Cap on the total stored chunk bytes.
    #[serde(default)]
    pub max_bytes: Option<u64>,
}

/// Contract every storage provider must uphold.
///
/// Obligations beyond the signatures: content-addressing immutability (a hash
/// resolves to the same bytes forever), and every hash returned by
/// `list_records` must be fetchable via `fetch_blob`, allowing for races
/// where a hash disappears between the calls, which surface as
/// [`DriveError::NotFound`], never a panic.
pub trait Drive: Send + Sync {
    /// Enumerate every content hash currently known to hold a file metadata
    /// record. The list may be partial or stale; callers tolerate both.
    fn list_records(&self) -> Result<Vec<ContentHash>, DriveError>;

    /// Fetch the raw bytes stored under a hash, record or chunk alike.
    fn fetch_blob(&self, sum: &ContentHash) -> Result<Vec<u8>, DriveError>;

    /// Store a file metadata record blob. Idempotent: storing the same hash
    /// with the same bytes succeeds trivially.
    fn store_record(&self, sum: &ContentHash, blob: &[u8]) -> Result<(), DriveError>;

    /// Store a content chunk blob. Idempotent like `store_record`.
    fn store_blob(&self, sum: &ContentHash, blob: &[u8]) -> Result<(), DriveError>;

    /// The static configuration this provider was constructed from. Used for
    /// diagnostics and logging only.
    fn describe(&self) -> &DriveConfig;
}

/// Verify that a blob hashes to its declared sum.
///
/// Shared by providers to uphold the content-addressing obligation on the
/// store path.
pub(crate) fn verify_sum(sum: &ContentHash, blob: &[u8]) -> Result<(), DriveError> {
    if ContentHash::of(blob) != *sum {
        return Err(DriveError::HashMismatch(*sum));
    }
    Ok(())
}

/// Constructor signature for a provider.
pub type DriveConstructor = fn(DriveConfig) -> Result<Arc<dyn Drive>, DriveError>;

/// Explicit mapping from provider name to constructor.
///
/// Built once at startup and passed to the config layer; registration order
/// carries no meaning.
pub struct DriveRegistry {
    constructors: BTreeMap<String, DriveConstructor>,
}

impl DriveRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        DriveRegistry {
            constructors: BTreeMap::new(),
        }
    }

    /// A registry with the built-in providers registered.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("memory", memory::MemoryDrive::create);
        registry.register("localdisk", local::LocalDrive::create);
        registry
    }

    /// Register a constructor under a provider name, replacing any previous
    /// registration for that name.
    pub fn register(&mut self, name: &str, constructor: DriveConstructor) {
        self.constructors.insert(name.to_string(), constructor);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    /// Construct a provider from its configuration.
    pub fn build(&self, config: DriveConfig) -> Result<Arc<dyn Drive>, DriveError> {
        let constructor = self.constructors.get(&config.provider).ok_or_else(|| {
            DriveError::InvalidConfig(format!("unknown provider {:?}", config.provider))
        })?;
        constructor(config)
    }
}

impl Default for DriveRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
