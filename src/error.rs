//! Error taxonomy
//!
//! Three layers mirror the crate's boundaries: [`DriveError`] for the storage
//! providers, [`RecordError`] for metadata parsing, and [`TreeError`] for the
//! namespace cache. Only enumeration failures and startup failures cross the
//! cache boundary; per-record failures are absorbed and logged.

use crate::types::ContentHash;
use thiserror::Error;

/// Errors surfaced by a storage provider.
#[derive(Debug, Error)]
pub enum DriveError {
    /// The hash is unknown to this provider. Also the required outcome when a
    /// hash disappears between enumeration and fetch.
    #[error("no blob with hash {0}")]
    NotFound(ContentHash),

    /// The provider cannot reach its backing store right now.
    #[error("{provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    /// Stored bytes do not hash to the declared sum.
    #[error("blob does not match declared hash {0}")]
    HashMismatch(ContentHash),

    /// A provider-local capacity limit was exceeded.
    #[error("{provider} over capacity: {reason}")]
    OverCapacity { provider: String, reason: String },

    /// The provider configuration is unusable.
    #[error("invalid drive config: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors rejecting a serialized file metadata record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("record has an empty path")]
    EmptyPath,

    #[error("record has no modified time")]
    ModifiedUnset,
}

/// Invalid ambient configuration (logging, CLI).
#[derive(Debug, Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);

/// Errors surfaced by the namespace cache.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Bootstrap could not complete; the tree was never usable.
    #[error("initializing tree: {0}")]
    Bootstrap(#[source] DriveError),

    /// A refresh pass could not enumerate the backend. The cache keeps its
    /// last-known state.
    #[error("refresh pass failed: {0}")]
    Refresh(#[source] DriveError),

    /// No node exists at the queried path.
    #[error("no such node: {0:?}")]
    NoSuchNode(String),

    /// The node is a synthetic directory with no backing record.
    #[error("no record behind synthetic node {0:?}")]
    SyntheticNode(String),

    /// The record behind a node could not be fetched or parsed.
    #[error("fetching record for {path:?}: {reason}")]
    RecordUnavailable { path: String, reason: String },
}
