//! Namespace cache
//!
//! Rebuilds a hierarchical view of the filesystem from the flat, hash-keyed
//! record space a [`Drive`] exposes. The tree bootstraps synchronously, then
//! stays current through refresh passes (manual or periodic, see
//! [`refresh`]); queries are served concurrently from an in-memory path map.
//!
//! Nodes are never evicted: a path whose backing record disappears from the
//! backend stays in the cache for the life of the process.

pub mod refresh;

use crate::drive::Drive;
use crate::error::TreeError;
use crate::file::FileRecord;
use crate::types::ContentHash;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Path of the root node, the only path carrying a leading slash.
pub const ROOT: &str = "/";

/// Compact representation of one path in the namespace.
///
/// `path` carries no leading or trailing slash (except the root itself).
/// `children` holds the names of nodes immediately below this one, relative
/// names only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub path: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    /// Hash of the backing metadata record. `None` marks a synthetic
    /// directory, which exists only because some descendant path needs it.
    pub record_sum: Option<ContentHash>,
    pub children: HashSet<String>,
}

impl Node {
    fn synthetic(path: &str) -> Node {
        Node {
            path: path.to_string(),
            size: 0,
            modified: DateTime::<Utc>::UNIX_EPOCH,
            record_sum: None,
            children: HashSet::new(),
        }
    }

    /// True for directories synthesized from descendant paths rather than
    /// named directly by a metadata record.
    pub fn is_synthetic(&self) -> bool {
        self.record_sum.is_none()
    }
}

/// The namespace cache over one storage provider.
///
/// A single reader/writer lock guards the path map: queries take it shared,
/// refresh takes it exclusively per node installation. Backend I/O never
/// happens under the lock, so queries block only on brief map operations.
pub struct Tree {
    drive: Arc<dyn Drive>,
    nodes: RwLock<HashMap<String, Node>>,
}

impl Tree {
    /// Build a tree over `drive`, running one full bootstrap refresh before
    /// returning. Fails only if the drive cannot enumerate records at all;
    /// individual bad records are tolerated and skipped.
    pub fn new(drive: Arc<dyn Drive>) -> Result<Arc<Tree>, TreeError> {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT.to_string(), Node::synthetic(ROOT));
        let tree = Arc::new(Tree {
            drive,
            nodes: RwLock::new(nodes),
        });
        match tree.refresh() {
            Ok(()) => Ok(tree),
            Err(TreeError::Refresh(e)) => Err(TreeError::Bootstrap(e)),
            Err(e) => Err(e),
        }
    }

    /// Run one refresh pass: enumerate, fetch, parse, install.
    ///
    /// Returns an error only if enumeration itself fails; the cache then
    /// keeps its last-known state. Per-record fetch and parse failures are
    /// logged and skipped, and the next pass is their retry mechanism.
    pub fn refresh(&self) -> Result<(), TreeError> {
        debug!("beginning cache refresh pass");
        let sums = self.drive.list_records().map_err(TreeError::Refresh)?;
        debug!(
            provider = %self.drive.describe().provider,
            listed = sums.len(),
            "enumerated records"
        );

        // Pass-local only: every pass re-fetches every listed hash. A hash
        // is marked seen only once processed, so a duplicate listing retries
        // an earlier failed fetch within the same pass.
        let mut seen: HashSet<ContentHash> = HashSet::new();
        for sum in sums {
            if seen.contains(&sum) {
                continue;
            }
            let blob = match self.drive.fetch_blob(&sum) {
                Ok(blob) => blob,
                Err(e) => {
                    warn!(sum = %sum, error = %e, "failed to fetch record, skipping");
                    continue;
                }
            };
            let record = match FileRecord::from_bytes(&blob) {
                Ok(record) => record,
                Err(e) => {
                    warn!(sum = %sum, error = %e, "invalid record, skipping");
                    continue;
                }
            };
            self.install(sum, &record.path, record.size, record.modified);
            seen.insert(sum);
        }
        info!(records = seen.len(), nodes = self.len(), "refresh pass complete");
        Ok(())
    }

    /// Install one record's node and synthesize its ancestor chain, all
    /// within a single write critical section.
    fn install(&self, sum: ContentHash, raw_path: &str, size: u64, modified: DateTime<Utc>) {
        let path = normalize(raw_path);
        let mut nodes = self.nodes.write();
        if let Some(existing) = nodes.get(&path) {
            // Last-writer-wins by timestamp: only a strictly later record
            // replaces an installed one.
            if existing.record_sum.is_some() && existing.modified >= modified {
                debug!(path = %path, "discarding record at or behind cached time");
                return;
            }
        }
        // File/directory collisions are unresolved by design: a record
        // landing on a synthesized directory replaces it, children and all.
        nodes.insert(
            path.clone(),
            Node {
                path: path.clone(),
                size,
                modified,
                record_sum: Some(sum),
                children: HashSet::new(),
            },
        );
        add_parents(&mut nodes, &path);
    }

    /// Return the node at `path`.
    pub fn lookup(&self, path: &str) -> Result<Node, TreeError> {
        let path = normalize(path);
        self.nodes
            .read()
            .get(&path)
            .cloned()
            .ok_or_else(|| TreeError::NoSuchNode(path))
    }

    /// True if `child` is registered immediately below `parent`.
    pub fn has_child(&self, parent: &str, child: &str) -> bool {
        let parent = normalize(parent);
        self.nodes
            .read()
            .get(&parent)
            .map(|node| node.children.contains(child))
            .unwrap_or(false)
    }

    /// Number of nodes in the cache, files plus synthetic directories.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Fetch the full metadata record behind a node, for callers that need
    /// file contents rather than namespace shape.
    pub fn record_for(&self, node: &Node) -> Result<FileRecord, TreeError> {
        let sum = node
            .record_sum
            .ok_or_else(|| TreeError::SyntheticNode(node.path.clone()))?;
        let blob = self
            .drive
            .fetch_blob(&sum)
            .map_err(|e| TreeError::RecordUnavailable {
                path: node.path.clone(),
                reason: e.to_string(),
            })?;
        FileRecord::from_bytes(&blob).map_err(|e| TreeError::RecordUnavailable {
            path: node.path.clone(),
            reason: e.to_string(),
        })
    }
}

/// Strip leading and trailing slashes; empty paths collapse to the root.
fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        ROOT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split a normalized path into (parent, name). Top-level names parent to
/// the root.
fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => (ROOT, path),
    }
}

/// Walk upward from `path`, creating any missing ancestor as a synthetic
/// directory and registering child membership at every level. Idempotent;
/// runs inside the caller's write critical section.
fn add_parents(nodes: &mut HashMap<String, Node>, path: &str) {
    let (parent, name) = split_parent(path);
    nodes
        .entry(parent.to_string())
        .or_insert_with(|| Node::synthetic(parent))
        .children
        .insert(name.to_string());
    if parent != ROOT {
        add_parents(nodes, parent);
    }
}
