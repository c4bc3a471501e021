//! Umbra: content-addressed object stores as a filesystem namespace
//!
//! Files live in flat, hash-keyed object stores as immutable blobs: content
//! chunks plus metadata records retrievable only by digest. This crate
//! rebuilds a hierarchical namespace from that object space and keeps it
//! current while serving concurrent queries, the surface a filesystem
//! front-end mounts against.

pub mod config;
pub mod drive;
pub mod error;
pub mod file;
pub mod logging;
pub mod tree;
pub mod types;
