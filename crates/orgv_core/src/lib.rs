//! ORGV Core Library
//!
//! A version-control core for organization charts, providing:
//! - Content-addressed node storage with structural deduplication
//! - Immutable tree snapshots and a single-parent commit chain
//! - Tags and a forward-only shared line
//! - Three-way merge with conflict detection
//!
//! # Quick Start
//!
//! ```
//! use orgv_core::OrgRepo;
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let repo = OrgRepo::init(tmp.path()).unwrap();
//!
//! let root = repo.add_node("CEO", None).unwrap();
//! repo.add_node("Sales", Some(&root.hash.as_hex())).unwrap();
//!
//! let commit = repo.commit(Some("initial chart"), Some("alice")).unwrap();
//! let forest = repo.commit_forest(commit.id).unwrap();
//! assert_eq!(forest[0].name, "CEO");
//! ```
//!
//! # Content Addressing
//!
//! A node is identified by the SHA-256 of its name, depth, and parent
//! hash. Identical content anywhere in history is stored once:
//!
//! ```
//! use orgv_core::NodeHash;
//!
//! let a = NodeHash::compute("Engineering", 2, None);
//! let b = NodeHash::compute("Engineering", 2, None);
//! assert_eq!(a, b);
//! ```

mod config;
mod draft;
mod error;
mod merge;
mod node_hash;
mod refs;
mod repo;
mod snapshot;
mod store;
mod types;

pub use config::{Config, DisplayConfig, IdentityConfig};
pub use draft::{Draft, DraftNode};
pub use error::{OrgError, Result};
pub use merge::{three_way_merge, Conflict, MergeOutcome};
pub use node_hash::NodeHash;
pub use refs::Refs;
pub use repo::{LogEntry, OrgRepo};
pub use snapshot::{flatten, materialize};
pub use store::{OrgStore, STORE_SCHEMA_VERSION};
pub use types::*;
