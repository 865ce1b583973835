//! Core data types for ORGV.

use crate::error::{OrgError, Result};
use crate::NodeHash;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier for a tree snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TreeId(Uuid);

impl TreeId {
    /// Generates a fresh tree id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a tree id from its string form.
    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| OrgError::Validation(format!("invalid tree id: {}", e)))
    }

    /// Returns the raw 16-byte representation.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommitId(Uuid);

impl CommitId {
    /// Generates a fresh commit id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a commit id from its string form.
    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| OrgError::Validation(format!("invalid commit id: {}", e)))
    }

    /// Returns the raw 16-byte representation.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable content-addressed organization node.
///
/// Two nodes with identical (name, depth, parent_hash) are the same node;
/// sharing across trees and commits is intentional. Nodes are created on
/// demand, never mutated, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Content hash; derived from the other three fields.
    pub hash: NodeHash,
    /// Display name.
    pub name: String,
    /// Depth in the chart, starting at 1 for roots.
    pub depth: u32,
    /// Parent node's content hash, if any.
    pub parent_hash: Option<NodeHash>,
}

impl Node {
    /// Builds a node from its content, computing the hash.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the name is empty or the depth is zero.
    pub fn new(name: &str, depth: u32, parent_hash: Option<NodeHash>) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(OrgError::Validation("node name must not be empty".into()));
        }
        if depth == 0 {
            return Err(OrgError::Validation("node depth must be >= 1".into()));
        }

        Ok(Self {
            hash: NodeHash::compute(name, depth, parent_hash.as_ref()),
            name: name.to_string(),
            depth,
            parent_hash,
        })
    }
}

/// Placement of one node inside one tree snapshot.
///
/// A tree snapshot is the set of links sharing a `tree_id`. Links whose
/// parent hash is null or unresolved within the set are roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLink {
    /// Tree the node is placed in.
    pub tree_id: TreeId,
    /// Placed node.
    pub node_hash: NodeHash,
    /// Parent placement within the same tree, if any.
    pub parent_hash: Option<NodeHash>,
}

/// Immutable commit record referencing one tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit identifier.
    pub id: CommitId,
    /// Snapshot this commit records.
    pub tree_id: TreeId,
    /// Author principal name.
    pub author: String,
    /// Optional commit message.
    pub message: Option<String>,
    /// Parent commit, forming a single-parent chain.
    pub parent_commit_id: Option<CommitId>,
    /// Creation time, Unix milliseconds.
    pub created_at: i64,
}

/// Tag annotation; at most one per commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name, 1..=50 characters.
    pub name: String,
    /// Tagged commit.
    pub commit_id: CommitId,
}

/// Share record marking a commit as published to the shared line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    /// Shared commit.
    pub commit_id: CommitId,
    /// Publication time, Unix milliseconds.
    pub shared_at: i64,
    /// Optional publication note.
    pub note: Option<String>,
}

/// Filter for commit listings.
#[derive(Debug, Clone, Default)]
pub struct CommitFilter {
    /// Only commits by this author.
    pub author: Option<String>,
    /// Only these commit ids.
    pub ids: Option<Vec<CommitId>>,
}

/// Flat node row consumed by the merge engine.
///
/// `id` is stable within a single collection only: persisted snapshots use
/// content-hash hex, drafts use ephemeral ids. The engine treats ids as
/// opaque comparison keys. `fingerprint` is the content hash as of the
/// collection's base snapshot (absent for nodes that never came from one),
/// compared only for equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeNode {
    /// Opaque per-collection identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Depth in the chart.
    pub depth: u32,
    /// Parent's id within the same collection, if any.
    pub parent_id: Option<String>,
    /// Opaque content fingerprint, if known.
    pub fingerprint: Option<NodeHash>,
}

/// A materialized node with its children, as returned by tree
/// materialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Content hash of the node.
    pub hash: NodeHash,
    /// Display name.
    pub name: String,
    /// Depth in the chart.
    pub depth: u32,
    /// Child subtrees.
    pub children: Vec<TreeNode>,
}
