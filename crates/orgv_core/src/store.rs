//! Persistent store for nodes, tree links, commits, tags, and shares.
//!
//! All records live in a single redb database with postcard-encoded
//! values. redb serializes writers, which gives the two guarantees the
//! model needs: resolve-or-create cannot race itself into duplicate node
//! rows, and multi-step operations (committing a snapshot, the
//! share-ordering guard) run inside one write transaction that rolls back
//! wholesale on error.

use crate::draft::DraftNode;
use crate::error::{OrgError, Result};
use crate::types::{Commit, CommitFilter, CommitId, Node, Share, Tag, TreeId, TreeLink};
use crate::NodeHash;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Store schema version for migration support.
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Maximum tag name length, matching the historical validation rule.
const MAX_TAG_NAME_LEN: usize = 50;

// Table definitions
const METADATA_TABLE: TableDefinition<&str, u32> = TableDefinition::new("metadata");
const NODES_TABLE: TableDefinition<&[u8; 32], &[u8]> = TableDefinition::new("nodes");
const TREE_LINKS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("tree_links");
const COMMITS_TABLE: TableDefinition<&[u8; 16], &[u8]> = TableDefinition::new("commits");
const TAGS_TABLE: TableDefinition<&[u8; 16], &[u8]> = TableDefinition::new("tags");
const SHARES_TABLE: TableDefinition<&[u8; 16], &[u8]> = TableDefinition::new("shares");

/// Encode tree link key: tree_id bytes + node hash bytes.
fn encode_link_key(tree_id: &TreeId, node_hash: &NodeHash) -> Vec<u8> {
    let mut key = Vec::with_capacity(16 + 32);
    key.extend_from_slice(tree_id.as_bytes());
    key.extend_from_slice(node_hash.as_bytes());
    key
}

/// Inclusive key range covering every link of one tree.
fn link_key_range(tree_id: &TreeId) -> (Vec<u8>, Vec<u8>) {
    let mut start = Vec::with_capacity(16 + 32);
    start.extend_from_slice(tree_id.as_bytes());
    start.extend_from_slice(&[0x00; 32]);

    let mut end = Vec::with_capacity(16 + 32);
    end.extend_from_slice(tree_id.as_bytes());
    end.extend_from_slice(&[0xff; 32]);

    (start, end)
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    postcard::to_allocvec(value).map_err(|e| OrgError::Serialization(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    postcard::from_bytes(bytes).map_err(|e| OrgError::Deserialization(e.to_string()))
}

/// Persistent store backing one repository.
///
/// # Examples
///
/// ```
/// use orgv_core::OrgStore;
/// use tempfile::TempDir;
///
/// let tmp = TempDir::new().unwrap();
/// let store = OrgStore::create(tmp.path().join("store.redb")).unwrap();
///
/// // Same content resolves to the same node (deduplication).
/// let a = store.resolve_or_create_node("CEO", 1, None).unwrap();
/// let b = store.resolve_or_create_node("CEO", 1, None).unwrap();
/// assert_eq!(a, b);
/// ```
pub struct OrgStore {
    db: Database,
    path: PathBuf,
}

impl OrgStore {
    /// Creates a new store database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or the schema
    /// version cannot be written.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(&path)?;

        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(METADATA_TABLE)?;
            table.insert("version", STORE_SCHEMA_VERSION)?;

            // Touch the record tables so open() finds a complete schema.
            write_txn.open_table(NODES_TABLE)?;
            write_txn.open_table(TREE_LINKS_TABLE)?;
            write_txn.open_table(COMMITS_TABLE)?;
            write_txn.open_table(TAGS_TABLE)?;
            write_txn.open_table(SHARES_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db, path })
    }

    /// Opens an existing store database, verifying the schema version.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the database is missing, unreadable, or has a
    /// mismatched schema version.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(OrgError::Storage(format!(
                "store database not found at {}",
                path.display()
            )));
        }

        let db = Database::open(&path)?;

        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(METADATA_TABLE)?;
        match table.get("version")? {
            Some(version) if version.value() == STORE_SCHEMA_VERSION => {}
            Some(version) => {
                return Err(OrgError::Storage(format!(
                    "store schema version mismatch: found {}, expected {}",
                    version.value(),
                    STORE_SCHEMA_VERSION
                )));
            }
            None => {
                return Err(OrgError::Storage(
                    "store database has no schema version".to_string(),
                ));
            }
        }
        drop(read_txn);

        Ok(Self { db, path })
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves a node by content, creating it if it does not exist.
    ///
    /// Repeated calls with identical inputs are idempotent and
    /// side-effect-free after the first: the lookup and the insert happen
    /// inside one write transaction, so concurrent callers computing the
    /// same new content cannot both insert.
    ///
    /// # Errors
    ///
    /// Returns `Validation` before any write if the name is empty or the
    /// depth is zero; storage failures are propagated.
    pub fn resolve_or_create_node(
        &self,
        name: &str,
        depth: u32,
        parent_hash: Option<NodeHash>,
    ) -> Result<Node> {
        let node = Node::new(name, depth, parent_hash)?;

        let write_txn = self.db.begin_write()?;
        let existing = {
            let mut table = write_txn.open_table(NODES_TABLE)?;
            let found = match table.get(node.hash.as_bytes())? {
                Some(found) => Some(decode::<Node>(found.value())?),
                None => None,
            };
            if found.is_none() {
                table.insert(node.hash.as_bytes(), encode(&node)?.as_slice())?;
            }
            found
        };

        match existing {
            Some(found) => {
                write_txn.abort()?;
                Ok(found)
            }
            None => {
                write_txn.commit()?;
                debug!(hash = %node.hash, name = %node.name, "created node");
                Ok(node)
            }
        }
    }

    /// Looks up a node by its content hash.
    pub fn lookup_node(&self, hash: NodeHash) -> Result<Option<Node>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NODES_TABLE)?;
        match table.get(hash.as_bytes())? {
            Some(bytes) => Ok(Some(decode(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// Returns the number of node rows in the store.
    ///
    /// Useful for verifying deduplication: re-committing identical
    /// content must not grow this number.
    pub fn node_count(&self) -> Result<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NODES_TABLE)?;
        Ok(table.len()?)
    }

    /// Places a node inside a tree.
    ///
    /// # Errors
    ///
    /// `UnknownNode` if the node (or the non-null parent) has no stored
    /// content; `Validation` if the parent is not already placed in the
    /// same tree (placements must form a forest).
    pub fn insert_tree_link(
        &self,
        tree_id: TreeId,
        node_hash: NodeHash,
        parent_hash: Option<NodeHash>,
    ) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let nodes = write_txn.open_table(NODES_TABLE)?;
            if nodes.get(node_hash.as_bytes())?.is_none() {
                return Err(OrgError::UnknownNode(node_hash.as_hex()));
            }

            let mut links = write_txn.open_table(TREE_LINKS_TABLE)?;
            if let Some(parent) = parent_hash {
                if nodes.get(parent.as_bytes())?.is_none() {
                    return Err(OrgError::UnknownNode(parent.as_hex()));
                }
                let parent_key = encode_link_key(&tree_id, &parent);
                if links.get(parent_key.as_slice())?.is_none() {
                    return Err(OrgError::Validation(format!(
                        "parent {} is not placed in tree {}",
                        parent.as_hex(),
                        tree_id
                    )));
                }
            }

            // At most one placement per (tree, node); re-inserting the
            // same content replaces the parent pointer.
            let key = encode_link_key(&tree_id, &node_hash);
            links.insert(key.as_slice(), encode(&parent_hash)?.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Replaces one placement with another, as a node edit does. Links
    /// of children pointing at the old placement are rewired to the new
    /// one, all in the same transaction.
    ///
    /// Returns `false` without writing when the edit resolves to the very
    /// same content hash (a no-op edit).
    ///
    /// # Errors
    ///
    /// `UnknownNode` if the old placement does not exist in the tree or
    /// the new node has no stored content.
    pub fn replace_tree_link(
        &self,
        tree_id: TreeId,
        old_node_hash: NodeHash,
        new_node_hash: NodeHash,
        new_parent_hash: Option<NodeHash>,
    ) -> Result<bool> {
        if old_node_hash == new_node_hash {
            return Ok(false);
        }

        let write_txn = self.db.begin_write()?;
        {
            let nodes = write_txn.open_table(NODES_TABLE)?;
            if nodes.get(new_node_hash.as_bytes())?.is_none() {
                return Err(OrgError::UnknownNode(new_node_hash.as_hex()));
            }

            let mut links = write_txn.open_table(TREE_LINKS_TABLE)?;
            let old_key = encode_link_key(&tree_id, &old_node_hash);
            if links.remove(old_key.as_slice())?.is_none() {
                return Err(OrgError::UnknownNode(old_node_hash.as_hex()));
            }

            let new_key = encode_link_key(&tree_id, &new_node_hash);
            links.insert(new_key.as_slice(), encode(&new_parent_hash)?.as_slice())?;

            // Keep children attached to the edited node.
            let (start, end) = link_key_range(&tree_id);
            let mut rewired: Vec<Vec<u8>> = Vec::new();
            for entry in links.range(start.as_slice()..=end.as_slice())? {
                let (key, value) = entry?;
                let parent: Option<NodeHash> = decode(value.value())?;
                if parent == Some(old_node_hash) {
                    rewired.push(key.value().to_vec());
                }
            }
            let new_parent = encode(&Some(new_node_hash))?;
            for key in &rewired {
                links.insert(key.as_slice(), new_parent.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(true)
    }

    /// Removes a placement together with its entire subtree, returning
    /// how many placements were removed. Node content is never deleted.
    ///
    /// # Errors
    ///
    /// `UnknownNode` if the root placement does not exist.
    pub fn delete_tree_subtree(&self, tree_id: TreeId, node_hash: NodeHash) -> Result<usize> {
        let write_txn = self.db.begin_write()?;
        let removed;
        {
            let mut links = write_txn.open_table(TREE_LINKS_TABLE)?;

            let (start, end) = link_key_range(&tree_id);
            let mut parents: HashMap<NodeHash, Option<NodeHash>> = HashMap::new();
            for entry in links.range(start.as_slice()..=end.as_slice())? {
                let (key, value) = entry?;
                let hash_bytes: [u8; 32] = key.value()[16..]
                    .try_into()
                    .map_err(|_| OrgError::Storage("malformed tree link key".to_string()))?;
                parents.insert(NodeHash::from_bytes(hash_bytes), decode(value.value())?);
            }

            if !parents.contains_key(&node_hash) {
                return Err(OrgError::UnknownNode(node_hash.as_hex()));
            }

            let mut doomed: Vec<NodeHash> = vec![node_hash];
            let mut frontier = vec![node_hash];
            while let Some(current) = frontier.pop() {
                for (child, parent) in &parents {
                    if *parent == Some(current) && !doomed.contains(child) {
                        doomed.push(*child);
                        frontier.push(*child);
                    }
                }
            }

            for hash in &doomed {
                let key = encode_link_key(&tree_id, hash);
                links.remove(key.as_slice())?;
            }
            removed = doomed.len();
        }
        write_txn.commit()?;
        Ok(removed)
    }

    /// Copies a tree's placements under a fresh tree id, as checkout
    /// does to rebuild a working tree from a snapshot.
    ///
    /// # Errors
    ///
    /// `UnknownTree` if the source tree has no placements.
    pub fn clone_tree(&self, src: TreeId) -> Result<TreeId> {
        let dst = TreeId::generate();

        let write_txn = self.db.begin_write()?;
        {
            let mut links = write_txn.open_table(TREE_LINKS_TABLE)?;

            let (start, end) = link_key_range(&src);
            let mut copied: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
            for entry in links.range(start.as_slice()..=end.as_slice())? {
                let (key, value) = entry?;
                let mut new_key = Vec::with_capacity(16 + 32);
                new_key.extend_from_slice(dst.as_bytes());
                new_key.extend_from_slice(&key.value()[16..]);
                copied.push((new_key, value.value().to_vec()));
            }

            if copied.is_empty() {
                return Err(OrgError::UnknownTree(src.to_string()));
            }

            for (key, value) in &copied {
                links.insert(key.as_slice(), value.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(dst)
    }

    /// Removes a placement from a tree. Node content is never deleted.
    ///
    /// # Errors
    ///
    /// `UnknownNode` if the placement does not exist.
    pub fn delete_tree_link(&self, tree_id: TreeId, node_hash: NodeHash) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut links = write_txn.open_table(TREE_LINKS_TABLE)?;
            let key = encode_link_key(&tree_id, &node_hash);
            if links.remove(key.as_slice())?.is_none() {
                return Err(OrgError::UnknownNode(node_hash.as_hex()));
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Lists all placements of one tree.
    pub fn tree_links(&self, tree_id: TreeId) -> Result<Vec<TreeLink>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TREE_LINKS_TABLE)?;
        let (start, end) = link_key_range(&tree_id);

        let mut links = Vec::new();
        for entry in table.range(start.as_slice()..=end.as_slice())? {
            let (key, value) = entry?;
            let hash_bytes: [u8; 32] = key.value()[16..]
                .try_into()
                .map_err(|_| OrgError::Storage("malformed tree link key".to_string()))?;
            links.push(TreeLink {
                tree_id,
                node_hash: NodeHash::from_bytes(hash_bytes),
                parent_hash: decode(value.value())?,
            });
        }
        Ok(links)
    }

    /// Freezes the given tree into an immutable snapshot and records a
    /// commit for it, as a single atomic unit.
    ///
    /// The working tree keeps its id and stays editable; the commit
    /// references a fresh tree id holding a copy of the links, so older
    /// snapshots remain reachable forever.
    ///
    /// # Errors
    ///
    /// `UnknownTree` if the tree has no placements; `UnknownCommit` if
    /// `parent_commit_id` does not resolve. Any storage failure aborts
    /// the transaction, leaving the store unchanged.
    pub fn commit_tree(
        &self,
        tree_id: TreeId,
        author: &str,
        message: Option<&str>,
        parent_commit_id: Option<CommitId>,
        created_at: i64,
    ) -> Result<Commit> {
        if author.trim().is_empty() {
            return Err(OrgError::Validation("author must not be empty".into()));
        }

        let commit = Commit {
            id: CommitId::generate(),
            tree_id: TreeId::generate(),
            author: author.to_string(),
            message: message.map(str::to_string),
            parent_commit_id,
            created_at,
        };

        let write_txn = self.db.begin_write()?;
        {
            let mut links = write_txn.open_table(TREE_LINKS_TABLE)?;

            let (start, end) = link_key_range(&tree_id);
            let mut copied: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
            for entry in links.range(start.as_slice()..=end.as_slice())? {
                let (key, value) = entry?;
                let mut new_key = Vec::with_capacity(16 + 32);
                new_key.extend_from_slice(commit.tree_id.as_bytes());
                new_key.extend_from_slice(&key.value()[16..]);
                copied.push((new_key, value.value().to_vec()));
            }

            if copied.is_empty() {
                return Err(OrgError::UnknownTree(tree_id.to_string()));
            }

            for (key, value) in &copied {
                links.insert(key.as_slice(), value.as_slice())?;
            }

            let mut commits = write_txn.open_table(COMMITS_TABLE)?;
            if let Some(parent) = parent_commit_id {
                if commits.get(parent.as_bytes())?.is_none() {
                    return Err(OrgError::UnknownCommit(parent.to_string()));
                }
            }
            commits.insert(commit.id.as_bytes(), encode(&commit)?.as_slice())?;
        }
        write_txn.commit()?;

        debug!(commit = %commit.id, tree = %commit.tree_id, "recorded commit");
        Ok(commit)
    }

    /// Commits a draft node set as a new immutable snapshot: nodes are
    /// resolved or created, placed under a fresh tree id, and the commit
    /// record inserted, all in one transaction.
    ///
    /// Parent references use the draft's ephemeral ids; a reference that
    /// resolves to nothing makes that node a root, mirroring how the
    /// merge engine tolerates broken chains.
    ///
    /// # Errors
    ///
    /// `Validation` (before any write) for empty names, zero depths, or
    /// an empty draft; `UnknownCommit` for a missing parent commit.
    pub fn commit_draft(
        &self,
        draft_nodes: &[DraftNode],
        author: &str,
        message: Option<&str>,
        parent_commit_id: Option<CommitId>,
        created_at: i64,
    ) -> Result<Commit> {
        if author.trim().is_empty() {
            return Err(OrgError::Validation("author must not be empty".into()));
        }
        if draft_nodes.is_empty() {
            return Err(OrgError::Validation("draft has no nodes to commit".into()));
        }
        for node in draft_nodes {
            if node.name.trim().is_empty() {
                return Err(OrgError::Validation(format!(
                    "draft node {} has an empty name",
                    node.id
                )));
            }
            if node.depth == 0 {
                return Err(OrgError::Validation(format!(
                    "draft node {} has depth 0",
                    node.id
                )));
            }
        }

        let commit = Commit {
            id: CommitId::generate(),
            tree_id: TreeId::generate(),
            author: author.to_string(),
            message: message.map(str::to_string),
            parent_commit_id,
            created_at,
        };

        // Shallowest first, so parent hashes resolve before children.
        let mut order: Vec<&DraftNode> = draft_nodes.iter().collect();
        order.sort_by_key(|n| n.depth);

        let write_txn = self.db.begin_write()?;
        {
            let mut nodes = write_txn.open_table(NODES_TABLE)?;
            let mut links = write_txn.open_table(TREE_LINKS_TABLE)?;

            let mut resolved: HashMap<&str, NodeHash> = HashMap::new();
            for draft in &order {
                let parent_hash = draft
                    .parent_id
                    .as_deref()
                    .and_then(|pid| resolved.get(pid))
                    .copied();

                let node = Node::new(&draft.name, draft.depth, parent_hash)?;
                if nodes.get(node.hash.as_bytes())?.is_none() {
                    nodes.insert(node.hash.as_bytes(), encode(&node)?.as_slice())?;
                }

                let key = encode_link_key(&commit.tree_id, &node.hash);
                links.insert(key.as_slice(), encode(&parent_hash)?.as_slice())?;

                resolved.insert(draft.id.as_str(), node.hash);
            }

            let mut commits = write_txn.open_table(COMMITS_TABLE)?;
            if let Some(parent) = parent_commit_id {
                if commits.get(parent.as_bytes())?.is_none() {
                    return Err(OrgError::UnknownCommit(parent.to_string()));
                }
            }
            commits.insert(commit.id.as_bytes(), encode(&commit)?.as_slice())?;
        }
        write_txn.commit()?;

        debug!(
            commit = %commit.id,
            tree = %commit.tree_id,
            nodes = draft_nodes.len(),
            "committed draft"
        );
        Ok(commit)
    }

    /// Looks up a commit by id.
    pub fn lookup_commit(&self, id: CommitId) -> Result<Option<Commit>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COMMITS_TABLE)?;
        match table.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// Lists commits matching the filter, newest first.
    pub fn list_commits(&self, filter: &CommitFilter) -> Result<Vec<Commit>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COMMITS_TABLE)?;

        let mut commits = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let commit: Commit = decode(value.value())?;

            if let Some(author) = &filter.author {
                if &commit.author != author {
                    continue;
                }
            }
            if let Some(ids) = &filter.ids {
                if !ids.contains(&commit.id) {
                    continue;
                }
            }
            commits.push(commit);
        }

        commits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(commits)
    }

    /// Returns the most recent commit, if any.
    pub fn latest_commit(&self) -> Result<Option<Commit>> {
        Ok(self.list_commits(&CommitFilter::default())?.into_iter().next())
    }

    /// Attaches a tag to a commit.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty or over-long name, `UnknownCommit` if
    /// the commit does not exist, `DuplicateTag` if it already carries a
    /// tag. The existence check and insert are one transaction.
    pub fn insert_tag(&self, commit_id: CommitId, name: &str) -> Result<Tag> {
        let name = name.trim();
        if name.is_empty() || name.len() > MAX_TAG_NAME_LEN {
            return Err(OrgError::Validation(format!(
                "tag name must be 1..={} characters",
                MAX_TAG_NAME_LEN
            )));
        }

        let tag = Tag {
            name: name.to_string(),
            commit_id,
        };

        let write_txn = self.db.begin_write()?;
        {
            let commits = write_txn.open_table(COMMITS_TABLE)?;
            if commits.get(commit_id.as_bytes())?.is_none() {
                return Err(OrgError::UnknownCommit(commit_id.to_string()));
            }

            let mut tags = write_txn.open_table(TAGS_TABLE)?;
            if tags.get(commit_id.as_bytes())?.is_some() {
                return Err(OrgError::DuplicateTag(commit_id.to_string()));
            }
            tags.insert(commit_id.as_bytes(), encode(&tag)?.as_slice())?;
        }
        write_txn.commit()?;
        Ok(tag)
    }

    /// Looks up the tag attached to a commit, if any.
    pub fn lookup_tag(&self, commit_id: CommitId) -> Result<Option<Tag>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TAGS_TABLE)?;
        match table.get(commit_id.as_bytes())? {
            Some(bytes) => Ok(Some(decode(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// Publishes a commit to the shared line.
    ///
    /// The shared frontier only moves forward: the commit's `created_at`
    /// must be strictly greater than that of every previously shared
    /// commit. The guard check and the insert run in the same write
    /// transaction, so two concurrent shares cannot both pass it.
    ///
    /// # Errors
    ///
    /// `UnknownCommit`, `AlreadyShared`, or `StaleCommit` per the rules
    /// above.
    pub fn insert_share(
        &self,
        commit_id: CommitId,
        note: Option<&str>,
        shared_at: i64,
    ) -> Result<Share> {
        let share = Share {
            commit_id,
            shared_at,
            note: note.map(str::to_string),
        };

        let write_txn = self.db.begin_write()?;
        {
            let commits = write_txn.open_table(COMMITS_TABLE)?;
            let commit: Commit = match commits.get(commit_id.as_bytes())? {
                Some(bytes) => decode(bytes.value())?,
                None => return Err(OrgError::UnknownCommit(commit_id.to_string())),
            };

            let mut shares = write_txn.open_table(SHARES_TABLE)?;
            if shares.get(commit_id.as_bytes())?.is_some() {
                return Err(OrgError::AlreadyShared(commit_id.to_string()));
            }

            // Frontier = greatest created_at among shared commits.
            let mut frontier: Option<i64> = None;
            for entry in shares.iter()? {
                let (key, _) = entry?;
                if let Some(bytes) = commits.get(key.value())? {
                    let shared_commit: Commit = decode(bytes.value())?;
                    frontier = Some(frontier.map_or(shared_commit.created_at, |f: i64| {
                        f.max(shared_commit.created_at)
                    }));
                }
            }

            if let Some(frontier) = frontier {
                if commit.created_at <= frontier {
                    return Err(OrgError::StaleCommit {
                        commit_created_at: commit.created_at,
                        frontier_created_at: frontier,
                    });
                }
            }

            shares.insert(commit_id.as_bytes(), encode(&share)?.as_slice())?;
        }
        write_txn.commit()?;
        Ok(share)
    }

    /// Returns the share record at the shared frontier, if any.
    pub fn latest_share(&self) -> Result<Option<Share>> {
        let shares = self.list_shares()?;

        let mut latest: Option<(i64, Share)> = None;
        for share in shares {
            let created_at = self
                .lookup_commit(share.commit_id)?
                .map(|c| c.created_at)
                .unwrap_or(i64::MIN);
            if latest.as_ref().map_or(true, |(best, _)| created_at > *best) {
                latest = Some((created_at, share));
            }
        }
        Ok(latest.map(|(_, share)| share))
    }

    /// Lists all share records, oldest first.
    pub fn list_shares(&self) -> Result<Vec<Share>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SHARES_TABLE)?;

        let mut shares = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            shares.push(decode::<Share>(value.value())?);
        }
        shares.sort_by_key(|s| s.shared_at);
        Ok(shares)
    }
}
