//! Repository handle providing the main ORGV API.

use crate::config::Config;
use crate::draft::DraftNode;
use crate::error::{OrgError, Result};
use crate::merge::{three_way_merge, MergeOutcome};
use crate::refs::Refs;
use crate::snapshot;
use crate::store::OrgStore;
use crate::types::{Commit, CommitFilter, CommitId, MergeNode, Node, Share, Tag, TreeId, TreeLink, TreeNode};
use crate::NodeHash;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// One entry of a history listing: the commit plus its annotations.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// The commit record.
    pub commit: Commit,
    /// Tag attached to the commit, if any.
    pub tag: Option<Tag>,
    /// Whether the commit is on the shared line.
    pub shared: bool,
}

/// ORGV repository handle.
///
/// Provides the main API for interacting with an organization-chart
/// repository: editing the working tree, committing snapshots, tagging,
/// sharing, and merging.
pub struct OrgRepo {
    /// Root directory containing the repository (parent of .orgv).
    root: PathBuf,
    /// Record store.
    store: OrgStore,
    /// Reference management.
    refs: Refs,
    /// Repository configuration.
    config: Config,
    /// Time provider for testing (None = use system time).
    time_provider: Option<Arc<dyn Fn() -> i64 + Send + Sync>>,
}

impl OrgRepo {
    /// Initializes a new ORGV repository.
    ///
    /// Creates the .orgv directory with the record store, a default
    /// config, and an empty working tree.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository already exists here or any of
    /// the pieces cannot be created.
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let orgv_dir = root.join(".orgv");

        if orgv_dir.exists() {
            return Err(OrgError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "ORGV repository already exists in this directory",
            )));
        }

        fs::create_dir_all(&orgv_dir)?;

        let store = OrgStore::create(orgv_dir.join("store.redb"))?;
        let config = Config::default();
        config.save(&orgv_dir)?;

        let refs = Refs::new(&orgv_dir);
        refs.write_tree(TreeId::generate())?;

        info!(root = %root.display(), "initialized repository");

        Ok(Self {
            root,
            store,
            refs,
            config,
            time_provider: None,
        })
    }

    /// Opens an existing ORGV repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the .orgv directory doesn't exist or is
    /// invalid.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let orgv_dir = root.join(".orgv");

        if !orgv_dir.exists() {
            return Err(OrgError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not an ORGV repository: {}", root.display()),
            )));
        }

        let store = OrgStore::open(orgv_dir.join("store.redb"))?;
        let config = Config::load(&orgv_dir)?;
        let refs = Refs::new(&orgv_dir);

        Ok(Self {
            root,
            store,
            refs,
            config,
            time_provider: None,
        })
    }

    /// Sets a custom time provider for testing.
    ///
    /// Allows injecting controlled time for testing the share-ordering
    /// guard and other time-dependent behavior. In production, just use
    /// `open()` or `init()` without calling this method.
    pub fn with_time_provider(
        mut self,
        provider: impl Fn() -> i64 + Send + Sync + 'static,
    ) -> Self {
        self.time_provider = Some(Arc::new(provider));
        self
    }

    /// Returns the repository root (parent of the `.orgv` directory).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .orgv directory path.
    pub fn orgv_dir(&self) -> PathBuf {
        self.root.join(".orgv")
    }

    /// Returns a reference to the record store.
    pub fn store(&self) -> &OrgStore {
        &self.store
    }

    /// Returns the repository configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the working tree id.
    pub fn working_tree(&self) -> Result<TreeId> {
        self.refs.read_tree()
    }

    /// Returns the HEAD commit id, if any commit exists.
    pub fn head(&self) -> Result<Option<CommitId>> {
        self.refs.read_head()
    }

    /// Current time in Unix milliseconds.
    fn now_ms(&self) -> i64 {
        match &self.time_provider {
            Some(provider) => provider(),
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("system time before Unix epoch")
                .as_millis() as i64,
        }
    }

    /// Adds a node to the working tree, under the given parent.
    ///
    /// Depth is derived from the parent: roots sit at depth 1, children
    /// one below their parent. Existing content is reused rather than
    /// re-inserted.
    ///
    /// # Errors
    ///
    /// `InvalidHex` for a malformed parent hash, `Validation` if the
    /// parent is not placed in the working tree.
    pub fn add_node(&self, name: &str, parent_hex: Option<&str>) -> Result<Node> {
        let tree = self.refs.read_tree()?;

        let parent = match parent_hex {
            Some(hex) => {
                let hash = NodeHash::from_hex(hex)?;
                let node = self
                    .store
                    .lookup_node(hash)?
                    .ok_or_else(|| OrgError::UnknownNode(hash.as_hex()))?;
                Some(node)
            }
            None => None,
        };

        let depth = parent.as_ref().map_or(1, |p| p.depth + 1);
        let parent_hash = parent.map(|p| p.hash);

        let node = self.store.resolve_or_create_node(name, depth, parent_hash)?;
        self.store.insert_tree_link(tree, node.hash, parent_hash)?;
        Ok(node)
    }

    /// Renames a node in the working tree.
    ///
    /// Returns `None` when the new name resolves to the same content (a
    /// no-op edit, nothing written). Children keep their placement under
    /// the edited node; their own content hashes are left alone.
    ///
    /// # Errors
    ///
    /// `UnknownNode` if the node is not placed in the working tree.
    pub fn edit_node(&self, hash_hex: &str, new_name: &str) -> Result<Option<Node>> {
        let tree = self.refs.read_tree()?;
        let hash = NodeHash::from_hex(hash_hex)?;

        let link = self.find_link(tree, hash)?;
        let old = self
            .store
            .lookup_node(hash)?
            .ok_or_else(|| OrgError::UnknownNode(hash.as_hex()))?;

        let new = self
            .store
            .resolve_or_create_node(new_name, old.depth, link.parent_hash)?;

        if self
            .store
            .replace_tree_link(tree, hash, new.hash, link.parent_hash)?
        {
            Ok(Some(new))
        } else {
            Ok(None)
        }
    }

    /// Removes a node from the working tree.
    ///
    /// With `recursive`, the whole subtree goes; otherwise only this
    /// placement is removed and its children become roots. Returns the
    /// number of placements removed.
    pub fn remove_node(&self, hash_hex: &str, recursive: bool) -> Result<usize> {
        let tree = self.refs.read_tree()?;
        let hash = NodeHash::from_hex(hash_hex)?;

        if recursive {
            self.store.delete_tree_subtree(tree, hash)
        } else {
            self.store.delete_tree_link(tree, hash)?;
            Ok(1)
        }
    }

    /// Materializes the working tree.
    pub fn working_forest(&self) -> Result<Vec<TreeNode>> {
        let tree = self.refs.read_tree()?;
        snapshot::materialize(&self.store, tree)
    }

    /// Materializes the snapshot recorded by a commit.
    ///
    /// # Errors
    ///
    /// `UnknownCommit` if the commit does not exist.
    pub fn commit_forest(&self, commit_id: CommitId) -> Result<Vec<TreeNode>> {
        let commit = self.require_commit(commit_id)?;
        snapshot::materialize(&self.store, commit.tree_id)
    }

    /// Commits the working tree as a new immutable snapshot and advances
    /// HEAD. The working tree keeps its id and stays editable.
    ///
    /// # Errors
    ///
    /// `UnknownTree` if the working tree is empty.
    pub fn commit(&self, message: Option<&str>, author: Option<&str>) -> Result<Commit> {
        let tree = self.refs.read_tree()?;
        let author = author.unwrap_or(&self.config.identity.author);
        let parent = self.refs.read_head()?;

        let commit = self
            .store
            .commit_tree(tree, author, message, parent, self.now_ms())?;
        self.refs.write_head(commit.id)?;

        info!(commit = %commit.id, "committed working tree");
        Ok(commit)
    }

    /// Restores the working tree from a commit's snapshot.
    ///
    /// The snapshot is copied under a fresh tree id, so editing the
    /// restored tree cannot touch history. Returns the new working tree
    /// id.
    ///
    /// # Errors
    ///
    /// `UnknownCommit` if the commit does not exist.
    pub fn checkout(&self, commit_id: CommitId) -> Result<TreeId> {
        let commit = self.require_commit(commit_id)?;
        let tree = self.store.clone_tree(commit.tree_id)?;
        self.refs.write_tree(tree)?;

        info!(commit = %commit_id, tree = %tree, "checked out commit");
        Ok(tree)
    }

    /// Lists history entries matching the filter, newest first, with
    /// tag and shared-line annotations.
    pub fn log(&self, filter: &CommitFilter) -> Result<Vec<LogEntry>> {
        let shared: HashSet<CommitId> = self
            .store
            .list_shares()?
            .into_iter()
            .map(|s| s.commit_id)
            .collect();

        let mut entries = Vec::new();
        for commit in self.store.list_commits(filter)? {
            let tag = self.store.lookup_tag(commit.id)?;
            let is_shared = shared.contains(&commit.id);
            entries.push(LogEntry {
                commit,
                tag,
                shared: is_shared,
            });
        }
        Ok(entries)
    }

    /// Looks up a commit by id.
    pub fn lookup_commit(&self, commit_id: CommitId) -> Result<Option<Commit>> {
        self.store.lookup_commit(commit_id)
    }

    /// Attaches a tag to a commit.
    pub fn tag(&self, commit_id: CommitId, name: &str) -> Result<Tag> {
        self.store.insert_tag(commit_id, name)
    }

    /// Publishes a commit to the shared line.
    pub fn share(&self, commit_id: CommitId, note: Option<&str>) -> Result<Share> {
        self.store.insert_share(commit_id, note, self.now_ms())
    }

    /// Lists share records, oldest first.
    pub fn shares(&self) -> Result<Vec<Share>> {
        self.store.list_shares()
    }

    /// Returns the share at the shared frontier, if any.
    pub fn latest_share(&self) -> Result<Option<Share>> {
        self.store.latest_share()
    }

    /// Merges the working tree against a remote commit over a common
    /// base commit.
    ///
    /// # Errors
    ///
    /// `UnknownCommit` if either commit does not exist.
    pub fn merge_working(&self, base: CommitId, remote: CommitId) -> Result<MergeOutcome> {
        let base_commit = self.require_commit(base)?;
        let remote_commit = self.require_commit(remote)?;
        let tree = self.refs.read_tree()?;

        let base_rows = snapshot::flatten(&self.store, base_commit.tree_id)?;
        let local_rows = snapshot::flatten(&self.store, tree)?;
        let remote_rows = snapshot::flatten(&self.store, remote_commit.tree_id)?;

        Ok(three_way_merge(&base_rows, &local_rows, &remote_rows))
    }

    /// Merges three commits' snapshots.
    ///
    /// # Errors
    ///
    /// `UnknownCommit` if any of them does not exist.
    pub fn merge_commits(
        &self,
        base: CommitId,
        local: CommitId,
        remote: CommitId,
    ) -> Result<MergeOutcome> {
        let base_commit = self.require_commit(base)?;
        let local_commit = self.require_commit(local)?;
        let remote_commit = self.require_commit(remote)?;

        let base_rows = snapshot::flatten(&self.store, base_commit.tree_id)?;
        let local_rows = snapshot::flatten(&self.store, local_commit.tree_id)?;
        let remote_rows = snapshot::flatten(&self.store, remote_commit.tree_id)?;

        Ok(three_way_merge(&base_rows, &local_rows, &remote_rows))
    }

    /// Applies an auto-merge delta onto the working tree's rows, commits
    /// the result as a new snapshot, advances HEAD, and resets the
    /// working tree to it.
    ///
    /// The delta only carries rows that changed somewhere; rows the
    /// working tree already holds are kept as they are unless the delta
    /// overrides them by id.
    ///
    /// # Errors
    ///
    /// `Validation` if the combined row set is empty or malformed.
    pub fn apply_merge(
        &self,
        delta: &[MergeNode],
        message: Option<&str>,
        author: Option<&str>,
    ) -> Result<Commit> {
        let author = author.unwrap_or(&self.config.identity.author);
        let parent = self.refs.read_head()?;

        let tree = self.refs.read_tree()?;
        let mut rows = snapshot::flatten(&self.store, tree)?;
        for row in delta {
            match rows.iter_mut().find(|r| r.id == row.id) {
                Some(existing) => *existing = row.clone(),
                None => rows.push(row.clone()),
            }
        }

        let draft_nodes: Vec<DraftNode> = rows
            .iter()
            .map(|row| DraftNode {
                id: row.id.clone(),
                name: row.name.clone(),
                depth: row.depth,
                parent_id: row.parent_id.clone(),
                fingerprint: row.fingerprint,
            })
            .collect();

        let commit = self
            .store
            .commit_draft(&draft_nodes, author, message, parent, self.now_ms())?;
        self.refs.write_head(commit.id)?;

        let tree = self.store.clone_tree(commit.tree_id)?;
        self.refs.write_tree(tree)?;

        info!(commit = %commit.id, rows = delta.len(), "applied merge delta");
        Ok(commit)
    }

    fn require_commit(&self, commit_id: CommitId) -> Result<Commit> {
        self.store
            .lookup_commit(commit_id)?
            .ok_or_else(|| OrgError::UnknownCommit(commit_id.to_string()))
    }

    fn find_link(&self, tree: TreeId, hash: NodeHash) -> Result<TreeLink> {
        self.store
            .tree_links(tree)?
            .into_iter()
            .find(|l| l.node_hash == hash)
            .ok_or_else(|| OrgError::UnknownNode(hash.as_hex()))
    }
}
