//! Reference (pointer) management for HEAD and TREE.
//!
//! HEAD points at the latest commit; TREE points at the mutable working
//! tree. Both are single-line text files holding a uuid, written
//! atomically via temp file + rename.

use crate::error::{OrgError, Result};
use crate::types::{CommitId, TreeId};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Manages the repository's pointer files.
pub struct Refs {
    root: PathBuf,
}

impl Refs {
    /// Creates a new Refs manager for the given .orgv directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Reads the HEAD reference.
    ///
    /// Returns `None` before the first commit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRef` if the content is malformed.
    pub fn read_head(&self) -> Result<Option<CommitId>> {
        let path = self.root.join("HEAD");

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let id = CommitId::parse(content.trim()).map_err(|_| OrgError::InvalidRef {
            path: path.clone(),
            reason: "expected a commit uuid".to_string(),
        })?;
        Ok(Some(id))
    }

    /// Writes the HEAD reference atomically.
    pub fn write_head(&self, id: CommitId) -> Result<()> {
        self.write_ref_file(&self.root.join("HEAD"), &id.to_string())
    }

    /// Reads the TREE reference pointing at the working tree.
    ///
    /// # Errors
    ///
    /// Returns `RefNotFound` if TREE doesn't exist (repository not
    /// initialized). Returns `InvalidRef` if the content is malformed.
    pub fn read_tree(&self) -> Result<TreeId> {
        let path = self.root.join("TREE");

        if !path.exists() {
            return Err(OrgError::RefNotFound("TREE".to_string()));
        }

        let content = fs::read_to_string(&path)?;
        TreeId::parse(content.trim()).map_err(|_| OrgError::InvalidRef {
            path: path.clone(),
            reason: "expected a tree uuid".to_string(),
        })
    }

    /// Writes the TREE reference atomically.
    pub fn write_tree(&self, id: TreeId) -> Result<()> {
        self.write_ref_file(&self.root.join("TREE"), &id.to_string())
    }

    /// Writes a single-line ref file atomically.
    ///
    /// Uses temp file + fsync + rename for crash safety.
    fn write_ref_file(&self, path: &Path, value: &str) -> Result<()> {
        let tmp_path = path.with_extension("tmp");

        {
            let mut file = File::create(&tmp_path)?;
            writeln!(file, "{}", value)?;
            file.sync_all()?;
        }

        fs::rename(&tmp_path, path)?;

        // fsync parent directory (Unix-specific for crash safety)
        #[cfg(unix)]
        {
            if let Some(parent) = path.parent() {
                if let Ok(dir_file) = File::open(parent) {
                    let _ = dir_file.sync_all();
                }
            }
        }

        Ok(())
    }
}
