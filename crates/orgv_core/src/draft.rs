//! Draft editing sessions.
//!
//! A draft is an in-memory working copy of a snapshot. Rows loaded from a
//! snapshot keep their hash-hex ids and fingerprints; rows added in the
//! session get ephemeral uuid ids and no fingerprint. Edits never touch
//! the fingerprint, so the merge engine can still tell what the row
//! looked like at its base.

use crate::error::{OrgError, Result};
use crate::types::MergeNode;
use crate::NodeHash;
use std::collections::HashSet;
use uuid::Uuid;

/// One draft row.
///
/// Parent references use draft ids, not content hashes, so reparenting a
/// node does not invalidate its children's references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftNode {
    /// Draft-local identifier (hash hex for loaded rows, uuid otherwise).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Depth in the chart.
    pub depth: u32,
    /// Parent row's draft id, if any.
    pub parent_id: Option<String>,
    /// Content hash as of the base snapshot; `None` for new rows.
    pub fingerprint: Option<NodeHash>,
}

/// An editable working copy of a snapshot.
///
/// # Examples
///
/// ```
/// use orgv_core::Draft;
///
/// let mut draft = Draft::new();
/// let root = draft.add_node("CEO", 1, None).unwrap();
/// draft.add_node("Sales", 2, Some(&root)).unwrap();
/// assert_eq!(draft.nodes().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Draft {
    nodes: Vec<DraftNode>,
}

impl Draft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a draft from snapshot or merge rows, preserving their ids
    /// and fingerprints.
    pub fn from_rows(rows: impl IntoIterator<Item = MergeNode>) -> Self {
        let nodes = rows
            .into_iter()
            .map(|row| DraftNode {
                id: row.id,
                name: row.name,
                depth: row.depth,
                parent_id: row.parent_id,
                fingerprint: row.fingerprint,
            })
            .collect();
        Self { nodes }
    }

    /// Returns the draft rows.
    pub fn nodes(&self) -> &[DraftNode] {
        &self.nodes
    }

    /// Returns true if the draft has no rows.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a row by id.
    pub fn get(&self, id: &str) -> Option<&DraftNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Adds a new row and returns its ephemeral id.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty name, zero depth, or an unknown parent.
    pub fn add_node(&mut self, name: &str, depth: u32, parent_id: Option<&str>) -> Result<String> {
        self.validate_content(name, depth)?;
        if let Some(parent) = parent_id {
            if self.get(parent).is_none() {
                return Err(OrgError::Validation(format!(
                    "parent {} is not in the draft",
                    parent
                )));
            }
        }

        let id = Uuid::new_v4().to_string();
        self.nodes.push(DraftNode {
            id: id.clone(),
            name: name.to_string(),
            depth,
            parent_id: parent_id.map(str::to_string),
            fingerprint: None,
        });
        Ok(id)
    }

    /// Rewrites a row's name, depth, and parent. The fingerprint is left
    /// as it was, so the row still compares against its base content.
    ///
    /// # Errors
    ///
    /// `UnknownNode` if the row does not exist; `Validation` for bad
    /// content, an unknown parent, or a parent that would form a cycle.
    pub fn update_node(
        &mut self,
        id: &str,
        name: &str,
        depth: u32,
        parent_id: Option<&str>,
    ) -> Result<()> {
        self.validate_content(name, depth)?;
        if self.get(id).is_none() {
            return Err(OrgError::UnknownNode(id.to_string()));
        }

        if let Some(parent) = parent_id {
            if self.get(parent).is_none() {
                return Err(OrgError::Validation(format!(
                    "parent {} is not in the draft",
                    parent
                )));
            }
            if parent == id || self.descendants_of(id).contains(parent) {
                return Err(OrgError::Validation(format!(
                    "cannot parent {} under its own subtree",
                    id
                )));
            }
        }

        for node in &mut self.nodes {
            if node.id == id {
                node.name = name.to_string();
                node.depth = depth;
                node.parent_id = parent_id.map(str::to_string);
                break;
            }
        }
        Ok(())
    }

    /// Removes a row and its entire subtree, returning how many rows
    /// were removed.
    ///
    /// # Errors
    ///
    /// `UnknownNode` if the row does not exist.
    pub fn delete_node(&mut self, id: &str) -> Result<usize> {
        if self.get(id).is_none() {
            return Err(OrgError::UnknownNode(id.to_string()));
        }

        let mut doomed = self.descendants_of(id);
        doomed.insert(id.to_string());

        let before = self.nodes.len();
        self.nodes.retain(|n| !doomed.contains(&n.id));
        Ok(before - self.nodes.len())
    }

    /// Returns the draft as merge rows.
    pub fn merge_rows(&self) -> Vec<MergeNode> {
        self.nodes
            .iter()
            .map(|n| MergeNode {
                id: n.id.clone(),
                name: n.name.clone(),
                depth: n.depth,
                parent_id: n.parent_id.clone(),
                fingerprint: n.fingerprint,
            })
            .collect()
    }

    /// Collects the ids of every row below the given one.
    fn descendants_of(&self, id: &str) -> HashSet<String> {
        let mut found: HashSet<String> = HashSet::new();
        let mut frontier = vec![id.to_string()];
        while let Some(current) = frontier.pop() {
            for node in &self.nodes {
                if node.parent_id.as_deref() == Some(current.as_str())
                    && found.insert(node.id.clone())
                {
                    frontier.push(node.id.clone());
                }
            }
        }
        found
    }

    fn validate_content(&self, name: &str, depth: u32) -> Result<()> {
        if name.trim().is_empty() {
            return Err(OrgError::Validation("node name must not be empty".into()));
        }
        if depth == 0 {
            return Err(OrgError::Validation("node depth must be >= 1".into()));
        }
        Ok(())
    }
}
