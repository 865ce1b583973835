//! Materialization of stored tree snapshots.
//!
//! A snapshot is just a set of placement links; this module joins them
//! with node content and rebuilds the forest, or flattens them into the
//! row form the merge engine consumes.

use crate::error::{OrgError, Result};
use crate::store::OrgStore;
use crate::types::{MergeNode, TreeId, TreeNode};
use crate::NodeHash;
use std::collections::HashMap;

/// Materializes a tree snapshot into its forest of root subtrees.
///
/// A link whose parent is null, or whose parent is not placed in the same
/// tree, becomes a root. Roots and children are ordered by name so the
/// same snapshot always materializes identically.
///
/// An empty or unknown tree materializes to an empty forest.
pub fn materialize(store: &OrgStore, tree_id: TreeId) -> Result<Vec<TreeNode>> {
    let links = store.tree_links(tree_id)?;

    let placed: HashMap<NodeHash, Option<NodeHash>> = links
        .iter()
        .map(|l| (l.node_hash, l.parent_hash))
        .collect();

    let mut children: HashMap<NodeHash, Vec<NodeHash>> = HashMap::new();
    let mut roots: Vec<NodeHash> = Vec::new();
    for link in &links {
        match link.parent_hash {
            Some(parent) if placed.contains_key(&parent) => {
                children.entry(parent).or_default().push(link.node_hash);
            }
            _ => roots.push(link.node_hash),
        }
    }

    let mut forest = Vec::with_capacity(roots.len());
    for root in roots {
        forest.push(build_subtree(store, root, &children)?);
    }
    forest.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(forest)
}

fn build_subtree(
    store: &OrgStore,
    hash: NodeHash,
    children: &HashMap<NodeHash, Vec<NodeHash>>,
) -> Result<TreeNode> {
    let node = store
        .lookup_node(hash)?
        .ok_or_else(|| OrgError::UnknownNode(hash.as_hex()))?;

    let mut subtrees = Vec::new();
    if let Some(child_hashes) = children.get(&hash) {
        for child in child_hashes {
            subtrees.push(build_subtree(store, *child, children)?);
        }
    }
    subtrees.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(TreeNode {
        hash,
        name: node.name,
        depth: node.depth,
        children: subtrees,
    })
}

/// Flattens a tree snapshot into merge rows.
///
/// Row ids are the nodes' hex hashes; parent ids point at the parent's
/// hex hash when the parent is placed in the same tree, and are null
/// otherwise. Fingerprints carry the content hash. Rows come out sorted
/// by depth, then name.
pub fn flatten(store: &OrgStore, tree_id: TreeId) -> Result<Vec<MergeNode>> {
    let links = store.tree_links(tree_id)?;

    let placed: HashMap<NodeHash, ()> = links.iter().map(|l| (l.node_hash, ())).collect();

    let mut rows = Vec::with_capacity(links.len());
    for link in &links {
        let node = store
            .lookup_node(link.node_hash)?
            .ok_or_else(|| OrgError::UnknownNode(link.node_hash.as_hex()))?;

        let parent_id = link
            .parent_hash
            .filter(|p| placed.contains_key(p))
            .map(|p| p.as_hex());

        rows.push(MergeNode {
            id: link.node_hash.as_hex(),
            name: node.name,
            depth: node.depth,
            parent_id,
            fingerprint: Some(link.node_hash),
        });
    }

    rows.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.name.cmp(&b.name)));
    Ok(rows)
}
