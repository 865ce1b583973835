//! Three-way merge of organization-node collections.
//!
//! Reconciles a common-ancestor snapshot (`base`), the local working draft
//! (`local`), and the latest fetched snapshot (`remote`) into an
//! auto-merged delta plus an explicit conflict set. The computation is a
//! pure, total function over three flat collections; it performs no I/O
//! and tolerates malformed input (a parent id missing from its own
//! collection just terminates the ancestor walk there).

use crate::types::MergeNode;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// One irreconcilable difference surfaced to the caller.
///
/// At least one of `local` / `remote` is always present; a pure base-only
/// disappearance with no competing edit is not a conflict.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Conflict {
    /// The common-ancestor version, if the node existed there.
    pub base: Option<MergeNode>,
    /// The local ("ours") version, if present.
    pub local: Option<MergeNode>,
    /// The remote ("theirs") version, if present.
    pub remote: Option<MergeNode>,
}

/// Result of a three-way merge.
///
/// `auto_merged` is a delta, not a full restatement: rows present and
/// unchanged in all three inputs are omitted, so callers union it with
/// `base` to obtain a complete tree (or treat it as the new working
/// delta).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct MergeOutcome {
    /// Rows merged without intervention.
    pub auto_merged: Vec<MergeNode>,
    /// Conflict groups requiring explicit resolution.
    pub conflicts: Vec<Conflict>,
}

/// Raw per-id conflict candidate before absorption and deduplication.
struct Candidate<'a> {
    id: &'a str,
    base: Option<&'a MergeNode>,
    local: Option<&'a MergeNode>,
    remote: Option<&'a MergeNode>,
}

/// Computes the three-way merge of `base`, `local`, and `remote`.
///
/// Ids are opaque comparison keys, stable only within one collection:
/// persisted snapshots key by content-hash hex while drafts use ephemeral
/// ids. Rows carry an optional content fingerprint compared solely for
/// equality.
pub fn three_way_merge(
    base: &[MergeNode],
    local: &[MergeNode],
    remote: &[MergeNode],
) -> MergeOutcome {
    let base_map = index_by_id(base);
    let local_map = index_by_id(local);
    let remote_map = index_by_id(remote);

    // Union of ids, first-seen order: base, then local, then remote.
    let mut all_ids: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for node in base.iter().chain(local).chain(remote) {
        if seen.insert(&node.id) {
            all_ids.push(&node.id);
        }
    }

    // Step 1: raw conflict candidates keyed by id. An id is clean only if
    // it is present in all three collections with identical content.
    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    for &id in &all_ids {
        let b = base_map.get(id).copied();
        let l = local_map.get(id).copied();
        let r = remote_map.get(id).copied();

        if let (Some(b), Some(l), Some(r)) = (b, l, r) {
            if same_row(b, l) && same_row(b, r) {
                continue;
            }
        }

        candidates.push(Candidate {
            id,
            base: b,
            local: l,
            remote: r,
        });
    }

    let candidate_ids: HashSet<&str> = candidates.iter().map(|c| c.id).collect();

    // Step 2: ancestor-conflict absorption. A candidate beneath another
    // candidate (walking parents through the base collection) is dropped
    // unless its own content differs pairwise by name or fingerprint;
    // structural fallout of an ancestor's rename/move stays with the
    // ancestor.
    let absorbed: Vec<&Candidate<'_>> = candidates
        .iter()
        .filter(|c| {
            let Some(node) = c.base.or(c.local).or(c.remote) else {
                return false;
            };
            if has_ancestor_in(node, &base_map, &candidate_ids) {
                pairwise_differs(c.base, c.local, c.remote)
            } else {
                true
            }
        })
        .collect();

    // Step 3: re-key by display name, merging partial appearances. The
    // same logical node can surface under different ids (ephemeral id vs
    // content hash); the name is the stable identity for resolution.
    let mut by_name: Vec<Conflict> = Vec::new();
    let mut name_slots: HashMap<String, usize> = HashMap::new();
    for c in &absorbed {
        let key = c
            .base
            .or(c.local)
            .or(c.remote)
            .map(|n| n.name.clone())
            .unwrap_or_default();

        match name_slots.get(&key) {
            Some(&slot) => {
                let entry = &mut by_name[slot];
                if entry.base.is_none() {
                    entry.base = c.base.cloned();
                }
                if entry.local.is_none() {
                    entry.local = c.local.cloned();
                }
                if entry.remote.is_none() {
                    entry.remote = c.remote.cloned();
                }
            }
            None => {
                name_slots.insert(key, by_name.len());
                by_name.push(Conflict {
                    base: c.base.cloned(),
                    local: c.local.cloned(),
                    remote: c.remote.cloned(),
                });
            }
        }
    }

    // Union view for parent walks: local and remote placements override
    // base ones under the same id.
    let mut union_map: HashMap<&str, &MergeNode> = HashMap::new();
    for node in base.iter().chain(local).chain(remote) {
        union_map.insert(&node.id, node);
    }

    // Step 4: parent-conflict dominance. Only the top-most conflicting
    // node per subtree is surfaced; descendants of an accepted conflict
    // stay pending until it is resolved, unless they diverge by their own
    // content (same exemption as step 2, via the new placements this
    // time).
    let mut accepted_ids: HashSet<&str> = HashSet::new();
    let mut dominant: Vec<Conflict> = Vec::new();
    for entry in by_name {
        let under_accepted = entry
            .local
            .as_ref()
            .or(entry.remote.as_ref())
            .is_some_and(|node| has_ancestor_in(node, &union_map, &accepted_ids));
        if under_accepted
            && !pairwise_differs(
                entry.base.as_ref(),
                entry.local.as_ref(),
                entry.remote.as_ref(),
            )
        {
            continue;
        }
        if let Some(l) = &entry.local {
            if let Some((id, _)) = union_map.get_key_value(l.id.as_str()) {
                accepted_ids.insert(id);
            }
        }
        if let Some(r) = &entry.remote {
            if let Some((id, _)) = union_map.get_key_value(r.id.as_str()) {
                accepted_ids.insert(id);
            }
        }
        dominant.push(entry);
    }

    // Step 5: keep the entries that genuinely need a human: competing
    // divergent edits and deletion-versus-presence. One-sided additions,
    // identical two-sided additions, and convergent edits auto-merge in
    // step 6 instead; base-only disappearance is nobody's conflict.
    let conflicts: Vec<Conflict> = dominant.into_iter().filter(is_conflict).collect();

    let conflict_ids: HashSet<&str> = conflicts
        .iter()
        .flat_map(|c| [c.base.as_ref(), c.local.as_ref(), c.remote.as_ref()])
        .flatten()
        .filter_map(|n| union_map.get_key_value(n.id.as_str()).map(|(id, _)| *id))
        .collect();

    // Step 6: auto-merge every id that neither conflicts nor descends
    // from a conflicted node.
    let mut auto_merged: Vec<MergeNode> = Vec::new();
    for &id in &all_ids {
        if conflict_ids.contains(id) {
            continue;
        }
        if let Some(node) = union_map.get(id) {
            if has_ancestor_in(node, &union_map, &conflict_ids) {
                continue;
            }
        }

        let b = base_map.get(id).copied();
        let l = local_map.get(id).copied();
        let r = remote_map.get(id).copied();

        match (b, l, r) {
            // Added on exactly one side.
            (None, Some(l), None) => auto_merged.push(l.clone()),
            (None, None, Some(r)) => auto_merged.push(r.clone()),
            // Added on both sides: identical rows collapse to one; a
            // genuine divergence belongs to the conflict set already.
            (None, Some(l), Some(r)) => {
                if same_row(l, r) {
                    auto_merged.push(l.clone());
                } else {
                    warn!(id, "divergent two-sided add missing from conflict set");
                }
            }
            (Some(b), Some(l), Some(r)) => {
                let local_changed = !same_row(b, l);
                let remote_changed = !same_row(b, r);
                match (local_changed, remote_changed) {
                    (true, false) => auto_merged.push(l.clone()),
                    (false, true) => auto_merged.push(r.clone()),
                    // Unchanged rows are omitted: the result is a delta.
                    (false, false) => {}
                    (true, true) => {
                        if same_row(l, r) {
                            auto_merged.push(l.clone());
                        } else {
                            warn!(id, "divergent change missing from conflict set");
                        }
                    }
                }
            }
            // Base-only ids are dropped silently; other partial shapes
            // are already covered by the conflict set or were absorbed
            // into an ancestor's entry.
            _ => {}
        }
    }

    MergeOutcome {
        auto_merged,
        conflicts,
    }
}

fn index_by_id(nodes: &[MergeNode]) -> HashMap<&str, &MergeNode> {
    nodes.iter().map(|n| (n.id.as_str(), n)).collect()
}

/// Decides whether a surviving entry is an actual conflict or something
/// step 6 resolves on its own.
fn is_conflict(c: &Conflict) -> bool {
    match (&c.base, &c.local, &c.remote) {
        // Deleted on both sides, or never present anywhere.
        (_, None, None) => false,
        // Added on both sides: divergent content conflicts, identical
        // content merges once.
        (None, Some(l), Some(r)) => !same_row(l, r),
        // Added on exactly one side: clean.
        (None, _, _) => false,
        // Deleted on one side while still present on the other.
        (Some(_), None, Some(_)) | (Some(_), Some(_), None) => true,
        // Present everywhere: only a divergent two-sided change is left
        // for the caller; one-sided and convergent changes auto-merge.
        (Some(b), Some(l), Some(r)) => {
            !same_row(b, l) && !same_row(b, r) && !same_row(l, r)
        }
    }
}

/// True when two rows are structurally identical.
fn same_row(a: &MergeNode, b: &MergeNode) -> bool {
    a.fingerprint == b.fingerprint
        && a.name == b.name
        && a.parent_id == b.parent_id
        && a.depth == b.depth
}

/// True when any two present sides differ by name or fingerprint.
fn pairwise_differs(
    base: Option<&MergeNode>,
    local: Option<&MergeNode>,
    remote: Option<&MergeNode>,
) -> bool {
    let pairs = [(base, local), (base, remote), (local, remote)];
    pairs.iter().any(|(x, y)| match (x, y) {
        (Some(x), Some(y)) => x.name != y.name || x.fingerprint != y.fingerprint,
        _ => false,
    })
}

/// Walks the parent chain of `node` through `map`, reporting whether any
/// ancestor id is in `ids`. A parent id absent from `map` terminates the
/// walk.
fn has_ancestor_in(
    node: &MergeNode,
    map: &HashMap<&str, &MergeNode>,
    ids: &HashSet<&str>,
) -> bool {
    let mut current = node;
    while let Some(parent_id) = &current.parent_id {
        if ids.contains(parent_id.as_str()) {
            return true;
        }
        match map.get(parent_id.as_str()) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeHash;

    fn row(id: &str, name: &str, depth: u32, parent: Option<&str>) -> MergeNode {
        MergeNode {
            id: id.to_string(),
            name: name.to_string(),
            depth,
            parent_id: parent.map(str::to_string),
            fingerprint: Some(NodeHash::compute(name, depth, None)),
        }
    }

    fn renamed(node: &MergeNode, name: &str) -> MergeNode {
        // Drafts keep the seeded fingerprint after an edit; the change is
        // visible through the name.
        MergeNode {
            name: name.to_string(),
            ..node.clone()
        }
    }

    fn reparented(node: &MergeNode, parent: Option<&str>) -> MergeNode {
        MergeNode {
            parent_id: parent.map(str::to_string),
            ..node.clone()
        }
    }

    #[test]
    fn test_merge_identity() {
        let tree = vec![
            row("a", "CEO", 1, None),
            row("b", "Sales", 2, Some("a")),
            row("c", "Engineering", 2, Some("a")),
        ];

        let outcome = three_way_merge(&tree, &tree, &tree);
        assert!(outcome.auto_merged.is_empty());
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn test_merge_of_empty_collections() {
        let outcome = three_way_merge(&[], &[], &[]);
        assert!(outcome.auto_merged.is_empty());
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn test_disjoint_adds_merge_cleanly() {
        let base = vec![row("a", "CEO", 1, None)];
        let mut local = base.clone();
        local.push(row("draft-1", "Design", 2, Some("a")));
        let mut remote = base.clone();
        remote.push(row("x", "Support", 2, Some("a")));

        let outcome = three_way_merge(&base, &local, &remote);
        assert!(outcome.conflicts.is_empty());
        let names: Vec<&str> = outcome.auto_merged.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Design", "Support"]);
    }

    #[test]
    fn test_identical_two_sided_add_included_once() {
        let base = vec![row("a", "CEO", 1, None)];
        let added = row("n", "QA", 2, Some("a"));
        let mut local = base.clone();
        local.push(added.clone());
        let mut remote = base.clone();
        remote.push(added.clone());

        let outcome = three_way_merge(&base, &local, &remote);
        assert!(outcome.conflicts.is_empty());
        assert_eq!(outcome.auto_merged, vec![added]);
    }

    #[test]
    fn test_rename_conflict_detected() {
        let x = row("x", "Marketing", 2, None);
        let base = vec![x.clone()];
        let local = vec![renamed(&x, "Foo")];
        let remote = vec![renamed(&x, "Bar")];

        let outcome = three_way_merge(&base, &local, &remote);
        assert!(outcome.auto_merged.is_empty());
        assert_eq!(outcome.conflicts.len(), 1);
        let c = &outcome.conflicts[0];
        assert_eq!(c.base.as_ref().unwrap().name, "Marketing");
        assert_eq!(c.local.as_ref().unwrap().name, "Foo");
        assert_eq!(c.remote.as_ref().unwrap().name, "Bar");
    }

    #[test]
    fn test_one_sided_change_taken() {
        let x = row("x", "Ops", 2, None);
        let base = vec![x.clone()];
        let local = vec![renamed(&x, "Operations")];
        let remote = vec![x.clone()];

        let outcome = three_way_merge(&base, &local, &remote);
        assert!(outcome.conflicts.is_empty());
        assert_eq!(outcome.auto_merged.len(), 1);
        assert_eq!(outcome.auto_merged[0].name, "Operations");
    }

    #[test]
    fn test_convergent_change_taken_once() {
        let x = row("x", "Ops", 2, None);
        let base = vec![x.clone()];
        let local = vec![renamed(&x, "Operations")];
        let remote = vec![renamed(&x, "Operations")];

        let outcome = three_way_merge(&base, &local, &remote);
        assert!(outcome.conflicts.is_empty());
        assert_eq!(outcome.auto_merged.len(), 1);
        assert_eq!(outcome.auto_merged[0].name, "Operations");
    }

    #[test]
    fn test_base_only_disappearance_dropped_silently() {
        let base = vec![row("gone", "Legacy", 2, None)];

        let outcome = three_way_merge(&base, &[], &[]);
        assert!(outcome.auto_merged.is_empty());
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn test_delete_vs_presence_surfaces_conflict() {
        let x = row("x", "Ops", 2, None);
        let base = vec![x.clone()];
        let local = vec![x.clone()];

        // Remote deleted the node while local still carries it; the
        // disagreement goes to the caller.
        let outcome = three_way_merge(&base, &local, &[]);
        assert!(outcome.auto_merged.is_empty());
        assert_eq!(outcome.conflicts.len(), 1);
        assert!(outcome.conflicts[0].remote.is_none());
    }

    #[test]
    fn test_delete_vs_edit_surfaces_conflict() {
        let x = row("x", "Ops", 2, None);
        let base = vec![x.clone()];
        let local = vec![renamed(&x, "Operations")];

        let outcome = three_way_merge(&base, &local, &[]);
        assert!(outcome.auto_merged.is_empty());
        assert_eq!(outcome.conflicts.len(), 1);
        assert!(outcome.conflicts[0].remote.is_none());
        assert_eq!(outcome.conflicts[0].local.as_ref().unwrap().name, "Operations");
    }

    #[test]
    fn test_unchanged_rows_omitted_from_delta() {
        let base = vec![row("a", "CEO", 1, None), row("b", "Sales", 2, Some("a"))];
        let mut local = base.clone();
        local.push(row("draft-1", "Legal", 2, Some("a")));
        let remote = base.clone();

        let outcome = three_way_merge(&base, &local, &remote);
        // Only the addition appears; unchanged rows are the caller's to
        // union back in from base.
        assert_eq!(outcome.auto_merged.len(), 1);
        assert_eq!(outcome.auto_merged[0].name, "Legal");
    }

    #[test]
    fn test_ancestor_absorption_for_structural_drift() {
        let p = row("p", "Platform", 2, None);
        let c = row("c", "Tooling", 3, Some("p"));
        let base = vec![p.clone(), c.clone()];

        // Both sides renamed P differently; the child only drifted
        // structurally (remote re-parented it under the replacement
        // placement).
        let local = vec![renamed(&p, "Platform Eng"), c.clone()];
        let remote = vec![renamed(&p, "Core Platform"), reparented(&c, Some("p2"))];

        let outcome = three_way_merge(&base, &local, &remote);
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].base.as_ref().unwrap().name, "Platform");
        // The child is absorbed into the parent's conflict rather than
        // listed as its own; its one-sided structural drift still merges.
        assert_eq!(outcome.auto_merged.len(), 1);
        assert_eq!(outcome.auto_merged[0].id, "c");
        assert_eq!(outcome.auto_merged[0].parent_id.as_deref(), Some("p2"));
    }

    #[test]
    fn test_child_with_own_rename_surfaces_separately() {
        let p = row("p", "Platform", 2, None);
        let c = row("c", "Tooling", 3, Some("p"));
        let base = vec![p.clone(), c.clone()];

        let local = vec![renamed(&p, "Platform Eng"), renamed(&c, "Build Tools")];
        let remote = vec![renamed(&p, "Core Platform"), renamed(&c, "Dev Tools")];

        let outcome = three_way_merge(&base, &local, &remote);
        let names: Vec<&str> = outcome
            .conflicts
            .iter()
            .map(|c| c.base.as_ref().unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["Platform", "Tooling"]);
    }

    #[test]
    fn test_name_key_deduplication() {
        // The same logical node surfaces under an ephemeral draft id
        // locally and a content-hash id remotely; the shared name folds
        // the two candidates into one conflict entry.
        let base = vec![row("a", "CEO", 1, None)];
        let mut local = base.clone();
        local.push(MergeNode {
            id: "draft-7".to_string(),
            name: "Finance".to_string(),
            depth: 2,
            parent_id: Some("a".to_string()),
            // Newly drafted nodes carry no fingerprint yet.
            fingerprint: None,
        });
        let mut remote = base.clone();
        remote.push(reparented(&row("h-finance", "Finance", 2, None), Some("a")));

        let outcome = three_way_merge(&base, &local, &remote);
        assert_eq!(outcome.conflicts.len(), 1);
        let c = &outcome.conflicts[0];
        assert_eq!(c.local.as_ref().unwrap().id, "draft-7");
        assert_eq!(c.remote.as_ref().unwrap().id, "h-finance");
    }

    #[test]
    fn test_descendants_of_conflicts_withheld() {
        let p = row("p", "Platform", 2, None);
        let base = vec![p.clone()];
        // Conflicting rename of P on both sides, plus a clean local
        // addition beneath it.
        let local = vec![renamed(&p, "Platform Eng"), row("draft-1", "SRE", 3, Some("p"))];
        let remote = vec![renamed(&p, "Core Platform")];

        let outcome = three_way_merge(&base, &local, &remote);
        assert_eq!(outcome.conflicts.len(), 1);
        // The SRE addition hangs beneath the conflicted node and stays
        // pending.
        assert!(outcome.auto_merged.is_empty());
    }

    #[test]
    fn test_broken_parent_chain_tolerated() {
        // Parent id that resolves nowhere: the walk terminates and the
        // row merges normally.
        let base = vec![];
        let local = vec![row("orphan", "Floating", 4, Some("missing"))];

        let outcome = three_way_merge(&base, &local, &[]);
        assert_eq!(outcome.auto_merged.len(), 1);
        assert!(outcome.conflicts.is_empty());
    }
}
