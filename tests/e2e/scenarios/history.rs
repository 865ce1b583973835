use crate::harness::Workspace;
use orgv_core::{flatten, CommitFilter};

#[test]
fn test_commit_chain_and_log_order() {
    let ws = Workspace::new();

    let root = ws.add("CEO", None);
    let c1 = ws.commit("initial chart");

    ws.add("Sales", Some(&root.hash.as_hex()));
    let c2 = ws.commit("add sales");

    ws.add("Engineering", Some(&root.hash.as_hex()));
    let c3 = ws.commit("add engineering");

    assert_eq!(c1.parent_commit_id, None);
    assert_eq!(c2.parent_commit_id, Some(c1.id));
    assert_eq!(c3.parent_commit_id, Some(c2.id));

    let entries = ws.repo().log(&CommitFilter::default()).unwrap();
    let ids: Vec<_> = entries.iter().map(|e| e.commit.id).collect();
    assert_eq!(ids, vec![c3.id, c2.id, c1.id]);
}

#[test]
fn test_checkout_restores_old_snapshot() {
    let ws = Workspace::new();

    let root = ws.add("CEO", None);
    ws.add("Sales", Some(&root.hash.as_hex()));
    let c1 = ws.commit("two departments");

    ws.add("Marketing", Some(&root.hash.as_hex()));
    ws.commit("three departments");

    ws.repo().checkout(c1.id).unwrap();

    let forest = ws.repo().working_forest().unwrap();
    assert_eq!(forest.len(), 1);
    let names: Vec<&str> = forest[0].children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Sales"]);
}

#[test]
fn test_recommit_reuses_node_rows() {
    let ws = Workspace::new();

    let root = ws.add("CEO", None);
    ws.add("Sales", Some(&root.hash.as_hex()));
    let c1 = ws.commit("initial");

    let rows_before = ws.repo().store().node_count().unwrap();

    // Materialize the snapshot back into a working tree and commit it
    // again unchanged: same content, so zero new node rows.
    ws.repo().checkout(c1.id).unwrap();
    let c2 = ws.commit("recommit");

    assert_eq!(ws.repo().store().node_count().unwrap(), rows_before);

    let snapshot1 = flatten(ws.repo().store(), c1.tree_id).unwrap();
    let snapshot2 = flatten(ws.repo().store(), c2.tree_id).unwrap();
    assert_eq!(snapshot1, snapshot2);
}

#[test]
fn test_edit_creates_exactly_one_new_row() {
    let ws = Workspace::new();

    let root = ws.add("CEO", None);
    ws.add("Sales", Some(&root.hash.as_hex()));
    ws.commit("initial");

    let before = ws.repo().store().node_count().unwrap();

    // Renaming a leaf touches only that node's content.
    let sales_hash = ws
        .repo()
        .working_forest()
        .unwrap()[0]
        .children[0]
        .hash;
    ws.repo().edit_node(&sales_hash.as_hex(), "Revenue").unwrap();

    assert_eq!(ws.repo().store().node_count().unwrap(), before + 1);

    // History still resolves the old content.
    assert!(ws.repo().store().lookup_node(sales_hash).unwrap().is_some());
}
