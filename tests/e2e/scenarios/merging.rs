use crate::harness::Workspace;
use orgv_core::{flatten, three_way_merge, Draft, MergeNode};

fn row_id(rows: &[MergeNode], name: &str) -> String {
    rows.iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("no row named {}", name))
        .id
        .clone()
}

#[test]
fn test_disjoint_adds_merge_clean() {
    let ws = Workspace::new();

    let root = ws.add("CEO", None);
    ws.add("Sales", Some(&root.hash.as_hex()));
    let base = ws.commit("base");

    // Remote line adds Engineering.
    ws.add("Engineering", Some(&root.hash.as_hex()));
    let remote = ws.commit("remote adds engineering");

    // Local line starts over from base and adds Marketing.
    ws.repo().checkout(base.id).unwrap();
    ws.add("Marketing", Some(&root.hash.as_hex()));

    let outcome = ws.repo().merge_working(base.id, remote.id).unwrap();
    assert!(outcome.conflicts.is_empty());
    assert_eq!(outcome.auto_merged.len(), 2);

    let merged = ws
        .repo()
        .apply_merge(&outcome.auto_merged, Some("merge remote"), None)
        .unwrap();

    let forest = ws.repo().commit_forest(merged.id).unwrap();
    let names: Vec<&str> = forest[0].children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Engineering", "Marketing", "Sales"]);
}

#[test]
fn test_rename_rename_conflict() {
    let ws = Workspace::new();

    let root = ws.add("CEO", None);
    ws.add("Sales", Some(&root.hash.as_hex()));
    let base = ws.commit("base");

    let base_rows = flatten(ws.repo().store(), base.tree_id).unwrap();
    let sales = row_id(&base_rows, "Sales");

    let mut local = Draft::from_rows(base_rows.clone());
    local
        .update_node(&sales, "Sales EMEA", 2, Some(&row_id(&base_rows, "CEO")))
        .unwrap();

    let mut remote = Draft::from_rows(base_rows.clone());
    remote
        .update_node(&sales, "Sales Global", 2, Some(&row_id(&base_rows, "CEO")))
        .unwrap();

    let outcome = three_way_merge(&base_rows, &local.merge_rows(), &remote.merge_rows());

    assert!(outcome.auto_merged.is_empty());
    assert_eq!(outcome.conflicts.len(), 1);

    let conflict = &outcome.conflicts[0];
    assert_eq!(conflict.base.as_ref().unwrap().name, "Sales");
    assert_eq!(conflict.local.as_ref().unwrap().name, "Sales EMEA");
    assert_eq!(conflict.remote.as_ref().unwrap().name, "Sales Global");
}

#[test]
fn test_delete_vs_edit_conflict() {
    let ws = Workspace::new();

    let root = ws.add("CEO", None);
    ws.add("Sales", Some(&root.hash.as_hex()));
    let base = ws.commit("base");

    let base_rows = flatten(ws.repo().store(), base.tree_id).unwrap();
    let sales = row_id(&base_rows, "Sales");

    let mut local = Draft::from_rows(base_rows.clone());
    local.delete_node(&sales).unwrap();

    let mut remote = Draft::from_rows(base_rows.clone());
    remote
        .update_node(&sales, "Revenue", 2, Some(&row_id(&base_rows, "CEO")))
        .unwrap();

    let outcome = three_way_merge(&base_rows, &local.merge_rows(), &remote.merge_rows());

    assert!(outcome.auto_merged.is_empty());
    assert_eq!(outcome.conflicts.len(), 1);
    assert!(outcome.conflicts[0].local.is_none());
    assert_eq!(outcome.conflicts[0].remote.as_ref().unwrap().name, "Revenue");
}

#[test]
fn test_one_sided_edit_stays_out_of_conflicts() {
    let ws = Workspace::new();

    let root = ws.add("CEO", None);
    ws.add("Sales", Some(&root.hash.as_hex()));
    let base = ws.commit("base");

    let base_rows = flatten(ws.repo().store(), base.tree_id).unwrap();
    let sales = row_id(&base_rows, "Sales");

    let mut local = Draft::from_rows(base_rows.clone());
    local
        .update_node(&sales, "Revenue", 2, Some(&row_id(&base_rows, "CEO")))
        .unwrap();

    let remote = Draft::from_rows(base_rows.clone());

    let outcome = three_way_merge(&base_rows, &local.merge_rows(), &remote.merge_rows());

    assert!(outcome.conflicts.is_empty());
    // The delta carries only the edited row; the untouched CEO row is
    // implied by the base.
    assert_eq!(outcome.auto_merged.len(), 1);
    assert_eq!(outcome.auto_merged[0].name, "Revenue");
}

#[test]
fn test_conflicted_parent_withholds_new_descendants() {
    let ws = Workspace::new();

    let root = ws.add("CEO", None);
    ws.add("Sales", Some(&root.hash.as_hex()));
    let base = ws.commit("base");

    let base_rows = flatten(ws.repo().store(), base.tree_id).unwrap();
    let sales = row_id(&base_rows, "Sales");
    let ceo = row_id(&base_rows, "CEO");

    let mut local = Draft::from_rows(base_rows.clone());
    local.update_node(&sales, "Sales EMEA", 2, Some(&ceo)).unwrap();

    let mut remote = Draft::from_rows(base_rows.clone());
    remote
        .update_node(&sales, "Sales Global", 2, Some(&ceo))
        .unwrap();
    remote.add_node("Enterprise", 3, Some(&sales)).unwrap();

    let outcome = three_way_merge(&base_rows, &local.merge_rows(), &remote.merge_rows());

    // The new child rides on a conflicted ancestor: it must neither
    // auto-merge nor surface as its own conflict.
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].base.as_ref().unwrap().name, "Sales");
    assert!(outcome.auto_merged.is_empty());
}
