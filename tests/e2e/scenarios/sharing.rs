use crate::harness::Workspace;
use orgv_core::{CommitId, OrgError};

#[test]
fn test_tag_attach_and_duplicate() {
    let ws = Workspace::new();

    ws.add("CEO", None);
    let commit = ws.commit("initial");

    let tag = ws.repo().tag(commit.id, "q1-review").unwrap();
    assert_eq!(tag.commit_id, commit.id);

    let again = ws.repo().tag(commit.id, "other");
    assert!(matches!(again, Err(OrgError::DuplicateTag(_))));

    let missing = ws.repo().tag(CommitId::generate(), "nope");
    assert!(matches!(missing, Err(OrgError::UnknownCommit(_))));
}

#[test]
fn test_tag_name_bounds() {
    let ws = Workspace::new();

    ws.add("CEO", None);
    let commit = ws.commit("initial");

    assert!(matches!(
        ws.repo().tag(commit.id, ""),
        Err(OrgError::Validation(_))
    ));
    assert!(matches!(
        ws.repo().tag(commit.id, &"x".repeat(51)),
        Err(OrgError::Validation(_))
    ));

    // Exactly at the limit is fine.
    ws.repo().tag(commit.id, &"x".repeat(50)).unwrap();
}

#[test]
fn test_share_frontier_only_moves_forward() {
    let ws = Workspace::new();

    let root = ws.add("CEO", None);
    let c1 = ws.commit("first");
    ws.add("Sales", Some(&root.hash.as_hex()));
    let c2 = ws.commit("second");

    ws.repo().share(c2.id, Some("publishing second")).unwrap();

    // c1 predates the frontier commit.
    let stale = ws.repo().share(c1.id, None);
    assert!(matches!(stale, Err(OrgError::StaleCommit { .. })));

    // Re-sharing the frontier itself is a different rejection.
    let duplicate = ws.repo().share(c2.id, None);
    assert!(matches!(duplicate, Err(OrgError::AlreadyShared(_))));

    // A newer commit moves the frontier.
    ws.add("Engineering", Some(&root.hash.as_hex()));
    let c3 = ws.commit("third");
    ws.repo().share(c3.id, None).unwrap();

    let frontier = ws.repo().latest_share().unwrap().unwrap();
    assert_eq!(frontier.commit_id, c3.id);
    assert_eq!(ws.repo().shares().unwrap().len(), 2);
}

#[test]
fn test_share_rejects_backdated_commit() {
    let ws = Workspace::new();

    let root = ws.add("CEO", None);
    let c1 = ws.commit("first");
    ws.repo().share(c1.id, None).unwrap();

    // A commit whose clock reads earlier than the frontier commit's
    // cannot be shared, regardless of when the share is attempted.
    ws.rewind_clock(60_000);
    ws.add("Sales", Some(&root.hash.as_hex()));
    let backdated = ws.commit("backdated");

    let result = ws.repo().share(backdated.id, None);
    assert!(matches!(result, Err(OrgError::StaleCommit { .. })));
}

#[test]
fn test_share_unknown_commit() {
    let ws = Workspace::new();

    let result = ws.repo().share(CommitId::generate(), None);
    assert!(matches!(result, Err(OrgError::UnknownCommit(_))));
}
