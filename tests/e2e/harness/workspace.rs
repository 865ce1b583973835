//! Repository workspace with a deterministic clock.

use orgv_core::{Commit, Node, OrgRepo};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Milliseconds between two observations of the test clock.
const TICK_MS: i64 = 1_000;

/// A repository under test.
///
/// Each read of the clock advances it by one tick, so commit timestamps
/// are strictly increasing without ever touching the system clock.
pub struct Workspace {
    _tmp: TempDir,
    repo: OrgRepo,
    clock: Arc<AtomicI64>,
}

impl Workspace {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let clock = Arc::new(AtomicI64::new(1_700_000_000_000));

        let clock_ref = clock.clone();
        let repo = OrgRepo::init(tmp.path())
            .expect("init repository")
            .with_time_provider(move || clock_ref.fetch_add(TICK_MS, Ordering::SeqCst));

        Self {
            _tmp: tmp,
            repo,
            clock,
        }
    }

    pub fn repo(&self) -> &OrgRepo {
        &self.repo
    }

    /// Winds the clock back, for provoking stale-commit rejections.
    pub fn rewind_clock(&self, ms: i64) {
        self.clock.fetch_sub(ms, Ordering::SeqCst);
    }

    pub fn add(&self, name: &str, parent_hex: Option<&str>) -> Node {
        self.repo.add_node(name, parent_hex).expect("add node")
    }

    pub fn commit(&self, message: &str) -> Commit {
        self.repo
            .commit(Some(message), Some("alice"))
            .expect("commit working tree")
    }
}
