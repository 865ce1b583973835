//! CLI commands.

pub mod commit;
pub mod init;
pub mod log;
pub mod merge;
pub mod node;
pub mod share;
pub mod show;
pub mod tag;

use anyhow::{Context, Result};
use orgv_core::{CommitId, OrgError, OrgRepo};

/// Opens the repository in the current directory.
pub(crate) fn open_repo() -> Result<OrgRepo> {
    OrgRepo::open(".").context("Not an ORGV repository (run 'orgv init' first)")
}

/// Parses a commit id argument.
pub(crate) fn parse_commit(s: &str) -> Result<CommitId> {
    CommitId::parse(s).with_context(|| format!("invalid commit id: {}", s))
}

/// Wraps a core error, appending its recovery hint when it has one.
pub(crate) fn with_hint(e: OrgError) -> anyhow::Error {
    match e.recovery_suggestion() {
        Some(hint) => anyhow::Error::new(e).context(hint),
        None => e.into(),
    }
}

/// Renders a Unix-millisecond timestamp for display.
pub(crate) fn format_ts(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}
