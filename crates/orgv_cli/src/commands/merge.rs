//! Merge command: three-way merge against a remote commit.

use super::{open_repo, parse_commit, with_hint};
use anyhow::Result;
use console::style;
use orgv_core::{Conflict, MergeNode};

/// Run a three-way merge and report the outcome.
///
/// By default the local side is the working tree; `--local` substitutes
/// another commit's snapshot. With `--apply` and a clean outcome, the
/// auto-merged delta is committed.
pub fn run(
    base: &str,
    remote: &str,
    local: Option<&str>,
    apply: bool,
    message: Option<&str>,
    format: &str,
) -> Result<()> {
    let repo = open_repo()?;

    let base_id = parse_commit(base)?;
    let remote_id = parse_commit(remote)?;

    let outcome = match local {
        Some(local) => repo.merge_commits(base_id, parse_commit(local)?, remote_id)?,
        None => repo.merge_working(base_id, remote_id)?,
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        if outcome.auto_merged.is_empty() && outcome.conflicts.is_empty() {
            println!("Nothing to merge: all three sides agree.");
        }
        for row in &outcome.auto_merged {
            println!("{} {}", style("auto").green(), describe_row(row));
        }
        for conflict in &outcome.conflicts {
            println!("{} {}", style("conflict").red().bold(), describe_conflict(conflict));
        }
    }

    if !outcome.conflicts.is_empty() {
        if apply {
            anyhow::bail!(
                "cannot apply: {} conflict(s) need resolution",
                outcome.conflicts.len()
            );
        }
        return Ok(());
    }

    if apply {
        let commit = repo
            .apply_merge(&outcome.auto_merged, message, None)
            .map_err(with_hint)?;
        println!("Merged into commit {}", commit.id);
    }

    Ok(())
}

fn describe_row(row: &MergeNode) -> String {
    format!("{} (depth {})", row.name, row.depth)
}

fn describe_conflict(conflict: &Conflict) -> String {
    let side = |node: &Option<MergeNode>| -> String {
        node.as_ref()
            .map(|n| n.name.clone())
            .unwrap_or_else(|| "(deleted)".to_string())
    };
    format!(
        "base: {} / local: {} / remote: {}",
        side(&conflict.base),
        side(&conflict.local),
        side(&conflict.remote)
    )
}
