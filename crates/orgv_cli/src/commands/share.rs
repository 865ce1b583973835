//! Share commands for the forward-only shared line.

use super::{format_ts, open_repo, parse_commit, with_hint};
use anyhow::Result;
use console::style;

/// Publish a commit to the shared line.
pub fn run(commit: &str, note: Option<&str>) -> Result<()> {
    let repo = open_repo()?;
    let commit_id = parse_commit(commit)?;

    match repo.share(commit_id, note) {
        Ok(share) => {
            println!("Shared commit {}", commit_id);
            println!("  At: {}", format_ts(share.shared_at));
            if let Some(note) = &share.note {
                println!("  Note: {}", note);
            }
            Ok(())
        }
        Err(e) => Err(with_hint(e)),
    }
}

/// List shared commits, oldest first.
pub fn list() -> Result<()> {
    let repo = open_repo()?;

    let shares = repo.shares()?;
    if shares.is_empty() {
        println!("Nothing shared yet.");
        return Ok(());
    }

    let frontier = repo.latest_share()?;
    for share in &shares {
        let marker = match &frontier {
            Some(f) if f.commit_id == share.commit_id => {
                format!(" {}", style("(frontier)").green())
            }
            _ => String::new(),
        };
        println!(
            "{} {}{}",
            style(share.commit_id).yellow(),
            format_ts(share.shared_at),
            marker
        );
        if let Some(note) = &share.note {
            println!("    {}", note);
        }
    }
    Ok(())
}
