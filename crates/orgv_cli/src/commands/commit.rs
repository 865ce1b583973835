//! Commit and checkout commands.

use super::{open_repo, parse_commit};
use anyhow::Result;

/// Commit the working tree as a new immutable snapshot.
pub fn run(message: Option<&str>, author: Option<&str>) -> Result<()> {
    let repo = open_repo()?;

    let commit = repo.commit(message, author)?;

    println!("Created commit {}", commit.id);
    println!("  Snapshot: {}", commit.tree_id);
    println!("  Author:   {}", commit.author);
    if let Some(message) = &commit.message {
        println!("  Message:  {}", message);
    }

    Ok(())
}

/// Restore the working tree from a commit's snapshot.
pub fn checkout(commit: &str) -> Result<()> {
    let repo = open_repo()?;

    let commit_id = parse_commit(commit)?;
    let tree = repo.checkout(commit_id)?;

    println!("Restored working tree from commit {}", commit_id);
    println!("  Working tree: {}", tree);

    Ok(())
}
