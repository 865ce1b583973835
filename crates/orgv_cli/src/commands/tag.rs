//! Tag command for annotating commits.

use super::{open_repo, parse_commit, with_hint};
use anyhow::Result;

/// Attach a tag to a commit.
pub fn run(commit: &str, name: &str) -> Result<()> {
    let repo = open_repo()?;
    let commit_id = parse_commit(commit)?;

    match repo.tag(commit_id, name) {
        Ok(tag) => {
            println!("Tagged commit {} as '{}'", commit_id, tag.name);
            Ok(())
        }
        Err(e) => Err(with_hint(e)),
    }
}
