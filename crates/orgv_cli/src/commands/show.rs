//! Show command for printing tree snapshots.

use super::{open_repo, parse_commit};
use anyhow::Result;
use console::style;
use orgv_core::TreeNode;

/// Print the working tree, or a commit's snapshot.
pub fn run(commit: Option<&str>, format: &str) -> Result<()> {
    let repo = open_repo()?;

    let forest = match commit {
        Some(id) => repo.commit_forest(parse_commit(id)?)?,
        None => repo.working_forest()?,
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&forest)?);
        }
        _ => {
            if forest.is_empty() {
                println!("(empty tree)");
                return Ok(());
            }
            let short = repo.config().display.short_hash_len;
            for root in &forest {
                print_subtree(root, 0, short);
            }
        }
    }
    Ok(())
}

fn print_subtree(node: &TreeNode, indent: usize, short: usize) {
    println!(
        "{}{} {}",
        "  ".repeat(indent),
        style(&node.name).bold(),
        style(&node.hash.as_hex()[..short]).dim()
    );
    for child in &node.children {
        print_subtree(child, indent + 1, short);
    }
}
