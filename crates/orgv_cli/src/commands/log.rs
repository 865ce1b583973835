//! Log command for listing commit history.

use super::{format_ts, open_repo};
use anyhow::Result;
use console::style;
use orgv_core::CommitFilter;
use serde_json::json;

/// Show commit history, newest first.
pub fn run(author: Option<&str>, limit: Option<usize>, format: &str) -> Result<()> {
    let repo = open_repo()?;

    let filter = CommitFilter {
        author: author.map(str::to_string),
        ids: None,
    };
    let limit = limit.unwrap_or(repo.config().display.log_limit);

    let entries = repo.log(&filter)?;
    let shown = entries.iter().take(limit);

    match format {
        "json" => {
            let rows: Vec<_> = shown
                .map(|e| {
                    json!({
                        "id": e.commit.id.to_string(),
                        "tree_id": e.commit.tree_id.to_string(),
                        "author": e.commit.author,
                        "message": e.commit.message,
                        "parent_commit_id": e.commit.parent_commit_id.map(|p| p.to_string()),
                        "created_at": e.commit.created_at,
                        "tag": e.tag.as_ref().map(|t| t.name.clone()),
                        "shared": e.shared,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        _ => {
            let mut any = false;
            for entry in shown {
                any = true;
                let mut markers = Vec::new();
                if let Some(tag) = &entry.tag {
                    markers.push(format!("{}", style(format!("[{}]", tag.name)).cyan()));
                }
                if entry.shared {
                    markers.push(format!("{}", style("(shared)").green()));
                }

                println!(
                    "{} {} {} {}",
                    style(entry.commit.id).yellow(),
                    format_ts(entry.commit.created_at),
                    entry.commit.author,
                    markers.join(" ")
                );
                if let Some(message) = &entry.commit.message {
                    println!("    {}", message);
                }
            }
            if !any {
                println!("No commits yet.");
            }
        }
    }
    Ok(())
}
