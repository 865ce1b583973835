//! Working-tree node commands: add, edit, rm.

use super::open_repo;
use anyhow::Result;
use console::style;

pub fn add(name: &str, parent: Option<&str>) -> Result<()> {
    let repo = open_repo()?;

    let node = repo.add_node(name, parent)?;

    println!(
        "Added {} at depth {}: {}",
        style(&node.name).bold(),
        node.depth,
        node.hash.as_hex()
    );
    Ok(())
}

pub fn edit(hash: &str, name: &str) -> Result<()> {
    let repo = open_repo()?;

    match repo.edit_node(hash, name)? {
        Some(node) => {
            println!("Renamed to {}: {}", style(&node.name).bold(), node.hash.as_hex());
        }
        None => {
            println!("No change: the new name matches the existing content.");
        }
    }
    Ok(())
}

pub fn rm(hash: &str, recursive: bool) -> Result<()> {
    let repo = open_repo()?;

    let removed = repo.remove_node(hash, recursive)?;

    if removed == 1 {
        println!("Removed 1 node from the working tree");
    } else {
        println!("Removed {} nodes from the working tree", removed);
    }
    Ok(())
}
