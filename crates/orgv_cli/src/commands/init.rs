//! Init command for creating a new repository.

use anyhow::Result;
use orgv_core::OrgRepo;

/// Initialize a new ORGV repository in the current directory.
pub fn run() -> Result<()> {
    let repo = OrgRepo::init(".")?;

    println!("Initialized empty ORGV repository in {}", repo.orgv_dir().display());
    println!("Author: {}", repo.config().identity.author);
    println!("Edit .orgv/config.toml to change the commit identity.");

    Ok(())
}
