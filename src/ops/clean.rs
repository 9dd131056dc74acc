//! Implementation of `packwright clean`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::paths::PackagePaths;
use crate::util::fs::remove_dir_all_if_exists;

/// Remove the output and scratch directories.
pub fn clean(cwd: Option<PathBuf>) -> Result<()> {
    let root = match cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    let paths = PackagePaths::new(root);

    for dir in [paths.dist(), paths.scratch()] {
        if dir.exists() {
            remove_dir_all_if_exists(dir)?;
            eprintln!("     Removed {}", dir.display());
        }
    }

    Ok(())
}
