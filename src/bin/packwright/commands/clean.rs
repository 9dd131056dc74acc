//! `packwright clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use packwright::ops::clean::clean;

pub fn execute(args: CleanArgs) -> Result<()> {
    clean(args.dir)
}
