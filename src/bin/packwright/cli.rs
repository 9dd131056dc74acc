//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Packwright - builds publishable JavaScript package artifacts
#[derive(Parser)]
#[command(name = "packwright")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every artifact variant and the publish manifest
    Build(BuildArgs),

    /// Remove build output and scratch directories
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build mode (`library` or `application`), overriding packwright.toml
    #[arg(long)]
    pub mode: Option<String>,

    /// Package directory (defaults to the current directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Package directory (defaults to the current directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
