//! User-facing configuration diagnostics.
//!
//! Configuration mistakes abort before any external tool runs, so these
//! errors carry enough help text to be fixable without a second run.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Unrecognized build mode in the config file or on the command line.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("unrecognized build mode `{mode}`")]
#[diagnostic(
    code(packwright::config::unknown_mode),
    help("expected `library` or `application`")
)]
pub struct UnknownModeError {
    pub mode: String,
}

/// The package manifest has no usable name.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("package manifest at {} has no `name` field", .path.display())]
#[diagnostic(
    code(packwright::manifest::missing_name),
    help("add `\"name\": \"my-package\"` to package.json")
)]
pub struct MissingNameError {
    pub path: PathBuf,
}

/// No entry source file could be located.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("no entry file found under {}", .root.display())]
#[diagnostic(
    code(packwright::entry::not_found),
    help("create src/index.ts (or .tsx/.jsx/.mjs/.js/.cjs), or point the manifest `source` field at the entry file")
)]
pub struct MissingEntryError {
    pub root: PathBuf,
}
