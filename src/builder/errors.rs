//! Build error taxonomy.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::core::target::{ModuleFormat, Platform};

/// Error raised while producing artifacts.
///
/// All variants are fatal to the run; only scratch-file cleanup failures are
/// tolerated, and those are logged instead of raised.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The type checker reported diagnostics (already streamed to stderr).
    #[error("type check failed ({status})")]
    TypeCheck { status: ExitStatus },

    /// The declaration matching the entry file never materialized.
    #[error("declaration file `{expected}` not found under {}", .directory.display())]
    DeclarationNotFound {
        expected: String,
        directory: PathBuf,
    },

    /// The bundler failed for one target.
    #[error("failed to bundle `{outfile}` ({format})")]
    Bundle {
        outfile: String,
        format: ModuleFormat,
        #[source]
        source: anyhow::Error,
    },

    /// A format/platform combination with no substitution table.
    #[error("unsupported format `{format}` for platform `{platform}`")]
    UnsupportedCombination {
        platform: Platform,
        format: ModuleFormat,
    },

    /// A required external tool is missing.
    #[error("`{tool}` not found; install it or add it to the package's dev dependencies")]
    ToolNotFound { tool: String },
}
