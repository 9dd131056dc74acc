//! Shared handle to the bundler toolchain.
//!
//! One engine is created at the start of a run, shared by reference across
//! the concurrent per-target builds, and explicitly shut down when the run
//! ends, on the success and the failure path alike. The engine holds no
//! per-target state, so concurrent builds cannot contaminate each other's
//! configuration.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::errors::BuildError;
use crate::builder::shims::ShimDir;
use crate::core::target::ModuleFormat;
use crate::util::process::find_node_tool;

/// Handle to the bundler executable plus the staged shim files.
#[derive(Debug)]
pub struct BundlerEngine {
    esbuild: PathBuf,
    shims: ShimDir,
}

impl BundlerEngine {
    /// Locate the bundler and stage the injection shims.
    ///
    /// The package-local `node_modules/.bin/esbuild` wins over PATH.
    pub fn start(package_root: &Path) -> Result<Self> {
        let esbuild =
            find_node_tool(package_root, "esbuild").ok_or_else(|| BuildError::ToolNotFound {
                tool: "esbuild".to_string(),
            })?;

        tracing::debug!("using bundler at {}", esbuild.display());

        let shims = ShimDir::stage()?;

        Ok(BundlerEngine { esbuild, shims })
    }

    /// Path to the bundler executable.
    pub fn esbuild(&self) -> &Path {
        &self.esbuild
    }

    /// The shim file injected into bundles of the given format.
    pub fn shim_for(&self, format: ModuleFormat) -> &Path {
        self.shims.for_format(format)
    }

    /// Release the engine's resources.
    ///
    /// Cleanup problems are logged, never raised; by this point the build
    /// outcome is already decided.
    pub fn shutdown(self) {
        self.shims.close();
        tracing::debug!("bundler engine shut down");
    }
}
