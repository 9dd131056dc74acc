//! Packwright - a build orchestrator for publishing JavaScript packages
//!
//! This crate drives the external toolchain (type checker, bundler,
//! declaration bundler) to turn a package's entry file into the full set of
//! distributable artifact variants, then synthesizes the publish manifest
//! that tells consumers how to resolve each one.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

pub use crate::core::manifest::PackageManifest;
pub use crate::core::matrix::{compute_targets, BuildMode, TargetMatrix};
pub use crate::core::paths::PackagePaths;
pub use crate::core::publish::{synthesize, ProducedOutputs, PublishPolicy};
pub use crate::core::target::BuildTarget;
pub use crate::ops::bundle::{bundle, BuildOptions, BuildReport};
