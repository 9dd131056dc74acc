//! Core domain model: the package manifest, the build-target matrix, and
//! publish-manifest synthesis.

pub mod manifest;
pub mod matrix;
pub mod paths;
pub mod publish;
pub mod target;

pub use manifest::{PackageManifest, PlatformSupport};
pub use matrix::{compute_targets, BuildMode, DeclarationTarget, TargetMatrix};
pub use paths::PackagePaths;
pub use publish::{synthesize, ProducedOutputs, PublishPolicy};
pub use target::{BuildTarget, ModuleFormat, Platform, TargetEnv, TargetKind};
