//! High-level operations.
//!
//! This module contains the implementation of packwright commands.

pub mod bundle;
pub mod clean;

pub use bundle::{bundle, BuildOptions, BuildReport};
pub use clean::clean;
