//! Per-target global symbol replacement tables.
//!
//! Source code introspects its environment through a closed set of
//! expressions (`import.meta.env.MODE`, `import.meta.platform`,
//! `import.meta.hot`, the `process.*` equivalents). Node and ESM bundles
//! rewrite them to identifiers the injected runtime shim provides, deferring
//! the answer to runtime. The global-script bundle bakes in production
//! literals instead, so non-production branches become dead code the
//! bundler can drop.

use crate::builder::errors::BuildError;
use crate::core::target::{ModuleFormat, Platform};

/// Replacements for node CommonJS bundles: everything delegates to
/// `process.*` or the module shim.
const NODE_CJS_REPLACEMENTS: &[(&str, &str)] = &[
    // De-alias MODE to NODE_ENV
    ("import.meta.env.MODE", "process_env_NODE_ENV"),
    ("process.env.MODE", "process_env_NODE_ENV"),
    // Delegate to process.*
    ("import.meta.platform", "process_platform"),
    ("import.meta.env", "process_env"),
    // import.meta has no meaning in CommonJS
    ("import.meta.url", "import_meta_url"),
    ("import.meta.resolve", "import_meta_resolve"),
];

/// Replacements for ESM bundles: the shim resolves the environment when a
/// host runtime is present and falls back to browser defaults.
const ESM_REPLACEMENTS: &[(&str, &str)] = &[
    ("import.meta.env.MODE", "process_env_NODE_ENV"),
    ("process.env.MODE", "process_env_NODE_ENV"),
    ("import.meta.platform", "process_platform"),
    ("import.meta.env", "process_env"),
];

/// Replacements for the global-script bundle: production literals only.
const IIFE_REPLACEMENTS: &[(&str, &str)] = &[
    ("import.meta.env.NODE_ENV", "\"production\""),
    ("import.meta.env.MODE", "\"production\""),
    ("process.env.NODE_ENV", "\"production\""),
    ("process.env.MODE", "\"production\""),
    ("import.meta.platform", "\"browser\""),
    ("process.platform", "\"browser\""),
    ("import.meta.env", "process_env"),
    ("process.env", "process_env"),
    // No hot mode
    ("import.meta.hot", "undefined"),
];

/// Look up the substitution table for a target's platform/format slot.
pub fn replacements(
    platform: Platform,
    format: ModuleFormat,
) -> Result<&'static [(&'static str, &'static str)], BuildError> {
    match (platform, format) {
        (Platform::Node, ModuleFormat::Cjs) => Ok(NODE_CJS_REPLACEMENTS),
        (_, ModuleFormat::Esm) => Ok(ESM_REPLACEMENTS),
        (Platform::Browser, ModuleFormat::Iife) => Ok(IIFE_REPLACEMENTS),
        _ => Err(BuildError::UnsupportedCombination { platform, format }),
    }
}
