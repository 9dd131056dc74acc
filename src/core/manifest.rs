//! package.json reading and derived package facts.
//!
//! The manifest is read once per build and never mutated; the publish step
//! produces a transformed copy instead (see [`crate::core::publish`]).

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use semver::Version;
use serde_json::{Map, Value};

use crate::util::diagnostic::MissingNameError;

/// Dependency tables whose keys become bundler externals.
const DEPENDENCY_TABLES: &[&str] = &[
    "dependencies",
    "peerDependencies",
    "devDependencies",
    "optionalDependencies",
];

/// Which platforms the package ships builds for.
///
/// Derived from the manifest `browser` field: absent means both, `true`
/// means browser-only, `false` means node-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformSupport {
    pub node: bool,
    pub browser: bool,
}

/// The parsed package.json manifest.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    fields: Map<String, Value>,

    /// The directory containing this manifest
    manifest_dir: PathBuf,
}

impl PackageManifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let fields = match value {
            Value::Object(map) => map,
            _ => anyhow::bail!("manifest at {} is not a JSON object", path.display()),
        };

        let manifest_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let manifest = PackageManifest {
            fields,
            manifest_dir,
        };

        // A package without a name can be neither built nor published.
        if manifest.fields.get("name").and_then(Value::as_str).map_or(true, str::is_empty) {
            return Err(MissingNameError {
                path: path.to_path_buf(),
            }
            .into());
        }

        Ok(manifest)
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        self.fields
            .get("name")
            .and_then(Value::as_str)
            .expect("manifest validated on parse")
    }

    /// Get the package name with any leading `@scope/` segment removed.
    pub fn unscoped_name(&self) -> &str {
        let name = self.name();
        match name.rsplit_once('/') {
            Some((_, unscoped)) => unscoped,
            None => name,
        }
    }

    /// Parse the manifest `version` field, if present and valid.
    pub fn version(&self) -> Option<Version> {
        let raw = self.fields.get("version").and_then(Value::as_str)?;
        match raw.parse() {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::warn!("ignoring invalid manifest version `{}`: {}", raw, e);
                None
            }
        }
    }

    /// Which platforms this package ships builds for.
    pub fn platform_support(&self) -> PlatformSupport {
        match self.fields.get("browser") {
            None => PlatformSupport {
                node: true,
                browser: true,
            },
            Some(Value::Bool(true)) => PlatformSupport {
                node: false,
                browser: true,
            },
            Some(Value::Bool(false)) => PlatformSupport {
                node: true,
                browser: false,
            },
            Some(other) => {
                tracing::warn!(
                    "manifest `browser` field is not a boolean ({}); building for both platforms",
                    other
                );
                PlatformSupport {
                    node: true,
                    browser: true,
                }
            }
        }
    }

    /// Whether the package declares side effects.
    ///
    /// Only a literal `true` counts; everything else normalizes to `false`
    /// so consumers' bundlers can tree-shake aggressively.
    pub fn side_effects(&self) -> bool {
        matches!(self.fields.get("sideEffects"), Some(Value::Bool(true)))
    }

    /// The global variable name for the script build.
    ///
    /// Uses the manifest `amdName` if set, otherwise a sanitized identifier
    /// derived from the unscoped package name.
    pub fn global_name(&self) -> String {
        if let Some(amd) = self.fields.get("amdName").and_then(Value::as_str) {
            return amd.to_string();
        }
        safe_variable_name(self.unscoped_name())
    }

    /// Check whether any dependency table declares the given package.
    pub fn has_dependency(&self, name: &str) -> bool {
        DEPENDENCY_TABLES.iter().any(|table| {
            self.fields
                .get(*table)
                .and_then(Value::as_object)
                .is_some_and(|deps| deps.contains_key(name))
        })
    }

    /// Dependencies the manifest asks to be inlined into every artifact.
    pub fn bundled_dependencies(&self) -> Vec<String> {
        let mut bundled = Vec::new();
        for key in ["bundledDependencies", "bundleDependencies"] {
            if let Some(Value::Array(names)) = self.fields.get(key) {
                bundled.extend(names.iter().filter_map(Value::as_str).map(str::to_string));
            }
        }
        bundled
    }

    /// Dependencies left external to the bundle, resolved at the consumer.
    ///
    /// Every declared dependency is external unless it appears in the
    /// bundled-dependencies list.
    pub fn external_dependencies(&self) -> Vec<String> {
        let bundled = self.bundled_dependencies();
        let mut externals = Vec::new();

        for table in DEPENDENCY_TABLES {
            if let Some(deps) = self.fields.get(*table).and_then(Value::as_object) {
                for name in deps.keys() {
                    if !bundled.iter().any(|b| b == name) && !externals.contains(name) {
                        externals.push(name.clone());
                    }
                }
            }
        }

        externals
    }

    /// Raw access to a manifest field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All manifest fields, in document order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The directory containing this manifest.
    pub fn dir(&self) -> &Path {
        &self.manifest_dir
    }
}

static INVALID_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^[^a-zA-Z]+)|[^\w.-]|([^a-zA-Z\d]+$)").unwrap());

/// Turn a package name into a valid global variable name.
///
/// Strips characters that cannot appear in an identifier, then camel-cases
/// across the remaining separators: `my-pkg.js` becomes `myPkgJs`.
pub fn safe_variable_name(name: &str) -> String {
    let ident = INVALID_IDENT.replace_all(name, "").to_lowercase();

    let mut out = String::with_capacity(ident.len());
    let mut upper_next = false;
    for ch in ident.chars() {
        if ch.is_ascii_alphanumeric() {
            if upper_next {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }
    out
}
