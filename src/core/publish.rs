//! Publish manifest synthesis.
//!
//! Reassembles a publish-ready package.json from the source manifest and the
//! set of artifacts the run actually produced. Pure: same inputs, same
//! bytes out.

use serde_json::{Map, Value};

use crate::core::manifest::PackageManifest;
use crate::util::config::PublishSection;

/// Manifest fields stripped from the publish manifest by default.
///
/// Build-time-only configuration and publish-blocking metadata. The list is
/// adjustable per package through `[publish] remove`/`keep` in
/// packwright.toml.
pub const DEFAULT_REMOVED_FIELDS: &[&str] = &[
    // publish-blocking / superseded by the build layout
    "private",
    "files",
    "type",
    "source",
    // build-time only
    "scripts",
    "devDependencies",
    // inlined into the artifacts, no longer resolved by consumers
    "bundledDependencies",
    "bundleDependencies",
    // tool config sections
    "packwright",
    "eslintConfig",
    "jest",
    "prettier",
    "snowpack",
    "graphql",
    "size-limit",
    "np",
    "svelte",
];

/// Which fields to strip when synthesizing the publish manifest.
#[derive(Debug, Clone)]
pub struct PublishPolicy {
    remove: Vec<String>,
}

impl Default for PublishPolicy {
    fn default() -> Self {
        PublishPolicy {
            remove: DEFAULT_REMOVED_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PublishPolicy {
    /// Build a policy from the `[publish]` config section.
    ///
    /// `remove` entries extend the default list; `keep` entries are spared
    /// from it.
    pub fn from_config(section: &PublishSection) -> Self {
        let mut remove: Vec<String> = DEFAULT_REMOVED_FIELDS
            .iter()
            .map(|s| s.to_string())
            .filter(|field| !section.keep.contains(field))
            .collect();

        for field in &section.remove {
            if !remove.contains(field) && !section.keep.contains(field) {
                remove.push(field.clone());
            }
        }

        PublishPolicy { remove }
    }

    /// Fields this policy strips.
    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.remove.iter().map(String::as_str)
    }
}

/// The artifact paths one run produced, relative to the dist directory.
///
/// Only paths recorded here can end up in the publish manifest, which keeps
/// the manifest free of references to files that were never written.
#[derive(Debug, Clone, Default)]
pub struct ProducedOutputs {
    pub node: Option<String>,
    pub browser_dev: Option<String>,
    pub module: Option<String>,
    pub esnext: Option<String>,
    pub script: Option<String>,
    pub types: Option<String>,
}

/// Synthesize the publish manifest.
///
/// The `exports["."]` conditions are assigned in fixed priority order: node,
/// browser, default, types. The platform conditions are only emitted when
/// both platforms were built; a single-platform package resolves through
/// `default` alone.
pub fn synthesize(
    manifest: &PackageManifest,
    outputs: &ProducedOutputs,
    policy: &PublishPolicy,
) -> Map<String, Value> {
    let mut fields = manifest.fields().clone();

    for key in policy.removed() {
        fields.shift_remove(key);
    }

    // Conditional-loading table for the package root.
    let mut dot = Map::new();

    let both_platforms = outputs.node.is_some() && outputs.module.is_some();
    if both_platforms {
        dot.insert("node".into(), json_path(outputs.node.as_ref().unwrap()));
        dot.insert(
            "browser".into(),
            json_path(outputs.module.as_ref().unwrap()),
        );
    }

    if let Some(default) = outputs.node.as_ref().or(outputs.module.as_ref()) {
        dot.insert("default".into(), json_path(default));
    }

    if let Some(types) = &outputs.types {
        dot.insert("types".into(), json_path(types));
    }

    let mut exports = match fields.get("exports") {
        Some(Value::Object(existing)) => existing.clone(),
        _ => Map::new(),
    };
    exports.insert(".".into(), Value::Object(dot));
    // Keep every other file (assets, chunks, the manifest itself) reachable.
    exports.insert("./".into(), Value::String("./".into()));
    fields.insert("exports".into(), Value::Object(exports));

    // Single-field pointers for consumers that predate conditional exports.
    set_or_remove(&mut fields, "main", outputs.node.as_deref());
    set_or_remove(&mut fields, "module", outputs.module.as_deref());
    set_or_remove(&mut fields, "esnext", outputs.esnext.as_deref());
    set_or_remove(&mut fields, "browser:module", outputs.browser_dev.as_deref());
    set_or_remove(&mut fields, "unpkg", outputs.script.as_deref());
    set_or_remove(&mut fields, "types", outputs.types.as_deref());

    fields.insert(
        "sideEffects".into(),
        Value::Bool(manifest.side_effects()),
    );

    fields
}

/// Serialize a publish manifest the way it is written to disk.
pub fn render(fields: &Map<String, Value>) -> String {
    let mut out = serde_json::to_string_pretty(&Value::Object(fields.clone()))
        .expect("manifest maps always serialize");
    out.push('\n');
    out
}

fn json_path(path: &str) -> Value {
    Value::String(path.to_string())
}

fn set_or_remove(fields: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    match value {
        Some(v) => {
            fields.insert(key.to_string(), Value::String(v.to_string()));
        }
        None => {
            fields.shift_remove(key);
        }
    }
}
