//! `module.json` parsing and canonical serialization.
//!
//! Every other part of this crate treats manifests as opaque bytes and
//! goes through this module to read or edit them. Serialization is
//! canonical (pretty JSON, sorted replace keys, trailing newline);
//! preserving the input's exact formatting is not part of the contract.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const MODULE_MANIFEST_SCHEMA_VERSION: &str = "crosslink.module@0.1.0";
pub const MODULE_MANIFEST_FILE_NAME: &str = "module.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    pub schema_version: String,
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<Requirement>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub replace: BTreeMap<String, ReplaceTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Requirement {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceTarget {
    pub path: String,
}

/// Parses manifest bytes, enforcing the schema version. Unknown fields
/// are rejected: a manifest this crate cannot fully round-trip must
/// not be rewritten.
pub fn parse(bytes: &[u8], path: &Path) -> Result<ModuleManifest> {
    let manifest: ModuleManifest = serde_json::from_slice(bytes)
        .with_context(|| format!("parse module manifest: {}", path.display()))?;
    if manifest.schema_version != MODULE_MANIFEST_SCHEMA_VERSION {
        anyhow::bail!(
            "unsupported module manifest schema_version {:?} in {} (expected {:?})",
            manifest.schema_version,
            path.display(),
            MODULE_MANIFEST_SCHEMA_VERSION
        );
    }
    if manifest.module.trim().is_empty() {
        anyhow::bail!("module manifest has empty module name: {}", path.display());
    }
    Ok(manifest)
}

pub fn to_bytes(manifest: &ModuleManifest) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(manifest).context("encode module manifest")?;
    bytes.push(b'\n');
    Ok(bytes)
}
