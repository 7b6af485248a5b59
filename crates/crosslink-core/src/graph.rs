//! Manifest discovery and per-module replace requirement closure.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::manifest::{self, MODULE_MANIFEST_FILE_NAME};

/// One discovered module manifest plus the replace requirements
/// computed for it.
#[derive(Debug, Clone, Default)]
pub struct ModuleInfo {
    /// Absolute path of the `module.json` that declared this module.
    pub file_path: PathBuf,
    /// In-memory manifest bytes, re-serialized after each edit pass.
    pub contents: Vec<u8>,
    /// Sibling module names that must resolve to a local path.
    pub required_replaces: BTreeSet<String>,
}

impl ModuleInfo {
    /// Directory containing the module's manifest. Replace paths are
    /// computed between these directories.
    pub fn manifest_dir(&self) -> &Path {
        self.file_path.parent().unwrap_or_else(|| Path::new(""))
    }
}

pub type ModuleGraph = BTreeMap<String, ModuleInfo>;

/// Discovers every module manifest under `root_path` and computes, for
/// each module, the transitive set of sibling modules that must be
/// replaced with a local path. The returned graph is complete before
/// any manifest is rewritten.
pub fn build_dependency_graph(root_path: &Path, root_module: &str) -> Result<ModuleGraph> {
    let mut modules = scan_modules(root_path)?;

    let names: Vec<String> = modules.keys().cloned().collect();
    for name in &names {
        let required = compute_required_replaces(&modules, name, root_module)?;
        if let Some(info) = modules.get_mut(name) {
            info.required_replaces = required;
        }
    }

    Ok(modules)
}

fn scan_modules(root_path: &Path) -> Result<ModuleGraph> {
    let mut modules = ModuleGraph::new();
    // Sorted walk, so duplicate module names resolve deterministically.
    for entry in walkdir::WalkDir::new(root_path).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(err)
                    .with_context(|| format!("walk repository root: {}", root_path.display()));
            }
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry during repository walk");
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() != MODULE_MANIFEST_FILE_NAME {
            continue;
        }
        let contents = match fs::read(entry.path()) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(
                    path = %entry.path().display(),
                    error = %err,
                    "skipping unreadable module manifest"
                );
                continue;
            }
        };
        // A manifest that cannot be parsed cannot be safely rewritten
        // later, so a parse failure here aborts the whole run.
        let parsed = manifest::parse(&contents, entry.path())?;
        let info = ModuleInfo {
            file_path: entry.path().to_path_buf(),
            contents,
            required_replaces: BTreeSet::new(),
        };
        if let Some(previous) = modules.insert(parsed.module.clone(), info) {
            warn!(
                module = %parsed.module,
                kept = %entry.path().display(),
                dropped = %previous.file_path.display(),
                "duplicate module name; keeping the manifest found last"
            );
        }
    }
    Ok(modules)
}

/// Work-list closure over the module map. A name is queued when it is
/// present in the map, falls under the root namespace, and is not the
/// module the closure is being computed for; the visited set keeps a
/// cyclic requirement graph from re-queueing anything, which bounds
/// the loop by the module count.
///
/// A requirement whose manifest was never discovered is dropped from
/// the closure: inserting a replace directive pointing at a path that
/// does not exist would break the build.
fn compute_required_replaces(
    modules: &ModuleGraph,
    name: &str,
    root_module: &str,
) -> Result<BTreeSet<String>> {
    let Some(info) = modules.get(name) else {
        return Ok(BTreeSet::new());
    };
    let parsed = manifest::parse(&info.contents, &info.file_path)?;

    let eligible =
        |dep: &str| dep != name && dep.contains(root_module) && modules.contains_key(dep);

    let mut stack: Vec<String> = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for req in &parsed.require {
        if eligible(&req.name) && seen.insert(req.name.clone()) {
            stack.push(req.name.clone());
        }
    }

    let mut required = BTreeSet::new();
    while let Some(current) = stack.pop() {
        if let Some(dep_info) = modules.get(&current) {
            let dep_manifest = manifest::parse(&dep_info.contents, &dep_info.file_path)?;
            for req in &dep_manifest.require {
                if eligible(&req.name) && seen.insert(req.name.clone()) {
                    stack.push(req.name.clone());
                }
            }
        }
        required.insert(current);
    }

    Ok(required)
}
