//! Reconciles intra-repository module requirements with local path
//! replace directives.
//!
//! Given a repository whose top-level `module.json` declares the root
//! namespace, [`crosslink`] discovers every module manifest in the
//! tree, computes which sibling modules each one transitively requires,
//! and rewrites each manifest so those siblings resolve to their
//! location on disk instead of a remote registry. This lets developers
//! iterate across modules without publishing intermediate releases.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

pub mod common;
pub mod config;
pub mod graph;
pub mod manifest;
pub mod reconcile;

pub use config::RunConfig;
pub use graph::{ModuleGraph, ModuleInfo};

/// Runs the full pipeline: scan, closure, insert, prune, write.
///
/// The graph is built completely before any manifest is rewritten, so
/// no module's edits are visible to another module's closure. A fatal
/// error aborts the run; manifests already written stay on disk.
pub fn crosslink(rc: &RunConfig) -> Result<()> {
    let root_path: PathBuf = match &rc.root_path {
        Some(path) => path.clone(),
        None => common::find_repo_root()?,
    };
    let root_module = common::identify_root_module(&root_path)?;
    let mut modules = graph::build_dependency_graph(&root_path, &root_module)?;

    // Snapshot manifest locations before mutating any record; replace
    // paths are computed between manifest directories.
    let locations: BTreeMap<String, PathBuf> = modules
        .iter()
        .map(|(name, info)| (name.clone(), info.manifest_dir().to_path_buf()))
        .collect();

    for module in modules.values_mut() {
        reconcile::insert_replace(module, &locations, rc)?;
        if rc.prune {
            reconcile::prune_replace(&root_module, module, rc)?;
        }
        common::write_module(module)?;
    }
    Ok(())
}
