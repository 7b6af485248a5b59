//! Replace directive reconciliation: the insert and prune passes.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::graph::ModuleInfo;
use crate::manifest::{self, ReplaceTarget};

/// Inserts a replace directive for every required sibling module.
///
/// A directive that already points at the computed path is left alone.
/// A directive that points elsewhere is only rewritten when
/// `overwrite` is set; insertion of a missing directive is always
/// permitted. Excluded names are never touched.
pub fn insert_replace(
    module: &mut ModuleInfo,
    locations: &BTreeMap<String, PathBuf>,
    rc: &RunConfig,
) -> Result<()> {
    let mut parsed = manifest::parse(&module.contents, &module.file_path)?;

    for required in &module.required_replaces {
        if rc.excluded.contains(required) {
            if rc.verbose {
                info!(module = %parsed.module, target = %required, "excluded module, ignoring replace");
            }
            continue;
        }
        // The graph builder only records names it discovered locally,
        // so a miss here means the requirement set and the location
        // snapshot disagree.
        let Some(target_dir) = locations.get(required) else {
            warn!(
                module = %parsed.module,
                target = %required,
                "required replace has no discovered manifest; skipping"
            );
            continue;
        };
        let local_path = local_replace_path(module.manifest_dir(), target_dir);

        match parsed.replace.get(required).map(|t| t.path.clone()) {
            Some(existing) if existing == local_path => {}
            Some(existing) => {
                if rc.overwrite {
                    if rc.verbose {
                        info!(
                            module = %parsed.module,
                            target = %required,
                            old = %existing,
                            new = %local_path,
                            "overwriting replace"
                        );
                    }
                    parsed
                        .replace
                        .insert(required.clone(), ReplaceTarget { path: local_path });
                } else if rc.verbose {
                    info!(
                        module = %parsed.module,
                        target = %required,
                        existing = %existing,
                        "replace already exists; run with --overwrite to update"
                    );
                }
            }
            None => {
                if rc.verbose {
                    info!(
                        module = %parsed.module,
                        target = %required,
                        path = %local_path,
                        "inserting replace"
                    );
                }
                parsed
                    .replace
                    .insert(required.clone(), ReplaceTarget { path: local_path });
            }
        }
    }

    module.contents = manifest::to_bytes(&parsed)?;
    Ok(())
}

/// Removes replace directives that fall under the repository namespace
/// but are no longer required. Directives naming modules outside the
/// root namespace are left alone; they were never this tool's to
/// manage. Must run after [`insert_replace`] so it sees the
/// post-insert requirement state.
pub fn prune_replace(root_module: &str, module: &mut ModuleInfo, rc: &RunConfig) -> Result<()> {
    let mut parsed = manifest::parse(&module.contents, &module.file_path)?;

    let existing: Vec<String> = parsed.replace.keys().cloned().collect();
    for source in existing {
        if rc.excluded.contains(&source) {
            if rc.verbose {
                info!(module = %parsed.module, target = %source, "excluded module, ignoring prune");
            }
            continue;
        }
        if source.contains(root_module) && !module.required_replaces.contains(&source) {
            if rc.verbose {
                info!(module = %parsed.module, target = %source, "pruning stale replace");
            }
            parsed.replace.remove(&source);
        }
    }

    module.contents = manifest::to_bytes(&parsed)?;
    Ok(())
}

/// Relative location of `to_dir` as seen from `from_dir`, rendered the
/// way the manifest grammar expects: slash-separated and explicitly
/// local. The current directory and its immediate parent get a
/// trailing separator; anything not already an upward traversal gets a
/// `./` prefix.
fn local_replace_path(from_dir: &Path, to_dir: &Path) -> String {
    let from: Vec<Component<'_>> = from_dir.components().collect();
    let to: Vec<Component<'_>> = to_dir.components().collect();

    let mut shared = 0;
    while shared < from.len() && shared < to.len() && from[shared] == to[shared] {
        shared += 1;
    }

    let mut parts: Vec<String> = Vec::new();
    for _ in shared..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[shared..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    let joined = parts.join("/");
    if joined.is_empty() {
        "./".to_string()
    } else if joined == ".." {
        "../".to_string()
    } else if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}
