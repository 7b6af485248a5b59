use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::graph::ModuleInfo;
use crate::manifest;

/// Walks up from the current directory to the nearest ancestor that
/// contains a `.git` entry.
pub fn find_repo_root() -> Result<PathBuf> {
    let start = std::env::current_dir().context("resolve current directory")?;
    let mut dir = start.clone();
    loop {
        if dir.join(".git").exists() {
            return Ok(dir);
        }
        if !dir.pop() {
            anyhow::bail!(
                "no git repository found above {}; pass an explicit root path",
                start.display()
            );
        }
    }
}

/// Reads the manifest at the repository root and returns its module
/// name. The root module's name is the namespace that separates
/// intra-repository modules from external dependencies.
pub fn identify_root_module(root_path: &Path) -> Result<String> {
    let manifest_path = root_path.join(manifest::MODULE_MANIFEST_FILE_NAME);
    let bytes = fs::read(&manifest_path)
        .with_context(|| format!("read root module manifest: {}", manifest_path.display()))?;
    let parsed = manifest::parse(&bytes, &manifest_path)?;
    Ok(parsed.module)
}

/// Persists a module's in-memory manifest bytes back to its file,
/// replacing the previous contents entirely.
pub fn write_module(module: &ModuleInfo) -> Result<()> {
    fs::write(&module.file_path, &module.contents)
        .with_context(|| format!("write module manifest: {}", module.file_path.display()))
}
