// src/file.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::config::options::ExportOptions;
use crate::data::Game;
use crate::error::{Result, ScrapeError};
use crate::export;
use crate::jurisdiction::Jurisdiction;

/// Write one export file for a jurisdiction's games.
/// Returns the final path written to.
pub fn write_export(export: &ExportOptions, jurisdiction: Jurisdiction, games: &[&Game]) -> Result<PathBuf> {
    let path = export.out_path(jurisdiction);
    ensure_parent(&path)?;

    let contents = export::to_export_string(games, export.include_headers, export.delim())?;
    fs::write(&path, contents)?;
    logf!("Wrote {} row(s) to {}", games.len(), path.display());
    Ok(path)
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(ScrapeError::Config(format!("Path exists but is not a directory: {}", dir.display())));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

pub fn looks_like_dir_hint(p: &Path) -> bool {
    let s = p.to_string_lossy();
    s.ends_with('/') || s.ends_with('\\')
}
