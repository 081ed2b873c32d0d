//! Removing previous artifacts

use crate::core::error::{ResultExt, ShipResult};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Matches `<name>`, `<name>_<semver>` and either with `.zip`
fn artifact_pattern(name: &str) -> ShipResult<Regex> {
  let pattern = format!(
    r"^{}(_\d+\.\d+\.\d+(-[0-9A-Za-z.-]+)?(\+[0-9A-Za-z.-]+)?)?(\.zip)?$",
    regex::escape(name)
  );
  Ok(Regex::new(&pattern)?)
}

/// Remove every artifact of mod `name` from `dir`, whatever its version or form
pub fn sweep_versions(dir: &Path, name: &str) -> ShipResult<Vec<PathBuf>> {
  let pattern = artifact_pattern(name)?;
  let mut removed = Vec::new();

  let entries = fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
  for entry in entries {
    let entry = entry?;
    let file_name = entry.file_name();
    let Some(file_name) = file_name.to_str() else {
      continue;
    };
    if !pattern.is_match(file_name) {
      continue;
    }

    let path = entry.path();
    if remove_entry(&path)? {
      removed.push(path);
    }
  }

  removed.sort();
  Ok(removed)
}

/// Remove a file, directory tree or link at `path`
///
/// Links are unlinked, never followed. Returns whether anything was there.
pub fn remove_entry(path: &Path) -> ShipResult<bool> {
  let metadata = match fs::symlink_metadata(path) {
    Ok(m) => m,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
    Err(e) => return Err(e).with_context(|| format!("Failed to inspect {}", path.display())),
  };

  let result = if metadata.file_type().is_symlink() {
    // Directory links on Windows are removed as directories
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
  } else if metadata.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  };
  result.with_context(|| format!("Failed to remove {}", path.display()))?;
  Ok(true)
}
