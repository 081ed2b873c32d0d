//! Plain directory copy output

use super::walk_tree;
use crate::core::error::{ResultExt, ShipResult};
use crate::ui::progress::MaybeProgress;
use std::fs;
use std::path::Path;

/// Copy every file below `source` into `dest`
///
/// Returns the number of files copied.
pub(crate) fn copy_tree(source: &Path, dest: &Path, show_progress: bool) -> ShipResult<usize> {
  let entries = walk_tree(source)?;
  let files = entries.iter().filter(|e| !e.is_dir).count();
  let mut progress = MaybeProgress::new(show_progress, files, "Copying");

  fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
  for entry in &entries {
    let target = dest.join(&entry.relative);
    if entry.is_dir {
      fs::create_dir_all(&target).with_context(|| format!("Failed to create {}", target.display()))?;
    } else {
      fs::copy(source.join(&entry.relative), &target).with_context(|| format!("Failed to copy to {}", target.display()))?;
      progress.inc();
    }
  }

  tracing::debug!(dest = %dest.display(), files, "tree copied");
  Ok(files)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_copy_nested_tree() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("prototypes/entity")).unwrap();
    fs::create_dir_all(src.join("empty")).unwrap();
    fs::write(src.join("data.lua"), "require('prototypes.entity.rail')\n").unwrap();
    fs::write(src.join("prototypes/entity/rail.lua"), "return {}\n").unwrap();

    let dest = dir.path().join("out/m_1.0.0");
    let copied = copy_tree(&src, &dest, false).unwrap();

    assert_eq!(copied, 2);
    assert_eq!(
      fs::read_to_string(dest.join("prototypes/entity/rail.lua")).unwrap(),
      "return {}\n"
    );
    assert!(dest.join("empty").is_dir());
  }
}
