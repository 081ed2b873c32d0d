//! Directory link output

use crate::core::error::{ResultExt, ShipError, ShipResult};
use std::fs;
use std::io;
use std::path::Path;

/// Link `link` to the canonical path of `source`
pub(crate) fn link_dir(source: &Path, link: &Path) -> ShipResult<()> {
  let target = fs::canonicalize(source).with_context(|| format!("Failed to resolve {}", source.display()))?;

  #[cfg(windows)]
  println!("   Creating a directory link needs Developer Mode or an elevated shell on Windows");

  match create_dir_link(&target, link) {
    Ok(()) => {
      tracing::debug!(link = %link.display(), target = %target.display(), "link created");
      Ok(())
    }
    Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(ShipError::with_help(
      format!("Not allowed to create a link at {}", link.display()),
      "Enable Developer Mode or re-run from an elevated shell, or build a zip or folder instead.",
    )),
    Err(e) => Err(e).with_context(|| format!("Failed to link {}", link.display())),
  }
}

#[cfg(unix)]
fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
  std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
  std::os::windows::fs::symlink_dir(target, link)
}
