//! Zip archive output

use super::walk_tree;
use crate::core::error::{ResultExt, ShipResult};
use crate::ui::progress::MaybeProgress;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Compress `source` into `path` under the root folder `root_name/`
///
/// Returns the archive size once the writer is finished and the file synced.
/// A partially written archive is removed on failure.
pub(crate) fn write_archive(source: &Path, path: &Path, root_name: &str, show_progress: bool) -> ShipResult<u64> {
  match write_archive_inner(source, path, root_name, show_progress) {
    Ok(bytes) => Ok(bytes),
    Err(err) => {
      if let Err(cleanup) = fs::remove_file(path) {
        tracing::debug!(path = %path.display(), error = %cleanup, "no partial archive to remove");
      }
      Err(err)
    }
  }
}

fn write_archive_inner(source: &Path, path: &Path, root_name: &str, show_progress: bool) -> ShipResult<u64> {
  let entries = walk_tree(source)?;
  let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
  let mut writer = ZipWriter::new(file);
  let options = SimpleFileOptions::default()
    .compression_method(CompressionMethod::Deflated)
    .compression_level(Some(9));

  let files = entries.iter().filter(|e| !e.is_dir).count();
  let mut progress = MaybeProgress::new(show_progress, files, "Archiving");

  writer.add_directory(format!("{}/", root_name), options)?;
  for entry in &entries {
    let name = entry_name(root_name, &entry.relative);
    if entry.is_dir {
      writer.add_directory(format!("{}/", name), options)?;
      continue;
    }

    writer.start_file(name, options)?;
    let mut input = File::open(source.join(&entry.relative))
      .with_context(|| format!("Failed to read {}", source.join(&entry.relative).display()))?;
    io::copy(&mut input, &mut writer)?;
    progress.inc();
  }

  let file = writer.finish()?;
  file.sync_all()?;
  let bytes = fs::metadata(path)?.len();
  tracing::debug!(path = %path.display(), entries = entries.len(), bytes, "archive written");
  Ok(bytes)
}

/// Forward-slash entry name below the archive root
fn entry_name(root_name: &str, relative: &Path) -> String {
  let mut name = root_name.to_string();
  for component in relative.components() {
    name.push('/');
    name.push_str(&component.as_os_str().to_string_lossy());
  }
  name
}
