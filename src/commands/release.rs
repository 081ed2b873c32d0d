//! `modship release`: resolve the version, settle the patch notes, publish
//!
//! Releases never build an artifact and never ask for a destination. Metadata
//! and the changelog are written once, after every prompt that can still be
//! declined, and before the first git command that changes anything.

use crate::core::context::ProjectContext;
use crate::core::error::{ResultExt, ShipResult};
use crate::core::vcs::SystemGit;
use crate::manifest::{ModMetadata, write_atomic};
use crate::release::changelog::{extract_patch_notes, prepend_entry};
use crate::release::publish::{ReleaseRecord, ReleaseRequest, publish};
use crate::release::version::{VersionIntent, resolve_version};
use crate::ui::prompt::Prompter;
use chrono::NaiveDate;
use std::fs;
use std::io;

/// Release invocation, resolved from the command line
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
  pub version: VersionIntent,
  /// Date written into newly authored changelog entries
  pub today: NaiveDate,
}

/// Run a release
pub fn run_release(
  ctx: &ProjectContext,
  options: &ReleaseOptions,
  prompter: &mut dyn Prompter,
) -> ShipResult<ReleaseRecord> {
  let vcs = SystemGit::open(&ctx.root)?;
  tracing::debug!(work_tree = %vcs.work_tree().display(), "repository opened");

  let mut metadata = ModMetadata::load(ctx)?;
  let current = metadata.version()?;
  let resolved = resolve_version(&current, &ctx.info_path, &options.version, prompter)?;

  let changelog = read_changelog(ctx)?;
  let notes = extract_patch_notes(&changelog, &resolved.text, options.today, prompter)?;

  metadata.persist(&resolved)?;
  if notes.authored {
    write_atomic(&ctx.changelog_path, &prepend_entry(&changelog, &notes.entry))?;
    println!("📝 Added v{} to {}", resolved.text, ctx.changelog_path.display());
  }

  let files = ctx.release_files();
  let request = ReleaseRequest {
    files: &files,
    version: &resolved.text,
    tag_prefix: ctx.tag_prefix(),
    notes: &notes.entry,
  };
  let record = publish(&vcs, prompter, &request)?;

  println!();
  println!("🚀 Released {} v{} as {}", metadata.name()?, resolved.text, record.tag);
  Ok(record)
}

/// Changelog text; a missing file is an empty changelog
fn read_changelog(ctx: &ProjectContext) -> ShipResult<String> {
  match fs::read_to_string(&ctx.changelog_path) {
    Ok(text) => Ok(text),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      tracing::info!(path = %ctx.changelog_path.display(), "no changelog yet");
      Ok(String::new())
    }
    Err(e) => Err(e).with_context(|| format!("Failed to read {}", ctx.changelog_path.display())),
  }
}
