//! Artifact production
//!
//! A build turns the mod source tree into exactly one artifact named
//! `<name>_<version>` at a destination directory: a zip archive, a plain copy,
//! or a directory link back to the source. Whatever previously occupied that
//! name (in any of the three forms) is removed first, and the shared mod
//! manager directory is additionally swept of every other version of the mod.

mod archive;
mod copy;
mod link;
mod sweep;

pub use sweep::{remove_entry, sweep_versions};

use crate::core::context::ProjectContext;
use crate::core::error::{ConfigError, ShipError, ShipResult};
use crate::manifest::ModDescriptor;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output form of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
  /// `<name>_<version>.zip`
  Archive,
  /// `<name>_<version>/`, a full copy
  Directory,
  /// `<name>_<version>` linking to the source tree
  SymbolicLink,
}

impl BuildKind {
  pub const ALL: [BuildKind; 3] = [BuildKind::Archive, BuildKind::Directory, BuildKind::SymbolicLink];

  /// Name used on the command line
  pub fn as_str(&self) -> &'static str {
    match self {
      BuildKind::Archive => "zip",
      BuildKind::Directory => "folder",
      BuildKind::SymbolicLink => "symlink",
    }
  }

  /// Human label for the selection prompt
  pub fn label(&self) -> &'static str {
    match self {
      BuildKind::Archive => "zip",
      BuildKind::Directory => "folder",
      BuildKind::SymbolicLink => "symlink (may need an elevated shell on Windows)",
    }
  }

  /// Artifact path for `stem` inside `dir`
  pub fn artifact_path(&self, dir: &Path, stem: &str) -> PathBuf {
    match self {
      BuildKind::Archive => dir.join(format!("{}.zip", stem)),
      BuildKind::Directory | BuildKind::SymbolicLink => dir.join(stem),
    }
  }
}

impl fmt::Display for BuildKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for BuildKind {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "zip" => Ok(BuildKind::Archive),
      "folder" => Ok(BuildKind::Directory),
      "symlink" => Ok(BuildKind::SymbolicLink),
      other => Err(ConfigError::InvalidBuildKind {
        value: other.to_string(),
      }),
    }
  }
}

/// Where the artifact goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
  /// Local output directory; created on demand, versions coexist
  Dist,
  /// Shared mod manager directory; must exist, swept before writing
  Deploy,
  /// Operator-supplied directory; must exist, never swept
  Custom(PathBuf),
}

impl Destination {
  /// `dist`, `deploy`, or any other text as a path
  pub fn parse(value: &str) -> Self {
    match value.trim() {
      "dist" => Destination::Dist,
      "deploy" => Destination::Deploy,
      other => Destination::Custom(PathBuf::from(other)),
    }
  }

  /// Resolve to a concrete, existing directory
  pub fn prepare(&self, ctx: &ProjectContext) -> ShipResult<OutputDir> {
    match self {
      Destination::Dist => {
        fs::create_dir_all(&ctx.dist_dir)?;
        Ok(OutputDir {
          path: ctx.dist_dir.clone(),
          sweep: false,
        })
      }
      Destination::Deploy => {
        let path = ctx.deploy_dir.clone().ok_or_else(|| {
          ShipError::with_help(
            "No mod manager directory is known for this platform",
            "Set [paths] deploy in modship.toml, or pass --dir <path>.",
          )
        })?;
        Ok(OutputDir {
          path: existing_dir(path)?,
          sweep: true,
        })
      }
      Destination::Custom(path) => {
        let path = if path.is_absolute() {
          path.clone()
        } else {
          ctx.root.join(path)
        };
        Ok(OutputDir {
          path: existing_dir(path)?,
          sweep: false,
        })
      }
    }
  }
}

fn existing_dir(path: PathBuf) -> ShipResult<PathBuf> {
  if path.is_dir() {
    Ok(path)
  } else {
    Err(ConfigError::MissingDestination { path }.into())
  }
}

/// A destination directory that exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDir {
  pub path: PathBuf,
  /// Remove every version of the mod before writing
  pub sweep: bool,
}

/// The artifact produced by a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
  pub kind: BuildKind,
  pub path: PathBuf,
  pub source: PathBuf,
}

/// Outcome of a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
  pub artifact: BuildArtifact,
  /// Archive size on disk (archives only)
  pub bytes: Option<u64>,
  /// Entries removed before writing
  pub removed: Vec<PathBuf>,
}

/// Build one artifact of `kind` for `descriptor` into `output`
pub fn build_artifact(
  source: &Path,
  descriptor: &ModDescriptor,
  output: &OutputDir,
  kind: BuildKind,
  show_progress: bool,
) -> ShipResult<BuildReport> {
  if !source.is_dir() {
    return Err(ShipError::with_help(
      format!("Source directory not found: {}", source.display()),
      "Set [paths] source in modship.toml to the mod's root folder.",
    ));
  }

  let stem = descriptor.artifact_stem();
  println!("📦 Building {} v{} ({})", descriptor.name, descriptor.next_version, kind);
  if descriptor.current_version != descriptor.next_version.to_string() {
    println!("   Version: {} → {}", descriptor.current_version, descriptor.next_version);
  }

  let mut removed = Vec::new();
  if output.sweep {
    removed.extend(sweep_versions(&output.path, &descriptor.name)?);
  }
  for slot in BuildKind::ALL.iter().map(|k| k.artifact_path(&output.path, &stem)) {
    if remove_entry(&slot)? {
      removed.push(slot);
    }
  }
  for path in &removed {
    tracing::info!(path = %path.display(), "removed previous artifact");
  }

  let path = kind.artifact_path(&output.path, &stem);
  let bytes = match kind {
    BuildKind::Archive => Some(archive::write_archive(source, &path, &stem, show_progress)?),
    BuildKind::Directory => {
      copy::copy_tree(source, &path, show_progress)?;
      None
    }
    BuildKind::SymbolicLink => {
      link::link_dir(source, &path)?;
      None
    }
  };

  match bytes {
    Some(bytes) => println!("✅ Build complete: {} ({} bytes)", path.display(), bytes),
    None => println!("✅ Build complete: {}", path.display()),
  }

  Ok(BuildReport {
    artifact: BuildArtifact {
      kind,
      path,
      source: source.to_path_buf(),
    },
    bytes,
    removed,
  })
}

/// One entry of a source tree, relative to its root
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TreeEntry {
  pub relative: PathBuf,
  pub is_dir: bool,
}

/// Every directory and file below `root`, parents first, siblings sorted by name
pub(crate) fn walk_tree(root: &Path) -> ShipResult<Vec<TreeEntry>> {
  let mut entries = Vec::new();
  walk_into(root, Path::new(""), &mut entries)?;
  Ok(entries)
}

fn walk_into(root: &Path, relative: &Path, entries: &mut Vec<TreeEntry>) -> ShipResult<()> {
  let mut children: Vec<_> = fs::read_dir(root.join(relative))?.collect::<Result<_, _>>()?;
  children.sort_by_key(|e| e.file_name());

  for child in children {
    let child_relative = relative.join(child.file_name());
    let is_dir = fs::metadata(child.path())?.is_dir();
    entries.push(TreeEntry {
      relative: child_relative.clone(),
      is_dir,
    });
    if is_dir {
      walk_into(root, &child_relative, entries)?;
    }
  }
  Ok(())
}
