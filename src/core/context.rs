//! Project context - resolve once, pass everywhere
//!
//! Every path the pipeline touches is resolved here, once, from the project
//! root, the optional config file and the platform directories captured at
//! startup. Components receive `&ProjectContext` and never consult the current
//! directory or the environment themselves.

use crate::core::config::{LaunchConfig, ShipConfig};
use crate::core::error::ShipResult;
use std::path::{Path, PathBuf};

/// Environment-derived directories, captured once in `main`
#[derive(Debug, Clone, Default)]
pub struct PlatformDirs {
  pub home: Option<PathBuf>,
  /// `%APPDATA%` (Windows only)
  pub app_data: Option<PathBuf>,
}

impl PlatformDirs {
  /// Read HOME / USERPROFILE / APPDATA from the process environment
  pub fn from_env() -> Self {
    let home = std::env::var_os("HOME")
      .or_else(|| std::env::var_os("USERPROFILE"))
      .map(PathBuf::from);
    let app_data = std::env::var_os("APPDATA").map(PathBuf::from);
    Self { home, app_data }
  }

  /// Well-known mod manager directory for this platform
  pub fn default_deploy_dir(&self) -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
      self.app_data.as_ref().map(|d| d.join("Factorio").join("mods"))
    } else if cfg!(target_os = "macos") {
      self
        .home
        .as_ref()
        .map(|h| h.join("Library").join("Application Support").join("factorio").join("mods"))
    } else {
      self.home.as_ref().map(|h| h.join(".factorio").join("mods"))
    }
  }
}

/// Resolved project layout shared by every pipeline stage
#[derive(Debug, Clone)]
pub struct ProjectContext {
  /// Project root directory (absolute path)
  pub root: PathBuf,

  /// Build input tree
  pub source_dir: PathBuf,

  /// Mod descriptor file
  pub info_path: PathBuf,

  /// Packaging descriptor file
  pub package_path: PathBuf,

  /// Changelog file
  pub changelog_path: PathBuf,

  /// Local default output location
  pub dist_dir: PathBuf,

  /// Shared mod manager directory, if one could be determined
  pub deploy_dir: Option<PathBuf>,

  /// Home directory, used as the initial value of the custom path prompt
  pub home_dir: Option<PathBuf>,

  /// Raw configuration (tag prefix, launch command)
  pub config: ShipConfig,
}

impl ProjectContext {
  /// Build the context from a root directory
  pub fn build(root: &Path, dirs: &PlatformDirs) -> ShipResult<Self> {
    let root = if root.is_absolute() {
      root.to_path_buf()
    } else {
      std::env::current_dir()?.join(root)
    };
    let config = ShipConfig::load(&root)?;
    Ok(Self::from_config(root, config, dirs))
  }

  /// Build the context from an already-loaded configuration
  pub fn from_config(root: PathBuf, config: ShipConfig, dirs: &PlatformDirs) -> Self {
    let paths = &config.paths;
    let deploy_dir = paths
      .deploy
      .as_ref()
      .map(|d| root.join(d))
      .or_else(|| dirs.default_deploy_dir());

    Self {
      source_dir: root.join(&paths.source),
      info_path: root.join(&paths.info),
      package_path: root.join(&paths.package),
      changelog_path: root.join(&paths.changelog),
      dist_dir: root.join(&paths.dist),
      deploy_dir,
      home_dir: dirs.home.clone(),
      root,
      config,
    }
  }

  /// Metadata files touched by a release, in staging order
  pub fn release_files(&self) -> Vec<&Path> {
    vec![
      self.info_path.as_path(),
      self.package_path.as_path(),
      self.changelog_path.as_path(),
    ]
  }

  pub fn tag_prefix(&self) -> &str {
    &self.config.release.tag_prefix
  }

  pub fn launch(&self) -> Option<&LaunchConfig> {
    self.config.launch.as_ref()
  }
}
