use crate::core::error::{ResultExt, ShipError, ShipResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for modship
/// Searched in order: modship.toml, .modship.toml, .config/modship.toml
///
/// Every field is optional; a project with the conventional layout
/// (`src/`, `src/info.json`, `package.json`, `src/changelog.txt`) needs no file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipConfig {
  #[serde(default)]
  pub paths: PathsConfig,
  #[serde(default)]
  pub release: ReleaseSettings,
  #[serde(default)]
  pub launch: Option<LaunchConfig>,
}

/// Project layout, relative to the project root
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
  /// Directory tree that becomes the artifact
  #[serde(default = "default_source")]
  pub source: PathBuf,

  /// Mod descriptor (name + version)
  #[serde(default = "default_info")]
  pub info: PathBuf,

  /// Packaging descriptor kept in step with the mod descriptor
  #[serde(default = "default_package")]
  pub package: PathBuf,

  /// Plain-text changelog
  #[serde(default = "default_changelog")]
  pub changelog: PathBuf,

  /// Local output directory (created on demand, never swept)
  #[serde(default = "default_dist")]
  pub dist: PathBuf,

  /// Mod manager directory; overrides the platform default when set
  #[serde(default)]
  pub deploy: Option<PathBuf>,
}

fn default_source() -> PathBuf {
  PathBuf::from("src")
}

fn default_info() -> PathBuf {
  PathBuf::from("src").join("info.json")
}

fn default_package() -> PathBuf {
  PathBuf::from("package.json")
}

fn default_changelog() -> PathBuf {
  PathBuf::from("src").join("changelog.txt")
}

fn default_dist() -> PathBuf {
  PathBuf::from("dist")
}

impl Default for PathsConfig {
  fn default() -> Self {
    Self {
      source: default_source(),
      info: default_info(),
      package: default_package(),
      changelog: default_changelog(),
      dist: default_dist(),
      deploy: None,
    }
  }
}

/// Release transaction settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseSettings {
  /// Prefix of the default tag name (`v` → `v1.2.0`)
  #[serde(default = "default_tag_prefix")]
  pub tag_prefix: String,
}

fn default_tag_prefix() -> String {
  "v".to_string()
}

impl Default for ReleaseSettings {
  fn default() -> Self {
    Self {
      tag_prefix: default_tag_prefix(),
    }
  }
}

/// Command that starts the game after a build
///
/// ```toml
/// [launch]
/// command = "factorio"
/// args = ["--load-game", "test"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchConfig {
  pub command: String,
  #[serde(default)]
  pub args: Vec<String>,
}

impl ShipConfig {
  /// Find config file in search order: modship.toml, .modship.toml, .config/modship.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("modship.toml"),
      path.join(".modship.toml"),
      path.join(".config").join("modship.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load(path: &Path) -> ShipResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ShipConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Validate configuration values that serde cannot check
  pub fn validate(&self) -> ShipResult<()> {
    if self.paths.source.as_os_str().is_empty() {
      return Err(ShipError::message("paths.source must not be empty"));
    }

    if let Some(launch) = &self.launch
      && launch.command.trim().is_empty()
    {
      return Err(ShipError::with_help(
        "launch.command must not be empty",
        "Remove the [launch] section or set command to the game executable",
      ));
    }

    if self.release.tag_prefix.chars().any(char::is_whitespace) {
      return Err(ShipError::message(format!(
        "Invalid tag prefix '{}'. Tag names cannot contain whitespace",
        self.release.tag_prefix
      )));
    }

    Ok(())
  }
}
