//! Mod metadata files: the mod descriptor and the packaging descriptor
//!
//! Both are JSON objects carrying at least `name` and `version`. They are
//! rewritten together after version resolution with the same version, keeping
//! every other field and the original key order.

use crate::core::context::ProjectContext;
use crate::core::error::{ConfigError, ResultExt, ShipResult};
use crate::release::version::ResolvedVersion;
use semver::Version;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Identity and version of the mod being built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModDescriptor {
  pub name: String,
  pub current_version: String,
  pub next_version: Version,
}

impl ModDescriptor {
  /// `<name>_<version>`, the stem of every artifact
  pub fn artifact_stem(&self) -> String {
    format!("{}_{}", self.name, self.next_version)
  }
}

/// A JSON object loaded from disk
#[derive(Debug, Clone)]
pub struct JsonRecord {
  pub path: PathBuf,
  pub fields: Map<String, Value>,
}

impl JsonRecord {
  /// Load a JSON object; anything else is a parse error
  pub fn load(path: &Path) -> ShipResult<Self> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      reason: e.to_string(),
    })?;

    match value {
      Value::Object(fields) => Ok(Self {
        path: path.to_path_buf(),
        fields,
      }),
      other => Err(
        ConfigError::Parse {
          path: path.to_path_buf(),
          reason: format!("expected a JSON object, found {}", json_kind(&other)),
        }
        .into(),
      ),
    }
  }

  fn string_field(&self, field: &str) -> Option<&str> {
    self.fields.get(field).and_then(Value::as_str)
  }

  fn set(&mut self, field: &str, value: &str) {
    self.fields.insert(field.to_string(), Value::String(value.to_string()));
  }

  /// Two-space indented JSON with a trailing newline
  pub fn to_pretty_string(&self) -> ShipResult<String> {
    let mut text = serde_json::to_string_pretty(&self.fields)?;
    text.push('\n');
    Ok(text)
  }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Replace `path` with `contents` in one rename
pub fn write_atomic(path: &Path, contents: &str) -> ShipResult<()> {
  let file_name = path
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| "file".to_string());
  let tmp = path.with_file_name(format!(".{}.modship-tmp", file_name));

  fs::write(&tmp, contents).with_context(|| format!("Failed to write {}", tmp.display()))?;
  if let Err(e) = fs::rename(&tmp, path) {
    let _ = fs::remove_file(&tmp);
    return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
  }
  Ok(())
}

/// Both metadata files of a mod
#[derive(Debug, Clone)]
pub struct ModMetadata {
  pub info: JsonRecord,
  pub package: JsonRecord,
  /// `version` of the mod descriptor as loaded, untouched by `persist`
  loaded_version: Option<Value>,
}

impl ModMetadata {
  pub fn load(ctx: &ProjectContext) -> ShipResult<Self> {
    let info = JsonRecord::load(&ctx.info_path)?;
    let package = JsonRecord::load(&ctx.package_path)?;
    let loaded_version = info.fields.get("version").cloned();
    let metadata = Self {
      info,
      package,
      loaded_version,
    };
    metadata.name()?;
    Ok(metadata)
  }

  /// Mod name from the mod descriptor
  pub fn name(&self) -> ShipResult<&str> {
    match self.info.string_field("name") {
      Some(name) if !name.trim().is_empty() => Ok(name),
      _ => Err(
        ConfigError::MissingField {
          path: self.info.path.clone(),
          field: "name".to_string(),
        }
        .into(),
      ),
    }
  }

  /// Version text from before this run; a missing field reads as `0.0.0`
  pub fn version(&self) -> ShipResult<String> {
    match &self.loaded_version {
      None | Some(Value::Null) => Ok("0.0.0".to_string()),
      Some(Value::String(v)) => Ok(v.clone()),
      Some(other) => Err(
        ConfigError::InvalidVersion {
          path: self.info.path.clone(),
          version: other.to_string(),
        }
        .into(),
      ),
    }
  }

  /// Descriptor for this run, after version resolution
  ///
  /// `current_version` stays the loaded one even once `persist` has run.
  pub fn descriptor(&self, resolved: &ResolvedVersion) -> ShipResult<ModDescriptor> {
    Ok(ModDescriptor {
      name: self.name()?.to_string(),
      current_version: self.version()?,
      next_version: resolved.version.clone(),
    })
  }

  /// Write name and version into both files
  ///
  /// Both documents are serialized before either file is touched.
  pub fn persist(&mut self, resolved: &ResolvedVersion) -> ShipResult<()> {
    let name = self.name()?.to_string();
    self.package.set("name", &name);
    self.package.set("version", &resolved.text);
    self.info.set("version", &resolved.text);

    let package_text = self.package.to_pretty_string()?;
    let info_text = self.info.to_pretty_string()?;
    write_atomic(&self.package.path, &package_text)?;
    write_atomic(&self.info.path, &info_text)?;

    tracing::info!(name = %name, version = %resolved.text, "metadata updated");
    Ok(())
  }
}
