//! Integration tests for `modship build`

use crate::helpers::{TestMod, modship, run_modship};
use anyhow::Result;

#[test]
fn test_build_zip_into_dist() -> Result<()> {
  let m = TestMod::new("test-mod", "1.0.0")?;

  let output = run_modship(&m.path, &["build", "--yes", "--skip-version", "--dir", "dist", "--kind", "zip"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  let archive = m.path.join("dist/test-mod_1.0.0.zip");
  assert!(archive.is_file(), "archive should exist");
  assert!(std::fs::metadata(&archive)?.len() > 0);
  assert!(stdout.contains("bytes"), "size should be reported: {}", stdout);

  Ok(())
}

#[test]
fn test_build_folder_with_new_version_updates_metadata() -> Result<()> {
  let m = TestMod::new("test-mod", "1.0.0")?;

  run_modship(
    &m.path,
    &["build", "--yes", "--set-version", "1.1.0", "--dir", "dist", "--kind", "folder"],
  )?;

  assert!(m.path.join("dist/test-mod_1.1.0/control.lua").is_file());
  assert!(m.path.join("dist/test-mod_1.1.0/locale/en/strings.cfg").is_file());

  let info = m.read_file("src/info.json")?;
  assert!(info.contains("\"version\": \"1.1.0\""));
  assert!(info.contains("\"factorio_version\": \"2.0\""));
  assert!(info.ends_with("}\n"));

  let package = m.read_file("package.json")?;
  assert!(package.contains("\"version\": \"1.1.0\""));
  assert!(package.contains("\"private\": true"));

  Ok(())
}

#[test]
fn test_defaults_build_current_version_zip() -> Result<()> {
  let m = TestMod::new("test-mod", "2.3.4")?;

  run_modship(&m.path, &["--yes", "build"])?;

  assert!(m.path.join("dist/test-mod_2.3.4.zip").is_file());
  assert!(m.read_file("src/info.json")?.contains("\"version\": \"2.3.4\""));

  Ok(())
}

#[test]
fn test_rebuild_same_version_keeps_single_artifact() -> Result<()> {
  let m = TestMod::new("test-mod", "1.0.0")?;
  let args = ["build", "--yes", "--skip-version", "--dir", "dist", "--kind", "folder"];

  run_modship(&m.path, &args)?;
  run_modship(&m.path, &args)?;
  run_modship(&m.path, &["build", "--yes", "--skip-version", "--dir", "dist", "--kind", "zip"])?;

  let names: Vec<String> = std::fs::read_dir(m.path.join("dist"))?
    .map(|e| e.map(|e| e.file_name().to_string_lossy().to_string()))
    .collect::<Result<_, _>>()?;
  assert_eq!(names, vec!["test-mod_1.0.0.zip".to_string()]);

  Ok(())
}

#[test]
fn test_deploy_dir_is_swept_of_other_versions() -> Result<()> {
  let m = TestMod::new("test-mod", "1.2.0")?;
  let mods = m.scratch("mods")?;
  std::fs::write(mods.join("test-mod_1.1.0.zip"), "stale")?;
  std::fs::create_dir_all(mods.join("test-mod_1.0.0"))?;
  std::fs::write(mods.join("other-mod_1.0.0.zip"), "keep")?;
  std::fs::write(m.path.join("modship.toml"), "[paths]\ndeploy = \"../mods\"\n")?;

  run_modship(&m.path, &["build", "--yes", "--skip-version", "--dir", "deploy", "--kind", "folder"])?;

  let mut names: Vec<String> = std::fs::read_dir(&mods)?
    .map(|e| e.map(|e| e.file_name().to_string_lossy().to_string()))
    .collect::<Result<_, _>>()?;
  names.sort();
  assert_eq!(names, vec!["other-mod_1.0.0.zip", "test-mod_1.2.0"]);

  Ok(())
}

#[test]
fn test_invalid_kind_is_config_error() -> Result<()> {
  let m = TestMod::new("test-mod", "1.0.0")?;

  let output = modship(
    &m.path,
    &["build", "--yes", "--set-version", "2.0.0", "--dir", "dist", "--kind", "tarball"],
  )?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid build kind: tarball"));
  assert!(m.read_file("src/info.json")?.contains("\"version\": \"1.0.0\""));
  assert!(!m.path.join("dist").exists());

  Ok(())
}

#[test]
fn test_missing_custom_destination_is_not_created() -> Result<()> {
  let m = TestMod::new("test-mod", "1.0.0")?;

  let output = modship(&m.path, &["build", "--yes", "--skip-version", "--dir", "nowhere", "--kind", "zip"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Destination does not exist"));
  assert!(!m.path.join("nowhere").exists());

  Ok(())
}

#[test]
fn test_invalid_explicit_version_without_prompting() -> Result<()> {
  let m = TestMod::new("test-mod", "1.0.0")?;

  let output = modship(&m.path, &["build", "--yes", "--set-version", "one", "--dir", "dist"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Version one is not a valid semver."));

  Ok(())
}

#[test]
fn test_corrupt_persisted_version_is_fatal() -> Result<()> {
  let m = TestMod::new("test-mod", "1.0.0")?;
  std::fs::write(m.path.join("src/info.json"), "{\"name\": \"test-mod\", \"version\": \"1.x\"}\n")?;

  let output = modship(&m.path, &["build", "--yes", "--dir", "dist", "--kind", "zip"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("not a valid semantic version"));

  Ok(())
}
