//! Integration tests for `modship release`

use crate::helpers::{TestMod, entry, git, modship, run_modship};
use anyhow::Result;

#[test]
fn test_release_with_existing_notes() -> Result<()> {
  let m = TestMod::new("test-mod", "1.0.0")?;
  let changelog = format!(
    "{}\n\n{}\n",
    entry("1.1.0", "16.10.2026", "  Features:\n    - Rail planner"),
    entry("1.0.0", "01.09.2026", "  Info:\n    - First release")
  );
  m.write_changelog(&changelog)?;
  m.commit("Notes for 1.1.0")?;

  let output = run_modship(&m.path, &["release", "--yes", "--set-version", "1.1.0"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Patch notes for v1.1.0 found"), "{}", stdout);

  assert_eq!(m.tags()?, vec!["v1.1.0".to_string()]);
  assert_eq!(m.remote_tags()?, vec!["v1.1.0".to_string()]);

  let message = m.remote_message("main")?;
  assert_eq!(
    message,
    "Release\nVersion: 1.1.0\nDate: 16.10.2026\n  Features:\n    - Rail planner"
  );

  // Existing notes are not rewritten
  assert_eq!(m.read_file("src/changelog.txt")?, changelog);
  assert!(m.read_file("src/info.json")?.contains("\"version\": \"1.1.0\""));

  // Metadata changes are part of the release commit
  let status = git(&m.path, &["status", "--porcelain"])?;
  assert!(String::from_utf8_lossy(&status.stdout).trim().is_empty());

  Ok(())
}

#[test]
fn test_release_without_notes_fails_before_any_change() -> Result<()> {
  let m = TestMod::new("test-mod", "1.0.0")?;

  let output = modship(&m.path, &["release", "--yes", "--set-version", "1.1.0"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid patch notes"));
  assert!(m.tags()?.is_empty());
  assert_eq!(m.remote_message("main")?, "Initial mod");
  assert!(m.read_file("src/info.json")?.contains("\"version\": \"1.0.0\""));

  Ok(())
}

#[test]
fn test_release_tag_collision_never_retags_or_commits() -> Result<()> {
  let m = TestMod::new("test-mod", "1.0.0")?;
  m.write_changelog(&format!("{}\n", entry("1.1.0", "16.10.2026", "  Fixes:\n    - Crash on load")))?;
  m.commit("Notes for 1.1.0")?;
  git(&m.path, &["tag", "v1.1.0"])?;
  let tagged = git(&m.path, &["rev-parse", "v1.1.0"])?;

  let output = modship(&m.path, &["release", "--yes", "--set-version", "1.1.0"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr.contains("Tag v1.1.0 already exists"), "{}", stderr);
  assert!(!stderr.contains("git reset --soft HEAD~1"), "{}", stderr);

  // No release commit was made
  let head = git(&m.path, &["log", "-1", "--format=%s"])?;
  assert_eq!(String::from_utf8_lossy(&head.stdout).trim(), "Notes for 1.1.0");

  // The pre-existing tag still points where it did
  assert_eq!(git(&m.path, &["rev-parse", "v1.1.0"])?.stdout, tagged.stdout);
  assert!(m.remote_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_release_with_custom_tag_prefix() -> Result<()> {
  let m = TestMod::new("test-mod", "0.4.2")?;
  std::fs::write(m.path.join("modship.toml"), "[release]\ntag_prefix = \"test-mod-v\"\n")?;
  m.write_changelog(&format!("{}\n", entry("0.5.0", "3/2/2026", "  Changes:\n    - Rebalanced")))?;
  m.commit("Notes for 0.5.0")?;

  run_modship(&m.path, &["release", "--yes", "--set-version", "v0.5.0"])?;

  assert_eq!(m.remote_tags()?, vec!["test-mod-v0.5.0".to_string()]);
  assert!(m.read_file("package.json")?.contains("\"version\": \"0.5.0\""));

  Ok(())
}

#[test]
fn test_skip_version_uses_canonical_text() -> Result<()> {
  let m = TestMod::new("test-mod", "v1.1.0")?;
  m.write_changelog(&format!("{}\n", entry("1.1.0", "16.10.2026", "  Fixes:\n    - Desync")))?;
  m.commit("Notes for 1.1.0")?;

  run_modship(&m.path, &["release", "--yes", "--skip-version"])?;

  assert_eq!(m.remote_tags()?, vec!["v1.1.0".to_string()]);
  assert!(m.read_file("src/info.json")?.contains("\"version\": \"1.1.0\""));
  assert!(m.remote_message("main")?.starts_with("Release\nVersion: 1.1.0"));

  Ok(())
}
