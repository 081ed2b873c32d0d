//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const SEPARATOR: &str =
  "---------------------------------------------------------------------------------------------------";

/// A mod project inside a git repository with a bare remote
pub struct TestMod {
  _root: TempDir,
  pub path: PathBuf,
  pub remote: PathBuf,
}

impl TestMod {
  /// Create a mod named `name` at `version`, committed and pushed to its remote
  pub fn new(name: &str, version: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("project");
    let remote = root.path().join("remote.git");
    std::fs::create_dir_all(path.join("src/locale/en"))?;

    git(root.path(), &["init", "--bare", "--initial-branch=main", "remote.git"])?;
    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;
    git(&path, &["config", "tag.gpgsign", "false"])?;

    std::fs::write(
      path.join("src/info.json"),
      format!(
        "{{\n  \"name\": \"{}\",\n  \"version\": \"{}\",\n  \"title\": \"Test Mod\",\n  \"factorio_version\": \"2.0\"\n}}\n",
        name, version
      ),
    )?;
    std::fs::write(path.join("src/control.lua"), "script.on_init(function() end)\n")?;
    std::fs::write(path.join("src/locale/en/strings.cfg"), "[mod-name]\ntest=Test Mod\n")?;
    std::fs::write(
      path.join("package.json"),
      format!(
        "{{\n  \"name\": \"{}\",\n  \"version\": \"{}\",\n  \"private\": true\n}}\n",
        name, version
      ),
    )?;
    std::fs::write(path.join("src/changelog.txt"), "")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial mod"])?;
    git(&path, &["remote", "add", "origin", &remote.to_string_lossy()])?;
    git(&path, &["push", "-u", "origin", "main"])?;

    Ok(Self {
      _root: root,
      path,
      remote,
    })
  }

  /// Scratch directory next to the project (outside the repository)
  pub fn scratch(&self, name: &str) -> Result<PathBuf> {
    let dir = self.path.parent().context("project has a parent")?.join(name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
  }

  /// Replace the changelog
  pub fn write_changelog(&self, content: &str) -> Result<()> {
    std::fs::write(self.path.join("src/changelog.txt"), content)?;
    Ok(())
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<()> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    Ok(())
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  /// Tags in the local repository
  pub fn tags(&self) -> Result<Vec<String>> {
    lines(&git(&self.path, &["tag", "--list"])?)
  }

  /// Tags in the bare remote
  pub fn remote_tags(&self) -> Result<Vec<String>> {
    lines(&git(&self.remote, &["tag", "--list"])?)
  }

  /// Full message of a commit in the remote
  pub fn remote_message(&self, rev: &str) -> Result<String> {
    let output = git(&self.remote, &["log", "-1", "--format=%B", rev])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
  }
}

/// A changelog entry in the on-disk format
pub fn entry(version: &str, date: &str, body: &str) -> String {
  format!("{}\nVersion: {}\nDate: {}\n{}", SEPARATOR, version, date, body)
}

fn lines(output: &Output) -> Result<Vec<String>> {
  Ok(
    String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(str::trim)
      .filter(|l| !l.is_empty())
      .map(String::from)
      .collect(),
  )
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run modship and return its output whatever the exit status
pub fn modship(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_modship");
  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env("HOME", cwd)
    .env_remove("APPDATA")
    .output()
    .context("Failed to run modship")
}

/// Run modship and fail unless it succeeds
pub fn run_modship(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = modship(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "modship command failed: modship {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
