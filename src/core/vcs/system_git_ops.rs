//! Release operations for SystemGit (stage, commit, tag, push, config)

use super::ReleaseVcs;
use super::system_git::SystemGit;
use crate::core::error::{GitError, ResultExt, ShipError, ShipResult};
use std::path::Path;

impl ReleaseVcs for SystemGit {
  fn stage(&self, paths: &[&Path]) -> ShipResult<()> {
    let mut cmd = self.git_cmd();
    cmd.arg("add").arg("--");
    for path in paths {
      cmd.arg(path);
    }

    let output = cmd.output().context("Failed to run git add")?;
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::CommandFailed {
        command: "git add".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  fn commit(&self, message: &str, sign: bool) -> ShipResult<()> {
    let mut args = vec!["commit"];
    if sign {
      args.push("-S");
    }
    args.extend(["-m", message]);
    self.run(&args)?;
    Ok(())
  }

  fn tags(&self) -> ShipResult<Vec<String>> {
    let output = self.run(&["tag", "--list"])?;
    let tags = String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();
    Ok(tags)
  }

  fn create_tag(&self, name: &str, message: &str, sign: bool) -> ShipResult<()> {
    let mut args = vec!["tag"];
    if sign {
      args.push("-s");
    }
    args.extend(["-a", "-m", message, name]);
    self.run(&args)?;
    Ok(())
  }

  fn push(&self) -> ShipResult<()> {
    let branch = self.current_branch()?;
    println!("   Pushing '{}'...", branch);

    let output = self.git_cmd().arg("push").output().context("Failed to push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::PushFailed {
        what: format!("branch '{}'", branch),
        reason: stderr.to_string(),
      }));
    }

    println!("   ✅ Pushed {}", branch);
    Ok(())
  }

  fn push_tags(&self) -> ShipResult<()> {
    println!("   Pushing tags...");

    let output = self
      .git_cmd()
      .args(["push", "--tags"])
      .output()
      .context("Failed to push tags")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::PushFailed {
        what: "tags".to_string(),
        reason: stderr.to_string(),
      }));
    }

    println!("   ✅ Pushed tags");
    Ok(())
  }

  fn config_value(&self, key: &str) -> ShipResult<Option<String>> {
    let output = self
      .git_cmd()
      .args(["config", "--get", key])
      .output()
      .with_context(|| format!("Failed to read git config {}", key))?;

    // Exit code 1 means the key is unset
    if !output.status.success() {
      return Ok(None);
    }

    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(if value.is_empty() { None } else { Some(value) })
  }
}
