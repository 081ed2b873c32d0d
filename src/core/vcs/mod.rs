pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::ShipResult;
use std::path::Path;

/// Version-control operations needed by a release transaction
///
/// `SystemGit` is the production implementation; the release publisher only
/// sees this trait.
pub trait ReleaseVcs {
  /// Add files to the pending change set
  fn stage(&self, paths: &[&Path]) -> ShipResult<()>;

  /// Commit the staged change set
  fn commit(&self, message: &str, sign: bool) -> ShipResult<()>;

  /// Every existing tag name
  fn tags(&self) -> ShipResult<Vec<String>>;

  /// Create an annotated tag on HEAD
  fn create_tag(&self, name: &str, message: &str, sign: bool) -> ShipResult<()>;

  /// Push commits of the current branch to its upstream
  fn push(&self) -> ShipResult<()>;

  /// Push all tags
  fn push_tags(&self) -> ShipResult<()>;

  /// Read a configuration value (`None` when unset)
  fn config_value(&self, key: &str) -> ShipResult<Option<String>>;
}

/// Signing settings already present in git configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SigningSettings {
  pub has_signing_key: bool,
  pub commit_gpgsign: bool,
  pub tag_gpgsign: bool,
}

impl SigningSettings {
  /// Read `user.signingkey`, `commit.gpgsign` and `tag.gpgsign` (read-only)
  pub fn load(vcs: &dyn ReleaseVcs) -> ShipResult<Self> {
    let has_signing_key = vcs
      .config_value("user.signingkey")?
      .is_some_and(|key| !key.trim().is_empty());
    let commit_gpgsign = is_true(vcs.config_value("commit.gpgsign")?);
    let tag_gpgsign = is_true(vcs.config_value("tag.gpgsign")?);

    Ok(Self {
      has_signing_key,
      commit_gpgsign,
      tag_gpgsign,
    })
  }

  /// A key exists but git would not sign both commit and tag on its own
  pub fn should_ask(&self) -> bool {
    self.has_signing_key && !(self.commit_gpgsign && self.tag_gpgsign)
  }
}

fn is_true(value: Option<String>) -> bool {
  value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}
