//! CLI commands for modship
//!
//! - **build**: resolve the version and produce a zip, folder or symlink artifact
//! - **release**: resolve the version, settle patch notes, commit, tag and push
//!
//! Both commands take `&ProjectContext` and a `&mut dyn Prompter`; nothing here
//! reads the environment or the current directory.

pub mod build;
pub mod release;

pub use build::{BuildOptions, run_build};
pub use release::{ReleaseOptions, run_release};

use crate::release::version::VersionIntent;

/// Version choice from `--set-version` / `--skip-version`
pub fn version_intent(set_version: Option<String>, skip_version: bool) -> VersionIntent {
  match (set_version, skip_version) {
    (Some(version), _) => VersionIntent::Explicit(version),
    (None, true) => VersionIntent::Skip,
    (None, false) => VersionIntent::Interactive,
  }
}
