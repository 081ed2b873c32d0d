//! Version resolution: from the persisted version to the one being built
//!
//! The persisted version must already be a semantic version; anything else is
//! corrupt metadata and stops the run. Operator input is validated and
//! re-prompted, and non-canonical spellings (`v1.2.0`, ` =1.2.0`) are only
//! rewritten after confirmation.

use crate::core::error::{ConfigError, ShipResult, ValidationError};
use crate::ui::prompt::{Prompter, confirm_or_abort, text_until_valid};
use semver::Version;
use std::path::Path;

/// Version bump offered to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
  Patch,
  Minor,
  Major,
}

impl VersionBump {
  /// Apply bump to a semver version
  ///
  /// Lower components reset to zero; pre-release and build metadata are dropped.
  pub fn apply(&self, version: &Version) -> Result<Version, ValidationError> {
    let next = match self {
      VersionBump::Major => version.major.checked_add(1).map(|major| Version::new(major, 0, 0)),
      VersionBump::Minor => version
        .minor
        .checked_add(1)
        .map(|minor| Version::new(version.major, minor, 0)),
      VersionBump::Patch => version
        .patch
        .checked_add(1)
        .map(|patch| Version::new(version.major, version.minor, patch)),
    };
    next.ok_or_else(|| ValidationError::VersionOverflow {
      version: version.to_string(),
    })
  }
}

/// How the next version is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionIntent {
  /// Keep the persisted version, offering its canonical spelling
  Skip,
  /// Offer current / patch / minor / major / custom
  Interactive,
  /// Operator-supplied version; exempt from the "must increase" gate
  Explicit(String),
}

/// A validated version and the exact text that will be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
  pub version: Version,
  pub text: String,
}

/// Parse a version, tolerating surrounding whitespace and leading `v` / `=`
pub fn parse_lenient(input: &str) -> Result<Version, ValidationError> {
  let cleaned = input.trim().trim_start_matches(['=', 'v', 'V']);
  Version::parse(cleaned).map_err(|_| ValidationError::Version {
    input: input.to_string(),
  })
}

/// Canonical text of a (leniently) valid version
pub fn canonical(input: &str) -> Result<String, ValidationError> {
  parse_lenient(input).map(|v| v.to_string())
}

/// Resolve the next version for a mod whose descriptor at `source` holds `current`
pub fn resolve_version(
  current: &str,
  source: &Path,
  intent: &VersionIntent,
  prompter: &mut dyn Prompter,
) -> ShipResult<ResolvedVersion> {
  let current_version = parse_lenient(current).map_err(|_| ConfigError::InvalidVersion {
    path: source.to_path_buf(),
    version: current.to_string(),
  })?;

  match intent {
    VersionIntent::Skip => validate_candidate(prompter, current.to_string()),
    VersionIntent::Explicit(raw) => validate_candidate(prompter, raw.clone()),
    VersionIntent::Interactive => {
      let candidate = choose_candidate(prompter, current, &current_version)?;
      let resolved = validate_candidate(prompter, candidate)?;

      if resolved.version <= current_version {
        confirm_or_abort(
          prompter,
          &format!("Version {} is not greater than {}. Continue?", resolved.text, current_version),
          true,
        )?;
      }

      Ok(resolved)
    }
  }
}

fn choose_candidate(prompter: &mut dyn Prompter, current: &str, current_version: &Version) -> ShipResult<String> {
  let bumps = [VersionBump::Patch, VersionBump::Minor, VersionBump::Major];
  let next = bumps
    .iter()
    .map(|b| b.apply(current_version))
    .collect::<Result<Vec<Version>, _>>()?;

  let choices = vec![
    format!("Current: v{}", current.trim()),
    format!("Patch: v{}", next[0]),
    format!("Minor: v{}", next[1]),
    format!("Major: v{}", next[2]),
    "Custom".to_string(),
  ];

  let candidate = match prompter.select("Version", &choices, 0)? {
    0 => current.to_string(),
    i @ 1..=3 => next[i - 1].to_string(),
    _ => prompt_custom(prompter, &current_version.to_string())?,
  };
  Ok(candidate)
}

/// Validate, then settle on canonical text
///
/// Declining canonicalization sends the operator back to the custom prompt, so
/// only canonical text is ever returned.
fn validate_candidate(prompter: &mut dyn Prompter, candidate: String) -> ShipResult<ResolvedVersion> {
  let mut raw = candidate;
  loop {
    let version = match parse_lenient(&raw) {
      Ok(v) => v,
      Err(err) => {
        if !prompter.is_interactive() {
          return Err(err.into());
        }
        prompter.warn(&err.to_string());
        raw = prompt_custom(prompter, &raw)?;
        continue;
      }
    };

    let text = version.to_string();
    if raw == text {
      return Ok(ResolvedVersion { version, text });
    }

    if prompter.confirm(&format!("Convert {} to cleaned version {}?", raw, text), true)? {
      return Ok(ResolvedVersion { version, text });
    }

    if !prompter.is_interactive() {
      return Err(ValidationError::Version { input: raw }.into());
    }
    raw = prompt_custom(prompter, &raw)?;
  }
}

fn prompt_custom(prompter: &mut dyn Prompter, initial: &str) -> ShipResult<String> {
  text_until_valid(prompter, "Custom version", initial, |s| parse_lenient(s).map(|_| s.to_string()))
}
