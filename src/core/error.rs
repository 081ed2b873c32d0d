//! Error types for modship with contextual messages and exit codes
//!
//! Errors fall into four groups: configuration problems (fatal before any side
//! effect), validation failures (normally recovered by re-prompting), operator
//! aborts (clean termination), and I/O or git failures (fatal, surfaced verbatim).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for modship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, corrupt metadata)
  User = 1,
  /// System error (git, archive, I/O)
  System = 2,
  /// Validation failure that could not be recovered by prompting
  Validation = 3,
  /// Operator declined a confirmation or cancelled a prompt (SIGINT convention)
  Aborted = 128,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for modship
#[derive(Debug)]
pub enum ShipError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Validation errors (version strings, tag names, changelog entries)
  Validation(ValidationError),

  /// Operator-initiated abort
  Aborted { reason: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ShipError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Operator declined or cancelled
  pub fn aborted(reason: impl Into<String>) -> Self {
    ShipError::Aborted { reason: reason.into() }
  }

  /// Add context to an existing error
  ///
  /// Io errors are promoted to messages so the failing path is not lost.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ShipError::Message { message, context, help } => ShipError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ShipError::Io(e) => ShipError::Message {
        message: ctx_str,
        context: Some(format!("I/O error: {}", e)),
        help: None,
      },
      _ => self,
    }
  }

  /// Whether this error is an operator abort rather than a failure
  pub fn is_abort(&self) -> bool {
    matches!(self, ShipError::Aborted { .. })
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ShipError::Config(_) => ExitCode::User,
      ShipError::Git(_) => ExitCode::System,
      ShipError::Validation(_) => ExitCode::Validation,
      ShipError::Aborted { .. } => ExitCode::Aborted,
      ShipError::Io(_) => ExitCode::System,
      ShipError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ShipError::Config(e) => e.help_message(),
      ShipError::Git(e) => e.help_message(),
      ShipError::Validation(e) => e.help_message(),
      ShipError::Io(e) if e.kind() == io::ErrorKind::PermissionDenied => {
        Some("Check permissions on the destination, or run from an elevated shell for symlink builds.".to_string())
      }
      ShipError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ShipError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShipError::Config(e) => write!(f, "{}", e),
      ShipError::Git(e) => write!(f, "{}", e),
      ShipError::Validation(e) => write!(f, "{}", e),
      ShipError::Aborted { reason } => write!(f, "Aborted: {}", reason),
      ShipError::Io(e) => write!(f, "I/O error: {}", e),
      ShipError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ShipError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ShipError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ShipError {
  fn from(err: io::Error) -> Self {
    ShipError::Io(err)
  }
}

impl From<String> for ShipError {
  fn from(msg: String) -> Self {
    ShipError::message(msg)
  }
}

impl From<&str> for ShipError {
  fn from(msg: &str) -> Self {
    ShipError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ShipError {
  fn from(err: toml_edit::de::Error) -> Self {
    ShipError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ShipError {
  fn from(err: serde_json::Error) -> Self {
    ShipError::message(format!("JSON error: {}", err))
  }
}

impl From<zip::result::ZipError> for ShipError {
  fn from(err: zip::result::ZipError) -> Self {
    match err {
      zip::result::ZipError::Io(e) => ShipError::Io(e),
      other => ShipError::message(format!("Archive error: {}", other)),
    }
  }
}

impl From<std::path::StripPrefixError> for ShipError {
  fn from(err: std::path::StripPrefixError) -> Self {
    ShipError::message(format!("Path strip prefix error: {}", err))
  }
}

impl From<regex::Error> for ShipError {
  fn from(err: regex::Error) -> Self {
    ShipError::message(format!("Pattern error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// A structured file could not be parsed
  Parse { path: PathBuf, reason: String },

  /// Missing required field
  MissingField { path: PathBuf, field: String },

  /// Persisted version is not a semantic version
  InvalidVersion { path: PathBuf, version: String },

  /// Unknown build kind
  InvalidBuildKind { value: String },

  /// Destination directory does not exist and may not be created
  MissingDestination { path: PathBuf },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::InvalidVersion { path, .. } => Some(format!(
        "Fix the \"version\" field in {} by hand (e.g. \"1.0.0\"); it cannot be recovered automatically.",
        path.display()
      )),
      ConfigError::InvalidBuildKind { .. } => Some("Valid build kinds are: zip, folder, symlink.".to_string()),
      ConfigError::MissingDestination { .. } => {
        Some("Custom destinations are never created automatically. Create the directory first.".to_string())
      }
      ConfigError::MissingField { field, .. } => Some(format!("Add a \"{}\" field to the file.", field)),
      ConfigError::Parse { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Parse { path, reason } => {
        write!(f, "{} is not valid: {}", path.display(), reason)
      }
      ConfigError::MissingField { path, field } => {
        write!(f, "Missing required field '{}' in {}", field, path.display())
      }
      ConfigError::InvalidVersion { path, version } => {
        write!(f, "Version '{}' in {} is not a valid semantic version", version, path.display())
      }
      ConfigError::InvalidBuildKind { value } => {
        write!(f, "Invalid build kind: {}", value)
      }
      ConfigError::MissingDestination { path } => {
        write!(f, "Destination does not exist: {}", path.display())
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed { what: String, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") || reason.contains("rejected") {
          Some("The remote has commits you don't have. Pull, then push the release commit and tag by hand.".to_string())
        } else if reason.contains("no upstream") {
          Some("Set an upstream first: git push -u origin <branch>".to_string())
        } else if reason.contains("ermission denied") || reason.contains("403") {
          Some("Check your SSH key permissions and remote access.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Releases must run inside a git working tree: {}",
        path.display()
      )),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { what, reason } => {
        write!(f, "Pushing {} failed: {}", what, reason.trim_end())
      }
    }
  }
}

/// Validation errors
///
/// These are normally shown inline and re-prompted. They only terminate the
/// run when prompting is non-interactive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
  /// Not a semantic version
  Version { input: String },

  /// Commit message empty after trimming
  EmptyCommitMessage,

  /// Tag name empty after trimming
  EmptyTagName,

  /// Tag already present in the repository
  TagExists { tag: String },

  /// Changelog entry does not follow the entry grammar
  ChangelogEntry { reason: String },

  /// Path entered by the operator does not exist
  PathNotFound { path: PathBuf },

  /// A version bump would exceed the largest component value
  VersionOverflow { version: String },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::Version { .. } => Some("Use MAJOR.MINOR.PATCH, e.g. 1.4.0".to_string()),
      ValidationError::VersionOverflow { .. } => Some("Pass the next version with --set-version.".to_string()),
      ValidationError::TagExists { .. } => Some("Pass a different tag name, or delete the existing tag.".to_string()),
      ValidationError::ChangelogEntry { .. } => Some(
        "Entries start with a line of 99 '-', then 'Version: X.Y.Z', 'Date: DD.MM.YYYY' and at least one line of notes."
          .to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::Version { input } => write!(f, "Version {} is not a valid semver.", input),
      ValidationError::EmptyCommitMessage => write!(f, "Commit message is required"),
      ValidationError::EmptyTagName => write!(f, "Tag name is required"),
      ValidationError::TagExists { tag } => write!(f, "Tag {} already exists", tag),
      ValidationError::ChangelogEntry { reason } => write!(f, "Invalid patch notes: {}", reason),
      ValidationError::PathNotFound { path } => write!(f, "Path not valid: {}", path.display()),
      ValidationError::VersionOverflow { version } => write!(f, "Version {} cannot be bumped any further", version),
    }
  }
}

impl From<ValidationError> for ShipError {
  fn from(err: ValidationError) -> Self {
    ShipError::Validation(err)
  }
}

impl From<ConfigError> for ShipError {
  fn from(err: ConfigError) -> Self {
    ShipError::Config(err)
  }
}

impl From<GitError> for ShipError {
  fn from(err: GitError) -> Self {
    ShipError::Git(err)
  }
}

/// Result type alias for modship
pub type ShipResult<T> = Result<T, ShipError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ShipResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ShipError>,
{
  fn context(self, ctx: impl Into<String>) -> ShipResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
///
/// Aborts are not failures: they get a single informational line.
pub fn print_error(error: &ShipError) {
  if let ShipError::Aborted { reason } = error {
    eprintln!("\n🛑 Aborting: {}", reason);
    return;
  }

  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exit_codes_are_distinct_per_category() {
    assert_eq!(ShipError::aborted("declined").exit_code().as_i32(), 128);
    assert_eq!(
      ShipError::Config(ConfigError::InvalidBuildKind { value: "tar".into() })
        .exit_code()
        .as_i32(),
      1
    );
    assert_eq!(
      ShipError::Git(GitError::CommandFailed {
        command: "git push".into(),
        stderr: String::new(),
      })
      .exit_code()
      .as_i32(),
      2
    );
    assert_eq!(ShipError::from(ValidationError::EmptyTagName).exit_code().as_i32(), 3);
  }

  #[test]
  fn test_context_keeps_io_cause() {
    let err = ShipError::from(io::Error::new(io::ErrorKind::NotFound, "gone")).context("Failed to read info.json");
    let text = err.to_string();
    assert!(text.contains("Failed to read info.json"));
    assert!(text.contains("gone"));
  }

  #[test]
  fn test_abort_is_not_failure() {
    assert!(ShipError::aborted("x").is_abort());
    assert!(!ShipError::message("x").is_abort());
  }

  #[test]
  fn test_tag_exists_help() {
    let err = ShipError::from(ValidationError::TagExists { tag: "v1.0.0".into() });
    assert_eq!(err.to_string(), "Tag v1.0.0 already exists");
    assert!(err.help_message().is_some());
  }
}
