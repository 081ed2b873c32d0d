//! Release publishing: stage, commit, tag, push
//!
//! A release is a small state machine over [`ReleaseVcs`]. Commit message, tag
//! name and signing are all settled before the commit. Every transition is
//! attempted at most once and nothing is rolled back: when a step fails after
//! the local commit exists, the operator gets the commands that undo (or
//! finish) the release by hand.

use crate::core::error::{ShipResult, ValidationError};
use crate::core::vcs::{ReleaseVcs, SigningSettings};
use crate::release::changelog::ChangelogEntry;
use crate::ui::prompt::{Prompter, confirm_or_abort, text_until_valid};
use std::fmt;
use std::path::Path;

/// Where a release transaction currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReleaseState {
  Start,
  Staged,
  Committed,
  Tagged,
  PushedCommits,
  PushedTags,
}

impl fmt::Display for ReleaseState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ReleaseState::Start => "start",
      ReleaseState::Staged => "staged",
      ReleaseState::Committed => "committed",
      ReleaseState::Tagged => "tagged",
      ReleaseState::PushedCommits => "pushed commits",
      ReleaseState::PushedTags => "pushed tags",
    };
    f.write_str(name)
  }
}

/// What was published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
  pub message: String,
  pub tag: String,
  pub signed: bool,
}

/// Inputs of one release
pub struct ReleaseRequest<'a> {
  /// Files to stage, already written
  pub files: &'a [&'a Path],
  /// Persisted version text
  pub version: &'a str,
  /// Prefix of the default tag name
  pub tag_prefix: &'a str,
  pub notes: &'a ChangelogEntry,
}

/// Default release message: a title line followed by the patch notes
pub fn default_message(notes: &ChangelogEntry) -> String {
  format!("Release\n{}", notes.content())
}

/// Commit message must contain something other than whitespace
pub fn validate_message(input: &str) -> Result<String, ValidationError> {
  if input.trim().is_empty() {
    Err(ValidationError::EmptyCommitMessage)
  } else {
    Ok(input.to_string())
  }
}

/// Tag name must be non-empty and unused
pub fn validate_tag(input: &str, existing: &[String]) -> Result<String, ValidationError> {
  let tag = input.trim();
  if tag.is_empty() {
    return Err(ValidationError::EmptyTagName);
  }
  if existing.iter().any(|t| t == tag) {
    return Err(ValidationError::TagExists { tag: tag.to_string() });
  }
  Ok(tag.to_string())
}

/// Drives one release transaction
pub struct Publisher<'a> {
  vcs: &'a dyn ReleaseVcs,
  state: ReleaseState,
  tag: Option<String>,
}

impl<'a> Publisher<'a> {
  pub fn new(vcs: &'a dyn ReleaseVcs) -> Self {
    Self {
      vcs,
      state: ReleaseState::Start,
      tag: None,
    }
  }

  pub fn state(&self) -> ReleaseState {
    self.state
  }

  /// Run the whole transaction
  ///
  /// On failure the state stays at the last completed step and recovery hints
  /// are printed.
  pub fn publish(&mut self, prompter: &mut dyn Prompter, request: &ReleaseRequest<'_>) -> ShipResult<ReleaseRecord> {
    let result = self.run(prompter, request);
    if let Err(err) = &result {
      tracing::debug!(state = %self.state, error = %err, "release stopped");
      self.print_recovery();
    }
    result
  }

  fn run(&mut self, prompter: &mut dyn Prompter, request: &ReleaseRequest<'_>) -> ShipResult<ReleaseRecord> {
    self.vcs.stage(request.files)?;
    self.advance(ReleaseState::Staged);

    let message = text_until_valid(prompter, "Commit message", &default_message(request.notes), validate_message)?;

    // Tag name is settled before the commit so a collision leaves no commit behind
    let existing = self.vcs.tags()?;
    let default_tag = format!("{}{}", request.tag_prefix, request.version);
    let tag = text_until_valid(prompter, "Tag name", &default_tag, |input| validate_tag(input, &existing))?;

    let signing = SigningSettings::load(self.vcs)?;
    let signed = if signing.should_ask() {
      prompter.confirm("Sign commit and tag?", true)?
    } else {
      false
    };

    self.vcs.commit(&message, signed)?;
    self.advance(ReleaseState::Committed);
    println!("✅ Committed release v{}", request.version);

    self.vcs.create_tag(&tag, &message, signed)?;
    self.tag = Some(tag.clone());
    self.advance(ReleaseState::Tagged);
    println!("✅ Created tag {}", tag);

    confirm_or_abort(prompter, "Push changes to remote?", true)?;

    self.vcs.push()?;
    self.advance(ReleaseState::PushedCommits);
    self.vcs.push_tags()?;
    self.advance(ReleaseState::PushedTags);

    Ok(ReleaseRecord { message, tag, signed })
  }

  fn advance(&mut self, next: ReleaseState) {
    tracing::debug!(from = %self.state, to = %next, "release step");
    self.state = next;
  }

  /// Manual follow-up for a transaction that stopped part way
  pub fn recovery_hints(&self) -> Vec<String> {
    let tag = self.tag.as_deref().unwrap_or("<tag>");
    match self.state {
      ReleaseState::Start | ReleaseState::Staged | ReleaseState::PushedTags => Vec::new(),
      ReleaseState::Committed => vec!["git reset --soft HEAD~1  # undo the local release commit".to_string()],
      ReleaseState::Tagged => vec![
        "git push && git push --tags  # publish the local release".to_string(),
        format!("git tag -d {} && git reset --soft HEAD~1  # or undo it", tag),
      ],
      ReleaseState::PushedCommits => vec!["git push --tags  # commits are public, tags are not".to_string()],
    }
  }

  fn print_recovery(&self) {
    let hints = self.recovery_hints();
    if hints.is_empty() {
      return;
    }
    eprintln!("💡 Release stopped after: {}", self.state);
    for hint in hints {
      eprintln!("   {}", hint);
    }
  }
}

/// Publish a release with a fresh [`Publisher`]
pub fn publish(
  vcs: &dyn ReleaseVcs,
  prompter: &mut dyn Prompter,
  request: &ReleaseRequest<'_>,
) -> ShipResult<ReleaseRecord> {
  Publisher::new(vcs).publish(prompter, request)
}
