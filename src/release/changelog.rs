//! Changelog parsing and patch-note extraction
//!
//! The changelog is an append-only, newest-first list of entries:
//!
//! ```text
//! ---------------------------------------------------------------------------------------------------
//! Version: 1.3.0
//! Date: 16.10.2026
//!   Features:
//!     - Added a thing
//! ```
//!
//! Each entry is a 99-character separator line, a `Version:` line, a `Date:` line
//! (day/month/year joined by `.`, `/` or `-`) and at least one line of notes. The
//! notes end at a blank line, the next separator or the end of the file. Text that
//! does not fit the grammar is reported but never rewritten.

use crate::core::error::{ShipResult, ValidationError};
use crate::ui::prompt::{Prompter, confirm_or_abort, multiline_until_valid};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Width of the separator line
pub const SEPARATOR_WIDTH: usize = 99;

/// The separator line that opens every entry
pub fn separator() -> String {
  "-".repeat(SEPARATOR_WIDTH)
}

fn is_separator(line: &str) -> bool {
  let line = line.trim_end();
  line.len() == SEPARATOR_WIDTH && line.bytes().all(|b| b == b'-')
}

fn is_blank(line: &str) -> bool {
  line.trim().is_empty()
}

/// `Date:` field of an entry, kept as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDate {
  pub day: u32,
  pub month: u32,
  pub year: u32,
  text: String,
}

impl EntryDate {
  /// Parse `D.M.YYYY` (1–2 digit day up to 31 and month up to 12; `.`, `/` or `-` between parts)
  pub fn parse(text: &str) -> Result<Self, String> {
    let text = text.trim();
    let parts: Vec<&str> = text.split(['.', '/', '-']).collect();
    let &[day, month, year] = parts.as_slice() else {
      return Err(format!("date '{}' must be day.month.year", text));
    };

    let digits = |s: &str, max_len: usize| !s.is_empty() && s.len() <= max_len && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(day, 2) || !digits(month, 2) || !digits(year, 9) {
      return Err(format!("date '{}' must be day.month.year", text));
    }

    let (day, month, year): (u32, u32, u32) = (
      day.parse().map_err(|_| format!("bad day in '{}'", text))?,
      month.parse().map_err(|_| format!("bad month in '{}'", text))?,
      year.parse().map_err(|_| format!("bad year in '{}'", text))?,
    );
    if day > 31 {
      return Err(format!("day {} is out of range", day));
    }
    if month > 12 {
      return Err(format!("month {} is out of range", month));
    }

    Ok(Self {
      day,
      month,
      year,
      text: text.to_string(),
    })
  }

  /// `DD.MM.YYYY` for a calendar date
  pub fn from_date(date: NaiveDate) -> Self {
    Self {
      day: date.day(),
      month: date.month(),
      year: date.year().max(0) as u32,
      text: date.format("%d.%m.%Y").to_string(),
    }
  }
}

impl fmt::Display for EntryDate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.text)
  }
}

/// One versioned, dated block of notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
  pub version: String,
  pub date: EntryDate,
  pub body: String,
}

impl ChangelogEntry {
  /// Version, date and notes without the separator (used for release messages)
  pub fn content(&self) -> String {
    format!("Version: {}\nDate: {}\n{}", self.version, self.date, self.body)
  }

  /// The entry as it appears in the file, without a trailing newline
  pub fn render(&self) -> String {
    format!("{}\n{}", separator(), self.content())
  }
}

/// Result of scanning a whole changelog
#[derive(Debug, Clone, Default)]
pub struct ParsedChangelog {
  /// Well-formed entries in file order
  pub entries: Vec<ChangelogEntry>,
  /// 1-based line numbers where text that does not fit the grammar starts
  pub malformed: Vec<usize>,
}

impl ParsedChangelog {
  /// First entry in file order for `version`
  pub fn find(&self, version: &str) -> Option<&ChangelogEntry> {
    self.entries.iter().find(|e| e.version == version)
  }

  /// How many entries claim `version`
  pub fn count(&self, version: &str) -> usize {
    self.entries.iter().filter(|e| e.version == version).count()
  }
}

/// Parse one entry starting at `start` (a separator line)
///
/// Returns the entry and the index of the first line after its notes.
fn parse_at(lines: &[&str], start: usize) -> Result<(ChangelogEntry, usize), String> {
  if !lines.get(start).is_some_and(|l| is_separator(l)) {
    return Err(format!("expected a line of {} '-' characters", SEPARATOR_WIDTH));
  }

  let version = lines
    .get(start + 1)
    .and_then(|l| l.trim_end().strip_prefix("Version: "))
    .map(str::trim)
    .ok_or_else(|| "expected 'Version: X.Y.Z' after the separator".to_string())?;
  semver::Version::parse(version).map_err(|_| format!("'{}' is not a semantic version", version))?;

  let date = lines
    .get(start + 2)
    .and_then(|l| l.trim_end().strip_prefix("Date: "))
    .ok_or_else(|| "expected 'Date: DD.MM.YYYY' after the version".to_string())?;
  let date = EntryDate::parse(date)?;

  let body_start = start + 3;
  let mut end = body_start;
  while end < lines.len() && !is_blank(lines[end]) && !is_separator(lines[end]) {
    end += 1;
  }
  if end == body_start {
    return Err(format!("no notes for version {}", version));
  }

  let body = lines[body_start..end]
    .iter()
    .map(|l| l.trim_end())
    .collect::<Vec<_>>()
    .join("\n");

  Ok((
    ChangelogEntry {
      version: version.to_string(),
      date,
      body,
    },
    end,
  ))
}

fn split_lines(text: &str) -> Vec<&str> {
  text.lines().collect()
}

/// Scan a changelog into entries, tolerating malformed text
pub fn parse_changelog(text: &str) -> ParsedChangelog {
  let lines = split_lines(text);
  let mut parsed = ParsedChangelog::default();
  let mut in_stray_text = false;
  let mut i = 0;

  while i < lines.len() {
    if is_separator(lines[i]) {
      in_stray_text = false;
      match parse_at(&lines, i) {
        Ok((entry, next)) => {
          parsed.entries.push(entry);
          i = next;
        }
        Err(reason) => {
          tracing::debug!(line = i + 1, %reason, "malformed changelog entry");
          parsed.malformed.push(i + 1);
          in_stray_text = true;
          i += 1;
        }
      }
      continue;
    }

    if is_blank(lines[i]) {
      in_stray_text = false;
    } else if !in_stray_text {
      parsed.malformed.push(i + 1);
      in_stray_text = true;
    }
    i += 1;
  }

  parsed
}

/// Validate operator-supplied text as exactly one entry for `version`
pub fn parse_entry(text: &str, version: &str) -> Result<ChangelogEntry, ValidationError> {
  let invalid = |reason: String| ValidationError::ChangelogEntry { reason };

  let lines = split_lines(text.trim_matches(['\n', '\r']));
  let (entry, next) = parse_at(&lines, 0).map_err(invalid)?;

  if lines[next..].iter().any(|l| !is_blank(l)) {
    return Err(invalid("notes must not contain blank lines or a second entry".to_string()));
  }
  if entry.version != version {
    return Err(invalid(format!(
      "entry is for version {} but the release is {}",
      entry.version, version
    )));
  }

  Ok(entry)
}

/// Separator, version and date lines for a new entry
pub fn entry_header(version: &str, today: NaiveDate) -> String {
  format!(
    "{}\nVersion: {}\nDate: {}",
    separator(),
    version,
    EntryDate::from_date(today)
  )
}

/// Operators may type just the notes; the header is added for them
fn complete_entry(input: &str, header: &str) -> String {
  let first = input.lines().find(|l| !is_blank(l)).unwrap_or("");
  if is_separator(first) {
    input.to_string()
  } else {
    format!("{}\n{}", header, input.trim_matches(['\n', '\r']))
  }
}

/// Prepend `entry` so that exactly one blank line separates it from the old text
///
/// Existing entries are left byte-for-byte as they were.
pub fn prepend_entry(changelog: &str, entry: &ChangelogEntry) -> String {
  let existing = changelog.trim_start_matches(['\n', '\r']);
  if existing.trim().is_empty() {
    format!("{}\n", entry.render())
  } else {
    format!("{}\n\n{}", entry.render(), existing)
  }
}

/// Patch notes chosen for a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchNotes {
  pub entry: ChangelogEntry,
  /// The entry was written during this run and must be added to the changelog
  pub authored: bool,
}

/// Find (or have the operator write) the changelog entry for `version`
pub fn extract_patch_notes(
  changelog: &str,
  version: &str,
  today: NaiveDate,
  prompter: &mut dyn Prompter,
) -> ShipResult<PatchNotes> {
  let parsed = parse_changelog(changelog);
  if !parsed.malformed.is_empty() {
    tracing::warn!(lines = ?parsed.malformed, "changelog contains text outside well-formed entries");
  }

  let header = entry_header(version, today);

  let (mut entry, authored) = match parsed.find(version) {
    Some(found) => {
      if parsed.count(version) > 1 {
        prompter.warn(&format!(
          "changelog has {} entries for {}; using the first one",
          parsed.count(version),
          version
        ));
      }
      println!("✅ Patch notes for v{} found in changelog", version);
      (found.clone(), false)
    }
    None => {
      println!("📝 Valid patch notes for v{} not found in changelog", version);
      let message = format!("Please provide the patch notes for v{}", version);
      (author_entry(prompter, &message, &header, &header, version)?, true)
    }
  };

  loop {
    println!("\nCurrent patch notes:\n{}\n", entry.render());
    if prompter.confirm("Are the patch notes correct?", true)? {
      break;
    }
    confirm_or_abort(prompter, "Would you like to edit the patch notes?", true)?;
    let message = format!("Edit the patch notes for v{}", version);
    entry = author_entry(prompter, &message, &entry.render(), &header, version)?;
  }

  Ok(PatchNotes { entry, authored })
}

fn author_entry(
  prompter: &mut dyn Prompter,
  message: &str,
  initial: &str,
  header: &str,
  version: &str,
) -> ShipResult<ChangelogEntry> {
  multiline_until_valid(prompter, message, initial, |input| {
    parse_entry(&complete_entry(input, header), version)
  })
}
