//! Operator prompts
//!
//! The pipeline talks to the operator only through [`Prompter`]. Cancelling a
//! prompt (end of input) surfaces as `ShipError::Aborted`, which terminates the
//! run cleanly. Validation loops live in the helpers at the bottom of this
//! module so that every component re-prompts the same way.

use crate::core::error::{ShipError, ShipResult, ValidationError};
use std::io::{BufRead, Write};

/// Ask the operator for text, a choice or a confirmation
pub trait Prompter {
  /// Pick one of `choices`; returns its index
  fn select(&mut self, message: &str, choices: &[String], default: usize) -> ShipResult<usize>;

  /// Single line of text, pre-filled with `initial`
  fn text(&mut self, message: &str, initial: &str) -> ShipResult<String>;

  /// Block of text, pre-filled with `initial`
  fn multiline(&mut self, message: &str, initial: &str) -> ShipResult<String>;

  /// Yes/no question
  fn confirm(&mut self, message: &str, default: bool) -> ShipResult<bool>;

  /// Whether a rejected answer can be asked again
  fn is_interactive(&self) -> bool {
    true
  }

  /// Report a recoverable problem before re-prompting
  fn warn(&mut self, message: &str) {
    eprintln!("⚠️  {}", message);
  }
}

/// Prompts on a terminal (or any reader/writer pair)
pub struct TerminalPrompter<R, W> {
  input: R,
  output: W,
}

impl TerminalPrompter<std::io::StdinLock<'static>, std::io::Stdout> {
  pub fn stdio() -> Self {
    Self::new(std::io::stdin().lock(), std::io::stdout())
  }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
  pub fn new(input: R, output: W) -> Self {
    Self { input, output }
  }

  /// Read one line without its terminator; `None` at end of input
  fn read_line(&mut self) -> ShipResult<Option<String>> {
    self.output.flush()?;
    let mut line = String::new();
    if self.input.read_line(&mut line)? == 0 {
      return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
  }

  fn read_line_or_abort(&mut self) -> ShipResult<String> {
    self.read_line()?.ok_or_else(|| ShipError::aborted("input closed"))
  }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
  fn select(&mut self, message: &str, choices: &[String], default: usize) -> ShipResult<usize> {
    writeln!(self.output, "? {}", message)?;
    for (i, choice) in choices.iter().enumerate() {
      let marker = if i == default { ">" } else { " " };
      writeln!(self.output, " {} {}) {}", marker, i + 1, choice)?;
    }

    loop {
      write!(self.output, "  Choice [{}]: ", default + 1)?;
      let line = self.read_line_or_abort()?;
      let answer = line.trim();
      if answer.is_empty() {
        return Ok(default);
      }
      match answer.parse::<usize>() {
        Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
        _ => writeln!(self.output, "  Enter a number between 1 and {}", choices.len())?,
      }
    }
  }

  fn text(&mut self, message: &str, initial: &str) -> ShipResult<String> {
    if initial.is_empty() {
      write!(self.output, "? {}: ", message)?;
    } else {
      write!(self.output, "? {} [{}]: ", message, initial)?;
    }
    let line = self.read_line_or_abort()?;
    if line.trim().is_empty() {
      Ok(initial.to_string())
    } else {
      Ok(line)
    }
  }

  fn multiline(&mut self, message: &str, initial: &str) -> ShipResult<String> {
    writeln!(self.output, "? {}", message)?;
    if !initial.is_empty() {
      writeln!(self.output, "{}", initial)?;
      writeln!(self.output, "  (press Enter on an empty line to keep the text above)")?;
    }
    writeln!(self.output, "  (finish with an empty line)")?;

    let mut lines: Vec<String> = Vec::new();
    loop {
      match self.read_line()? {
        None if lines.is_empty() => return Err(ShipError::aborted("input closed")),
        None => break,
        Some(line) if line.trim().is_empty() => {
          if lines.is_empty() {
            return Ok(initial.to_string());
          }
          break;
        }
        Some(line) => lines.push(line),
      }
    }

    Ok(lines.join("\n"))
  }

  fn confirm(&mut self, message: &str, default: bool) -> ShipResult<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    loop {
      write!(self.output, "? {} ({}) ", message, hint)?;
      let line = self.read_line_or_abort()?;
      match line.trim().to_ascii_lowercase().as_str() {
        "" => return Ok(default),
        "y" | "yes" => return Ok(true),
        "n" | "no" => return Ok(false),
        _ => writeln!(self.output, "  Please answer y or n")?,
      }
    }
  }
}

/// Accepts every default without asking (`--yes`)
#[derive(Debug, Default)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
  fn select(&mut self, message: &str, choices: &[String], default: usize) -> ShipResult<usize> {
    tracing::info!(prompt = message, answer = ?choices.get(default), "accepting default");
    Ok(default)
  }

  fn text(&mut self, message: &str, initial: &str) -> ShipResult<String> {
    tracing::info!(prompt = message, answer = initial, "accepting default");
    Ok(initial.to_string())
  }

  fn multiline(&mut self, message: &str, initial: &str) -> ShipResult<String> {
    tracing::info!(prompt = message, "accepting default text");
    Ok(initial.to_string())
  }

  fn confirm(&mut self, message: &str, default: bool) -> ShipResult<bool> {
    tracing::info!(prompt = message, answer = default, "accepting default");
    Ok(default)
  }

  fn is_interactive(&self) -> bool {
    false
  }
}

/// Ask a yes/no question; "no" aborts the run
pub fn confirm_or_abort(prompter: &mut dyn Prompter, message: &str, default: bool) -> ShipResult<()> {
  if prompter.confirm(message, default)? {
    Ok(())
  } else {
    Err(ShipError::aborted(format!("declined: {}", message)))
  }
}

/// Re-prompt single-line text until `validate` accepts it
///
/// A non-interactive prompter cannot be asked again, so the first failure
/// becomes the error.
pub fn text_until_valid<T>(
  prompter: &mut dyn Prompter,
  message: &str,
  initial: &str,
  validate: impl FnMut(&str) -> Result<T, ValidationError>,
) -> ShipResult<T> {
  until_valid(prompter, message, initial, false, validate)
}

/// Re-prompt a text block until `validate` accepts it
pub fn multiline_until_valid<T>(
  prompter: &mut dyn Prompter,
  message: &str,
  initial: &str,
  validate: impl FnMut(&str) -> Result<T, ValidationError>,
) -> ShipResult<T> {
  until_valid(prompter, message, initial, true, validate)
}

fn until_valid<T>(
  prompter: &mut dyn Prompter,
  message: &str,
  initial: &str,
  multiline: bool,
  mut validate: impl FnMut(&str) -> Result<T, ValidationError>,
) -> ShipResult<T> {
  let mut current = initial.to_string();
  loop {
    let input = if multiline {
      prompter.multiline(message, &current)?
    } else {
      prompter.text(message, &current)?
    };

    match validate(&input) {
      Ok(value) => return Ok(value),
      Err(err) => {
        if !prompter.is_interactive() {
          return Err(err.into());
        }
        prompter.warn(&err.to_string());
        current = input;
      }
    }
  }
}
