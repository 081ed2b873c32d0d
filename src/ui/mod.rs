//! Operator-facing I/O: prompts and progress bars

pub mod progress;
pub mod prompt;

pub use prompt::{DefaultsPrompter, Prompter, TerminalPrompter};
