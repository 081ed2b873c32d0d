//! Progress indicators for artifact production
//!
//! Uses `linya` for allocation-free progress bars drawn on stderr.

use linya::{Bar, Progress};

/// Progress bar counting files written into an artifact
pub struct FileProgress {
  progress: Progress,
  bar: Bar,
}

impl FileProgress {
  /// Create a new progress bar for `total` files
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self { progress, bar }
  }

  /// Increment progress by 1
  pub fn inc(&mut self) {
    self.progress.inc_and_draw(&self.bar, 1);
  }
}

/// Optional progress: drawing is skipped entirely when disabled
pub struct MaybeProgress(Option<FileProgress>);

impl MaybeProgress {
  pub fn new(enabled: bool, total: usize, label: impl Into<String>) -> Self {
    // Empty trees have nothing to draw
    if enabled && total > 0 {
      Self(Some(FileProgress::new(total, label)))
    } else {
      Self(None)
    }
  }

  pub fn inc(&mut self) {
    if let Some(progress) = self.0.as_mut() {
      progress.inc();
    }
  }
}
