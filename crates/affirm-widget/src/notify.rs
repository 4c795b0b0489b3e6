//! Asking the renderer host to redraw.

use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};

use tokio::process::Command;
use tracing::{debug, warn};

/// Fire-and-forget refresh trigger. Implementations must return promptly and
/// never fail the caller; problems are logged.
pub trait RefreshNotifier: Send + Sync {
  fn request_refresh(&self);
}

/// Runs an external command (for example a host script that reloads widget
/// timelines) without waiting for it.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
  program: String,
  args:    Vec<String>,
}

impl CommandNotifier {
  pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
    Self { program: program.into(), args }
  }

  /// Split a shell-style command line on whitespace. Returns `None` for an
  /// empty line.
  pub fn from_command_line(line: &str) -> Option<Self> {
    let mut parts = line.split_whitespace().map(str::to_owned);
    let program = parts.next()?;
    Some(Self::new(program, parts.collect()))
  }
}

impl RefreshNotifier for CommandNotifier {
  fn request_refresh(&self) {
    let mut command = Command::new(&self.program);
    command.args(&self.args).kill_on_drop(false);

    let program = self.program.clone();
    match command.spawn() {
      Ok(mut child) => {
        tokio::spawn(async move {
          match child.wait().await {
            Ok(status) if status.success() => debug!(%program, "refresh requested"),
            Ok(status) => warn!(%program, %status, "refresh command failed"),
            Err(e) => warn!(%program, error = %e, "refresh command failed"),
          }
        });
      }
      Err(e) => warn!(%program, error = %e, "could not start refresh command"),
    }
  }
}

/// `None` never requests anything.
impl<N: RefreshNotifier> RefreshNotifier for Option<N> {
  fn request_refresh(&self) {
    if let Some(notifier) = self {
      notifier.request_refresh();
    }
  }
}

/// Counts requests. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct CountingNotifier {
  count: Arc<AtomicUsize>,
}

impl CountingNotifier {
  pub fn count(&self) -> usize { self.count.load(Ordering::SeqCst) }
}

impl RefreshNotifier for CountingNotifier {
  fn request_refresh(&self) { self.count.fetch_add(1, Ordering::SeqCst); }
}
