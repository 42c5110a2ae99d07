use std::{
  io::Write,
  sync::{Arc, Mutex, PoisonError},
};

use ansi_term::Colour;
use module_build::{LogLevel, OnEvent, OnLog};

use crate::lifecycle;

/// Where user-facing lines go. Plugins write from module tasks, so every line is written under a
/// lock.
#[derive(Clone)]
pub struct Console(Arc<Mutex<dyn Write + Send>>);

impl Console {
  pub fn new(out: impl Write + Send + 'static) -> Self {
    Self(Arc::new(Mutex::new(out)))
  }

  pub fn stdout() -> Self {
    Self::new(std::io::stdout())
  }

  pub fn with<R>(&self, f: impl FnOnce(&mut dyn Write) -> R) -> R {
    let mut out = self.0.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut *out)
  }

  pub fn line(&self, line: &str) {
    if let Err(error) = self.with(|out| writeln!(out, "{line}")) {
      log::debug!("Failed to write to the console: {error}");
    }
  }

  /// Sink for messages plugins report through their context.
  pub fn on_log(&self) -> OnLog {
    let console = self.clone();
    OnLog::new(move |level, message| match level {
      LogLevel::Info => console.line(message),
      LogLevel::Warn => console.line(&format!("{} {message}", Colour::Yellow.paint("Warning:"))),
    })
  }

  /// Sink for watcher events. Called on the watch task, so lifecycle lines and plugin lines of a
  /// pass come out in the order they happen.
  pub fn on_event(&self) -> OnEvent {
    let console = self.clone();
    OnEvent::new(move |event| {
      if let Err(error) = console.with(|out| lifecycle::log_event(out, event)) {
        log::debug!("Failed to write to the console: {error}");
      }
    })
  }
}

/// In-memory output for tests.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl Captured {
  pub fn console(&self) -> Console {
    Console::new(self.clone())
  }

  pub fn lines(&self) -> Vec<String> {
    String::from_utf8_lossy(&self.0.lock().unwrap()).lines().map(String::from).collect()
  }
}

#[cfg(test)]
impl Write for Captured {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    self.0.lock().unwrap().write(buf)
  }

  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}

#[test]
fn plugin_messages_become_lines() {
  let captured = Captured::default();
  let on_log = captured.console().on_log();

  on_log.call(LogLevel::Info, "index.ts: parsed");
  on_log.call(LogLevel::Warn, "[typescript] no declaration");

  assert_eq!(
    captured.lines(),
    vec![
      "index.ts: parsed".to_string(),
      format!("{} [typescript] no declaration", Colour::Yellow.paint("Warning:")),
    ]
  );
}
