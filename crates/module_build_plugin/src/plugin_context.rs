use std::{
  borrow::Cow,
  path::{Path, PathBuf},
};

use module_build_common::{LogLevel, OnLog};

/// What a plugin can reach while one of its hooks runs.
#[derive(Debug, Clone)]
pub struct PluginContext {
  cwd: PathBuf,
  on_log: Option<OnLog>,
  plugin_name: Cow<'static, str>,
}

impl PluginContext {
  pub fn new(cwd: PathBuf, on_log: Option<OnLog>, plugin_name: Cow<'static, str>) -> Self {
    Self { cwd, on_log, plugin_name }
  }

  pub fn cwd(&self) -> &Path {
    &self.cwd
  }

  pub fn plugin_name(&self) -> &str {
    &self.plugin_name
  }

  /// Plugins report through here instead of printing. Without an `on_log` handler the message goes
  /// to the `log` facade.
  pub fn info(&self, message: &str) {
    match &self.on_log {
      Some(on_log) => on_log.call(LogLevel::Info, message),
      None => log::info!("[{}] {message}", self.plugin_name),
    }
  }

  pub fn warn(&self, message: &str) {
    match &self.on_log {
      Some(on_log) => on_log.call(LogLevel::Warn, &format!("[{}] {message}", self.plugin_name)),
      None => log::warn!("[{}] {message}", self.plugin_name),
    }
  }
}

#[test]
fn messages_go_to_on_log() {
  use std::sync::{Arc, Mutex};

  let lines = Arc::new(Mutex::new(vec![]));
  let sink = Arc::clone(&lines);
  let ctx = PluginContext::new(
    PathBuf::from("/project"),
    Some(OnLog::new(move |level, message| {
      sink.lock().unwrap().push(format!("{level:?} {message}"));
    })),
    Cow::Borrowed("sizes"),
  );

  ctx.info("Sizes for index.js:");
  ctx.warn("large module");
  assert_eq!(*lines.lock().unwrap(), vec!["Info Sizes for index.js:", "Warn [sizes] large module"]);
}
