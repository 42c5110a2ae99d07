use std::{fmt::Debug, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
  Info,
  Warn,
}

/// Receives messages that plugins emit through their context.
#[derive(Clone)]
pub struct OnLog(Arc<dyn Fn(LogLevel, &str) + Send + Sync>);

impl OnLog {
  pub fn new(handler: impl Fn(LogLevel, &str) + Send + Sync + 'static) -> Self {
    Self(Arc::new(handler))
  }

  pub fn call(&self, level: LogLevel, message: &str) {
    (self.0)(level, message);
  }
}

impl Debug for OnLog {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("OnLog(..)")
  }
}
