use std::{fmt::Display, path::PathBuf, sync::Arc, time::Duration};

use module_build_error::BuildError;

use crate::ModuleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchChangeKind {
  Create,
  Update,
  Delete,
}

impl WatchChangeKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Create => "create",
      Self::Update => "update",
      Self::Delete => "delete",
    }
  }
}

impl Display for WatchChangeKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Emitted by the watcher over the lifetime of a watch session.
#[derive(Debug, Clone)]
pub enum WatcherEvent {
  /// A new build cycle begins.
  Start,
  BundleStart { input: String, output: PathBuf },
  BundleEnd { input: String, output: PathBuf, duration: Duration },
  /// The build cycle finished, successfully or not.
  End,
  Error(Arc<BuildError>),
  /// A watched file changed.
  Change { id: ModuleId, kind: WatchChangeKind },
  /// Changes were collected and a rebuild is about to start.
  Restart,
  Close,
}

impl WatcherEvent {
  pub fn code(&self) -> &'static str {
    match self {
      Self::Start => "START",
      Self::BundleStart { .. } => "BUNDLE_START",
      Self::BundleEnd { .. } => "BUNDLE_END",
      Self::End => "END",
      Self::Error(_) => "ERROR",
      Self::Change { .. } => "CHANGE",
      Self::Restart => "RESTART",
      Self::Close => "CLOSE",
    }
  }
}

/// Receives watcher events on the watch task, in order with the lines plugins print during a pass.
#[derive(Clone)]
pub struct OnEvent(Arc<dyn Fn(&WatcherEvent) + Send + Sync>);

impl OnEvent {
  pub fn new(handler: impl Fn(&WatcherEvent) + Send + Sync + 'static) -> Self {
    Self(Arc::new(handler))
  }

  pub fn call(&self, event: &WatcherEvent) {
    (self.0)(event);
  }
}

impl std::fmt::Debug for OnEvent {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("OnEvent(..)")
  }
}
