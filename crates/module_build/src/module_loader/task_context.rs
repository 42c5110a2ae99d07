use module_build_plugin::SharedPluginDriver;

use crate::types::{module_loader_msg::ModuleLoaderMsg, SharedOptions};

/// Used to store common data shared between all tasks.
pub struct TaskContext {
  pub options: SharedOptions,
  pub plugin_driver: SharedPluginDriver,
  pub tx: tokio::sync::mpsc::Sender<ModuleLoaderMsg>,
}
