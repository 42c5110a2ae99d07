mod bundle;
mod bundler;
mod generate_stage;
mod module_loader;
mod types;
mod utils;
mod watch;

pub use crate::{
  bundle::Bundle,
  bundler::Bundler,
  types::bundle_output::BundleOutput,
  watch::{watch, WatchOptions, Watcher},
};
pub use module_build_common::*;
pub use module_build_error::{BuildError, BuildResult};
pub use module_build_plugin::{HookNoopReturn, Plugin, PluginContext, SharedPlugin};
