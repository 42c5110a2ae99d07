mod bundler_options;
mod types;

pub use bundler_options::{
  normalized_bundler_options::{NormalizedInputOptions, NormalizedOutputOptions},
  on_log::{LogLevel, OnLog},
  output_format::OutputFormat,
  watch_options::WatcherOptions,
  InputOptions, OutputOptions,
};

pub use crate::types::{
  manifest::{Manifest, MANIFEST_FILE_NAME},
  module_id::ModuleId,
  module_info::{ModuleFormat, ModuleInfo},
  output_asset::OutputAsset,
  raw_idx::ModuleIdx,
  rendered_chunk::{RenderedChunk, RenderedModule},
  resolved_id::ResolvedId,
  watcher_event::{OnEvent, WatchChangeKind, WatcherEvent},
};
