mod plugin;
mod plugin_context;
mod plugin_driver;
mod types;

pub use crate::{
  plugin::{
    HookLoadReturn, HookNoopReturn, HookResolveIdReturn, HookTransformReturn, Plugin, SharedPlugin,
  },
  plugin_context::PluginContext,
  plugin_driver::{PluginDriver, SharedPluginDriver},
  types::{
    hook_generate_bundle_args::HookGenerateBundleArgs,
    hook_load::{HookLoadArgs, HookLoadOutput},
    hook_resolve_id::{HookResolveIdArgs, HookResolveIdOutput},
    hook_transform::{HookTransformArgs, HookTransformOutput},
    transform_result::TransformResult,
  },
};
