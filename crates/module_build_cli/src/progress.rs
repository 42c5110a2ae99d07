use std::borrow::Cow;

use ansi_term::Colour;
use module_build::{HookNoopReturn, ModuleId, ModuleInfo, Plugin, PluginContext, WatchChangeKind};

/// Prints a line for every parsed module and every watched file that changed. Never fails a build.
#[derive(Debug, Default)]
pub struct ProgressPlugin;

impl Plugin for ProgressPlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("progress")
  }

  fn module_parsed(&self, ctx: &PluginContext, module_info: &ModuleInfo) -> HookNoopReturn {
    ctx.info(&parsed_line(&module_info.id));
    Ok(())
  }

  fn watch_change(&self, ctx: &PluginContext, id: &str, kind: WatchChangeKind) -> HookNoopReturn {
    ctx.info(&change_line(&ModuleId::from(id), kind));
    Ok(())
  }
}

pub fn parsed_line(id: &ModuleId) -> String {
  format!("{}: {}", id.base_name(), Colour::Green.paint("parsed"))
}

pub fn change_line(id: &ModuleId, kind: WatchChangeKind) -> String {
  format!("{}: {}", id.base_name(), Colour::Blue.paint(format!("{kind}d")))
}
