use module_build_common::WatchChangeKind;
use module_build_error::BuildResult;

use crate::PluginDriver;

use super::hook_error;

impl PluginDriver {
  pub fn watch_change(&self, id: &str, kind: WatchChangeKind) -> BuildResult<()> {
    for (plugin, ctx) in self.iter_plugin_with_context() {
      plugin.watch_change(ctx, id, kind).map_err(|error| hook_error(error, ctx, "watch_change"))?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::{
    borrow::Cow,
    path::Path,
    sync::{Arc, Mutex},
  };

  use module_build_common::WatchChangeKind;

  use crate::{
    HookNoopReturn, HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn,
    HookTransformArgs, HookTransformOutput, HookTransformReturn, Plugin, PluginContext,
    PluginDriver,
  };

  #[derive(Debug, Default)]
  struct Recorder {
    name: &'static str,
    calls: Mutex<Vec<String>>,
  }

  impl Plugin for Recorder {
    fn name(&self) -> Cow<'static, str> {
      Cow::Borrowed(self.name)
    }

    fn resolve_id(&self, _ctx: &PluginContext, args: &HookResolveIdArgs<'_>) -> HookResolveIdReturn {
      Ok((self.name == "second").then(|| HookResolveIdOutput {
        id: format!("{}:{}", self.name, args.specifier).into(),
        external: true,
      }))
    }

    fn transform(&self, _ctx: &PluginContext, args: &HookTransformArgs<'_>) -> HookTransformReturn {
      Ok(Some(HookTransformOutput {
        code: Some(format!("{}{}", args.code, self.name)),
        ..HookTransformOutput::default()
      }))
    }

    fn watch_change(&self, _ctx: &PluginContext, id: &str, kind: WatchChangeKind) -> HookNoopReturn {
      if self.name == "broken" {
        anyhow::bail!("cannot watch {id}");
      }
      self.calls.lock().unwrap().push(format!("{id} {kind}"));
      Ok(())
    }
  }

  fn make_driver(names: &[&'static str]) -> (Vec<Arc<Recorder>>, Arc<PluginDriver>) {
    let recorders: Vec<_> =
      names.iter().map(|&name| Arc::new(Recorder { name, ..Recorder::default() })).collect();
    let plugins = recorders.iter().map(|plugin| Arc::clone(plugin) as crate::SharedPlugin).collect();
    (recorders, PluginDriver::new_shared(plugins, Path::new("/project"), None))
  }

  #[test]
  fn resolve_id_takes_the_first_answer() {
    let (_, driver) = make_driver(&["first", "second", "third"]);
    let resolved = driver
      .resolve_id(&HookResolveIdArgs { importer: None, specifier: "x", is_entry: false })
      .unwrap();
    assert_eq!(resolved, Some(HookResolveIdOutput { id: "second:x".into(), external: true }));
  }

  #[test]
  fn transform_chains_in_order() {
    let (_, driver) = make_driver(&["a", "b"]);
    let result = driver.transform("/project/index.js", "code:".to_string(), None).unwrap();
    assert_eq!(result.code, "code:ab");
  }

  #[test]
  fn watch_change_reaches_every_plugin_and_names_the_failing_one() {
    let (recorders, driver) = make_driver(&["a", "b"]);
    driver.watch_change("/project/src/index.ts", WatchChangeKind::Update).unwrap();
    for recorder in &recorders {
      assert_eq!(*recorder.calls.lock().unwrap(), vec!["/project/src/index.ts update"]);
    }

    let (_, driver) = make_driver(&["broken"]);
    let error = driver.watch_change("/project/a.ts", WatchChangeKind::Delete).unwrap_err();
    assert_eq!(error.to_string(), "[plugin broken] watch_change: cannot watch /project/a.ts");
  }
}
