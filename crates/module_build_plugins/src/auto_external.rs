use std::{borrow::Cow, path::Path};

use module_build_plugin::{
  HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, Plugin, PluginContext,
};

/// Keeps everything that is not part of the package's own source out of the bundle: package
/// imports and `node:` builtins are resolved as externals under their own name.
#[derive(Debug, Default)]
pub struct AutoExternalPlugin;

impl Plugin for AutoExternalPlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("auto-external")
  }

  fn resolve_id(&self, _ctx: &PluginContext, args: &HookResolveIdArgs<'_>) -> HookResolveIdReturn {
    if args.is_entry || !is_package_specifier(args.specifier) {
      return Ok(None);
    }
    Ok(Some(HookResolveIdOutput { id: args.specifier.into(), external: true }))
  }
}

fn is_package_specifier(specifier: &str) -> bool {
  if specifier.starts_with("node:") {
    return true;
  }
  !(specifier.is_empty()
    || specifier.starts_with(['.', '/', '#', '\0'])
    || specifier.contains(':')
    || Path::new(specifier).is_absolute())
}

#[test]
fn package_specifiers() {
  assert!(is_package_specifier("left-pad"));
  assert!(is_package_specifier("@scope/pkg/sub"));
  assert!(is_package_specifier("node:fs"));
  assert!(is_package_specifier("fs"));
  assert!(!is_package_specifier("./util"));
  assert!(!is_package_specifier("../util"));
  assert!(!is_package_specifier("/abs/util.js"));
  assert!(!is_package_specifier("#internal"));
  assert!(!is_package_specifier("virtual:config"));
}

#[test]
fn entry_is_never_external() {
  let ctx = PluginContext::new(std::path::PathBuf::from("/project"), None, Cow::Borrowed("auto-external"));
  let plugin = AutoExternalPlugin;

  let entry = HookResolveIdArgs { importer: None, specifier: "index", is_entry: true };
  assert_eq!(plugin.resolve_id(&ctx, &entry).unwrap(), None);

  let import =
    HookResolveIdArgs { importer: Some("/project/src/index.ts"), specifier: "left-pad", is_entry: false };
  assert_eq!(
    plugin.resolve_id(&ctx, &import).unwrap(),
    Some(HookResolveIdOutput { id: "left-pad".into(), external: true })
  );
}
