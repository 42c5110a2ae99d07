use std::{borrow::Cow, path::Path};

use module_build_common::ModuleFormat;
use module_build_ecmascript::EcmaCompiler;
use module_build_plugin::{
  HookTransformArgs, HookTransformOutput, HookTransformReturn, Plugin, PluginContext,
};

use crate::has_extension;

const EXTENSIONS: [&str; 4] = ["js", "cjs", "es6", "es"];

/// Recognizes CommonJS modules so they are bundled as `(exports, module, require)` factories.
#[derive(Debug, Default)]
pub struct CommonJsPlugin;

impl Plugin for CommonJsPlugin {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("commonjs")
  }

  fn transform(&self, _ctx: &PluginContext, args: &HookTransformArgs<'_>) -> HookTransformReturn {
    if !has_extension(args.id, &EXTENSIONS) {
      return Ok(None);
    }
    // Syntax errors are reported when the engine scans the module.
    let Ok(syntax) = EcmaCompiler::scan(args.code, Path::new(args.id)) else {
      return Ok(None);
    };
    if !syntax.is_commonjs() {
      return Ok(None);
    }

    log::debug!("{} is CommonJS", args.id);
    Ok(Some(HookTransformOutput {
      format: Some(ModuleFormat::CommonJs),
      dependencies: syntax.requires,
      ..HookTransformOutput::default()
    }))
  }
}
