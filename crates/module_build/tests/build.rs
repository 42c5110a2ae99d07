use std::{
  borrow::Cow,
  path::Path,
  sync::{Arc, Mutex},
};

use module_build::{
  Bundler, InputOptions, ModuleFormat, OutputOptions, Plugin, SharedPlugin,
};
use module_build_plugin::{
  HookLoadArgs, HookLoadOutput, HookLoadReturn, HookNoopReturn, HookResolveIdArgs,
  HookResolveIdOutput, HookResolveIdReturn, HookTransformArgs, HookTransformOutput,
  HookTransformReturn, PluginContext,
};

fn write_files(root: &Path, files: &[(&str, &str)]) {
  for (path, content) in files {
    let path = root.join(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
  }
}

fn input_options(root: &Path, input: &str, external: &[&str]) -> InputOptions {
  InputOptions {
    input: Some(input.to_string()),
    cwd: Some(root.to_path_buf()),
    external: Some(external.iter().map(ToString::to_string).collect()),
    ..InputOptions::default()
  }
}

fn output_options(file: &str) -> OutputOptions {
  OutputOptions { file: Some(file.to_string()), sourcemap: Some(true), ..OutputOptions::default() }
}

#[tokio::test]
async fn bundles_internal_modules_and_references_externals() {
  let dir = tempfile::tempdir().unwrap();
  write_files(
    dir.path(),
    &[
      (
        "src/index.js",
        "import pad from \"left-pad\";\nimport { greet } from \"./util.js\";\nexport const message = pad(greet(\"world\"), 20);\n",
      ),
      (
        "src/util.js",
        "export function greet(name) {\n  return `hello ${name}`;\n}\nexport function unused() {\n  return 42;\n}\n",
      ),
    ],
  );

  let bundler = Bundler::new(input_options(dir.path(), "src/index.js", &["left-pad"])).unwrap();
  let bundle = bundler.build().await.unwrap();
  let output = bundle.write(&output_options("dist/index.js")).await.unwrap();

  let code = std::fs::read_to_string(dir.path().join("dist/index.js")).unwrap();
  assert!(code.starts_with("import * as __external_0 from \"left-pad\";\n"));
  assert!(code.contains("const __externals = { \"left-pad\": __external_0 };"));
  assert!(code.contains("__modules[\"src/util.js\"]"));
  assert!(code.contains("function unused()"));
  assert!(code.contains("__cache[\"src/index.js\"] = __module;"));
  assert!(code.contains("export { message };"));
  assert!(code.ends_with("//# sourceMappingURL=index.js.map\n"));

  // Dependencies come before the modules importing them.
  let util = code.find("__modules[\"src/util.js\"]").unwrap();
  let index = code.find("__cache[\"src/index.js\"]").unwrap();
  assert!(util < index);

  let map: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(dir.path().join("dist/index.js.map")).unwrap())
      .unwrap();
  assert_eq!(map["version"], 3);
  assert_eq!(map["file"], "index.js");

  assert_eq!(output.chunk.exports, vec!["message"]);
  assert_eq!(output.chunk.modules.len(), 2);
  assert!(output.warnings.is_empty());
}

#[tokio::test]
async fn unresolved_imports_are_collected() {
  let dir = tempfile::tempdir().unwrap();
  write_files(
    dir.path(),
    &[("src/index.js", "import \"./missing.js\";\nimport \"also-missing\";\nexport {};\n")],
  );

  let bundler = Bundler::new(input_options(dir.path(), "src/index.js", &[])).unwrap();
  let Err(error) = bundler.build().await else { panic!("build should fail") };

  let messages = error.messages().collect::<Vec<_>>();
  assert_eq!(
    messages,
    vec![
      "Could not resolve \"./missing.js\" from \"src/index.js\"",
      "Could not resolve \"also-missing\" from \"src/index.js\"",
    ]
  );
}

#[tokio::test]
async fn missing_entry_is_an_error() {
  let dir = tempfile::tempdir().unwrap();
  let bundler = Bundler::new(input_options(dir.path(), "src/index.js", &[])).unwrap();
  let Err(error) = bundler.build().await else { panic!("build should fail") };
  assert_eq!(error.to_string(), "Could not resolve entry module \"src/index.js\"");
}

#[tokio::test]
async fn circular_imports_warn() {
  let dir = tempfile::tempdir().unwrap();
  write_files(
    dir.path(),
    &[
      ("src/a.js", "import { b } from \"./b.js\";\nexport const a = () => b;\n"),
      ("src/b.js", "import { a } from \"./a.js\";\nexport const b = () => a;\n"),
    ],
  );

  let bundle =
    Bundler::new(input_options(dir.path(), "src/a.js", &[])).unwrap().build().await.unwrap();
  let output = bundle.generate(&output_options("dist/a.js")).unwrap();

  let warnings = output.warnings.iter().map(ToString::to_string).collect::<Vec<_>>();
  assert_eq!(warnings, vec!["Circular dependency: src/a.js -> src/b.js -> src/a.js."]);
}

#[tokio::test]
async fn dynamic_imports_are_bundled_after_static_ones() {
  let dir = tempfile::tempdir().unwrap();
  write_files(
    dir.path(),
    &[
      ("src/index.js", "export const load = () => import(\"./lazy.js\");\nexport const chart = () => import(\"chart\");\n"),
      ("src/lazy.js", "export default \"lazy\";\n"),
    ],
  );

  let bundle = Bundler::new(input_options(dir.path(), "src/index.js", &["chart"]))
    .unwrap()
    .build()
    .await
    .unwrap();
  let output = bundle.generate(&output_options("dist/index.js")).unwrap();
  let code = &output.assets[0].content;

  assert!(code.contains("Promise.resolve().then(() => __interop(require(\"./lazy.js\")))"));
  assert!(code.contains("import(\"chart\")"));
  assert!(code.contains("const __externals = {};"));
  assert!(code.contains("__modules[\"src/lazy.js\"]"));
  assert!(code.find("__modules[\"src/lazy.js\"]").unwrap() < code.find("__cache[\"src/index.js\"]").unwrap());
}

/// Marks every `.cjs` file as CommonJS and reports its `require` calls.
#[derive(Debug)]
struct CommonJsMarker;

impl Plugin for CommonJsMarker {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("commonjs-marker")
  }

  fn transform(&self, _ctx: &PluginContext, args: &HookTransformArgs<'_>) -> HookTransformReturn {
    if !args.id.ends_with(".cjs") {
      return Ok(None);
    }
    let dependencies = args
      .code
      .split("require(\"")
      .skip(1)
      .filter_map(|rest| rest.split_once('"').map(|(specifier, _)| specifier.to_string()))
      .collect();
    Ok(Some(HookTransformOutput {
      format: Some(ModuleFormat::CommonJs),
      dependencies,
      ..HookTransformOutput::default()
    }))
  }
}

#[tokio::test]
async fn commonjs_modules_run_as_factories() {
  let dir = tempfile::tempdir().unwrap();
  write_files(
    dir.path(),
    &[
      ("src/index.js", "import legacy from \"./legacy.cjs\";\nexport const value = legacy.answer;\n"),
      ("src/legacy.cjs", "const helper = require(\"./helper.cjs\");\nmodule.exports = { answer: helper() };\n"),
      ("src/helper.cjs", "module.exports = () => 42;\n"),
    ],
  );

  let plugins: Vec<SharedPlugin> = vec![Arc::new(CommonJsMarker)];
  let bundle = Bundler::with_plugins(input_options(dir.path(), "src/index.js", &[]), plugins)
    .unwrap()
    .build()
    .await
    .unwrap();
  let output = bundle.generate(&output_options("dist/index.js")).unwrap();
  let code = &output.assets[0].content;

  assert!(code.contains(
    "__modules[\"src/legacy.cjs\"] = [function (exports, module, require) {\nconst helper = require(\"./helper.cjs\");\nmodule.exports = { answer: helper() };\n}, { \"./helper.cjs\": \"src/helper.cjs\" }];"
  ));
  assert!(code.contains("const legacy = __interop(__import_0).default;"));
  assert_eq!(
    output.chunk.modules.iter().map(|module| module.id.base_name().into_owned()).collect::<Vec<_>>(),
    vec!["helper.cjs", "legacy.cjs", "index.js"]
  );
}

/// Serves `virtual:config` from memory and records the hooks it sees.
#[derive(Debug, Default)]
struct VirtualConfig {
  calls: Mutex<Vec<String>>,
}

impl Plugin for VirtualConfig {
  fn name(&self) -> Cow<'static, str> {
    Cow::Borrowed("virtual-config")
  }

  fn build_start(&self, _ctx: &PluginContext) -> HookNoopReturn {
    self.calls.lock().unwrap().push("build_start".to_string());
    Ok(())
  }

  fn resolve_id(&self, _ctx: &PluginContext, args: &HookResolveIdArgs<'_>) -> HookResolveIdReturn {
    Ok((args.specifier == "virtual:config")
      .then(|| HookResolveIdOutput { id: "virtual:config".into(), external: false }))
  }

  fn load(&self, _ctx: &PluginContext, args: &HookLoadArgs<'_>) -> HookLoadReturn {
    Ok((args.id == "virtual:config").then(|| HookLoadOutput {
      code: "export const mode = \"production\";\n".to_string(),
      map: None,
    }))
  }

  fn build_end(
    &self,
    _ctx: &PluginContext,
    error: Option<&module_build::BuildError>,
  ) -> HookNoopReturn {
    self.calls.lock().unwrap().push(format!("build_end {}", error.is_some()));
    Ok(())
  }
}

#[tokio::test]
async fn plugins_resolve_and_load_virtual_modules() {
  let dir = tempfile::tempdir().unwrap();
  write_files(
    dir.path(),
    &[("src/index.js", "export { mode } from \"virtual:config\";\n")],
  );

  let plugin = Arc::new(VirtualConfig::default());
  let plugins: Vec<SharedPlugin> = vec![Arc::clone(&plugin) as SharedPlugin];
  let bundle = Bundler::with_plugins(input_options(dir.path(), "src/index.js", &[]), plugins)
    .unwrap()
    .build()
    .await
    .unwrap();
  let output = bundle.generate(&output_options("dist/index.js")).unwrap();

  assert!(output.assets[0].content.contains("__modules[\"virtual:config\"]"));
  assert_eq!(output.chunk.exports, vec!["mode"]);
  assert_eq!(*plugin.calls.lock().unwrap(), vec!["build_start", "build_end false"]);
}

#[tokio::test]
async fn entry_exports_stay_live() {
  let dir = tempfile::tempdir().unwrap();
  write_files(
    dir.path(),
    &[
      (
        "src/index.js",
        "import { step } from \"./step.js\";\nlet counter = 0;\nexport function inc() {\n  counter += step;\n}\nexport { counter };\nexport { step as size } from \"./step.js\";\n",
      ),
      ("src/step.js", "export const step = 1;\n"),
    ],
  );

  let bundle =
    Bundler::new(input_options(dir.path(), "src/index.js", &[])).unwrap().build().await.unwrap();
  let output = bundle.generate(&output_options("dist/index.js")).unwrap();
  let code = &output.assets[0].content;

  assert!(!code.contains("__modules[\"src/index.js\"]"));
  assert!(code.contains("let counter = 0;\nfunction inc() {\n  counter += step;\n}"));
  assert!(code.contains("const __export_0 = __exports.size;\nexport { inc, counter, __export_0 as size };"));
  assert_eq!(output.chunk.exports, vec!["inc", "counter", "size"]);
  assert_eq!(output.chunk.modules.last().unwrap().id.base_name(), "index.js");
}
