use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn module_build() -> Command {
  let mut cmd = Command::cargo_bin("module-build").unwrap();
  cmd.env_remove("MODULE_BUILD_LOG");
  cmd
}

#[test]
fn help_lists_watch() {
  module_build()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("--watch"))
    .stdout(predicate::str::contains("Watch files in bundle and rebuild on changes."));
}

#[test]
fn unknown_arguments_are_rejected() {
  module_build().arg("--minify").assert().code(2).stderr(predicate::str::contains("--minify"));
}

#[test]
fn manifest_without_source_fails_before_building() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::write(dir.path().join("package.json"), r#"{ "module": "dist/index.js" }"#).unwrap();
  std::fs::create_dir_all(dir.path().join("dist")).unwrap();
  std::fs::write(dir.path().join("dist/stale.js"), "").unwrap();

  module_build()
    .current_dir(dir.path())
    .assert()
    .failure()
    .code(1)
    .stdout(predicate::str::contains("module-build:"))
    .stdout(predicate::str::contains("ERROR"))
    .stdout(predicate::str::contains("source"));

  assert!(!dir.path().join("dist/index.js").exists());
  assert!(dir.path().join("dist/stale.js").exists());
}

#[test]
fn missing_manifest_fails() {
  let dir = tempfile::tempdir().unwrap();
  module_build()
    .current_dir(dir.path())
    .assert()
    .code(1)
    .stdout(predicate::str::contains("package.json"));
}

#[test]
fn builds_a_typescript_package() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path();
  std::fs::write(
    root.join("package.json"),
    r#"{ "name": "demo", "source": "src/index.ts", "module": "dist/index.js", "external": ["left-pad"] }"#,
  )
  .unwrap();
  std::fs::create_dir_all(root.join("src")).unwrap();
  std::fs::write(
    root.join("src/index.ts"),
    "import leftPad from \"left-pad\";\nimport { double } from \"./math\";\n\nexport function pad(value: number): string {\n  return leftPad(String(double(value)), 4);\n}\n",
  )
  .unwrap();
  std::fs::write(
    root.join("src/math.ts"),
    "export function double(value: number): number {\n  return value * 2;\n}\n\nexport const unused = 1;\n",
  )
  .unwrap();
  std::fs::create_dir_all(root.join("dist")).unwrap();
  std::fs::write(root.join("dist/stale.txt"), "old").unwrap();

  module_build()
    .current_dir(root)
    .assert()
    .success()
    .stdout(predicate::str::contains("index.ts:"))
    .stdout(predicate::str::contains("math.ts:"))
    .stdout(predicate::str::contains("Sizes for index.js:"));

  let bundle = std::fs::read_to_string(root.join("dist/index.js")).unwrap();
  assert!(bundle.contains("from \"left-pad\""));
  assert!(bundle.contains("unused"));
  for file in ["dist/index.js.map", "dist/index.d.ts", "dist/index.d.ts.map"] {
    assert!(root.join(file).exists(), "{file} was not written");
  }
  assert!(!root.join("dist/stale.txt").exists());
}

/// Relative specifiers after `from` in declaration code.
fn relative_specifiers(code: &str) -> Vec<String> {
  code
    .split(" from \"")
    .skip(1)
    .filter_map(|rest| rest.split_once('"').map(|(specifier, _)| specifier.to_string()))
    .filter(|specifier| specifier.starts_with('.'))
    .collect()
}

#[test]
fn declarations_cover_type_only_modules() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path();
  std::fs::write(
    root.join("package.json"),
    r#"{ "name": "demo", "source": "src/index.ts", "module": "dist/index.js" }"#,
  )
  .unwrap();
  std::fs::create_dir_all(root.join("src/shapes")).unwrap();
  std::fs::write(
    root.join("src/index.ts"),
    "import type { Opts } from \"./types\";\nexport type { Shape } from \"./shapes\";\n\nexport function pad(value: string, opts: Opts): string {\n  return value.padStart(opts.width);\n}\n",
  )
  .unwrap();
  std::fs::write(
    root.join("src/types.ts"),
    "import type { Unit } from \"./units\";\n\nexport interface Opts {\n  width: number;\n  unit: Unit;\n}\n",
  )
  .unwrap();
  std::fs::write(root.join("src/units.ts"), "export type Unit = \"ch\" | \"px\";\n").unwrap();
  std::fs::write(root.join("src/shapes/index.ts"), "export interface Shape {\n  sides: number;\n}\n")
    .unwrap();

  module_build().current_dir(root).assert().success();

  let bundle = std::fs::read_to_string(root.join("dist/index.js")).unwrap();
  assert!(!bundle.contains("./types"));

  let dist = root.join("dist");
  let mut pending = vec![dist.join("index.d.ts")];
  let mut seen = vec![];
  while let Some(declaration) = pending.pop() {
    let code = std::fs::read_to_string(&declaration)
      .unwrap_or_else(|_| panic!("{} was not written", declaration.display()));
    for specifier in relative_specifiers(&code) {
      let base = declaration.parent().unwrap().join(&specifier);
      let file = [base.with_extension("d.ts"), base.join("index.d.ts")]
        .into_iter()
        .find(|file| file.is_file())
        .unwrap_or_else(|| panic!("{specifier} in {} has no declaration", declaration.display()));
      if !seen.contains(&file) {
        seen.push(file.clone());
        pending.push(file);
      }
    }
  }

  for file in ["types.d.ts", "units.d.ts", "shapes/index.d.ts"] {
    assert!(seen.contains(&dist.join(file)), "{file} is not referenced");
  }
}
