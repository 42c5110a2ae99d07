use std::path::Path;

use module_build_common::{ModuleId, NormalizedInputOptions, ResolvedId};
use module_build_error::BuildResult;
use module_build_plugin::{HookResolveIdArgs, PluginDriver};
use sugar_path::SugarPath;

/// `external` option first, then `resolve_id` hooks, then paths that exist on disk.
pub fn resolve_id(
  options: &NormalizedInputOptions,
  plugin_driver: &PluginDriver,
  specifier: &str,
  importer: Option<&str>,
) -> BuildResult<ResolvedId> {
  let is_entry = importer.is_none();
  if !is_entry && options.is_external(specifier) {
    return Ok(ResolvedId::external(specifier));
  }

  if let Some(resolved) =
    plugin_driver.resolve_id(&HookResolveIdArgs { importer, specifier, is_entry })?
  {
    return Ok(ResolvedId { id: resolved.id, is_external: resolved.external });
  }

  let is_path_like = is_entry
    || specifier.starts_with("./")
    || specifier.starts_with("../")
    || Path::new(specifier).is_absolute();
  if is_path_like {
    let dir = importer.and_then(|importer| Path::new(importer).parent()).unwrap_or(&options.cwd);
    let path = dir.join(specifier).normalize();
    if path.is_file() {
      return Ok(ResolvedId::internal(path.to_string_lossy().as_ref()));
    }
  }

  let error = match importer {
    Some(importer) => anyhow::anyhow!(
      "Could not resolve \"{specifier}\" from \"{}\"",
      ModuleId::from(importer).stabilize(&options.cwd)
    ),
    None => anyhow::anyhow!("Could not resolve entry module \"{specifier}\""),
  };
  Err(error.into())
}

#[test]
fn external_option_then_files_on_disk() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::create_dir_all(dir.path().join("src")).unwrap();
  std::fs::write(dir.path().join("src/util.js"), "").unwrap();

  let options = NormalizedInputOptions {
    input: "src/index.js".to_string(),
    cwd: dir.path().to_path_buf(),
    external: vec!["left-pad".to_string()],
    treeshake: false,
    on_log: None,
  };
  let plugin_driver = PluginDriver::new_shared(vec![], dir.path(), None);
  let importer = dir.path().join("src/index.js");
  let importer = importer.to_string_lossy();

  let resolved = resolve_id(&options, &plugin_driver, "left-pad/fp", Some(&importer)).unwrap();
  assert_eq!(resolved, ResolvedId::external("left-pad/fp"));

  let resolved = resolve_id(&options, &plugin_driver, "./util.js", Some(&importer)).unwrap();
  assert_eq!(resolved, ResolvedId::internal(dir.path().join("src/util.js").to_string_lossy().as_ref()));

  let error = resolve_id(&options, &plugin_driver, "./nope.js", Some(&importer)).unwrap_err();
  assert_eq!(error.to_string(), "Could not resolve \"./nope.js\" from \"src/index.js\"");

  // The entry is never external, and is looked up relative to `cwd`.
  let error = resolve_id(&options, &plugin_driver, "left-pad", None).unwrap_err();
  assert_eq!(error.to_string(), "Could not resolve entry module \"left-pad\"");
}
