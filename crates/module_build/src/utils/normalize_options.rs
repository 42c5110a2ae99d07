use std::path::{Path, PathBuf};

use module_build_common::{
  InputOptions, NormalizedInputOptions, NormalizedOutputOptions, OutputOptions,
};
use module_build_error::BuildResult;
use sugar_path::SugarPath;

pub fn normalize_input_options(raw_options: InputOptions) -> BuildResult<NormalizedInputOptions> {
  let Some(input) = raw_options.input.filter(|input| !input.is_empty()) else {
    return Err(anyhow::anyhow!("You must supply options.input to the bundler").into());
  };

  let cwd = match raw_options.cwd {
    Some(cwd) => cwd,
    None => std::env::current_dir()?,
  };

  Ok(NormalizedInputOptions {
    input,
    cwd,
    external: raw_options.external.unwrap_or_default(),
    treeshake: raw_options.treeshake.unwrap_or(false),
    on_log: raw_options.on_log,
  })
}

pub fn normalize_output_options(
  raw_options: &OutputOptions,
  cwd: &Path,
) -> BuildResult<NormalizedOutputOptions> {
  let Some(file) = raw_options.file.as_ref().filter(|file| !file.is_empty()) else {
    return Err(anyhow::anyhow!("You must supply output.file to write a bundle").into());
  };

  let file = cwd.join(file).normalize();
  let dir = file.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(cwd));

  Ok(NormalizedOutputOptions {
    file,
    dir,
    format: raw_options.format.unwrap_or_default(),
    sourcemap: raw_options.sourcemap.unwrap_or(false),
  })
}

#[test]
fn input_is_required() {
  let error = normalize_input_options(InputOptions::default()).unwrap_err();
  assert_eq!(error.to_string(), "You must supply options.input to the bundler");
}

#[test]
fn output_file_is_resolved_against_cwd() {
  let options = normalize_output_options(
    &OutputOptions { file: Some("dist/index.js".to_string()), ..OutputOptions::default() },
    Path::new("/project"),
  )
  .unwrap();

  assert_eq!(options.file, PathBuf::from("/project/dist/index.js"));
  assert_eq!(options.dir, PathBuf::from("/project/dist"));
  assert_eq!(options.file_name(), "index.js");
  assert!(!options.sourcemap);
}
