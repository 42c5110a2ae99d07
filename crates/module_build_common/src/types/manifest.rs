use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const MANIFEST_FILE_NAME: &str = "package.json";

/// The fields of `package.json` the build reads. Everything else in the file is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
  /// Entry file, e.g. `src/index.ts`.
  pub source: String,
  /// Output file, e.g. `dist/index.js`.
  pub module: String,
  #[serde(default)]
  pub external: Vec<String>,
}

impl Manifest {
  pub fn read_from_dir(dir: &Path) -> anyhow::Result<Self> {
    let path = dir.join(MANIFEST_FILE_NAME);
    let content = std::fs::read_to_string(&path)
      .with_context(|| format!("Failed to read {}", path.display()))?;
    Self::parse(&content).with_context(|| format!("Invalid manifest {}", path.display()))
  }

  pub fn parse(content: &str) -> anyhow::Result<Self> {
    Ok(serde_json::from_str(content)?)
  }

  /// Directory that receives the bundle, relative to the package root.
  pub fn output_dir(&self) -> PathBuf {
    Path::new(&self.module).parent().map(Path::to_path_buf).unwrap_or_default()
  }
}

#[test]
fn parse_reads_known_fields() {
  let manifest = Manifest::parse(
    r#"{ "name": "pkg", "source": "src/index.ts", "module": "dist/index.js", "external": ["left-pad"] }"#,
  )
  .unwrap();
  assert_eq!(manifest.source, "src/index.ts");
  assert_eq!(manifest.module, "dist/index.js");
  assert_eq!(manifest.external, vec!["left-pad".to_string()]);
  assert_eq!(manifest.output_dir(), PathBuf::from("dist"));
}

#[test]
fn external_is_optional() {
  let manifest = Manifest::parse(r#"{ "source": "src/index.ts", "module": "index.js" }"#).unwrap();
  assert!(manifest.external.is_empty());
  assert_eq!(manifest.output_dir(), PathBuf::new());
}

#[test]
fn missing_source_is_an_error() {
  let error = Manifest::parse(r#"{ "module": "dist/index.js" }"#).unwrap_err();
  assert!(error.to_string().contains("source"));
}

#[test]
fn read_from_dir_reports_the_path() {
  let dir = tempfile::tempdir().unwrap();
  let error = Manifest::read_from_dir(dir.path()).unwrap_err();
  assert!(format!("{error:#}").contains(MANIFEST_FILE_NAME));

  std::fs::write(dir.path().join(MANIFEST_FILE_NAME), "{ not json").unwrap();
  let error = Manifest::read_from_dir(dir.path()).unwrap_err();
  assert!(error.to_string().starts_with("Invalid manifest"));
}
