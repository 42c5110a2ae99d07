use std::path::Path;

use anyhow::Context;
use oxc_sourcemap::SourceMap;
use sugar_path::SugarPath;

/// Maps produced by other `oxc` builds are re-read through JSON, so they do not have to share a
/// crate version with this one.
pub fn parse_sourcemap(json: &str) -> anyhow::Result<SourceMap> {
  SourceMap::from_json_string(json).context("Invalid source map")
}

/// Serializes `map` for a file called `file`, with every absolute entry of `sources` rewritten
/// relative to `dir` (the directory the map is written to).
pub fn finalize_sourcemap(map: &SourceMap, file: &str, dir: &Path) -> anyhow::Result<String> {
  let mut json: serde_json::Value = serde_json::from_str(&map.to_json_string())?;

  if let Some(object) = json.as_object_mut() {
    object.insert("file".to_string(), serde_json::Value::String(file.to_string()));

    if let Some(serde_json::Value::Array(sources)) = object.get_mut("sources") {
      for source in sources.iter_mut() {
        if let serde_json::Value::String(path) = source {
          if Path::new(path.as_str()).is_absolute() {
            *path = Path::new(path.as_str()).relative(dir).to_slash_lossy().into_owned();
          }
        }
      }
    }
  }

  Ok(serde_json::to_string(&json)?)
}

#[test]
fn finalize_relativizes_sources() {
  let root = std::env::current_dir().unwrap();
  let source = root.join("src").join("index.ts");
  let raw = serde_json::json!({
    "version": 3,
    "sources": [source.to_string_lossy()],
    "names": [],
    "mappings": "AAAA"
  });
  let map = parse_sourcemap(&raw.to_string()).unwrap();

  let json = finalize_sourcemap(&map, "index.js", &root.join("dist")).unwrap();
  let value: serde_json::Value = serde_json::from_str(&json).unwrap();
  assert_eq!(value["file"], "index.js");
  assert_eq!(value["sources"][0], "../src/index.ts");
}
