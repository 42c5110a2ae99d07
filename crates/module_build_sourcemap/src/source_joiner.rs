use oxc_sourcemap::{ConcatSourceMapBuilder, SourceMap};

use crate::source::{line_breaks, Source};

/// Joins sources with `\n`. Maps of mapped sources are shifted to the line their source starts on
/// and concatenated into one map for the joined code.
#[derive(Default)]
pub struct SourceJoiner<'source> {
  sources: Vec<Box<dyn Source + Send + 'source>>,
}

impl<'source> SourceJoiner<'source> {
  pub fn append_source<T: Source + Send + 'source>(&mut self, source: T) {
    self.sources.push(Box::new(source));
  }

  /// The joined code, and its map when at least one source carried one.
  pub fn join(&self) -> (String, Option<SourceMap>) {
    let capacity = self.sources.iter().map(|source| source.content().len() + 1).sum::<usize>();
    let mut code = String::with_capacity(capacity);
    let mut builder: Option<ConcatSourceMapBuilder> = None;
    let mut line = 0;

    for (index, source) in self.sources.iter().enumerate() {
      if index > 0 {
        code.push('\n');
        line += 1;
      }
      if let Some(map) = source.sourcemap() {
        builder.get_or_insert_with(ConcatSourceMapBuilder::default).add_sourcemap(map, line);
      }
      code.push_str(source.content());
      line += line_breaks(source.content());
    }

    (code, builder.map(ConcatSourceMapBuilder::into_sourcemap))
  }
}

#[test]
fn join_without_maps() {
  let mut joiner = SourceJoiner::default();
  joiner.append_source("a");
  joiner.append_source(String::from("b\nc"));

  let (code, map) = joiner.join();
  assert_eq!(code, "a\nb\nc");
  assert!(map.is_none());
}

#[test]
fn join_shifts_maps_by_line_offset() {
  let map = SourceMap::from_json_string(
    r#"{"version":3,"sources":["util.ts"],"names":[],"mappings":"AAAA"}"#,
  )
  .unwrap();

  let mut joiner = SourceJoiner::default();
  joiner.append_source("// header\n// more");
  joiner.append_source(crate::SourceMapSource::new("export {};".to_string(), map));

  let (code, map) = joiner.join();
  assert_eq!(line_breaks(&code), 2);
  let json: serde_json::Value = serde_json::from_str(&map.unwrap().to_json_string()).unwrap();
  assert_eq!(json["mappings"], ";;AAAA");
}
