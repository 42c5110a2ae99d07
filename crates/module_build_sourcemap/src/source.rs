use memchr::memchr_iter;
use oxc_sourcemap::SourceMap;

/// A piece of generated code, optionally mapped back to its original file.
pub trait Source {
  fn content(&self) -> &str;

  fn sourcemap(&self) -> Option<&SourceMap> {
    None
  }
}

impl Source for &str {
  fn content(&self) -> &str {
    self
  }
}

impl Source for String {
  fn content(&self) -> &str {
    self
  }
}

/// Code together with the map from its lines back to the original file.
#[derive(Debug)]
pub struct SourceMapSource {
  content: String,
  sourcemap: SourceMap,
}

impl SourceMapSource {
  pub fn new(content: String, sourcemap: SourceMap) -> Self {
    Self { content, sourcemap }
  }
}

impl Source for SourceMapSource {
  fn content(&self) -> &str {
    &self.content
  }

  fn sourcemap(&self) -> Option<&SourceMap> {
    Some(&self.sourcemap)
  }
}

/// Number of `\n` in `code`, the line offset a following source starts at.
pub fn line_breaks(code: &str) -> u32 {
  u32::try_from(memchr_iter(b'\n', code.as_bytes()).count()).unwrap_or(u32::MAX)
}

#[test]
fn counts_line_breaks() {
  assert_eq!(line_breaks("a\nb\nc"), 2);
  assert_eq!(line_breaks("a\nb\nc\n"), 3);
  assert_eq!(line_breaks(""), 0);
}
