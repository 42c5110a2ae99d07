/// Non-overlapping replacements applied to a module's code in one pass.
///
/// Every replaced range keeps its line breaks: they are appended after the new content, so each
/// remaining line of the code stays on the line its source map points to.
#[derive(Debug, Default)]
pub struct TextEdits {
  edits: Vec<(u32, u32, String)>,
}

impl TextEdits {
  pub fn replace(&mut self, start: u32, end: u32, content: impl Into<String>) {
    let content = content.into();
    debug_assert!(!content.contains('\n'), "replacement must fit on one line");
    self.edits.push((start, end, content));
  }

  pub fn remove(&mut self, start: u32, end: u32) {
    self.replace(start, end, String::new());
  }

  pub fn insert(&mut self, at: u32, content: impl Into<String>) {
    self.replace(at, at, content);
  }

  pub fn is_empty(&self) -> bool {
    self.edits.is_empty()
  }

  pub fn apply(mut self, code: &str) -> String {
    self.edits.sort_by_key(|(start, end, _)| (*start, *end));

    let mut output = String::with_capacity(code.len());
    let mut last = 0;
    for (start, end, content) in self.edits {
      let (start, end) = (start as usize, end as usize);
      if start < last || end > code.len() {
        continue;
      }
      output.push_str(&code[last..start]);
      output.push_str(&content);
      let removed_lines = code[start..end].matches('\n').count();
      output.push_str(&"\n".repeat(removed_lines));
      last = end;
    }
    output.push_str(&code[last..]);
    output
  }
}

#[test]
fn keeps_line_count() {
  let code = "export {\n  a,\n  b\n};\nconst a = 1;\n";
  let mut edits = TextEdits::default();
  edits.remove(0, 20);
  edits.insert(21, "/* a */ ");
  assert_eq!(edits.apply(code), "\n\n\n\n/* a */ const a = 1;\n");
}

#[test]
fn applies_edits_in_position_order() {
  let code = "export default 42;";
  let mut edits = TextEdits::default();
  edits.insert(18, ";");
  edits.replace(0, 15, "const __default = ");
  assert_eq!(edits.apply(code), "const __default = 42;;");
}
