mod ecma_compiler;
mod es_target;
mod module_syntax;
mod unused_bindings;

pub use crate::{
  ecma_compiler::{DeclarationOutput, EcmaCompiler, TransformConfig, TransformOutput},
  es_target::ESTarget,
  module_syntax::{
    DynamicImport, ExportSpecifier, ExportStatement, ImportBinding, ImportStatement, ModuleSyntax,
  },
};
pub use oxc::span::Span;

/// Whether `name` can be written as a bare identifier in JS.
pub fn is_validate_identifier_name(name: &str) -> bool {
  oxc::syntax::identifier::is_identifier_name(name)
}

/// `name` as it can appear in an import/export list or an object literal key.
pub fn to_module_import_export_name(name: &str) -> String {
  if is_validate_identifier_name(name) {
    name.into()
  } else {
    serde_json::Value::String(name.to_string()).to_string()
  }
}

#[test]
fn test_is_validate_identifier_name() {
  assert!(is_validate_identifier_name("foo"));
  assert!(!is_validate_identifier_name("1aaaa"));
  assert!(!is_validate_identifier_name("a-b"));
  assert_eq!(to_module_import_export_name("a-b"), "\"a-b\"");
}
