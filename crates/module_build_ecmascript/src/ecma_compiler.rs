use std::path::Path;

use oxc::{
  allocator::Allocator,
  ast::ast::{Program, Statement},
  codegen::{Codegen, CodegenOptions},
  diagnostics::OxcDiagnostic,
  isolated_declarations::{IsolatedDeclarations, IsolatedDeclarationsOptions},
  parser::{ParseOptions, Parser},
  semantic::SemanticBuilder,
  span::SourceType,
  transformer::{TransformOptions, Transformer},
};

use crate::{module_syntax::ModuleSyntax, unused_bindings::UnusedBindings, ESTarget};

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default)]
pub struct TransformConfig {
  pub target: ESTarget,
  /// Report semantic syntax errors such as redeclarations.
  pub strict: bool,
  pub no_unused_locals: bool,
  pub no_unused_parameters: bool,
  /// Emit `.d.ts` code for TypeScript sources.
  pub declaration: bool,
  pub declaration_map: bool,
  pub sourcemap: bool,
}

#[derive(Debug)]
pub struct DeclarationOutput {
  pub code: String,
  pub map: Option<String>,
  /// Module specifiers the declaration imports or re-exports from, type-only ones included.
  pub references: Vec<String>,
}

#[derive(Debug)]
pub struct TransformOutput {
  pub code: String,
  /// Source map JSON of `code`.
  pub map: Option<String>,
  pub declaration: Option<DeclarationOutput>,
  /// Problems that do not fail the module, e.g. declarations that could not be inferred.
  pub warnings: Vec<String>,
}

pub struct EcmaCompiler;

impl EcmaCompiler {
  /// Strips types, lowers syntax to `config.target` and compiles JSX.
  pub fn transform(
    source: &str,
    path: &Path,
    config: &TransformConfig,
  ) -> anyhow::Result<TransformOutput, Vec<anyhow::Error>> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_default();

    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
      return Err(to_errors(path, source, &ret.errors));
    }
    let mut program = ret.program;

    let ret = SemanticBuilder::new().with_check_syntax_error(config.strict).build(&program);
    if !ret.errors.is_empty() {
      return Err(to_errors(path, source, &ret.errors));
    }
    let semantic = ret.semantic;

    let unused = UnusedBindings::new(&semantic, &program)
      .with_locals(config.no_unused_locals)
      .with_parameters(config.no_unused_parameters)
      .check();
    if !unused.is_empty() {
      return Err(
        unused
          .into_iter()
          .map(|binding| {
            let (line, column) = line_column(source, binding.span.start);
            anyhow::anyhow!("{}:{line}:{column}: {}", path.display(), binding.message())
          })
          .collect(),
      );
    }

    let mut warnings = vec![];
    let declaration = if config.declaration && source_type.is_typescript() {
      let (declaration, errors) =
        isolated_declaration(&allocator, &program, path, source, config.declaration_map);
      warnings.extend(errors.iter().map(|error| format!("{error:#}")));
      Some(declaration)
    } else {
      None
    };

    let scoping = semantic.into_scoping();
    let options = TransformOptions::from_target(config.target.as_str()).map_err(|message| {
      vec![anyhow::anyhow!("{}: {message}", path.display())]
    })?;
    let ret = Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
      return Err(to_errors(path, source, &ret.errors));
    }

    let codegen = Codegen::new()
      .with_options(CodegenOptions {
        source_map_path: config.sourcemap.then(|| path.to_path_buf()),
        ..CodegenOptions::default()
      })
      .build(&program);

    Ok(TransformOutput {
      code: codegen.code,
      map: codegen.map.map(|map| map.to_json_string()),
      declaration,
      warnings,
    })
  }

  /// The `.d.ts` code of a TypeScript module that is never bundled, e.g. one only imported for
  /// its types. A `.d.ts` source is returned as it is. Returns the declaration and the problems
  /// that did not prevent it.
  pub fn declaration(
    source: &str,
    path: &Path,
    with_map: bool,
  ) -> anyhow::Result<(DeclarationOutput, Vec<String>), Vec<anyhow::Error>> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
      return Err(to_errors(path, source, &ret.errors));
    }

    if source_type.is_typescript_definition() {
      let declaration = DeclarationOutput {
        code: source.to_string(),
        map: None,
        references: module_references(&ret.program),
      };
      return Ok((declaration, vec![]));
    }

    let (declaration, errors) =
      isolated_declaration(&allocator, &ret.program, path, source, with_map);
    Ok((declaration, errors.iter().map(|error| format!("{error:#}")).collect()))
  }

  /// Reads the import/export structure of plain JavaScript. A top-level `return` is accepted so
  /// CommonJS files can be scanned too.
  pub fn scan(source: &str, path: &Path) -> anyhow::Result<ModuleSyntax, Vec<anyhow::Error>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs())
      .with_options(ParseOptions { allow_return_outside_function: true, ..ParseOptions::default() })
      .parse();
    if !ret.errors.is_empty() {
      return Err(to_errors(path, source, &ret.errors));
    }

    let semantic = SemanticBuilder::new().build(&ret.program).semantic;
    Ok(ModuleSyntax::from_semantic(&ret.program, &semantic))
  }
}

fn isolated_declaration<'a>(
  allocator: &'a Allocator,
  program: &Program<'a>,
  path: &Path,
  source: &str,
  with_map: bool,
) -> (DeclarationOutput, Vec<anyhow::Error>) {
  let ret = IsolatedDeclarations::new(allocator, IsolatedDeclarationsOptions { strip_internal: false })
    .build(program);
  let errors = to_errors(path, source, &ret.errors);

  let codegen = Codegen::new()
    .with_options(CodegenOptions {
      source_map_path: with_map.then(|| path.to_path_buf()),
      ..CodegenOptions::default()
    })
    .build(&ret.program);
  let declaration = DeclarationOutput {
    code: codegen.code,
    map: codegen.map.map(|map| map.to_json_string()),
    references: module_references(&ret.program),
  };
  (declaration, errors)
}

fn module_references(program: &Program) -> Vec<String> {
  let mut references: Vec<String> = vec![];
  for stmt in &program.body {
    let source = match stmt {
      Statement::ImportDeclaration(decl) => Some(&decl.source),
      Statement::ExportNamedDeclaration(decl) => decl.source.as_ref(),
      Statement::ExportAllDeclaration(decl) => Some(&decl.source),
      _ => None,
    };
    if let Some(source) = source {
      if !references.iter().any(|reference| reference == source.value.as_str()) {
        references.push(source.value.to_string());
      }
    }
  }
  references
}

fn to_errors(path: &Path, source: &str, diagnostics: &[OxcDiagnostic]) -> Vec<anyhow::Error> {
  diagnostics
    .iter()
    .map(|diagnostic| {
      let offset = diagnostic
        .labels
        .as_ref()
        .and_then(|labels| labels.first())
        .map(|label| u32::try_from(label.offset()).unwrap_or(u32::MAX));
      match offset {
        Some(offset) => {
          let (line, column) = line_column(source, offset);
          anyhow::anyhow!("{}:{line}:{column}: {diagnostic}", path.display())
        }
        None => anyhow::anyhow!("{}: {diagnostic}", path.display()),
      }
    })
    .collect()
}

/// One-based line and column of a byte offset.
fn line_column(source: &str, offset: u32) -> (usize, usize) {
  let offset = (offset as usize).min(source.len());
  let before = source.get(..offset).unwrap_or(source);
  let line = before.matches('\n').count() + 1;
  let column = before.rfind('\n').map_or(before.chars().count(), |index| {
    before[index + 1..].chars().count()
  }) + 1;
  (line, column)
}

#[test]
fn transform_strips_types() {
  let output = EcmaCompiler::transform(
    "export const add = (a: number, b: number): number => a + b;\n",
    Path::new("/project/src/add.ts"),
    &TransformConfig { sourcemap: true, declaration: true, ..TransformConfig::default() },
  )
  .unwrap();

  assert_eq!(output.code, "export const add = (a, b) => a + b;\n");
  assert!(output.map.is_some());
  let declaration = output.declaration.unwrap();
  assert!(declaration.code.contains("export declare const add"));
  assert!(declaration.map.is_none());
}

#[test]
fn transform_reports_unused_locals() {
  let errors = EcmaCompiler::transform(
    "const unused = 1;\nexport const used = 2;\n",
    Path::new("/project/src/a.ts"),
    &TransformConfig { no_unused_locals: true, ..TransformConfig::default() },
  )
  .unwrap_err();

  assert_eq!(errors.len(), 1);
  assert_eq!(
    errors[0].to_string(),
    "/project/src/a.ts:1:7: 'unused' is declared but its value is never read."
  );
}

#[test]
fn transform_reports_parse_errors_with_position() {
  let errors = EcmaCompiler::transform(
    "const a = ;\n",
    Path::new("/project/src/a.ts"),
    &TransformConfig::default(),
  )
  .unwrap_err();
  assert!(errors[0].to_string().starts_with("/project/src/a.ts:1:"));
}

#[test]
fn scan_collects_imports_and_exports() {
  let syntax = EcmaCompiler::scan(
    "import pad from 'left-pad';\nimport { a as b } from './a';\nexport * from './c';\nexport const x = 1;\nexport default function main() {}\nimport('./lazy');\n",
    Path::new("index.js"),
  )
  .unwrap();

  assert_eq!(syntax.dependency_specifiers(), vec!["left-pad", "./a", "./c", "./lazy"]);
  assert_eq!(syntax.export_names(), vec!["x".to_string(), "default".to_string()]);
  assert_eq!(syntax.star_reexports().collect::<Vec<_>>(), vec!["./c"]);
  assert!(!syntax.is_commonjs());
}

#[test]
fn scan_detects_commonjs() {
  let syntax = EcmaCompiler::scan(
    "const pad = require('left-pad');\nmodule.exports = pad;\n",
    Path::new("index.cjs"),
  )
  .unwrap();
  assert!(syntax.is_commonjs());
  assert_eq!(syntax.requires, vec!["left-pad".to_string()]);

  let shadowed =
    EcmaCompiler::scan("function f(require) { return require('x'); }\n", Path::new("a.js"))
      .unwrap();
  assert!(!shadowed.uses_commonjs_globals);
}

#[test]
fn line_column_is_one_based() {
  assert_eq!(line_column("ab\ncd", 0), (1, 1));
  assert_eq!(line_column("ab\ncd", 4), (2, 2));
}

#[test]
fn declarations_keep_type_only_references() {
  let output = EcmaCompiler::transform(
    "import type { Opts } from './types';\nexport type { Shape } from './shapes';\nexport function pad(value: string, opts: Opts): string {\n  return value.padStart(opts.width);\n}\n",
    Path::new("/project/src/index.ts"),
    &TransformConfig { declaration: true, ..TransformConfig::default() },
  )
  .unwrap();

  assert!(!output.code.contains("./types"));
  assert_eq!(output.declaration.unwrap().references, vec!["./types", "./shapes"]);
}

#[test]
fn declaration_only_modules() {
  let (declaration, warnings) = EcmaCompiler::declaration(
    "import type { Unit } from './units';\nexport interface Opts {\n  width: number;\n  unit: Unit;\n}\n",
    Path::new("/project/src/types.ts"),
    true,
  )
  .unwrap();
  assert!(warnings.is_empty());
  assert!(declaration.code.contains("export interface Opts"));
  assert!(declaration.map.is_some());
  assert_eq!(declaration.references, vec!["./units"]);

  let (handwritten, _) = EcmaCompiler::declaration(
    "export declare const version: string;\n",
    Path::new("/project/src/version.d.ts"),
    true,
  )
  .unwrap();
  assert_eq!(handwritten.code, "export declare const version: string;\n");
  assert!(handwritten.map.is_none());
}
