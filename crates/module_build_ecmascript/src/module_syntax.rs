use oxc::{
  ast::{
    ast::{
      Argument, Declaration, ExportDefaultDeclarationKind, Expression, ImportDeclarationSpecifier,
      ModuleExportName, Program, Statement,
    },
    AstKind,
  },
  semantic::Semantic,
  span::{GetSpan, Span},
};

const COMMONJS_GLOBALS: [&str; 3] = ["require", "module", "exports"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
  /// `import foo from '...'`
  Default { local: String },
  /// `import * as foo from '...'`
  Namespace { local: String },
  /// `import { foo as bar } from '...'`
  Named { imported: String, local: String },
}

#[derive(Debug, Clone)]
pub struct ImportStatement {
  pub span: Span,
  pub specifier: String,
  pub bindings: Vec<ImportBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSpecifier {
  pub local: String,
  pub exported: String,
}

#[derive(Debug, Clone)]
pub enum ExportStatement {
  /// `export const a = 1;`, `export function f() {}`. `keyword_span` covers `export `.
  Declaration { keyword_span: Span, names: Vec<String> },
  /// `export { a as b };`
  Local { span: Span, specifiers: Vec<ExportSpecifier> },
  /// `export { a as b } from './a';`
  Reexport { span: Span, specifier: String, specifiers: Vec<ExportSpecifier> },
  /// `export * from './a';` and `export * as ns from './a';`
  Star { span: Span, specifier: String, alias: Option<String> },
  /// `export default ...`. `keyword_span` covers `export default `; `local` is the name of a named
  /// function or class declaration.
  Default { keyword_span: Span, local: Option<String>, statement_end: u32 },
}

#[derive(Debug, Clone)]
pub struct DynamicImport {
  pub span: Span,
  pub specifier: String,
}

/// Import and export facts of one module, read from its top-level statements.
#[derive(Debug, Default, Clone)]
pub struct ModuleSyntax {
  pub imports: Vec<ImportStatement>,
  pub exports: Vec<ExportStatement>,
  pub dynamic_imports: Vec<DynamicImport>,
  /// Specifiers of `require('...')` calls with a literal argument.
  pub requires: Vec<String>,
  /// The module reads one of the free variables `require`, `module` or `exports`.
  pub uses_commonjs_globals: bool,
}

impl ModuleSyntax {
  pub fn from_semantic(program: &Program, semantic: &Semantic) -> Self {
    let mut syntax = Self::default();
    for stmt in &program.body {
      syntax.scan_statement(stmt);
    }
    syntax.scan_nodes(semantic);
    syntax
  }

  pub fn has_module_syntax(&self) -> bool {
    !self.imports.is_empty() || !self.exports.is_empty()
  }

  /// Looks like a CommonJS module: no ESM syntax, but CommonJS free variables are used.
  pub fn is_commonjs(&self) -> bool {
    !self.has_module_syntax() && self.uses_commonjs_globals
  }

  /// Names this module exports itself, in declaration order. Names reachable only through
  /// `export * from` are not included, see [`Self::star_reexports`].
  pub fn export_names(&self) -> Vec<String> {
    let mut names = vec![];
    for export in &self.exports {
      match export {
        ExportStatement::Declaration { names: declared, .. } => names.extend(declared.iter().cloned()),
        ExportStatement::Local { specifiers, .. } | ExportStatement::Reexport { specifiers, .. } => {
          names.extend(specifiers.iter().map(|specifier| specifier.exported.clone()));
        }
        ExportStatement::Star { alias: Some(alias), .. } => names.push(alias.clone()),
        ExportStatement::Star { alias: None, .. } => {}
        ExportStatement::Default { .. } => names.push("default".to_string()),
      }
    }
    names
  }

  /// Sources of `export * from '...'` without an alias.
  pub fn star_reexports(&self) -> impl Iterator<Item = &str> {
    self.exports.iter().filter_map(|export| match export {
      ExportStatement::Star { specifier, alias: None, .. } => Some(specifier.as_str()),
      _ => None,
    })
  }

  /// Top-level bindings exported by declaration, e.g. `a` in `export const a = 1`.
  pub fn exported_declarations(&self) -> impl Iterator<Item = &str> {
    self.exports.iter().flat_map(|export| match export {
      ExportStatement::Declaration { names, .. } => names.iter().map(String::as_str).collect(),
      ExportStatement::Default { local: Some(local), .. } => vec![local.as_str()],
      _ => vec![],
    })
  }

  /// Specifiers of static imports, re-exports and dynamic imports. `require` calls are not
  /// included, see [`Self::requires`]. Duplicates are removed, first occurrence wins.
  pub fn dependency_specifiers(&self) -> Vec<&str> {
    let reexports = self.exports.iter().filter_map(|export| match export {
      ExportStatement::Reexport { specifier, .. } | ExportStatement::Star { specifier, .. } => {
        Some(specifier.as_str())
      }
      _ => None,
    });

    let mut specifiers: Vec<&str> = vec![];
    for specifier in self
      .imports
      .iter()
      .map(|import| import.specifier.as_str())
      .chain(reexports)
      .chain(self.dynamic_imports.iter().map(|import| import.specifier.as_str()))
    {
      if !specifiers.contains(&specifier) {
        specifiers.push(specifier);
      }
    }
    specifiers
  }

  /// Whether `specifier` is only ever loaded through `import()`.
  pub fn is_dynamic_only(&self, specifier: &str) -> bool {
    self.dynamic_imports.iter().any(|import| import.specifier == specifier)
      && !self.imports.iter().any(|import| import.specifier == specifier)
      && !self.exports.iter().any(|export| match export {
        ExportStatement::Reexport { specifier: source, .. }
        | ExportStatement::Star { specifier: source, .. } => source == specifier,
        _ => false,
      })
  }

  fn scan_statement(&mut self, stmt: &Statement) {
    match stmt {
      Statement::ImportDeclaration(decl) => {
        if decl.import_kind.is_type() {
          return;
        }
        let bindings = decl
          .specifiers
          .iter()
          .flatten()
          .map(|specifier| match specifier {
            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
              ImportBinding::Default { local: s.local.name.to_string() }
            }
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
              ImportBinding::Namespace { local: s.local.name.to_string() }
            }
            ImportDeclarationSpecifier::ImportSpecifier(s) => ImportBinding::Named {
              imported: s.imported.name().to_string(),
              local: s.local.name.to_string(),
            },
          })
          .collect();
        self.imports.push(ImportStatement {
          span: decl.span,
          specifier: decl.source.value.to_string(),
          bindings,
        });
      }
      Statement::ExportNamedDeclaration(decl) => {
        if decl.export_kind.is_type() {
          return;
        }
        if let Some(declaration) = &decl.declaration {
          self.exports.push(ExportStatement::Declaration {
            keyword_span: Span::new(decl.span.start, declaration.span().start),
            names: declared_names(declaration),
          });
          return;
        }
        let specifiers = decl
          .specifiers
          .iter()
          .filter(|specifier| !specifier.export_kind.is_type())
          .map(|specifier| ExportSpecifier {
            local: module_export_name(&specifier.local),
            exported: module_export_name(&specifier.exported),
          })
          .collect();
        match &decl.source {
          Some(source) => self.exports.push(ExportStatement::Reexport {
            span: decl.span,
            specifier: source.value.to_string(),
            specifiers,
          }),
          None => self.exports.push(ExportStatement::Local { span: decl.span, specifiers }),
        }
      }
      Statement::ExportAllDeclaration(decl) => {
        if decl.export_kind.is_type() {
          return;
        }
        self.exports.push(ExportStatement::Star {
          span: decl.span,
          specifier: decl.source.value.to_string(),
          alias: decl.exported.as_ref().map(module_export_name),
        });
      }
      Statement::ExportDefaultDeclaration(decl) => {
        let local = match &decl.declaration {
          ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
            func.id.as_ref().map(|id| id.name.to_string())
          }
          ExportDefaultDeclarationKind::ClassDeclaration(class) => {
            class.id.as_ref().map(|id| id.name.to_string())
          }
          ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => return,
          _ => None,
        };
        self.exports.push(ExportStatement::Default {
          keyword_span: Span::new(decl.span.start, decl.declaration.span().start),
          local,
          statement_end: decl.span.end,
        });
      }
      _ => {}
    }
  }

  fn scan_nodes(&mut self, semantic: &Semantic) {
    let scoping = semantic.scoping();
    for node in semantic.nodes().iter() {
      match node.kind() {
        AstKind::ImportExpression(expr) => {
          if let Expression::StringLiteral(source) = &expr.source {
            self
              .dynamic_imports
              .push(DynamicImport { span: expr.span, specifier: source.value.to_string() });
          }
        }
        AstKind::CallExpression(call) => {
          if call.callee.is_specific_id("require") && call.arguments.len() == 1 {
            if let Some(Argument::StringLiteral(source)) = call.arguments.first() {
              let specifier = source.value.to_string();
              if !self.requires.contains(&specifier) {
                self.requires.push(specifier);
              }
            }
          }
        }
        AstKind::IdentifierReference(ident) => {
          if !self.uses_commonjs_globals && COMMONJS_GLOBALS.contains(&ident.name.as_str()) {
            let is_free = scoping.get_reference(ident.reference_id()).symbol_id().is_none();
            self.uses_commonjs_globals = is_free;
          }
        }
        _ => {}
      }
    }
  }
}

fn module_export_name(name: &ModuleExportName) -> String {
  name.name().to_string()
}

fn declared_names(declaration: &Declaration) -> Vec<String> {
  match declaration {
    Declaration::VariableDeclaration(decl) => decl
      .declarations
      .iter()
      .flat_map(|declarator| declarator.id.get_binding_identifiers())
      .map(|ident| ident.name.to_string())
      .collect(),
    Declaration::FunctionDeclaration(func) => {
      func.id.iter().map(|id| id.name.to_string()).collect()
    }
    Declaration::ClassDeclaration(class) => class.id.iter().map(|id| id.name.to_string()).collect(),
    Declaration::TSEnumDeclaration(decl) => vec![decl.id.name.to_string()],
    Declaration::TSTypeAliasDeclaration(decl) => vec![decl.id.name.to_string()],
    Declaration::TSInterfaceDeclaration(decl) => vec![decl.id.name.to_string()],
    _ => vec![],
  }
}
