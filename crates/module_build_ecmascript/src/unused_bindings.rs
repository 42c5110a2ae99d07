use oxc::{
  ast::{
    ast::{Declaration, ExportDefaultDeclarationKind, Program, Statement},
    AstKind,
  },
  semantic::{NodeId, Semantic, SymbolId},
  span::Span,
};
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKind {
  Value,
  Type,
}

#[derive(Debug)]
pub struct UnusedBinding {
  pub name: String,
  pub span: Span,
  pub kind: UnusedKind,
}

impl UnusedBinding {
  pub fn message(&self) -> String {
    match self.kind {
      UnusedKind::Value => format!("'{}' is declared but its value is never read.", self.name),
      UnusedKind::Type => format!("'{}' is declared but never used.", self.name),
    }
  }
}

/// Finds bindings that are never read, the way `noUnusedLocals` and `noUnusedParameters` do.
pub struct UnusedBindings<'s, 'a> {
  semantic: &'s Semantic<'a>,
  program: &'s Program<'a>,
  locals: bool,
  parameters: bool,
}

impl<'s, 'a> UnusedBindings<'s, 'a> {
  pub fn new(semantic: &'s Semantic<'a>, program: &'s Program<'a>) -> Self {
    Self { semantic, program, locals: false, parameters: false }
  }

  #[must_use]
  pub fn with_locals(mut self, yes: bool) -> Self {
    self.locals = yes;
    self
  }

  #[must_use]
  pub fn with_parameters(mut self, yes: bool) -> Self {
    self.parameters = yes;
    self
  }

  pub fn check(&self) -> Vec<UnusedBinding> {
    if !self.locals && !self.parameters {
      return vec![];
    }

    let scoping = self.semantic.scoping();
    let exported = exported_root_names(self.program);
    let root_scope_id = scoping.root_scope_id();

    let mut unused = scoping
      .symbol_ids()
      .filter(|&symbol_id| !self.is_used(symbol_id))
      .filter(|&symbol_id| {
        scoping.symbol_scope_id(symbol_id) != root_scope_id
          || !exported.contains(scoping.symbol_name(symbol_id))
      })
      .filter_map(|symbol_id| {
        let name = scoping.symbol_name(symbol_id);
        let kind = self.classify(scoping.symbol_declaration(symbol_id), name)?;
        Some(UnusedBinding {
          name: name.to_string(),
          span: scoping.symbol_span(symbol_id),
          kind,
        })
      })
      .collect::<Vec<_>>();
    unused.sort_by_key(|binding| binding.span.start);
    unused
  }

  fn is_used(&self, symbol_id: SymbolId) -> bool {
    let scoping = self.semantic.scoping();
    scoping.get_resolved_reference_ids(symbol_id).iter().any(|&reference_id| {
      let reference = scoping.get_reference(reference_id);
      reference.is_read() || reference.is_type()
    })
  }

  /// `None` when the declaration is not subject to the enabled checks.
  fn classify(&self, declaration: NodeId, name: &str) -> Option<UnusedKind> {
    let nodes = self.semantic.nodes();
    match nodes.kind(declaration) {
      AstKind::FormalParameter(param) => {
        let is_parameter_property = param.accessibility.is_some() || param.readonly;
        let checked = self.parameters
          && !is_parameter_property
          && !name.starts_with('_')
          && self.has_implementation(declaration);
        checked.then_some(UnusedKind::Value)
      }
      AstKind::VariableDeclarator(_)
      | AstKind::ImportSpecifier(_)
      | AstKind::ImportDefaultSpecifier(_)
      | AstKind::ImportNamespaceSpecifier(_) => self.locals.then_some(UnusedKind::Value),
      AstKind::Function(func) => {
        (self.locals && func.is_declaration() && func.body.is_some()).then_some(UnusedKind::Value)
      }
      AstKind::Class(class) => {
        (self.locals && class.is_declaration() && !class.declare).then_some(UnusedKind::Value)
      }
      AstKind::TSTypeAliasDeclaration(_) | AstKind::TSInterfaceDeclaration(_) => {
        self.locals.then_some(UnusedKind::Type)
      }
      _ => None,
    }
  }

  /// Parameters of signatures without a body (overloads, declared functions, function types)
  /// cannot be read.
  fn has_implementation(&self, param: NodeId) -> bool {
    for kind in self.semantic.nodes().ancestor_kinds(param) {
      match kind {
        AstKind::Function(func) => return func.body.is_some(),
        AstKind::ArrowFunctionExpression(_) => return true,
        AstKind::TSFunctionType(_)
        | AstKind::TSConstructorType(_)
        | AstKind::TSMethodSignature(_)
        | AstKind::TSCallSignatureDeclaration(_)
        | AstKind::TSConstructSignatureDeclaration(_) => return false,
        _ => {}
      }
    }
    false
  }
}

fn exported_root_names(program: &Program) -> FxHashSet<String> {
  let mut names = FxHashSet::default();
  for stmt in &program.body {
    match stmt {
      Statement::ExportNamedDeclaration(decl) => {
        match &decl.declaration {
          Some(Declaration::VariableDeclaration(var)) => {
            for declarator in &var.declarations {
              names.extend(declarator.id.get_binding_identifiers().iter().map(|id| id.name.to_string()));
            }
          }
          Some(Declaration::FunctionDeclaration(func)) => {
            names.extend(func.id.iter().map(|id| id.name.to_string()));
          }
          Some(Declaration::ClassDeclaration(class)) => {
            names.extend(class.id.iter().map(|id| id.name.to_string()));
          }
          Some(Declaration::TSTypeAliasDeclaration(alias)) => {
            names.insert(alias.id.name.to_string());
          }
          Some(Declaration::TSInterfaceDeclaration(interface)) => {
            names.insert(interface.id.name.to_string());
          }
          Some(Declaration::TSEnumDeclaration(decl)) => {
            names.insert(decl.id.name.to_string());
          }
          _ => {}
        }
        if decl.source.is_none() {
          names.extend(decl.specifiers.iter().map(|specifier| specifier.local.name().to_string()));
        }
      }
      Statement::ExportDefaultDeclaration(decl) => match &decl.declaration {
        ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
          names.extend(func.id.iter().map(|id| id.name.to_string()));
        }
        ExportDefaultDeclarationKind::ClassDeclaration(class) => {
          names.extend(class.id.iter().map(|id| id.name.to_string()));
        }
        ExportDefaultDeclarationKind::Identifier(ident) => {
          names.insert(ident.name.to_string());
        }
        _ => {}
      },
      _ => {}
    }
  }
  names
}

#[cfg(test)]
fn check(source: &str, locals: bool, parameters: bool) -> Vec<String> {
  use oxc::{allocator::Allocator, parser::Parser, semantic::SemanticBuilder, span::SourceType};

  let allocator = Allocator::default();
  let program = Parser::new(&allocator, source, SourceType::ts()).parse().program;
  let semantic = SemanticBuilder::new().build(&program).semantic;
  UnusedBindings::new(&semantic, &program)
    .with_locals(locals)
    .with_parameters(parameters)
    .check()
    .into_iter()
    .map(|binding| binding.name)
    .collect()
}

#[test]
fn reports_unused_locals_only_when_enabled() {
  let source = "import { a, b } from './x';\nconst c = 1;\nfunction d() {}\nexport const e = b;\n";
  assert_eq!(check(source, true, false), vec!["a", "c", "d"]);
  assert!(check(source, false, false).is_empty());
}

#[test]
fn exported_bindings_are_exempt() {
  let source = "function f() {}\ninterface Shape {}\ntype Id = string;\nexport { f };\nexport type { Shape, Id };\nexport class C {}\n";
  assert!(check(source, true, true).is_empty());
}

#[test]
fn parameters_follow_their_own_flag() {
  let source = "export function f(used: number, unused: number, _ignored: number) { return used; }\n";
  assert_eq!(check(source, false, true), vec!["unused"]);
  assert!(check(source, true, false).is_empty());
}

#[test]
fn signatures_and_parameter_properties_are_skipped() {
  let source = "export type Fn = (value: number) => void;\nexport declare function g(x: number): void;\nexport class P { constructor(private readonly name: string) {} }\n";
  assert!(check(source, true, true).is_empty());
}

#[test]
fn type_only_usage_counts() {
  let source = "interface Shape { size: number }\nexport const s: Shape = { size: 1 };\n";
  assert!(check(source, true, false).is_empty());
}
