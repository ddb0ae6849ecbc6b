//! Lowering of the tree-sitter C syntax tree into a [`TranslationUnit`].
//!
//! Walks the top-level items of a `translation_unit` node the way a
//! compiler front end would see them after preprocessing: conditional
//! blocks contribute only the branch that is taken, declarations build
//! their types inside-out from declarators, and every redeclaration of an
//! entity is linked to its first declaration and its definition.
//!
//! Two preprocessing steps happen on the text itself, since the grammar
//! sees unexpanded source. The `#ifdef __cplusplus` guards around an
//! `extern "C" {` block are blanked before parsing, and uses of macros
//! that expand to nothing are blanked and the text parsed again. Blanking
//! keeps every byte offset, so locations still match the file.

mod const_eval;
mod declarations;
mod declarators;
mod expressions;
mod preproc;
mod records;
mod specifiers;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use ast_grep_core::Node;
use ast_grep_language::SupportLang;

use crate::ParseOptions;
use crate::kind::CursorKind;
use crate::ty::TypeKind;
use crate::unit::{NodeId, TranslationUnit, TypeId, UnitBuilder};

use const_eval::ConstEnv;
use preproc::{EmptyMacro, blank, blank_linkage_guards, empty_macro_uses};

/// Parse and lower C source text into a translation unit.
pub(crate) fn lower_source(source: &str, file: &str, options: &ParseOptions) -> TranslationUnit {
    let mut text = blank_linkage_guards(source);
    let tree = crate::parser::parse_source(&text, SupportLang::C);
    let (unit, empty_macros) = lower(&tree.root(), file, source, options);
    let uses = empty_macro_uses(&tree.root(), &empty_macros);
    if uses.is_empty() {
        return unit;
    }
    tracing::debug!(file, uses = uses.len(), "expanding empty macros");
    for range in uses {
        blank(&mut text, range);
    }
    let tree = crate::parser::parse_source(&text, SupportLang::C);
    lower(&tree.root(), file, source, options).0
}

/// Lower a parsed tree; also returns where macros with empty bodies were
/// in effect.
fn lower<D: ast_grep_core::Doc>(
    root: &Node<D>,
    file: &str,
    source: &str,
    options: &ParseOptions,
) -> (TranslationUnit, Vec<EmptyMacro>) {
    let mut lowering = Lowering::new(file, source);
    for define in &options.defines {
        lowering.predefine(define);
    }
    let items: Vec<_> = root.children().collect();
    lowering.lower_items(&items, NodeId::ROOT);
    for error in error_nodes(root) {
        let start = error.start_pos();
        lowering
            .builder
            .record_error(to_u32(start.line() + 1), to_u32(start.column(&error) + 1));
    }
    let empty_macros = std::mem::take(&mut lowering.empty_macros);
    (lowering.finish(), empty_macros)
}

/// C name spaces that can hold redeclarations of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Namespace {
    Struct,
    Union,
    Enum,
    /// Functions, variables and typedef names.
    Ordinary,
}

/// Every declaration of one entity, in source order.
#[derive(Debug, Default)]
struct Redeclarations {
    decls: Vec<NodeId>,
    definition: Option<NodeId>,
    ty: Option<TypeId>,
}

/// How a `struct`/`union`/`enum` specifier without a body is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagUse {
    /// `struct S;` on its own: declares the tag.
    Declaration,
    /// `struct S *p;`: names a tag declared elsewhere.
    Reference,
}

struct Lowering {
    builder: UnitBuilder,
    entities: HashMap<(Namespace, String), Redeclarations>,
    typedefs: HashMap<String, TypeId>,
    external_typedefs: HashMap<String, TypeId>,
    builtins: HashMap<TypeKind, TypeId>,
    enumerators: HashMap<String, NodeId>,
    env: ConstEnv,
    empty_macros: Vec<EmptyMacro>,
}

impl Lowering {
    fn new(file: &str, source: &str) -> Self {
        Self {
            builder: UnitBuilder::new(file, source),
            entities: HashMap::new(),
            typedefs: HashMap::new(),
            external_typedefs: HashMap::new(),
            builtins: HashMap::new(),
            enumerators: HashMap::new(),
            env: ConstEnv::default(),
            empty_macros: Vec::new(),
        }
    }

    // ── Item dispatcher ────────────────────────────────────────────

    fn lower_items<D: ast_grep_core::Doc>(&mut self, items: &[Node<D>], parent: NodeId) {
        for (idx, item) in items.iter().enumerate() {
            let before = self.builder.unit().len();
            let documented = match item.kind().as_ref() {
                "declaration" => {
                    self.lower_declaration(item, parent);
                    true
                }
                "function_definition" => {
                    self.lower_function_definition(item, parent);
                    true
                }
                "type_definition" => {
                    self.lower_type_definition(item, parent);
                    true
                }
                "struct_specifier" | "union_specifier" | "enum_specifier" => {
                    // `struct S { ... };` and `struct S;` at file scope.
                    self.tag_specifier(item, parent, TagUse::Declaration);
                    true
                }
                "preproc_def" => {
                    self.lower_define(item, parent);
                    true
                }
                "preproc_function_def" => {
                    self.lower_function_macro(item, parent);
                    true
                }
                "preproc_include" => {
                    self.lower_include(item, parent);
                    false
                }
                "preproc_call" => {
                    self.lower_preproc_call(item);
                    false
                }
                "preproc_if" | "preproc_ifdef" => {
                    let branch = self.select_branch(item);
                    self.lower_items(&branch, parent);
                    false
                }
                "linkage_specification" => {
                    // `extern "C" { ... }` only groups declarations.
                    if let Some(body) = item.field("body") {
                        let inner: Vec<_> = if body.kind().as_ref() == "declaration_list" {
                            body.children().collect()
                        } else {
                            vec![body]
                        };
                        self.lower_items(&inner, parent);
                    }
                    false
                }
                "expression_statement" | "static_assert_declaration" => {
                    self.lower_static_assert(item, parent);
                    false
                }
                "ERROR" => {
                    let id = self.add_node(parent, CursorKind::InvalidCode, "", item);
                    tracing::debug!(line = self.line_of(id), "syntax error in top-level item");
                    false
                }
                _ => false,
            };
            if documented {
                self.attach_doc_comment(items, idx, parent, before);
            }
        }
    }

    fn attach_doc_comment<D: ast_grep_core::Doc>(
        &mut self,
        items: &[Node<D>],
        idx: usize,
        parent: NodeId,
        before: usize,
    ) {
        let doc = collect_doc_comment(items, idx);
        if doc.is_empty() {
            return;
        }
        for id in self.builder.children_since(parent, before) {
            if !self.builder.is_implicit(id) {
                self.builder.set_comment(id, doc.clone());
            }
        }
    }

    // ── Node helpers ───────────────────────────────────────────────

    /// Add a node positioned at `node`.
    fn add_node<D: ast_grep_core::Doc>(
        &mut self,
        parent: NodeId,
        kind: CursorKind,
        spelling: &str,
        node: &Node<D>,
    ) -> NodeId {
        let id = self.builder.add(parent, kind, spelling);
        self.place(id, node, node);
        id
    }

    /// Locate `id` at `at` while covering the source range of `extent`.
    fn place<D: ast_grep_core::Doc>(&mut self, id: NodeId, at: &Node<D>, extent: &Node<D>) {
        let start = at.start_pos();
        self.builder
            .set_location(id, to_u32(start.line() + 1), to_u32(start.column(at) + 1));
        self.builder.set_extent(id, extent.range());
    }

    fn line_of(&self, id: NodeId) -> u32 {
        self.builder.unit().cursor_by_id(id).location().line
    }

    fn builtin(&mut self, kind: TypeKind) -> TypeId {
        if let Some(ty) = self.builtins.get(&kind) {
            return *ty;
        }
        let ty = self.builder.builtin(kind);
        self.builtins.insert(kind, ty);
        ty
    }

    /// Record `decl` as a declaration of `name`; returns the entity's type.
    fn redeclare(
        &mut self,
        namespace: Namespace,
        name: &str,
        decl: NodeId,
        is_definition: bool,
    ) -> Option<TypeId> {
        let entity = self
            .entities
            .entry((namespace, name.to_string()))
            .or_default();
        entity.decls.push(decl);
        if is_definition && entity.definition.is_none() {
            entity.definition = Some(decl);
        }
        entity.ty
    }

    fn entity_type(&self, namespace: Namespace, name: &str) -> Option<TypeId> {
        self.entities
            .get(&(namespace, name.to_string()))
            .and_then(|entity| entity.ty)
    }

    fn set_entity_type(&mut self, namespace: Namespace, name: &str, ty: TypeId) {
        if let Some(entity) = self.entities.get_mut(&(namespace, name.to_string())) {
            entity.ty.get_or_insert(ty);
        }
    }

    /// Declaration an identifier in an expression refers to.
    fn lookup_value(&self, name: &str) -> Option<NodeId> {
        self.enumerators.get(name).copied().or_else(|| {
            self.entities
                .get(&(Namespace::Ordinary, name.to_string()))
                .and_then(|entity| entity.decls.first().copied())
        })
    }

    fn finish(mut self) -> TranslationUnit {
        for entity in self.entities.values() {
            let Some(&first) = entity.decls.first() else {
                continue;
            };
            for &decl in &entity.decls {
                if decl != first {
                    self.builder.set_canonical(decl, first);
                }
                if let Some(definition) = entity.definition
                    && decl != definition
                {
                    self.builder.link_definition(decl, definition);
                }
            }
        }
        self.builder.finish()
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// `ERROR` subtrees and tokens the parser had to invent, not counting
/// errors nested in errors.
fn error_nodes<'r, D: ast_grep_core::Doc>(root: &Node<'r, D>) -> Vec<Node<'r, D>> {
    let mut errors = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            errors.push(node);
            continue;
        }
        stack.extend(node.children());
    }
    errors
}

fn has_error_nodes<D: ast_grep_core::Doc>(root: &Node<D>) -> bool {
    !error_nodes(root).is_empty()
}

// ── Doc comment collection ─────────────────────────────────────────

/// Collect leading comments above `siblings[idx]`.
///
/// Walks backward through contiguous `comment` siblings. Stops at any
/// other node, at a blank-line gap, and at a comment that trails the code
/// on the previous line.
fn collect_doc_comment<D: ast_grep_core::Doc>(siblings: &[Node<D>], idx: usize) -> String {
    let mut comments = Vec::new();
    let target_line = siblings[idx].start_pos().line();

    let mut i = idx;
    while i > 0 {
        i -= 1;
        let sibling = &siblings[i];
        if sibling.kind().as_ref() != "comment" {
            break;
        }

        let comment_end = sibling.end_pos().line();
        let next_start = if i + 1 < idx {
            siblings[i + 1].start_pos().line()
        } else {
            target_line
        };
        if next_start > comment_end + 1 {
            break;
        }
        if i > 0 {
            let previous = &siblings[i - 1];
            if previous.kind().as_ref() != "comment"
                && previous.end_pos().line() == sibling.start_pos().line()
            {
                break;
            }
        }

        let stripped = strip_comment(&sibling.text());
        if !stripped.is_empty() {
            comments.push(stripped);
        }
    }

    comments.reverse();
    comments.join("\n")
}

/// Strip C comment markers from a comment string.
fn strip_comment(text: &str) -> String {
    let text = text.trim();

    if let Some(rest) = text.strip_prefix("//") {
        return rest.trim_start_matches('/').trim().to_string();
    }

    let inner = text
        .strip_prefix("/**")
        .or_else(|| text.strip_prefix("/*"))
        .unwrap_or(text);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);

    inner
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            let stripped = trimmed
                .strip_prefix("* ")
                .unwrap_or_else(|| trimmed.strip_prefix('*').unwrap_or(trimmed));
            stripped.trim()
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
