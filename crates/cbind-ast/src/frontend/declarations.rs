//! Declarations, function definitions and typedefs.

use ast_grep_core::Node;

use crate::kind::CursorKind;
use crate::unit::{NodeId, StorageClass};

use super::declarators::{Declared, declarators_of};
use super::specifiers::storage_class;
use super::{Lowering, Namespace, TagUse};

impl Lowering {
    pub(super) fn lower_declaration<D: ast_grep_core::Doc>(
        &mut self,
        node: &Node<D>,
        parent: NodeId,
    ) {
        let declarators = declarators_of(node);
        if declarators.is_empty() {
            if let Some(ty) = node.field("type") {
                self.type_specifier(&ty, parent, TagUse::Declaration);
            }
            return;
        }

        let base = self.specified_type(node, parent);
        let storage = storage_class(node);
        for declarator in declarators {
            let declared = self.declarator(base, declarator, parent);
            if self.builder.type_kind(declared.ty).is_function() {
                self.add_function(parent, node, declared, storage, None);
            } else {
                self.add_variable(parent, node, &declared, storage);
            }
        }
    }

    pub(super) fn lower_function_definition<D: ast_grep_core::Doc>(
        &mut self,
        node: &Node<D>,
        parent: NodeId,
    ) {
        let Some(declarator) = node.field("declarator") else {
            return;
        };
        let base = self.specified_type(node, parent);
        let declared = self.declarator(base, declarator, parent);
        if !self.builder.type_kind(declared.ty).is_function() {
            tracing::debug!(text = %node.text(), "function body without a function declarator");
            return;
        }
        let storage = storage_class(node);
        self.add_function(parent, node, declared, storage, node.field("body"));
    }

    fn add_function<'r, D: ast_grep_core::Doc>(
        &mut self,
        parent: NodeId,
        node: &Node<'r, D>,
        declared: Declared<'r, D>,
        storage: StorageClass,
        body: Option<Node<'r, D>>,
    ) {
        let name = declared.name_text();
        let id = self.builder.add(parent, CursorKind::FunctionDecl, name.as_str());
        match &declared.name {
            Some(at) => self.place(id, at, node),
            None => self.place(id, node, node),
        }
        self.builder.set_type(id, declared.ty);
        self.builder.set_storage(id, storage);

        if let Some(params) = &declared.params {
            for param in &params.entries {
                let parm = self.builder.add(id, CursorKind::ParmDecl, param.name.as_str());
                match &param.name_node {
                    Some(at) => self.place(parm, at, &param.node),
                    None => self.place(parm, &param.node, &param.node),
                }
                self.builder.set_type(parm, param.ty);
            }
        }

        self.lower_attributes(id, node);
        for attribute in &declared.attributes {
            self.lower_attribute_specifier(id, attribute);
        }

        let is_definition = body.is_some();
        if let Some(body) = body {
            self.builder.set_is_definition(id, true);
            self.add_node(id, CursorKind::CompoundStmt, "", &body);
        }
        self.redeclare(Namespace::Ordinary, &name, id, is_definition);
    }

    fn add_variable<D: ast_grep_core::Doc>(
        &mut self,
        parent: NodeId,
        node: &Node<D>,
        declared: &Declared<'_, D>,
        storage: StorageClass,
    ) {
        let name = declared.name_text();
        let id = self.builder.add(parent, CursorKind::VarDecl, name.as_str());
        match &declared.name {
            Some(at) => self.place(id, at, node),
            None => self.place(id, node, node),
        }
        self.builder.set_type(id, declared.ty);
        self.builder.set_storage(id, storage);
        self.lower_attributes(id, node);

        // Without `extern`, a file-scope declaration is a (tentative) definition.
        let is_definition = storage != StorageClass::Extern || declared.init.is_some();
        self.builder.set_is_definition(id, is_definition);
        if let Some(init) = &declared.init {
            self.lower_expression(id, init);
        }
        self.redeclare(Namespace::Ordinary, &name, id, is_definition);
    }

    pub(super) fn lower_type_definition<D: ast_grep_core::Doc>(
        &mut self,
        node: &Node<D>,
        parent: NodeId,
    ) {
        let before = self.builder.unit().len();
        let base = self.specified_type(node, parent);
        // `typedef struct { ... } name;` gives the anonymous tag its name.
        let anonymous_tag = self
            .builder
            .type_declaration(base)
            .filter(|tag| tag.index() >= before && self.builder.spelling_of(*tag).is_empty());

        for declarator in declarators_of(node) {
            let declared = self.declarator(base, declarator, parent);
            let Some(name_node) = &declared.name else {
                continue;
            };
            let name = name_node.text().to_string();
            let id = self.builder.add(parent, CursorKind::TypedefDecl, name.as_str());
            self.place(id, name_node, node);
            self.builder.set_underlying_type(id, declared.ty);
            let ty = self
                .redeclare(Namespace::Ordinary, &name, id, false)
                .unwrap_or_else(|| self.builder.typedef(id));
            self.set_entity_type(Namespace::Ordinary, &name, ty);
            self.builder.set_type(id, ty);
            self.typedefs.entry(name).or_insert(ty);

            if declared.ty == base
                && let Some(tag) = anonymous_tag
                && !self.builder.has_typedef_name(tag)
            {
                self.builder.set_typedef_name(tag, id);
            }
        }
    }

    /// `_Static_assert(...)` at file scope; other expression statements
    /// are not declarations and are ignored.
    pub(super) fn lower_static_assert<D: ast_grep_core::Doc>(
        &mut self,
        node: &Node<D>,
        parent: NodeId,
    ) {
        let assert_call = if node.kind().as_ref() == "static_assert_declaration" {
            Some(node.clone())
        } else {
            node.children().find(|c| {
                c.kind().as_ref() == "call_expression"
                    && c.field("function").is_some_and(|f| {
                        matches!(f.text().as_ref(), "_Static_assert" | "static_assert")
                    })
            })
        };
        let Some(call) = assert_call else {
            return;
        };
        let id = self.add_node(parent, CursorKind::StaticAssert, "", node);
        let arguments = call
            .field("arguments")
            .map_or_else(Vec::new, |args| args.children().collect());
        let condition = call
            .field("condition")
            .or_else(|| {
                arguments
                    .into_iter()
                    .find(|a| !matches!(a.kind().as_ref(), "(" | ")" | ","))
            });
        if let Some(condition) = condition {
            self.lower_expression(id, &condition);
        }
    }
}
