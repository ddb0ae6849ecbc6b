//! Type specifiers and qualifiers.

use ast_grep_core::Node;

use crate::kind::CursorKind;
use crate::unit::{NodeId, StorageClass, TypeId};

use super::const_eval::builtin_kind;
use super::declarators::has_const_qualifier;
use super::{Lowering, Namespace, TagUse};

impl Lowering {
    /// Type named by the specifiers of a declaration-like node, with
    /// `const` applied.
    pub(super) fn specified_type<D: ast_grep_core::Doc>(
        &mut self,
        node: &Node<D>,
        parent: NodeId,
    ) -> TypeId {
        let base = match node.field("type") {
            Some(ty) => self.type_specifier(&ty, parent, TagUse::Reference),
            // Implicit int.
            None => self.builtin(crate::TypeKind::Int),
        };
        if has_const_qualifier(node) {
            self.builder.qualified_const(base)
        } else {
            base
        }
    }

    pub(super) fn type_specifier<D: ast_grep_core::Doc>(
        &mut self,
        node: &Node<D>,
        parent: NodeId,
        tag_use: TagUse,
    ) -> TypeId {
        let text = node.text();
        match node.kind().as_ref() {
            "primitive_type" => match builtin_kind(&text) {
                Some(kind) => self.builtin(kind),
                // `size_t`, `uint32_t` and friends are primitive to the grammar.
                None => self.named_type(&text),
            },
            "sized_type_specifier" => {
                let words: Vec<String> = node
                    .children()
                    .filter(|c| c.kind().as_ref() != "comment")
                    .map(|c| c.text().to_string())
                    .collect();
                match builtin_kind(&words.join(" ")) {
                    Some(kind) => self.builtin(kind),
                    None => self.builder.unexposed(&text),
                }
            }
            "type_identifier" => self.named_type(&text),
            "struct_specifier" | "union_specifier" | "enum_specifier" => {
                self.tag_specifier(node, parent, tag_use)
            }
            _ => self.builder.unexposed(&text),
        }
    }

    /// Type of a typedef name, declared in this unit or not.
    fn named_type(&mut self, name: &str) -> TypeId {
        if let Some(ty) = self.typedefs.get(name) {
            return *ty;
        }
        if let Some(ty) = self.external_typedefs.get(name) {
            return *ty;
        }
        // `_Bool` reaches here as a type identifier.
        if let Some(kind) = builtin_kind(name) {
            return self.builtin(kind);
        }
        let ty = self.builder.external_typedef(name);
        self.external_typedefs.insert(name.to_string(), ty);
        ty
    }

    /// Lower a `struct`/`union`/`enum` specifier and return its type.
    ///
    /// Specifiers with a body always declare (and define) the tag. Named
    /// specifiers without a body either declare it (`struct S;`) or refer
    /// to it; a reference to a tag never seen before creates an implicit
    /// forward declaration at file scope.
    pub(super) fn tag_specifier<D: ast_grep_core::Doc>(
        &mut self,
        node: &Node<D>,
        parent: NodeId,
        tag_use: TagUse,
    ) -> TypeId {
        let (kind, namespace) = match node.kind().as_ref() {
            "struct_specifier" => (CursorKind::StructDecl, Namespace::Struct),
            "union_specifier" => (CursorKind::UnionDecl, Namespace::Union),
            _ => (CursorKind::EnumDecl, Namespace::Enum),
        };
        let name = node
            .field("name")
            .map_or_else(String::new, |n| n.text().to_string());
        let body = node.field("body");

        if body.is_none() && !name.is_empty() && tag_use == TagUse::Reference {
            if let Some(ty) = self.entity_type(namespace, &name) {
                return ty;
            }
            let id = self.add_node(NodeId::ROOT, kind, &name, node);
            self.builder.set_implicit(id);
            let ty = self.declare_tag(namespace, kind, &name, id, false);
            self.default_enum_integer(kind, id);
            return ty;
        }

        let id = self.add_node(parent, kind, &name, node);
        let ty = self.declare_tag(namespace, kind, &name, id, body.is_some());
        self.lower_attributes(id, node);
        match body {
            Some(body) => {
                self.builder.set_is_definition(id, true);
                if kind == CursorKind::EnumDecl {
                    self.lower_enum(id, node, &body, parent);
                } else {
                    self.lower_record(id, &body);
                }
            }
            None => self.default_enum_integer(kind, id),
        }
        ty
    }

    fn declare_tag(
        &mut self,
        namespace: Namespace,
        kind: CursorKind,
        name: &str,
        id: NodeId,
        is_definition: bool,
    ) -> TypeId {
        let existing = if name.is_empty() {
            None
        } else {
            self.redeclare(namespace, name, id, is_definition)
        };
        let ty = existing.unwrap_or_else(|| {
            let ty = if kind == CursorKind::EnumDecl {
                self.builder.enumeration(id)
            } else {
                self.builder.record(id)
            };
            if !name.is_empty() {
                self.set_entity_type(namespace, name, ty);
            }
            ty
        });
        self.builder.set_type(id, ty);
        ty
    }

    fn default_enum_integer(&mut self, kind: CursorKind, id: NodeId) {
        if kind == CursorKind::EnumDecl {
            let integer = self.builtin(crate::TypeKind::UInt);
            self.builder.set_underlying_type(id, integer);
        }
    }
}

/// Storage class written among the specifiers of `node`.
pub(super) fn storage_class<D: ast_grep_core::Doc>(node: &Node<D>) -> StorageClass {
    node.children()
        .filter(|c| c.kind().as_ref() == "storage_class_specifier")
        .find_map(|c| match c.text().as_ref() {
            "extern" => Some(StorageClass::Extern),
            "static" => Some(StorageClass::Static),
            "register" => Some(StorageClass::Register),
            _ => None,
        })
        .unwrap_or_default()
}
