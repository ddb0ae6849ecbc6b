//! Declarators: building types inside-out from `*`, `[]` and `()`.

use ast_grep_core::Node;

use crate::ty::TypeKind;
use crate::unit::{NodeId, TypeId};

use super::Lowering;
use super::const_eval;

/// A declarator applied to a base type.
pub(super) struct Declared<'r, D: ast_grep_core::Doc> {
    /// Identifier the declarator names, if any.
    pub(super) name: Option<Node<'r, D>>,
    pub(super) ty: TypeId,
    /// Parameters of the function declarator that produced a function type.
    pub(super) params: Option<Params<'r, D>>,
    pub(super) init: Option<Node<'r, D>>,
    /// `__attribute__` specifiers written on function declarators.
    pub(super) attributes: Vec<Node<'r, D>>,
}

impl<D: ast_grep_core::Doc> Declared<'_, D> {
    pub(super) fn name_text(&self) -> String {
        self.name
            .as_ref()
            .map_or_else(String::new, |n| n.text().to_string())
    }
}

pub(super) struct Params<'r, D: ast_grep_core::Doc> {
    pub(super) entries: Vec<Param<'r, D>>,
    pub(super) variadic: bool,
    /// `false` for `f()`, which says nothing about the parameters.
    pub(super) prototype: bool,
}

pub(super) struct Param<'r, D: ast_grep_core::Doc> {
    pub(super) name: String,
    pub(super) ty: TypeId,
    pub(super) node: Node<'r, D>,
    pub(super) name_node: Option<Node<'r, D>>,
}

/// Node kinds that can appear in declarator position.
pub(super) fn is_declarator_kind(kind: &str) -> bool {
    matches!(
        kind,
        "identifier"
            | "field_identifier"
            | "type_identifier"
            | "primitive_type"
            | "init_declarator"
            | "pointer_declarator"
            | "array_declarator"
            | "function_declarator"
            | "parenthesized_declarator"
            | "attributed_declarator"
            | "abstract_pointer_declarator"
            | "abstract_array_declarator"
            | "abstract_function_declarator"
            | "abstract_parenthesized_declarator"
    )
}

/// Every declarator of a declaration-like node.
///
/// The `type` field can itself be an identifier-like node, so it is
/// excluded by source range rather than by kind.
pub(super) fn declarators_of<'r, D: ast_grep_core::Doc>(node: &Node<'r, D>) -> Vec<Node<'r, D>> {
    let type_range = node.field("type").map(|ty| ty.range());
    node.children()
        .filter(|child| is_declarator_kind(&child.kind()))
        .filter(|child| Some(child.range()) != type_range)
        .collect()
}

impl Lowering {
    /// Apply `declarator` to `base`, outermost constructor first.
    pub(super) fn declarator<'r, D: ast_grep_core::Doc>(
        &mut self,
        base: TypeId,
        declarator: Node<'r, D>,
        parent: NodeId,
    ) -> Declared<'r, D> {
        let mut declared = Declared {
            name: None,
            ty: base,
            params: None,
            init: None,
            attributes: Vec::new(),
        };
        let mut current = Some(declarator);
        while let Some(node) = current.take() {
            match node.kind().as_ref() {
                "identifier" | "field_identifier" | "type_identifier" | "primitive_type" => {
                    declared.name = Some(node);
                }
                "init_declarator" => {
                    declared.init = node.field("value");
                    current = node.field("declarator");
                }
                "pointer_declarator" | "abstract_pointer_declarator" => {
                    let mut ty = self.builder.pointer(declared.ty);
                    if has_const_qualifier(&node) {
                        ty = self.builder.qualified_const(ty);
                    }
                    declared.ty = ty;
                    current = node.field("declarator");
                }
                "array_declarator" | "abstract_array_declarator" => {
                    declared.ty = self.array_type(declared.ty, node.field("size").as_ref());
                    current = node.field("declarator");
                }
                "function_declarator" | "abstract_function_declarator" => {
                    let params = node.field("parameters").map_or_else(
                        || Params {
                            entries: Vec::new(),
                            variadic: false,
                            prototype: false,
                        },
                        |list| self.parameters(&list, parent),
                    );
                    declared.ty = self.function_type(declared.ty, &params);
                    declared.params = Some(params);
                    declared.attributes.extend(
                        node.children()
                            .filter(|c| c.kind().as_ref() == "attribute_specifier"),
                    );
                    current = node.field("declarator");
                }
                "parenthesized_declarator"
                | "abstract_parenthesized_declarator"
                | "attributed_declarator" => {
                    current = node.children().find(|c| is_declarator_kind(&c.kind()));
                }
                _ => {}
            }
        }
        declared
    }

    fn array_type<D: ast_grep_core::Doc>(
        &mut self,
        element: TypeId,
        size: Option<&Node<D>>,
    ) -> TypeId {
        let Some(size) = size else {
            return self.builder.incomplete_array(element);
        };
        match const_eval::fold(size, &self.env).and_then(|f| u64::try_from(f.value).ok()) {
            Some(length) => self.builder.constant_array(element, length),
            None => self.builder.variable_array(element, &size.text()),
        }
    }

    fn function_type<D: ast_grep_core::Doc>(
        &mut self,
        result: TypeId,
        params: &Params<'_, D>,
    ) -> TypeId {
        if params.prototype {
            let args = params.entries.iter().map(|p| p.ty).collect();
            self.builder.function(result, args, params.variadic)
        } else {
            self.builder.function_no_proto(result)
        }
    }

    /// Lower a `parameter_list`; parameter types are adjusted the way C
    /// adjusts them (arrays and functions decay to pointers).
    pub(super) fn parameters<'r, D: ast_grep_core::Doc>(
        &mut self,
        list: &Node<'r, D>,
        parent: NodeId,
    ) -> Params<'r, D> {
        let mut params = Params {
            entries: Vec::new(),
            variadic: false,
            prototype: false,
        };
        for child in list.children() {
            match child.kind().as_ref() {
                "parameter_declaration" => {
                    params.prototype = true;
                    let base = self.specified_type(&child, parent);
                    let (name_node, ty) = match child.field("declarator") {
                        Some(declarator) => {
                            let declared = self.declarator(base, declarator, parent);
                            (declared.name, declared.ty)
                        }
                        None => (None, base),
                    };
                    let ty = self.decay(ty);
                    params.entries.push(Param {
                        name: name_node
                            .as_ref()
                            .map_or_else(String::new, |n| n.text().to_string()),
                        ty,
                        node: child,
                        name_node,
                    });
                }
                "variadic_parameter" | "..." => {
                    params.prototype = true;
                    params.variadic = true;
                }
                _ => {}
            }
        }
        // `(void)` declares no parameters.
        if let [only] = params.entries.as_slice()
            && only.name.is_empty()
            && self.builder.type_kind(only.ty) == TypeKind::Void
        {
            params.entries.clear();
        }
        params
    }

    fn decay(&mut self, ty: TypeId) -> TypeId {
        let kind = self.builder.type_kind(ty);
        if kind.is_array() {
            let element = self.builder.type_inner(ty).unwrap_or(ty);
            self.builder.pointer(element)
        } else if kind.is_function() {
            self.builder.pointer(ty)
        } else {
            ty
        }
    }
}

pub(super) fn has_const_qualifier<D: ast_grep_core::Doc>(node: &Node<D>) -> bool {
    node.children()
        .any(|c| c.kind().as_ref() == "type_qualifier" && c.text().as_ref() == "const")
}
