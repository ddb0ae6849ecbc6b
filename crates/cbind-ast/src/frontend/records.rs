//! Record fields, enumerators and attributes.

use ast_grep_core::Node;

use crate::kind::CursorKind;
use crate::ty::TypeKind;
use crate::unit::NodeId;

use super::const_eval::{self, Folded};
use super::declarators::declarators_of;
use super::{Lowering, TagUse};

/// Value assignment state while walking an enumerator list.
enum Previous {
    Start,
    Value(i128),
    /// The last explicit value did not fold; successors count from its text.
    Text { base: String, offset: u64 },
}

impl Previous {
    fn implicit(&mut self) -> (Option<i128>, Option<String>) {
        match self {
            Self::Start => {
                *self = Self::Value(0);
                (Some(0), None)
            }
            Self::Value(value) => {
                *value += 1;
                (Some(*value), None)
            }
            Self::Text { base, offset } => {
                *offset += 1;
                (None, Some(format!("{base} + {offset}")))
            }
        }
    }

    fn explicit(&mut self, value: Option<i128>, text: &str) {
        *self = match value {
            Some(value) => Self::Value(value),
            None if text.chars().all(|c| c.is_alphanumeric() || c == '_') => Self::Text {
                base: text.to_string(),
                offset: 0,
            },
            None => Self::Text {
                base: format!("({text})"),
                offset: 0,
            },
        };
    }
}

impl Lowering {
    pub(super) fn lower_record<D: ast_grep_core::Doc>(&mut self, record: NodeId, body: &Node<D>) {
        let items: Vec<_> = body.children().collect();
        self.record_items(record, &items);
    }

    fn record_items<D: ast_grep_core::Doc>(&mut self, record: NodeId, items: &[Node<D>]) {
        for item in items {
            match item.kind().as_ref() {
                "field_declaration" => self.lower_field(record, item),
                "preproc_if" | "preproc_ifdef" => {
                    let branch = self.select_branch(item);
                    self.record_items(record, &branch);
                }
                _ => {}
            }
        }
    }

    fn lower_field<D: ast_grep_core::Doc>(&mut self, record: NodeId, decl: &Node<D>) {
        let before = self.builder.unit().len();
        let base = self.specified_type(decl, record);
        let width = decl
            .children()
            .find(|c| c.kind().as_ref() == "bitfield_clause")
            .and_then(|clause| {
                clause
                    .children()
                    .find(|c| c.kind().as_ref() != ":")
                    .and_then(|expr| const_eval::fold(&expr, &self.env))
            })
            .and_then(|folded| u32::try_from(folded.value).ok());

        let declarators = declarators_of(decl);
        if declarators.is_empty() {
            // An anonymous struct/union member defined right here, or an
            // unnamed bit-field used for padding.
            let anonymous_member = self.builder.type_declaration(base).is_some_and(|tag| {
                tag.index() >= before && self.builder.spelling_of(tag).is_empty()
            });
            if anonymous_member || width.is_some() {
                let id = self.add_node(record, CursorKind::FieldDecl, "", decl);
                self.builder.set_type(id, base);
                if let Some(width) = width {
                    self.builder.set_bit_width(id, width);
                }
            }
            return;
        }

        for declarator in declarators {
            let declared = self.declarator(base, declarator, record);
            let name = declared.name_text();
            let id = self.builder.add(record, CursorKind::FieldDecl, name.as_str());
            match &declared.name {
                Some(at) => self.place(id, at, decl),
                None => self.place(id, decl, decl),
            }
            self.builder.set_type(id, declared.ty);
            if let Some(width) = width {
                self.builder.set_bit_width(id, width);
            }
            self.lower_attributes(id, decl);
        }
    }

    pub(super) fn lower_enum<D: ast_grep_core::Doc>(
        &mut self,
        decl: NodeId,
        specifier: &Node<D>,
        body: &Node<D>,
        parent: NodeId,
    ) {
        let items: Vec<_> = body.children().collect();
        let mut previous = Previous::Start;
        let mut values = Vec::new();
        self.enumerator_items(decl, &items, &mut previous, &mut values);

        let integer = match specifier.field("underlying_type") {
            Some(ty) => self.type_specifier(&ty, parent, TagUse::Reference),
            None => self.builtin(enum_integer_kind(&values)),
        };
        self.builder.set_underlying_type(decl, integer);
    }

    fn enumerator_items<D: ast_grep_core::Doc>(
        &mut self,
        decl: NodeId,
        items: &[Node<D>],
        previous: &mut Previous,
        values: &mut Vec<i128>,
    ) {
        for item in items {
            match item.kind().as_ref() {
                "enumerator" => {
                    if let Some(value) = self.lower_enumerator(decl, item, previous) {
                        values.push(value);
                    }
                }
                "preproc_if" | "preproc_ifdef" => {
                    let branch = self.select_branch(item);
                    self.enumerator_items(decl, &branch, previous, values);
                }
                _ => {}
            }
        }
    }

    fn lower_enumerator<D: ast_grep_core::Doc>(
        &mut self,
        decl: NodeId,
        enumerator: &Node<D>,
        previous: &mut Previous,
    ) -> Option<i128> {
        let name = enumerator
            .field("name")
            .map_or_else(String::new, |n| n.text().to_string());
        let id = self.add_node(decl, CursorKind::EnumConstantDecl, &name, enumerator);
        let int = self.builtin(TypeKind::Int);
        self.builder.set_type(id, int);

        let (value, text) = match enumerator.field("value") {
            Some(expr) => {
                let value = const_eval::fold(&expr, &self.env).map(|f| f.value);
                let text = expr.text().to_string();
                previous.explicit(value, &text);
                self.lower_expression(id, &expr);
                (value, Some(text))
            }
            None => previous.implicit(),
        };
        if value.is_none() {
            tracing::debug!(enumerator = %name, "enumerator value does not fold");
        }
        self.builder.set_value(id, value, text);
        if let Some(value) = value {
            self.env.set(&name, enumerator_constant(value));
        }
        self.enumerators.insert(name, id);
        value
    }

    /// Lower the `__attribute__((...))` specifiers written on `node`.
    pub(super) fn lower_attributes<D: ast_grep_core::Doc>(
        &mut self,
        owner: NodeId,
        node: &Node<D>,
    ) {
        for spec in node.children() {
            match spec.kind().as_ref() {
                "attribute_specifier" => self.lower_attribute_specifier(owner, &spec),
                "attribute_declaration" => {
                    let text = spec.text().to_string();
                    self.add_node(owner, CursorKind::UnexposedAttr, &text, &spec);
                }
                _ => {}
            }
        }
    }

    pub(super) fn lower_attribute_specifier<D: ast_grep_core::Doc>(
        &mut self,
        owner: NodeId,
        spec: &Node<D>,
    ) {
        let Some(arguments) = spec
            .children()
            .find(|c| c.kind().as_ref() == "argument_list")
        else {
            return;
        };
        for attribute in arguments.children() {
            match attribute.kind().as_ref() {
                "identifier" => {
                    let name = attribute_name(&attribute.text());
                    match name.as_str() {
                        "packed" => {
                            self.add_node(owner, CursorKind::PackedAttr, &name, &attribute);
                        }
                        "aligned" => {
                            // A bare `aligned` asks for the target's largest alignment.
                            let id =
                                self.add_node(owner, CursorKind::AlignedAttr, &name, &attribute);
                            self.builder.set_value(id, Some(16), None);
                        }
                        _ => {
                            self.add_node(owner, CursorKind::UnexposedAttr, &name, &attribute);
                        }
                    }
                }
                "call_expression" => {
                    let name = attribute
                        .field("function")
                        .map_or_else(String::new, |f| attribute_name(&f.text()));
                    if name == "aligned" {
                        let id = self.add_node(owner, CursorKind::AlignedAttr, &name, &attribute);
                        let argument = attribute.field("arguments").and_then(|args| {
                            args.children()
                                .find(|c| !matches!(c.kind().as_ref(), "(" | ")" | ","))
                        });
                        let value = argument
                            .as_ref()
                            .and_then(|arg| const_eval::fold(arg, &self.env))
                            .map(|f| f.value);
                        let text = argument.map(|arg| arg.text().to_string());
                        self.builder.set_value(id, value, text);
                    } else {
                        self.add_node(owner, CursorKind::UnexposedAttr, &name, &attribute);
                    }
                }
                _ => {}
            }
        }
    }
}

/// `__packed__` and `packed` name the same attribute.
fn attribute_name(text: &str) -> String {
    text.trim()
        .trim_start_matches("__")
        .trim_end_matches("__")
        .to_string()
}

fn enumerator_constant(value: i128) -> Folded {
    if i32::try_from(value).is_ok() {
        Folded::int(value)
    } else if i64::try_from(value).is_ok() {
        Folded::new(value, false, 64)
    } else {
        Folded::new(value, true, 64)
    }
}

/// Integer type a compiler picks for an enum with these values.
fn enum_integer_kind(values: &[i128]) -> TypeKind {
    let min = values.iter().copied().min().unwrap_or(0);
    let max = values.iter().copied().max().unwrap_or(0);
    if min < 0 {
        if min >= i128::from(i32::MIN) && max <= i128::from(i32::MAX) {
            TypeKind::Int
        } else {
            TypeKind::Long
        }
    } else if max <= i128::from(u32::MAX) {
        TypeKind::UInt
    } else {
        TypeKind::ULong
    }
}
