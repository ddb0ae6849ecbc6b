use cbind_ast::{ChildVisit, Cursor, CursorKind, Type, TypeKind};

use crate::diagnostics::DiagnosticKind;
use crate::naming::rust_ident;
use crate::output::Output;
use crate::visitor::Visitor;

use super::{DeclarationKind, TranslationContext, Translator};

/// How deep [`holds_union`] looks through nested records.
const UNION_SEARCH_DEPTH: usize = 16;

/// Layout attributes found among a record's children.
#[derive(Debug, Default)]
struct Layout {
    packed: bool,
    align: Option<u64>,
}

impl Layout {
    fn repr(&self) -> String {
        if self.packed {
            return "#[repr(C, packed)]".to_string();
        }
        match self.align {
            Some(align) => format!("#[repr(C, align({align}))]"),
            None => "#[repr(C)]".to_string(),
        }
    }
}

impl<'tu> Translator<'tu> {
    pub(super) fn translate_record(
        &mut self,
        cursor: Cursor<'tu>,
        kind: DeclarationKind,
        output: &mut Output,
    ) -> String {
        let name = self.name_of(cursor);
        let mut ctx = TranslationContext::new(cursor, name);

        if !cursor.is_definition() {
            let mut scope = output.scope();
            self.doc_lines(cursor, &mut scope);
            scope.line("#[repr(C)]");
            scope.line(&format!("pub struct {} {{", ctx.name));
            {
                let mut body = scope.scope();
                body.line("_unused: [u8; 0],");
                body.indented();
            }
            scope.line("}");
            return scope.finish();
        }

        let mut children = Vec::new();
        Visitor::new(cursor, self.options.max_depth).visit(|child, _| {
            children.push(child);
            ChildVisit::Continue
        });

        let mut layout = Layout::default();
        let mut debug = kind == DeclarationKind::Struct;
        for &child in &children {
            match child.kind() {
                CursorKind::FieldDecl => {
                    if holds_union(child.ty(), UNION_SEARCH_DEPTH) {
                        debug = false;
                    }
                    self.record_field(&mut ctx, child);
                }
                CursorKind::StructDecl | CursorKind::UnionDecl | CursorKind::EnumDecl => {
                    self.nested_tag(&mut ctx, child);
                }
                CursorKind::PackedAttr => layout.packed = true,
                CursorKind::AlignedAttr => layout.align = child.alignment(),
                other => tracing::trace!(kind = %other, "skipped inside record"),
            }
        }

        let mut scope = output.scope();
        for hoisted in &ctx.hoisted {
            scope.text(hoisted);
            scope.line("");
        }
        self.doc_lines(cursor, &mut scope);
        scope.line(&layout.repr());
        let derives: Vec<&str> = self
            .options
            .struct_derives
            .iter()
            .map(String::as_str)
            .filter(|derive| match kind {
                DeclarationKind::Union => matches!(*derive, "Clone" | "Copy"),
                _ => debug || *derive != "Debug",
            })
            .collect();
        Self::derive_line(&derives, &mut scope);
        let keyword = if kind == DeclarationKind::Union {
            "union"
        } else {
            "struct"
        };
        if ctx.members.is_empty() {
            scope.line(&format!("pub {keyword} {} {{}}", ctx.name));
            return scope.finish();
        }
        scope.line(&format!("pub {keyword} {} {{", ctx.name));
        {
            let mut body = scope.scope();
            body.lines(&ctx.members);
            body.indented();
        }
        scope.line("}");
        scope.finish()
    }

    fn record_field(&mut self, ctx: &mut TranslationContext<'tu>, field: Cursor<'tu>) {
        if let Some(width) = field.bit_width() {
            if field.is_anonymous() {
                self.report(
                    DiagnosticKind::BitfieldLayout,
                    field,
                    format!("unnamed bit-field of width {width} in `{}` dropped", ctx.name),
                );
                return;
            }
            self.report(
                DiagnosticKind::BitfieldLayout,
                field,
                format!(
                    "`{}` is a {width}-bit field; emitted with the storage of its type",
                    field.spelling()
                ),
            );
            ctx.members.push(format!("// bitfield: {width}"));
        }
        // An anonymous struct or union member gets a generated field name.
        let name = if field.is_anonymous() {
            ctx.next_anonymous_member()
        } else {
            rust_ident(field.spelling())
        };
        let ty = self.resolve(field.ty(), field);
        ctx.members.push(format!("pub {name}: {ty},"));
    }

    /// Translate a tag declared inside a record and hoist its text in
    /// front of the record.
    fn nested_tag(&mut self, ctx: &mut TranslationContext<'tu>, tag: Cursor<'tu>) {
        if self.nesting >= self.options.max_depth {
            self.report(
                DiagnosticKind::DepthLimit,
                tag,
                format!(
                    "declarations nested deeper than {} in `{}` skipped",
                    self.options.max_depth, ctx.name
                ),
            );
            return;
        }
        self.nesting += 1;
        let text = self.translate_declaration(tag, ctx.cursor);
        self.nesting -= 1;
        if !text.is_empty() {
            ctx.hoisted.push(text);
        }
    }
}

/// Whether a value of `ty` contains a union, which rules out `Debug`.
fn holds_union(ty: Type<'_>, depth: usize) -> bool {
    if depth == 0 {
        return false;
    }
    match ty.kind() {
        kind if kind.is_array() => ty
            .element_type()
            .is_some_and(|element| holds_union(element, depth - 1)),
        TypeKind::Typedef => ty
            .declaration()
            .is_some_and(|decl| holds_union(decl.typedef_underlying_type(), depth - 1)),
        TypeKind::Record => ty
            .declaration()
            .is_some_and(|decl| record_holds_union(decl, depth - 1)),
        _ => false,
    }
}

fn record_holds_union(record: Cursor<'_>, depth: usize) -> bool {
    let Some(definition) = record.definition() else {
        return false;
    };
    definition.kind() == CursorKind::UnionDecl
        || definition
            .children()
            .filter(|child| child.kind() == CursorKind::FieldDecl)
            .any(|field| holds_union(field.ty(), depth))
}
