use std::collections::HashMap;

use cbind_ast::{ChildVisit, Cursor, CursorKind, Type, TypeKind};

use crate::diagnostics::DiagnosticKind;
use crate::naming::rust_ident;
use crate::output::Output;
use crate::types::well_known_typedef;
use crate::visitor::Visitor;

use super::{TranslationContext, Translator};

impl<'tu> Translator<'tu> {
    pub(super) fn translate_enum(&mut self, cursor: Cursor<'tu>, output: &mut Output) -> String {
        let name = self.name_of(cursor);
        let mut ctx = TranslationContext::new(cursor, name);
        let integer = cursor.enum_integer_type();
        let repr = repr_of(integer);

        let mut scope = output.scope();
        self.doc_lines(cursor, &mut scope);

        let constants = enum_constants(cursor, self.options.max_depth);
        if constants.is_empty() {
            // Declared but never defined here, or defined without members.
            let ty = self.resolve(integer, cursor);
            scope.line(&format!("pub type {} = {ty};", ctx.name));
            return scope.finish();
        }
        self.enum_members(&mut ctx, &constants, repr.starts_with('u'));

        scope.line(&format!("#[repr({repr})]"));
        Self::derive_line(&self.options.enum_derives, &mut scope);
        scope.line(&format!("pub enum {} {{", ctx.name));
        {
            let mut body = scope.scope();
            body.lines(&ctx.members);
            body.indented();
        }
        scope.line("}");
        if !ctx.aliases.is_empty() {
            scope.line("");
            scope.line(&format!("impl {} {{", ctx.name));
            {
                let mut body = scope.scope();
                body.lines(&ctx.aliases);
                body.indented();
            }
            scope.line("}");
        }
        scope.finish()
    }

    /// One `NAME = value,` line per constant. A constant whose value was
    /// already taken becomes an associated const naming the first one.
    fn enum_members(
        &mut self,
        ctx: &mut TranslationContext<'tu>,
        constants: &[Cursor<'tu>],
        unsigned: bool,
    ) {
        let mut taken: HashMap<String, String> = HashMap::new();
        for &constant in constants {
            let variant = rust_ident(constant.spelling());
            let value = self.enum_value(constant, unsigned);
            if let Some(first) = taken.get(&value) {
                ctx.aliases.push(format!(
                    "pub const {variant}: {name} = {name}::{first};",
                    name = ctx.name
                ));
                continue;
            }
            ctx.members.push(format!("{variant} = {value},"));
            taken.insert(value, variant);
        }
    }

    /// The folded value, or the source text of the value expression when
    /// the constant did not fold.
    fn enum_value(&mut self, constant: Cursor<'tu>, unsigned: bool) -> String {
        let folded = if unsigned {
            constant.enum_constant_unsigned_value().map(|v| v.to_string())
        } else {
            constant.enum_constant_value().map(|v| v.to_string())
        };
        if let Some(value) = folded {
            return value;
        }
        let text = constant.value_text().unwrap_or("0").to_string();
        self.report(
            DiagnosticKind::UnfoldableConstant,
            constant,
            format!(
                "`{}` has no constant value; emitted `{text}` as written",
                constant.spelling()
            ),
        );
        text
    }
}

fn enum_constants(cursor: Cursor<'_>, max_depth: usize) -> Vec<Cursor<'_>> {
    let mut constants = Vec::new();
    Visitor::new(cursor, max_depth).visit(|child, _| {
        if child.kind() == CursorKind::EnumConstantDecl {
            constants.push(child);
        }
        ChildVisit::Continue
    });
    constants
}

/// Primitive integer named in `#[repr(...)]` for an enum's integer type.
fn repr_of(ty: Type<'_>) -> &'static str {
    match ty.kind() {
        TypeKind::CharS | TypeKind::SChar => "i8",
        TypeKind::UChar | TypeKind::Bool => "u8",
        TypeKind::Short => "i16",
        TypeKind::UShort => "u16",
        TypeKind::Int => "i32",
        TypeKind::Long | TypeKind::LongLong => "i64",
        TypeKind::ULong | TypeKind::ULongLong => "u64",
        TypeKind::Int128 => "i128",
        TypeKind::UInt128 => "u128",
        TypeKind::Typedef => match ty.declaration() {
            Some(decl) => repr_of(decl.typedef_underlying_type()),
            None => well_known_typedef(ty.spelling()).unwrap_or("u32"),
        },
        _ => "u32",
    }
}
