//! The declaration translator.
//!
//! [`Translator::translate_declaration`] is a closed dispatcher: the cursor
//! kind selects one [`DeclarationKind`], and each kind has one handler.
//! Every handler follows the same steps. It names the declaration, opens
//! an [`Output`] scope and a [`TranslationContext`], collects the member
//! cursors it cares about while skipping all others, then closes the scope
//! and returns the assembled text.

mod context;
mod enums;
mod functions;
mod macros;
mod records;
mod typedefs;
mod variables;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use cbind_ast::{Cursor, CursorKind, TranslationUnit, Type};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::TranslateError;
use crate::naming::NameTable;
use crate::options::TranslateOptions;
use crate::output::{Output, Scope};
use crate::types::{ResolvedType, TypeResolver};
use crate::visitor::Visitor;

pub(crate) use context::TranslationContext;

/// The declaration kinds that produce Rust items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Enum,
    Struct,
    Union,
    Function,
    Typedef,
    Variable,
    Macro,
}

impl DeclarationKind {
    /// Handler for a cursor kind; `None` for kinds that are never emitted.
    #[must_use]
    pub const fn of(kind: CursorKind) -> Option<Self> {
        Some(match kind {
            CursorKind::EnumDecl => Self::Enum,
            CursorKind::StructDecl => Self::Struct,
            CursorKind::UnionDecl => Self::Union,
            CursorKind::FunctionDecl => Self::Function,
            CursorKind::TypedefDecl => Self::Typedef,
            CursorKind::VarDecl => Self::Variable,
            CursorKind::MacroDefinition => Self::Macro,
            _ => return None,
        })
    }
}

/// One translation run over a unit.
///
/// The run owns everything that must stay consistent across declarations:
/// the names handed out so far and the diagnostics recorded.
pub struct Translator<'tu> {
    unit: &'tu TranslationUnit,
    options: TranslateOptions,
    names: NameTable<'tu>,
    diagnostics: Vec<Diagnostic>,
    reported: HashSet<(DiagnosticKind, String, String)>,
    /// Records currently being translated, outermost first.
    nesting: usize,
}

impl<'tu> Translator<'tu> {
    #[must_use]
    pub fn new(unit: &'tu TranslationUnit, options: TranslateOptions) -> Self {
        let mut names = NameTable::new(options.anonymous_naming, &options.anonymous_prefix);
        names.reserve(unit.cursor(), options.emit_macros);
        let renamed = names.renamed().to_vec();
        let mut translator = Self {
            unit,
            options,
            names,
            diagnostics: Vec::new(),
            reported: HashSet::new(),
            nesting: 0,
        };
        for (cursor, name) in renamed {
            translator.report(
                DiagnosticKind::NameCollision,
                cursor,
                format!("`{}` is already taken; emitted as `{name}`", cursor.spelling()),
            );
        }
        translator
    }

    #[must_use]
    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Rust text for one declaration, empty when it produces nothing.
    ///
    /// Declarations directly under the unit are emitted once per entity:
    /// at the definition when there is one, otherwise at the first
    /// declaration. Declarations nested in a record are always translated;
    /// the record hoists them in front of itself.
    pub fn translate_declaration(&mut self, cursor: Cursor<'tu>, parent: Cursor<'tu>) -> String {
        let Some(kind) = DeclarationKind::of(cursor.kind()) else {
            tracing::debug!(kind = %cursor.kind(), "no translation for cursor kind");
            return String::new();
        };
        if !parent.kind().is_tag() && !is_emission_site(cursor) {
            return String::new();
        }
        let mut output = Output::new(self.options.indent_width);
        match kind {
            DeclarationKind::Enum => self.translate_enum(cursor, &mut output),
            DeclarationKind::Struct | DeclarationKind::Union => {
                self.translate_record(cursor, kind, &mut output)
            }
            DeclarationKind::Function => self.translate_function(cursor, &mut output),
            DeclarationKind::Typedef => self.translate_typedef(cursor, &mut output),
            DeclarationKind::Variable => self.translate_variable(cursor, &mut output),
            DeclarationKind::Macro => self.translate_macro(cursor, &mut output),
        }
    }

    /// Rust text for every declaration directly under the unit.
    pub fn translate_unit(&mut self) -> String {
        let unit = self.unit;
        if let Some(first) = unit.first_error() {
            self.report_at(
                DiagnosticKind::ParseErrors,
                first.to_string(),
                format!("{} syntax error(s) skipped", unit.error_count()),
            );
        }

        let mut output = Output::new(self.options.indent_width);
        if self.options.header_comment {
            output.line(&format!("// Generated by cbind from `{}`.", unit.file_name()));
            output.line("");
        }
        if self.options.allow_attributes {
            output.line(
                "#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals, dead_code)]",
            );
            output.line("");
        }

        let visitor = Visitor::new(unit.cursor(), self.options.max_depth);
        let mut macros = HashSet::new();
        let mut items = Vec::new();
        for (cursor, parent) in visitor.children() {
            // A redefined macro keeps its first translation.
            if cursor.kind() == CursorKind::MacroDefinition && !macros.insert(cursor.spelling()) {
                continue;
            }
            let text = self.translate_declaration(cursor, parent);
            if !text.is_empty() {
                items.push(text);
            }
        }
        let mut text = output.into_text();
        text.push_str(&items.join("\n"));
        text
    }

    /// End the run: the diagnostics, or an error in strict mode when there
    /// are any.
    ///
    /// # Errors
    /// Returns [`TranslateError::Strict`] when `strict` is set and at least
    /// one diagnostic was recorded.
    pub fn finish(self) -> Result<Vec<Diagnostic>, TranslateError> {
        if self.options.strict
            && let Some(first) = self.diagnostics.first()
        {
            return Err(TranslateError::Strict {
                count: self.diagnostics.len(),
                first: first.to_string(),
            });
        }
        Ok(self.diagnostics)
    }

    // ── Shared helpers ─────────────────────────────────────────────

    pub(crate) fn name_of(&mut self, cursor: Cursor<'tu>) -> String {
        self.names.name_of(cursor)
    }

    fn resolver(&mut self) -> TypeResolver<'_, 'tu> {
        TypeResolver::new(&self.options.ffi_prefix, &mut self.names)
    }

    /// Rust syntax for `ty`, recording a diagnostic against `at` when it
    /// only renders as a placeholder.
    pub(crate) fn resolve(&mut self, ty: Type<'tu>, at: Cursor<'tu>) -> String {
        let resolved = self.resolver().resolve(ty);
        self.check_resolved(&resolved, at);
        resolved.to_string()
    }

    /// ` -> R` for a function result, empty for `void`.
    pub(crate) fn resolve_result(&mut self, ty: Type<'tu>, at: Cursor<'tu>) -> String {
        match self.resolver().resolve_result(ty) {
            Some(resolved) => {
                self.check_resolved(&resolved, at);
                format!(" -> {resolved}")
            }
            None => String::new(),
        }
    }

    fn check_resolved(&mut self, resolved: &ResolvedType, at: Cursor<'tu>) {
        if let ResolvedType::Unknown { spelling } = resolved {
            self.report(
                DiagnosticKind::UnresolvedType,
                at,
                format!("no Rust type for `{spelling}` in `{}`", at.spelling()),
            );
        }
    }

    /// Record a diagnostic once per kind, location and message.
    pub(crate) fn report(&mut self, kind: DiagnosticKind, at: Cursor<'tu>, message: String) {
        self.report_at(kind, at.location().to_string(), message);
    }

    fn report_at(&mut self, kind: DiagnosticKind, location: String, message: String) {
        if !self
            .reported
            .insert((kind, location.clone(), message.clone()))
        {
            return;
        }
        tracing::debug!(%kind, %location, "{message}");
        self.diagnostics.push(Diagnostic {
            kind,
            location,
            message,
        });
    }

    /// `///` lines for the declaration's comment.
    pub(crate) fn doc_lines(&self, cursor: Cursor<'tu>, scope: &mut Scope<'_>) {
        if !self.options.emit_doc_comments {
            return;
        }
        let canonical = cursor.canonical();
        // An anonymous tag named by a typedef carries the typedef's comment.
        let Some(comment) = cursor
            .comment()
            .or_else(|| canonical.comment())
            .or_else(|| canonical.typedef_name().and_then(|typedef| typedef.comment()))
        else {
            return;
        };
        for line in comment.lines() {
            if line.is_empty() {
                scope.line("///");
            } else {
                scope.line(&format!("/// {line}"));
            }
        }
    }

    /// One foreign item inside its own `unsafe extern "C"` block.
    pub(crate) fn extern_block(
        &self,
        ctx: &TranslationContext<'tu>,
        item: &str,
        output: &mut Output,
    ) -> String {
        let mut scope = output.scope();
        scope.line("unsafe extern \"C\" {");
        {
            let mut body = scope.scope();
            self.doc_lines(ctx.cursor, &mut body);
            let symbol = ctx.cursor.spelling();
            // Raw identifiers link under their plain spelling already.
            if ctx.name != symbol && ctx.name.strip_prefix("r#") != Some(symbol) {
                body.line(&format!("#[link_name = \"{symbol}\"]"));
            }
            body.line(item);
            body.indented();
        }
        scope.line("}");
        scope.finish()
    }

    /// `#[derive(...)]` for a list of derives, nothing for an empty list.
    pub(crate) fn derive_line<S: AsRef<str>>(derives: &[S], scope: &mut Scope<'_>) {
        if derives.is_empty() {
            return;
        }
        let list: Vec<&str> = derives.iter().map(AsRef::as_ref).collect();
        scope.line(&format!("#[derive({})]", list.join(", ")));
    }
}

/// Whether a file-scope declaration is where its entity gets emitted.
fn is_emission_site(cursor: Cursor<'_>) -> bool {
    match cursor.definition() {
        Some(definition) => definition == cursor,
        None => cursor.canonical() == cursor,
    }
}
