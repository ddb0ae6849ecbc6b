//! # cbind-translate
//!
//! Turns the declarations of a parsed C unit into Rust FFI declarations.
//!
//! A [`Translator`] walks the top-level cursors of a
//! [`TranslationUnit`](cbind_ast::TranslationUnit) and dispatches each one
//! to the handler for its [`DeclarationKind`]. Types are rendered by the
//! [`TypeResolver`], names come from one [`NameTable`] per run, and every
//! handler assembles its text in a scoped [`Output`]. Problems that do not
//! stop the run are collected as [`Diagnostic`]s.

pub mod diagnostics;
pub mod error;
pub mod naming;
pub mod options;
pub mod output;
pub mod translator;
pub mod types;
pub mod visitor;

use cbind_ast::TranslationUnit;

pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::TranslateError;
pub use naming::NameTable;
pub use options::{AnonymousNaming, TranslateOptions};
pub use output::{Output, Scope};
pub use translator::{DeclarationKind, Translator};
pub use types::{ResolvedType, TypeResolver};
pub use visitor::Visitor;

/// Rust source for a unit plus what degraded along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Translate every top-level declaration of `unit`.
///
/// # Errors
/// Returns [`TranslateError::Strict`] when `options.strict` is set and the
/// run recorded any diagnostic.
pub fn translate(
    unit: &TranslationUnit,
    options: &TranslateOptions,
) -> Result<Translation, TranslateError> {
    let mut translator = Translator::new(unit, options.clone());
    let text = translator.translate_unit();
    let diagnostics = translator.finish()?;
    tracing::debug!(
        file = unit.file_name(),
        bytes = text.len(),
        diagnostics = diagnostics.len(),
        "translated unit"
    );
    Ok(Translation { text, diagnostics })
}
