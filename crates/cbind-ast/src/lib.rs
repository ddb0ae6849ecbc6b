//! # cbind-ast
//!
//! C parsing for cbind. Sources are parsed with ast-grep's tree-sitter C
//! grammar and lowered into an immutable [`TranslationUnit`]: an arena of
//! nodes and types browsed through copyable [`Cursor`] and [`Type`] views.
//!
//! The cursor model follows the shape of a compiler front end rather than
//! the concrete syntax tree: declarations know their canonical and
//! defining declarations, types are spelled the way C spells them, enum
//! constants and object-like macros carry folded values, and conditional
//! compilation has already picked one branch.

mod cursor;
pub mod dump;
pub mod error;
mod frontend;
mod kind;
mod location;
pub mod parser;
mod ty;
mod unit;

use std::path::Path;

pub use cursor::{ChildVisit, Children, Cursor};
pub use error::AstError;
pub use kind::CursorKind;
pub use location::SourceLocation;
pub use ty::{Type, TypeKind};
pub use unit::{MacroValue, NodeId, StorageClass, TranslationUnit, TypeId, UnitBuilder};

/// Options that influence lowering.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Macros treated as defined before the first line, as `NAME` or
    /// `NAME=VALUE`.
    pub defines: Vec<String>,
}

/// Parse C source text into a translation unit with default options.
///
/// # Errors
/// Returns [`AstError::ParseFailed`] when the text cannot be handed to the
/// parser at all. Syntax errors inside the text do not fail the parse.
pub fn parse_source_unit(source: &str, file_name: &str) -> Result<TranslationUnit, AstError> {
    parse_source_unit_with(source, file_name, &ParseOptions::default())
}

/// Parse C source text into a translation unit.
///
/// # Errors
/// Returns [`AstError::ParseFailed`] when the text contains a NUL byte.
pub fn parse_source_unit_with(
    source: &str,
    file_name: &str,
    options: &ParseOptions,
) -> Result<TranslationUnit, AstError> {
    if let Some(offset) = source.find('\0') {
        return Err(AstError::ParseFailed {
            file: file_name.to_string(),
            message: format!("NUL byte at offset {offset}"),
        });
    }
    let unit = frontend::lower_source(source, file_name, options);
    if unit.has_errors() {
        tracing::debug!(
            file = file_name,
            errors = unit.error_count(),
            "recovered from syntax errors"
        );
    }
    Ok(unit)
}

/// Read and parse a `.c` or `.h` file.
///
/// # Errors
/// Returns [`AstError::UnsupportedLanguage`] for other extensions,
/// [`AstError::Io`] when the file cannot be read, and any error of
/// [`parse_source_unit_with`].
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<TranslationUnit, AstError> {
    let display = path.display().to_string();
    if parser::detect_language(&display).is_none() {
        return Err(AstError::UnsupportedLanguage(display));
    }
    let source = std::fs::read_to_string(path)?;
    parse_source_unit_with(&source, &display, options)
}
