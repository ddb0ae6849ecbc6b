//! ast-grep wrapper and language detection from file extensions.

use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_language::SupportLang;

/// The concrete AST tree type returned by `parse_source`.
pub type AstTree = ast_grep_core::AstGrep<StrDoc<SupportLang>>;

/// Detect the input language from a file path extension.
///
/// Only C sources and headers are accepted; returns `None` otherwise.
#[must_use]
pub fn detect_language(file_path: &str) -> Option<SupportLang> {
    let (_, ext) = file_path.rsplit_once('.')?;
    match ext {
        "c" | "h" => Some(SupportLang::C),
        _ => None,
    }
}

/// Parse source code into an ast-grep tree for the given language.
#[must_use]
pub fn parse_source(source: &str, lang: SupportLang) -> AstTree {
    use ast_grep_language::LanguageExt;
    lang.ast_grep(source)
}
