//! Error types for cbind-ast.

/// Errors that prevent a translation unit from being produced at all.
///
/// Recoverable syntax errors are not reported here; they become
/// `InvalidCode` cursors and are counted on the unit.
#[derive(Debug, thiserror::Error)]
pub enum AstError {
    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("Parse failed for {file}: {message}")]
    ParseFailed { file: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
