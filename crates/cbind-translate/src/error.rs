//! Translation error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslateError {
    /// Strict mode is on and the run recorded diagnostics.
    #[error("{count} translation diagnostic(s) in strict mode; first: {first}")]
    Strict { count: usize, first: String },
}
