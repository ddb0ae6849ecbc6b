//! Settings that are not about the shape of the generated code.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Refuse to translate a header the parser had to recover from.
    #[serde(default)]
    pub fail_on_parse_errors: bool,

    /// Macros defined before the header is read, as `NAME` or `NAME=VALUE`.
    #[serde(default)]
    pub defines: Vec<String>,
}

impl GeneralConfig {
    /// Macro name of a `defines` entry.
    #[must_use]
    pub fn define_name(define: &str) -> &str {
        define.split_once('=').map_or(define, |(name, _)| name).trim()
    }
}
