//! Knobs for one translation run.

use serde::{Deserialize, Serialize};

/// How names are made up for declarations without a spelling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnonymousNaming {
    /// `{prefix}{n}`, numbered in translation order.
    #[default]
    Counter,
    /// `{prefix}{file}_{line}_{column}` from the declaration's location.
    Location,
}

fn default_anonymous_prefix() -> String {
    "_Anonymous_".to_string()
}

fn default_ffi_prefix() -> String {
    "::core::ffi".to_string()
}

fn default_struct_derives() -> Vec<String> {
    ["Debug", "Clone", "Copy"].map(String::from).to_vec()
}

fn default_enum_derives() -> Vec<String> {
    ["Debug", "Clone", "Copy", "PartialEq", "Eq", "Hash"]
        .map(String::from)
        .to_vec()
}

const fn default_true() -> bool {
    true
}

const fn default_max_depth() -> usize {
    256
}

const fn default_indent_width() -> usize {
    4
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslateOptions {
    #[serde(default)]
    pub anonymous_naming: AnonymousNaming,

    /// Prefix of generated names for anonymous declarations.
    #[serde(default = "default_anonymous_prefix")]
    pub anonymous_prefix: String,

    /// Path the C scalar aliases (`c_int`, `c_char`, ...) are taken from.
    #[serde(default = "default_ffi_prefix")]
    pub ffi_prefix: String,

    /// Derives on structs. Unions only get `Clone` and `Copy` from this list.
    #[serde(default = "default_struct_derives")]
    pub struct_derives: Vec<String>,

    #[serde(default = "default_enum_derives")]
    pub enum_derives: Vec<String>,

    /// Translate object-like macros with a constant value.
    #[serde(default = "default_true")]
    pub emit_macros: bool,

    /// Carry C comments over as `///` doc comments.
    #[serde(default = "default_true")]
    pub emit_doc_comments: bool,

    /// Start the output with a "generated from" comment.
    #[serde(default = "default_true")]
    pub header_comment: bool,

    /// Start the output with `#![allow(...)]` for C naming conventions.
    #[serde(default = "default_true")]
    pub allow_attributes: bool,

    /// Deepest nesting of declarations and visitor recursion.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Fail the run when any diagnostic was recorded.
    #[serde(default)]
    pub strict: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            anonymous_naming: AnonymousNaming::default(),
            anonymous_prefix: default_anonymous_prefix(),
            ffi_prefix: default_ffi_prefix(),
            struct_derives: default_struct_derives(),
            enum_derives: default_enum_derives(),
            emit_macros: true,
            emit_doc_comments: true,
            header_comment: true,
            allow_attributes: true,
            max_depth: default_max_depth(),
            indent_width: default_indent_width(),
            strict: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_correct() {
        let options = TranslateOptions::default();
        assert_eq!(options.anonymous_naming, AnonymousNaming::Counter);
        assert_eq!(options.anonymous_prefix, "_Anonymous_");
        assert_eq!(options.ffi_prefix, "::core::ffi");
        assert_eq!(options.struct_derives, vec!["Debug", "Clone", "Copy"]);
        assert_eq!(options.max_depth, 256);
        assert_eq!(options.indent_width, 4);
        assert!(options.emit_macros);
        assert!(!options.strict);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let options: TranslateOptions = toml::from_str(
            r#"
            anonymous_naming = "location"
            strict = true
            "#,
        )
        .expect("should deserialize");
        assert_eq!(options.anonymous_naming, AnonymousNaming::Location);
        assert!(options.strict);
        assert_eq!(options.enum_derives.len(), 6);
        assert_eq!(options.indent_width, 4);
    }
}
