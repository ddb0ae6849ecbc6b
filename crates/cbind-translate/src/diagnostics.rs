//! Non-fatal conditions recorded while translating.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A type had no Rust rendering and a placeholder was emitted.
    UnresolvedType,
    /// An enum constant's value could not be folded; its source text was
    /// emitted instead.
    UnfoldableConstant,
    /// A bit-field was emitted with the storage of its base type.
    BitfieldLayout,
    /// Nested declarations went deeper than `max_depth`.
    DepthLimit,
    /// The parser recovered from syntax errors in the input.
    ParseErrors,
    /// A declaration's name was already taken in its Rust namespace and a
    /// suffixed name was emitted instead.
    NameCollision,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::UnresolvedType => "unresolved type",
            Self::UnfoldableConstant => "unfoldable constant",
            Self::BitfieldLayout => "bit-field layout",
            Self::DepthLimit => "depth limit",
            Self::ParseErrors => "parse errors",
            Self::NameCollision => "name collision",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// `file:line:column` of the cursor the diagnostic is about.
    pub location: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.kind, self.message)
    }
}
