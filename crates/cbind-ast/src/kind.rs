//! Cursor kinds exposed by a [`TranslationUnit`](crate::TranslationUnit).

use serde::{Deserialize, Serialize};

/// The kind of AST node a [`Cursor`](crate::Cursor) points at.
///
/// The set is closed: declarations, references, expressions, statements,
/// attributes, preprocessing entities and invalid markers. Consumers
/// usually act on a handful of declaration kinds and skip the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorKind {
    // ── Declarations ───────────────────────────────────────────────
    UnexposedDecl,
    StructDecl,
    UnionDecl,
    EnumDecl,
    FieldDecl,
    EnumConstantDecl,
    FunctionDecl,
    VarDecl,
    ParmDecl,
    TypedefDecl,
    StaticAssert,
    ObjCInterfaceDecl,
    ObjCCategoryDecl,
    ObjCProtocolDecl,

    // ── References ─────────────────────────────────────────────────
    TypeRef,
    MemberRef,

    // ── Expressions ────────────────────────────────────────────────
    UnexposedExpr,
    DeclRefExpr,
    CallExpr,
    IntegerLiteral,
    FloatingLiteral,
    CharacterLiteral,
    StringLiteral,
    ParenExpr,
    UnaryOperator,
    BinaryOperator,
    ConditionalOperator,
    CStyleCastExpr,
    /// `sizeof` / `_Alignof` expressions.
    UnaryExpr,
    InitListExpr,

    // ── Statements ─────────────────────────────────────────────────
    UnexposedStmt,
    CompoundStmt,

    // ── Attributes ─────────────────────────────────────────────────
    UnexposedAttr,
    PackedAttr,
    AlignedAttr,

    // ── Preprocessing ──────────────────────────────────────────────
    InclusionDirective,
    MacroDefinition,

    // ── Translation unit ───────────────────────────────────────────
    TranslationUnit,

    // ── Invalid markers ────────────────────────────────────────────
    InvalidFile,
    NoDeclFound,
    InvalidCode,
}

impl CursorKind {
    #[must_use]
    pub const fn is_declaration(self) -> bool {
        matches!(
            self,
            Self::UnexposedDecl
                | Self::StructDecl
                | Self::UnionDecl
                | Self::EnumDecl
                | Self::FieldDecl
                | Self::EnumConstantDecl
                | Self::FunctionDecl
                | Self::VarDecl
                | Self::ParmDecl
                | Self::TypedefDecl
                | Self::StaticAssert
                | Self::ObjCInterfaceDecl
                | Self::ObjCCategoryDecl
                | Self::ObjCProtocolDecl
        )
    }

    #[must_use]
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::TypeRef | Self::MemberRef)
    }

    #[must_use]
    pub const fn is_expression(self) -> bool {
        matches!(
            self,
            Self::UnexposedExpr
                | Self::DeclRefExpr
                | Self::CallExpr
                | Self::IntegerLiteral
                | Self::FloatingLiteral
                | Self::CharacterLiteral
                | Self::StringLiteral
                | Self::ParenExpr
                | Self::UnaryOperator
                | Self::BinaryOperator
                | Self::ConditionalOperator
                | Self::CStyleCastExpr
                | Self::UnaryExpr
                | Self::InitListExpr
        )
    }

    #[must_use]
    pub const fn is_statement(self) -> bool {
        matches!(self, Self::UnexposedStmt | Self::CompoundStmt)
    }

    #[must_use]
    pub const fn is_attribute(self) -> bool {
        matches!(self, Self::UnexposedAttr | Self::PackedAttr | Self::AlignedAttr)
    }

    #[must_use]
    pub const fn is_preprocessing(self) -> bool {
        matches!(self, Self::InclusionDirective | Self::MacroDefinition)
    }

    #[must_use]
    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::InvalidFile | Self::NoDeclFound | Self::InvalidCode)
    }

    /// Objective-C container declarations.
    #[must_use]
    pub const fn is_objc(self) -> bool {
        matches!(
            self,
            Self::ObjCInterfaceDecl | Self::ObjCCategoryDecl | Self::ObjCProtocolDecl
        )
    }

    /// Tag declarations: `struct`, `union` and `enum`.
    #[must_use]
    pub const fn is_tag(self) -> bool {
        matches!(self, Self::StructDecl | Self::UnionDecl | Self::EnumDecl)
    }
}

impl std::fmt::Display for CursorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
