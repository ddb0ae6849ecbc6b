//! Type descriptors reachable from cursors.

use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;
use crate::unit::{TranslationUnit, TypeData, TypeId};

/// Kind tag of a [`Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Invalid,
    Unexposed,
    Void,
    Bool,
    /// Plain `char` (signed on every target this tool models).
    CharS,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Int128,
    UInt128,
    Float,
    Double,
    LongDouble,
    Pointer,
    Record,
    Enum,
    Typedef,
    FunctionProto,
    FunctionNoProto,
    ConstantArray,
    IncompleteArray,
    /// Array whose size expression did not fold to a constant.
    VariableArray,
}

impl TypeKind {
    #[must_use]
    pub const fn is_builtin(self) -> bool {
        matches!(
            self,
            Self::Void
                | Self::Bool
                | Self::CharS
                | Self::SChar
                | Self::UChar
                | Self::Short
                | Self::UShort
                | Self::Int
                | Self::UInt
                | Self::Long
                | Self::ULong
                | Self::LongLong
                | Self::ULongLong
                | Self::Int128
                | Self::UInt128
                | Self::Float
                | Self::Double
                | Self::LongDouble
        )
    }

    #[must_use]
    pub const fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::UChar
                | Self::UShort
                | Self::UInt
                | Self::ULong
                | Self::ULongLong
                | Self::UInt128
        )
    }

    #[must_use]
    pub const fn is_signed_integer(self) -> bool {
        matches!(
            self,
            Self::CharS
                | Self::SChar
                | Self::Short
                | Self::Int
                | Self::Long
                | Self::LongLong
                | Self::Int128
        )
    }

    #[must_use]
    pub const fn is_function(self) -> bool {
        matches!(self, Self::FunctionProto | Self::FunctionNoProto)
    }

    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            Self::ConstantArray | Self::IncompleteArray | Self::VariableArray
        )
    }

    /// Size in bytes on an LP64 target, for scalar kinds.
    #[must_use]
    pub const fn size_of(self) -> Option<u64> {
        match self {
            Self::Bool | Self::CharS | Self::SChar | Self::UChar => Some(1),
            Self::Short | Self::UShort => Some(2),
            Self::Int | Self::UInt | Self::Float => Some(4),
            Self::Long
            | Self::ULong
            | Self::LongLong
            | Self::ULongLong
            | Self::Double
            | Self::Pointer => Some(8),
            Self::Int128 | Self::UInt128 | Self::LongDouble => Some(16),
            _ => None,
        }
    }

    /// C keyword spelling of a builtin kind.
    #[must_use]
    pub const fn c_spelling(self) -> Option<&'static str> {
        Some(match self {
            Self::Void => "void",
            Self::Bool => "_Bool",
            Self::CharS => "char",
            Self::SChar => "signed char",
            Self::UChar => "unsigned char",
            Self::Short => "short",
            Self::UShort => "unsigned short",
            Self::Int => "int",
            Self::UInt => "unsigned int",
            Self::Long => "long",
            Self::ULong => "unsigned long",
            Self::LongLong => "long long",
            Self::ULongLong => "unsigned long long",
            Self::Int128 => "__int128",
            Self::UInt128 => "unsigned __int128",
            Self::Float => "float",
            Self::Double => "double",
            Self::LongDouble => "long double",
            _ => return None,
        })
    }
}

/// A borrowed view of one type in a [`TranslationUnit`].
#[derive(Clone, Copy)]
pub struct Type<'tu> {
    unit: &'tu TranslationUnit,
    id: TypeId,
}

impl<'tu> Type<'tu> {
    pub(crate) const fn new(unit: &'tu TranslationUnit, id: TypeId) -> Self {
        Self { unit, id }
    }

    fn data(&self) -> &'tu TypeData {
        self.unit.type_data(self.id)
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.data().kind
    }

    /// C spelling, e.g. `const char *` or `struct point`.
    #[must_use]
    pub fn spelling(&self) -> &'tu str {
        &self.data().spelling
    }

    #[must_use]
    pub fn is_const_qualified(&self) -> bool {
        self.data().is_const
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.kind() != TypeKind::Invalid
    }

    #[must_use]
    pub fn pointee(&self) -> Option<Self> {
        (self.kind() == TypeKind::Pointer)
            .then(|| self.data().inner.map(|id| Self::new(self.unit, id)))
            .flatten()
    }

    #[must_use]
    pub fn element_type(&self) -> Option<Self> {
        if self.kind().is_array() {
            self.data().inner.map(|id| Self::new(self.unit, id))
        } else {
            None
        }
    }

    #[must_use]
    pub fn array_size(&self) -> Option<u64> {
        self.data().size
    }

    #[must_use]
    pub fn result_type(&self) -> Option<Self> {
        if self.kind().is_function() {
            self.data().inner.map(|id| Self::new(self.unit, id))
        } else {
            None
        }
    }

    pub fn argument_types(&self) -> impl ExactSizeIterator<Item = Self> + 'tu {
        let unit = self.unit;
        self.data().args.iter().map(move |id| Self::new(unit, *id))
    }

    #[must_use]
    pub fn is_variadic(&self) -> bool {
        self.data().variadic
    }

    /// Declaration of a record, enum or typedef type.
    #[must_use]
    pub fn declaration(&self) -> Option<Cursor<'tu>> {
        self.data()
            .decl
            .map(|id| self.unit.cursor_by_id(id))
            .filter(|cursor| !cursor.is_null())
    }
}

impl PartialEq for Type<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.unit, other.unit) && self.id == other.id
    }
}

impl Eq for Type<'_> {}

impl std::fmt::Debug for Type<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Type")
            .field("kind", &self.kind())
            .field("spelling", &self.spelling())
            .finish()
    }
}
