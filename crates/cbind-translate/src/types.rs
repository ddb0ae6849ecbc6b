//! Rendering C types as Rust type syntax.

use cbind_ast::{Type, TypeKind};

use crate::naming::{NameTable, rust_ident};

/// Placeholder emitted where a type has no Rust rendering.
pub const UNKNOWN_TYPE: &str = "__UnknownType";

/// Rust types for typedef names that C headers take from system headers.
const WELL_KNOWN_TYPEDEFS: &[(&str, &str)] = &[
    ("size_t", "usize"),
    ("ssize_t", "isize"),
    ("ptrdiff_t", "isize"),
    ("intptr_t", "isize"),
    ("uintptr_t", "usize"),
    ("int8_t", "i8"),
    ("int16_t", "i16"),
    ("int32_t", "i32"),
    ("int64_t", "i64"),
    ("uint8_t", "u8"),
    ("uint16_t", "u16"),
    ("uint32_t", "u32"),
    ("uint64_t", "u64"),
    ("__int128_t", "i128"),
    ("__uint128_t", "u128"),
];

/// Rust type for a typedef name declared outside the unit, if known.
#[must_use]
pub fn well_known_typedef(name: &str) -> Option<&'static str> {
    WELL_KNOWN_TYPEDEFS
        .iter()
        .find(|(c_name, _)| *c_name == name)
        .map(|(_, rust)| *rust)
}

/// Result of resolving one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Known(String),
    /// No Rust rendering; `spelling` is the C spelling of the whole type.
    Unknown { spelling: String },
}

impl ResolvedType {
    #[must_use]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl std::fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(text) => f.write_str(text),
            Self::Unknown { spelling } => write!(f, "{UNKNOWN_TYPE} /* {spelling} */"),
        }
    }
}

/// Maps [`Type`]s to Rust syntax, naming referenced declarations through
/// the run's [`NameTable`].
pub struct TypeResolver<'r, 'tu> {
    ffi_prefix: &'r str,
    names: &'r mut NameTable<'tu>,
}

impl<'r, 'tu> TypeResolver<'r, 'tu> {
    pub const fn new(ffi_prefix: &'r str, names: &'r mut NameTable<'tu>) -> Self {
        Self { ffi_prefix, names }
    }

    pub fn resolve(&mut self, ty: Type<'tu>) -> ResolvedType {
        match self.render(ty) {
            Some(text) => ResolvedType::Known(text),
            None => ResolvedType::Unknown {
                spelling: ty.spelling().to_string(),
            },
        }
    }

    /// Return type of a function; `void` renders as nothing.
    pub fn resolve_result(&mut self, ty: Type<'tu>) -> Option<ResolvedType> {
        (ty.kind() != TypeKind::Void).then(|| self.resolve(ty))
    }

    fn render(&mut self, ty: Type<'tu>) -> Option<String> {
        let kind = ty.kind();
        if kind.is_builtin() {
            return self.builtin(kind);
        }
        match kind {
            TypeKind::Pointer => self.pointer(ty.pointee()?),
            TypeKind::ConstantArray => {
                let element = self.render(ty.element_type()?)?;
                Some(format!("[{element}; {}]", ty.array_size()?))
            }
            TypeKind::IncompleteArray => {
                let element = self.render(ty.element_type()?)?;
                Some(format!("[{element}; 0]"))
            }
            TypeKind::FunctionProto | TypeKind::FunctionNoProto => self.function(ty),
            TypeKind::Record | TypeKind::Enum => {
                ty.declaration().map(|decl| self.names.name_of(decl))
            }
            TypeKind::Typedef => match ty.declaration() {
                Some(decl) => Some(self.names.name_of(decl)),
                None => Some(
                    well_known_typedef(ty.spelling())
                        .map_or_else(|| rust_ident(ty.spelling()), str::to_string),
                ),
            },
            _ => None,
        }
    }

    fn builtin(&self, kind: TypeKind) -> Option<String> {
        let ffi = match kind {
            TypeKind::Void => "c_void",
            TypeKind::Bool => return Some("bool".to_string()),
            TypeKind::CharS => "c_char",
            TypeKind::SChar => "c_schar",
            TypeKind::UChar => "c_uchar",
            TypeKind::Short => "c_short",
            TypeKind::UShort => "c_ushort",
            TypeKind::Int => "c_int",
            TypeKind::UInt => "c_uint",
            TypeKind::Long => "c_long",
            TypeKind::ULong => "c_ulong",
            TypeKind::LongLong => "c_longlong",
            TypeKind::ULongLong => "c_ulonglong",
            TypeKind::Int128 => return Some("i128".to_string()),
            TypeKind::UInt128 => return Some("u128".to_string()),
            TypeKind::Float => "c_float",
            TypeKind::Double => "c_double",
            _ => return None,
        };
        Some(format!("{}::{ffi}", self.ffi_prefix))
    }

    fn pointer(&mut self, pointee: Type<'tu>) -> Option<String> {
        if is_function_like(pointee) {
            // A C function pointer may be null.
            return Some(format!("Option<{}>", self.render(pointee)?));
        }
        let qualifier = if pointee.is_const_qualified() {
            "const"
        } else {
            "mut"
        };
        Some(format!("*{qualifier} {}", self.render(pointee)?))
    }

    fn function(&mut self, ty: Type<'tu>) -> Option<String> {
        let mut params = ty
            .argument_types()
            .map(|arg| self.render(arg))
            .collect::<Option<Vec<_>>>()?;
        if ty.is_variadic() {
            params.push("...".to_string());
        }
        let mut text = format!("unsafe extern \"C\" fn({})", params.join(", "));
        let result = ty.result_type()?;
        if result.kind() != TypeKind::Void {
            text.push_str(" -> ");
            text.push_str(&self.render(result)?);
        }
        Some(text)
    }
}

/// Whether `ty` is a function type, directly or through typedefs.
fn is_function_like(ty: Type<'_>) -> bool {
    let mut current = ty;
    loop {
        match current.kind() {
            TypeKind::FunctionProto | TypeKind::FunctionNoProto => return true,
            TypeKind::Typedef => match current.declaration() {
                Some(decl) => current = decl.typedef_underlying_type(),
                None => return false,
            },
            _ => return false,
        }
    }
}
