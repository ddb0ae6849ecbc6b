//! Rust names for C declarations, anonymous ones included.

use std::collections::{HashMap, HashSet};

use cbind_ast::{Cursor, CursorKind, StorageClass, TypeKind};

use crate::options::AnonymousNaming;

/// Words that cannot be used as plain identifiers in Rust 2024.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers either.
const NOT_RAW: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Whether `name` is a valid plain identifier (keywords included).
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Replace characters that cannot appear in an identifier.
#[must_use]
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// `name` as a Rust identifier: keywords become raw identifiers, and the
/// few that cannot be raw get a trailing underscore.
#[must_use]
pub fn rust_ident(name: &str) -> String {
    let name = if is_identifier(name) {
        name.to_string()
    } else {
        sanitize(name)
    };
    if NOT_RAW.contains(&name.as_str()) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name.as_str()) {
        format!("r#{name}")
    } else {
        name
    }
}

/// Rust namespaces a generated item lives in.
///
/// C keeps tags apart from typedef names, and Rust does not: structs,
/// unions, enums and type aliases share the type namespace. Functions,
/// statics and constants share the value namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
    Type,
    Value,
}

/// Names issued during one run, memoized per declaration.
///
/// Redeclarations share the name of their canonical declaration. Named
/// declarations keep their spelling unless an earlier declaration already
/// holds it in the same Rust namespace; anonymous tags named by a typedef
/// take the typedef's name, and every other anonymous declaration gets a
/// generated name that is unique within the run.
#[derive(Debug)]
pub struct NameTable<'tu> {
    scheme: AnonymousNaming,
    prefix: String,
    names: HashMap<Cursor<'tu>, String>,
    types: HashSet<String>,
    values: HashSet<String>,
    renamed: Vec<(Cursor<'tu>, String)>,
    counter: usize,
}

impl<'tu> NameTable<'tu> {
    #[must_use]
    pub fn new(scheme: AnonymousNaming, prefix: &str) -> Self {
        Self {
            scheme,
            prefix: prefix.to_string(),
            names: HashMap::new(),
            types: HashSet::new(),
            values: HashSet::new(),
            renamed: Vec::new(),
            counter: 0,
        }
    }

    /// Claim the names of every named declaration under `root`, in source
    /// order, before any anonymous name is generated.
    ///
    /// The first declaration of a spelling keeps it; a later declaration of
    /// another entity in the same namespace is suffixed and listed in
    /// [`NameTable::renamed`]. Function-like macros, `static` functions and
    /// variables never produce an item and claim nothing; object-like
    /// macros claim their name only with `include_macros`.
    pub fn reserve(&mut self, root: Cursor<'tu>, include_macros: bool) {
        let mut macros = HashSet::new();
        let mut stack: Vec<Cursor<'tu>> = root.children().collect();
        stack.reverse();
        while let Some(cursor) = stack.pop() {
            if cursor.kind().is_tag() {
                let nested: Vec<_> = cursor.children().collect();
                stack.extend(nested.into_iter().rev());
            }
            let namespace = match cursor.kind() {
                CursorKind::StructDecl | CursorKind::UnionDecl | CursorKind::EnumDecl => {
                    Namespace::Type
                }
                CursorKind::TypedefDecl if own_tag(cursor).is_none() => Namespace::Type,
                CursorKind::FunctionDecl | CursorKind::VarDecl
                    if cursor.storage_class() != StorageClass::Static =>
                {
                    Namespace::Value
                }
                CursorKind::MacroDefinition
                    if include_macros
                        && !cursor.is_function_like_macro()
                        && cursor.macro_value().is_some()
                        && macros.insert(cursor.spelling()) =>
                {
                    Namespace::Value
                }
                _ => continue,
            };
            let key = cursor.canonical();
            if self.names.contains_key(&key) {
                continue;
            }
            let spelling = if key.spelling().is_empty() {
                match key.typedef_name().filter(|_| is_anonymous_tag(key)) {
                    Some(typedef) => typedef.spelling(),
                    None => continue,
                }
            } else {
                key.spelling()
            };
            let wanted = rust_ident(spelling);
            let name = self.unique(namespace, wanted.clone());
            if name != wanted {
                tracing::debug!(%wanted, %name, "name already taken");
                self.renamed.push((key, name.clone()));
            }
            self.claim(namespace, key, name);
        }
    }

    /// Declarations [`NameTable::reserve`] had to rename, with their new
    /// names.
    #[must_use]
    pub fn renamed(&self) -> &[(Cursor<'tu>, String)] {
        &self.renamed
    }

    /// Rust name of `cursor`'s declaration.
    pub fn name_of(&mut self, cursor: Cursor<'tu>) -> String {
        let key = cursor.canonical();
        if let Some(name) = self.names.get(&key) {
            return name.clone();
        }
        if let Some(tag) = own_tag(key) {
            let name = self.name_of(tag);
            self.names.insert(key, name.clone());
            return name;
        }
        let name = if key.spelling().is_empty() {
            self.anonymous_name(key)
        } else {
            rust_ident(key.spelling())
        };
        self.claim(namespace_of(key.kind()), key, name.clone());
        name
    }

    fn claim(&mut self, namespace: Namespace, key: Cursor<'tu>, name: String) {
        match namespace {
            Namespace::Type => self.types.insert(name.clone()),
            Namespace::Value => self.values.insert(name.clone()),
        };
        self.names.insert(key, name);
    }

    fn anonymous_name(&mut self, cursor: Cursor<'tu>) -> String {
        if is_anonymous_tag(cursor)
            && let Some(typedef) = cursor.typedef_name()
        {
            return rust_ident(typedef.spelling());
        }
        let candidate = match self.scheme {
            AnonymousNaming::Counter => {
                let name = format!("{}{}", self.prefix, self.counter);
                self.counter += 1;
                name
            }
            AnonymousNaming::Location => {
                let location = cursor.location();
                let stem = std::path::Path::new(location.file)
                    .file_stem()
                    .map_or_else(
                        || location.file.to_string(),
                        |s| s.to_string_lossy().into_owned(),
                    );
                sanitize(&format!(
                    "{}{stem}_{}_{}",
                    self.prefix, location.line, location.column
                ))
            }
        };
        self.unique(Namespace::Type, candidate)
    }

    /// `candidate`, or `candidate_{k}` for the first `k` not issued yet.
    fn unique(&self, namespace: Namespace, candidate: String) -> String {
        let issued = match namespace {
            Namespace::Type => &self.types,
            Namespace::Value => &self.values,
        };
        if !issued.contains(&candidate) {
            return candidate;
        }
        (1..)
            .map(|k| format!("{candidate}_{k}"))
            .find(|name| !issued.contains(name))
            .unwrap_or(candidate)
    }
}

const fn namespace_of(kind: CursorKind) -> Namespace {
    match kind {
        CursorKind::FunctionDecl | CursorKind::VarDecl | CursorKind::MacroDefinition => {
            Namespace::Value
        }
        _ => Namespace::Type,
    }
}

/// The tag behind `typedef struct s s;` or `typedef struct { .. } s;`.
///
/// Such a typedef emits no alias of its own and goes by its tag's name.
fn own_tag(typedef: Cursor<'_>) -> Option<Cursor<'_>> {
    if typedef.kind() != CursorKind::TypedefDecl {
        return None;
    }
    let underlying = typedef.typedef_underlying_type();
    if !matches!(underlying.kind(), TypeKind::Record | TypeKind::Enum) {
        return None;
    }
    let tag = underlying.declaration()?.canonical();
    let names_tag = tag
        .typedef_name()
        .is_some_and(|named| named.canonical() == typedef.canonical());
    (names_tag || tag.spelling() == typedef.spelling()).then_some(tag)
}

/// Whether `cursor` is a record or enum declaration written without a name.
fn is_anonymous_tag(cursor: Cursor<'_>) -> bool {
    matches!(
        cursor.kind(),
        CursorKind::StructDecl | CursorKind::UnionDecl | CursorKind::EnumDecl
    ) && cursor.is_anonymous()
}
