//! Arena-backed translation unit and the builder that assembles it.
//!
//! A [`TranslationUnit`] owns every node and type of one parsed file.
//! Nodes and types are addressed by [`NodeId`] / [`TypeId`] and never
//! change once the unit is finished; [`Cursor`] and [`Type`] are borrowed
//! views over them.

use std::ops::Range;

use serde::Serialize;

use crate::cursor::Cursor;
use crate::kind::CursorKind;
use crate::location::SourceLocation;
use crate::ty::TypeKind;

/// Opaque identity of a node inside its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    /// The translation-unit node itself.
    pub const ROOT: Self = Self(0);
    pub(crate) const NULL: Self = Self(u32::MAX);

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque identity of a type inside its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(u32);

impl TypeId {
    /// Every unit reserves slot zero for the invalid type.
    pub(crate) const INVALID: Self = Self(0);

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Storage class written on a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageClass {
    #[default]
    None,
    Extern,
    Static,
    Register,
}

/// The folded value of an object-like macro.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroValue {
    Int { value: i128, unsigned: bool },
    Float(f64),
    /// Decoded bytes of a string literal, without the terminating NUL.
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: CursorKind,
    pub(crate) spelling: String,
    pub(crate) line: u32,
    pub(crate) column: u32,
    pub(crate) extent: Range<usize>,
    pub(crate) parent: NodeId,
    pub(crate) children: Vec<NodeId>,
    pub(crate) ty: TypeId,
    pub(crate) underlying: Option<TypeId>,
    pub(crate) value: Option<i128>,
    pub(crate) value_text: Option<String>,
    pub(crate) storage: StorageClass,
    pub(crate) is_definition: bool,
    pub(crate) definition: Option<NodeId>,
    pub(crate) canonical: Option<NodeId>,
    pub(crate) referenced: Option<NodeId>,
    pub(crate) typedef_name: Option<NodeId>,
    pub(crate) bit_width: Option<u32>,
    pub(crate) macro_value: Option<MacroValue>,
    pub(crate) function_like: bool,
    pub(crate) comment: Option<String>,
    pub(crate) implicit: bool,
}

impl NodeData {
    fn new(kind: CursorKind, spelling: String, parent: NodeId) -> Self {
        Self {
            kind,
            spelling,
            line: 0,
            column: 0,
            extent: 0..0,
            parent,
            children: Vec::new(),
            ty: TypeId::INVALID,
            underlying: None,
            value: None,
            value_text: None,
            storage: StorageClass::None,
            is_definition: false,
            definition: None,
            canonical: None,
            referenced: None,
            typedef_name: None,
            bit_width: None,
            macro_value: None,
            function_like: false,
            comment: None,
            implicit: false,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TypeData {
    pub(crate) kind: TypeKind,
    pub(crate) spelling: String,
    /// Pointee, element or result type depending on `kind`.
    pub(crate) inner: Option<TypeId>,
    pub(crate) size: Option<u64>,
    pub(crate) args: Vec<TypeId>,
    pub(crate) variadic: bool,
    pub(crate) decl: Option<NodeId>,
    pub(crate) is_const: bool,
}

impl TypeData {
    fn new(kind: TypeKind, spelling: String) -> Self {
        Self {
            kind,
            spelling,
            inner: None,
            size: None,
            args: Vec::new(),
            variadic: false,
            decl: None,
            is_const: false,
        }
    }
}

/// One parsed file: the immutable owner of every cursor and type.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    file: String,
    source: String,
    nodes: Vec<NodeData>,
    types: Vec<TypeData>,
    error_count: usize,
    /// Line and column of the earliest syntax error.
    first_error: Option<(u32, u32)>,
}

impl TranslationUnit {
    /// The translation-unit cursor; its children are the file's top-level entities.
    #[must_use]
    pub const fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self, NodeId::ROOT)
    }

    /// Look up a cursor by id, returning the null cursor for unknown ids.
    #[must_use]
    pub fn cursor_by_id(&self, id: NodeId) -> Cursor<'_> {
        if id.index() < self.nodes.len() {
            Cursor::new(self, id)
        } else {
            Cursor::null(self)
        }
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of syntax errors recovered from while lowering.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }

    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Position of the earliest syntax error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<SourceLocation<'_>> {
        self.first_error.map(|(line, column)| SourceLocation {
            file: &self.file,
            line,
            column,
        })
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index())
    }

    pub(crate) fn type_data(&self, id: TypeId) -> &TypeData {
        // Slot zero always exists, so unknown ids read as invalid.
        self.types
            .get(id.index())
            .unwrap_or_else(|| &self.types[TypeId::INVALID.index()])
    }
}

/// Assembles a [`TranslationUnit`].
///
/// The C frontend drives it while lowering a syntax tree; tests use it to
/// build exact cursor shapes without going through a parser.
#[derive(Debug)]
pub struct UnitBuilder {
    unit: TranslationUnit,
}

impl UnitBuilder {
    #[must_use]
    pub fn new(file: impl Into<String>, source: impl Into<String>) -> Self {
        let file = file.into();
        let source = source.into();
        let mut root = NodeData::new(CursorKind::TranslationUnit, file.clone(), NodeId::NULL);
        root.extent = 0..source.len();
        Self {
            unit: TranslationUnit {
                file,
                source,
                nodes: vec![root],
                types: vec![TypeData::new(TypeKind::Invalid, String::new())],
                error_count: 0,
                first_error: None,
            },
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Borrow the unit under construction.
    #[must_use]
    pub const fn unit(&self) -> &TranslationUnit {
        &self.unit
    }

    /// Append a node as the last child of `parent`.
    pub fn add(
        &mut self,
        parent: NodeId,
        kind: CursorKind,
        spelling: impl Into<String>,
    ) -> NodeId {
        let id = NodeId(u32::try_from(self.unit.nodes.len()).unwrap_or(u32::MAX - 1));
        self.unit
            .nodes
            .push(NodeData::new(kind, spelling.into(), parent));
        if let Some(parent) = self.unit.nodes.get_mut(parent.index()) {
            parent.children.push(id);
        }
        id
    }

    pub fn set_location(&mut self, node: NodeId, line: u32, column: u32) {
        if let Some(data) = self.node_mut(node) {
            data.line = line;
            data.column = column;
        }
    }

    pub fn set_extent(&mut self, node: NodeId, extent: Range<usize>) {
        if let Some(data) = self.node_mut(node) {
            data.extent = extent;
        }
    }

    pub fn set_type(&mut self, node: NodeId, ty: TypeId) {
        if let Some(data) = self.node_mut(node) {
            data.ty = ty;
        }
    }

    /// Typedef underlying type or enum integer type.
    pub fn set_underlying_type(&mut self, node: NodeId, ty: TypeId) {
        if let Some(data) = self.node_mut(node) {
            data.underlying = Some(ty);
        }
    }

    /// Record a folded value; `text` keeps the source expression for
    /// consumers that need it when folding failed.
    pub fn set_value(&mut self, node: NodeId, value: Option<i128>, text: Option<String>) {
        if let Some(data) = self.node_mut(node) {
            data.value = value;
            data.value_text = text;
        }
    }

    pub fn set_storage(&mut self, node: NodeId, storage: StorageClass) {
        if let Some(data) = self.node_mut(node) {
            data.storage = storage;
        }
    }

    pub fn set_is_definition(&mut self, node: NodeId, is_definition: bool) {
        if let Some(data) = self.node_mut(node) {
            data.is_definition = is_definition;
        }
    }

    pub fn link_definition(&mut self, node: NodeId, definition: NodeId) {
        if let Some(data) = self.node_mut(node) {
            data.definition = Some(definition);
        }
    }

    pub fn set_canonical(&mut self, node: NodeId, canonical: NodeId) {
        if let Some(data) = self.node_mut(node) {
            data.canonical = Some(canonical);
        }
    }

    pub fn set_referenced(&mut self, node: NodeId, target: NodeId) {
        if let Some(data) = self.node_mut(node) {
            data.referenced = Some(target);
        }
    }

    /// Mark `tag` as an anonymous record/enum named by `typedef`.
    pub fn set_typedef_name(&mut self, tag: NodeId, typedef: NodeId) {
        if let Some(data) = self.node_mut(tag) {
            data.typedef_name = Some(typedef);
        }
    }

    pub fn set_bit_width(&mut self, node: NodeId, width: u32) {
        if let Some(data) = self.node_mut(node) {
            data.bit_width = Some(width);
        }
    }

    pub fn set_macro(
        &mut self,
        node: NodeId,
        value: Option<MacroValue>,
        body: impl Into<String>,
        function_like: bool,
    ) {
        if let Some(data) = self.node_mut(node) {
            data.macro_value = value;
            data.value_text = Some(body.into());
            data.function_like = function_like;
        }
    }

    pub fn set_comment(&mut self, node: NodeId, comment: impl Into<String>) {
        if let Some(data) = self.node_mut(node) {
            data.comment = Some(comment.into());
        }
    }

    /// Mark a node the source never spelled out (e.g. a tag first seen in a reference).
    pub fn set_implicit(&mut self, node: NodeId) {
        if let Some(data) = self.node_mut(node) {
            data.implicit = true;
        }
    }

    /// Count one syntax error at `line:column`.
    pub fn record_error(&mut self, line: u32, column: u32) {
        self.unit.error_count += 1;
        let earliest = self.unit.first_error.is_none_or(|first| (line, column) < first);
        if earliest {
            self.unit.first_error = Some((line, column));
        }
    }

    // ── Types ──────────────────────────────────────────────────────

    pub fn builtin(&mut self, kind: TypeKind) -> TypeId {
        let spelling = kind.c_spelling().unwrap_or_default().to_string();
        self.push_type(TypeData::new(kind, spelling))
    }

    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        let inner = self.unit.type_data(pointee);
        let spelling = if matches!(
            inner.kind,
            TypeKind::FunctionProto | TypeKind::FunctionNoProto
        ) {
            inner.spelling.replacen('(', "(*)(", 1)
        } else {
            format!("{} *", inner.spelling)
        };
        let mut data = TypeData::new(TypeKind::Pointer, spelling);
        data.inner = Some(pointee);
        self.push_type(data)
    }

    pub fn constant_array(&mut self, element: TypeId, size: u64) -> TypeId {
        let spelling = format!("{} [{size}]", self.unit.type_data(element).spelling);
        let mut data = TypeData::new(TypeKind::ConstantArray, spelling);
        data.inner = Some(element);
        data.size = Some(size);
        self.push_type(data)
    }

    pub fn incomplete_array(&mut self, element: TypeId) -> TypeId {
        let spelling = format!("{} []", self.unit.type_data(element).spelling);
        let mut data = TypeData::new(TypeKind::IncompleteArray, spelling);
        data.inner = Some(element);
        self.push_type(data)
    }

    /// An array whose size expression could not be folded.
    pub fn variable_array(&mut self, element: TypeId, size_text: &str) -> TypeId {
        let spelling = format!("{} [{size_text}]", self.unit.type_data(element).spelling);
        let mut data = TypeData::new(TypeKind::VariableArray, spelling);
        data.inner = Some(element);
        self.push_type(data)
    }

    pub fn function(&mut self, result: TypeId, args: Vec<TypeId>, variadic: bool) -> TypeId {
        let mut params: Vec<String> = args
            .iter()
            .map(|arg| self.unit.type_data(*arg).spelling.clone())
            .collect();
        if variadic {
            params.push("...".to_string());
        }
        if params.is_empty() {
            params.push("void".to_string());
        }
        let spelling = format!(
            "{} ({})",
            self.unit.type_data(result).spelling,
            params.join(", ")
        );
        let mut data = TypeData::new(TypeKind::FunctionProto, spelling);
        data.inner = Some(result);
        data.args = args;
        data.variadic = variadic;
        self.push_type(data)
    }

    pub fn function_no_proto(&mut self, result: TypeId) -> TypeId {
        let spelling = format!("{} ()", self.unit.type_data(result).spelling);
        let mut data = TypeData::new(TypeKind::FunctionNoProto, spelling);
        data.inner = Some(result);
        self.push_type(data)
    }

    /// Type of a struct or union declaration.
    pub fn record(&mut self, decl: NodeId) -> TypeId {
        self.declared(TypeKind::Record, decl)
    }

    pub fn enumeration(&mut self, decl: NodeId) -> TypeId {
        self.declared(TypeKind::Enum, decl)
    }

    pub fn typedef(&mut self, decl: NodeId) -> TypeId {
        self.declared(TypeKind::Typedef, decl)
    }

    /// A typedef name used without a declaration in this unit (e.g. `size_t`).
    pub fn external_typedef(&mut self, name: &str) -> TypeId {
        self.push_type(TypeData::new(TypeKind::Typedef, name.to_string()))
    }

    pub fn unexposed(&mut self, spelling: &str) -> TypeId {
        self.push_type(TypeData::new(TypeKind::Unexposed, spelling.to_string()))
    }

    /// Copy of `ty` with `const` applied.
    pub fn qualified_const(&mut self, ty: TypeId) -> TypeId {
        let mut data = self.unit.type_data(ty).clone();
        if data.is_const {
            return ty;
        }
        data.is_const = true;
        data.spelling = if data.kind == TypeKind::Pointer {
            format!("{} const", data.spelling)
        } else {
            format!("const {}", data.spelling)
        };
        self.push_type(data)
    }

    /// Declaration referenced by a record/enum/typedef type.
    #[must_use]
    pub fn type_declaration(&self, ty: TypeId) -> Option<NodeId> {
        self.unit.type_data(ty).decl
    }

    #[must_use]
    pub fn type_kind(&self, ty: TypeId) -> TypeKind {
        self.unit.type_data(ty).kind
    }

    /// Pointee, element or result type of `ty`.
    pub(crate) fn type_inner(&self, ty: TypeId) -> Option<TypeId> {
        self.unit.type_data(ty).inner
    }

    pub(crate) fn is_implicit(&self, node: NodeId) -> bool {
        self.unit.node(node).is_some_and(|data| data.implicit)
    }

    /// Direct children of `parent` added once the unit held `len` nodes.
    pub(crate) fn children_since(&self, parent: NodeId, len: usize) -> Vec<NodeId> {
        self.unit.node(parent).map_or_else(Vec::new, |data| {
            data.children
                .iter()
                .copied()
                .filter(|id| id.index() >= len)
                .collect()
        })
    }

    pub(crate) fn spelling_of(&self, node: NodeId) -> &str {
        self.unit.node(node).map_or("", |data| data.spelling.as_str())
    }

    pub(crate) fn has_typedef_name(&self, node: NodeId) -> bool {
        self.unit
            .node(node)
            .is_some_and(|data| data.typedef_name.is_some())
    }

    #[must_use]
    pub fn finish(self) -> TranslationUnit {
        self.unit
    }

    fn declared(&mut self, kind: TypeKind, decl: NodeId) -> TypeId {
        let spelling = self.unit.node(decl).map_or_else(String::new, |node| {
            let keyword = match node.kind {
                CursorKind::StructDecl => "struct ",
                CursorKind::UnionDecl => "union ",
                CursorKind::EnumDecl => "enum ",
                _ => "",
            };
            if node.spelling.is_empty() {
                format!("{keyword}(anonymous)")
            } else {
                format!("{keyword}{}", node.spelling)
            }
        });
        let mut data = TypeData::new(kind, spelling);
        data.decl = Some(decl);
        self.push_type(data)
    }

    fn push_type(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(u32::try_from(self.unit.types.len()).unwrap_or(u32::MAX));
        self.unit.types.push(data);
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.unit.nodes.get_mut(id.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_unit_has_only_root() {
        let unit = UnitBuilder::new("empty.h", "").finish();
        assert!(unit.is_empty());
        assert_eq!(unit.cursor().kind(), CursorKind::TranslationUnit);
        assert_eq!(unit.cursor().spelling(), "empty.h");
    }

    #[test]
    fn added_nodes_become_children_in_order() {
        let mut b = UnitBuilder::new("t.h", "");
        let root = b.root();
        let first = b.add(root, CursorKind::EnumDecl, "A");
        let second = b.add(root, CursorKind::StructDecl, "B");
        let unit = b.finish();
        let ids: Vec<_> = unit.cursor().children().map(|c| c.id()).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn type_spellings_follow_c_syntax() {
        let mut b = UnitBuilder::new("t.h", "");
        let char_ty = b.builtin(TypeKind::CharS);
        let const_char = b.qualified_const(char_ty);
        let ptr = b.pointer(const_char);
        let int = b.builtin(TypeKind::Int);
        let array = b.constant_array(int, 4);
        let func = b.function(int, vec![ptr], true);
        let fn_ptr = b.pointer(func);
        let unit = b.finish();

        assert_eq!(unit.type_data(ptr).spelling, "const char *");
        assert_eq!(unit.type_data(array).spelling, "int [4]");
        assert_eq!(unit.type_data(func).spelling, "int (const char *, ...)");
        assert_eq!(unit.type_data(fn_ptr).spelling, "int (*)(const char *, ...)");
    }

    #[test]
    fn qualifying_twice_is_a_no_op() {
        let mut b = UnitBuilder::new("t.h", "");
        let int = b.builtin(TypeKind::Int);
        let once = b.qualified_const(int);
        let twice = b.qualified_const(once);
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_type_id_reads_as_invalid() {
        let unit = UnitBuilder::new("t.h", "").finish();
        assert_eq!(unit.type_data(TypeId(99)).kind, TypeKind::Invalid);
    }
}
