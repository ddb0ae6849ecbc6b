//! Cursors: copyable views of one node in a [`TranslationUnit`].

use std::hash::{Hash, Hasher};

use crate::kind::CursorKind;
use crate::location::SourceLocation;
use crate::ty::Type;
use crate::unit::{MacroValue, NodeData, NodeId, StorageClass, TranslationUnit, TypeId};

/// What a visit function wants the traversal to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildVisit {
    /// Stop the whole traversal, including every enclosing level.
    Break,
    /// Move on to the next sibling without descending.
    Continue,
    /// Visit this cursor's children before its next sibling.
    Recurse,
}

/// A borrowed reference to one AST node.
///
/// Cursors are never mutated and stay valid for as long as the unit they
/// borrow. Equality compares node identity within the same unit.
#[derive(Clone, Copy)]
pub struct Cursor<'tu> {
    unit: &'tu TranslationUnit,
    id: NodeId,
}

impl<'tu> Cursor<'tu> {
    pub(crate) const fn new(unit: &'tu TranslationUnit, id: NodeId) -> Self {
        Self { unit, id }
    }

    /// The null cursor of `unit`: kind `NoDeclFound`, no children.
    #[must_use]
    pub const fn null(unit: &'tu TranslationUnit) -> Self {
        Self {
            unit,
            id: NodeId::NULL,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.data().is_none()
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub const fn unit(&self) -> &'tu TranslationUnit {
        self.unit
    }

    fn data(&self) -> Option<&'tu NodeData> {
        self.unit.node(self.id)
    }

    fn cursor(&self, id: Option<NodeId>) -> Option<Self> {
        id.map(|id| self.unit.cursor_by_id(id))
            .filter(|cursor| !cursor.is_null())
    }

    const fn ty_of(&self, id: TypeId) -> Type<'tu> {
        Type::new(self.unit, id)
    }

    #[must_use]
    pub fn kind(&self) -> CursorKind {
        self.data().map_or(CursorKind::NoDeclFound, |d| d.kind)
    }

    /// Source name of the entity; empty for anonymous entities.
    #[must_use]
    pub fn spelling(&self) -> &'tu str {
        self.data().map_or("", |d| d.spelling.as_str())
    }

    /// A declaration written without a name.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.kind().is_declaration() && self.spelling().is_empty()
    }

    #[must_use]
    pub fn location(&self) -> SourceLocation<'tu> {
        let (line, column) = self.data().map_or((0, 0), |d| (d.line, d.column));
        SourceLocation {
            file: self.unit.file_name(),
            line,
            column,
        }
    }

    /// Source text covered by the node; empty for nodes without a source range.
    #[must_use]
    pub fn extent_text(&self) -> &'tu str {
        self.data()
            .and_then(|d| self.unit.source().get(d.extent.clone()))
            .unwrap_or("")
    }

    /// Enclosing entity; the null cursor for the translation unit itself.
    #[must_use]
    pub fn semantic_parent(&self) -> Self {
        self.data()
            .map_or_else(|| Self::null(self.unit), |d| self.unit.cursor_by_id(d.parent))
    }

    /// Direct children in source order.
    #[must_use]
    pub fn children(&self) -> Children<'tu> {
        Children {
            unit: self.unit,
            ids: self.data().map_or(&[][..], |d| d.children.as_slice()).iter(),
        }
    }

    /// Depth-first traversal of the children of this cursor.
    ///
    /// `visitor` receives `(child, parent)` and decides whether to skip,
    /// descend or stop. Returns `true` when the traversal was stopped by
    /// [`ChildVisit::Break`].
    pub fn visit_children<F>(&self, mut visitor: F) -> bool
    where
        F: FnMut(Self, Self) -> ChildVisit,
    {
        let mut stack: Vec<(Self, Children<'tu>)> = vec![(*self, self.children())];
        loop {
            let Some((parent, children)) = stack.last_mut() else {
                return false;
            };
            let parent = *parent;
            let Some(child) = children.next() else {
                stack.pop();
                continue;
            };
            match visitor(child, parent) {
                ChildVisit::Break => return true,
                ChildVisit::Continue => {}
                ChildVisit::Recurse => stack.push((child, child.children())),
            }
        }
    }

    /// Declared type; the invalid type for cursors without one.
    #[must_use]
    pub fn ty(&self) -> Type<'tu> {
        self.ty_of(self.data().map_or(TypeId::INVALID, |d| d.ty))
    }

    /// Aliased type of a typedef declaration.
    #[must_use]
    pub fn typedef_underlying_type(&self) -> Type<'tu> {
        match self.data() {
            Some(d) if d.kind == CursorKind::TypedefDecl => {
                self.ty_of(d.underlying.unwrap_or(TypeId::INVALID))
            }
            _ => self.ty_of(TypeId::INVALID),
        }
    }

    /// Integer type backing an enum declaration.
    #[must_use]
    pub fn enum_integer_type(&self) -> Type<'tu> {
        match self.data() {
            Some(d) if d.kind == CursorKind::EnumDecl => {
                self.ty_of(d.underlying.unwrap_or(TypeId::INVALID))
            }
            _ => self.ty_of(TypeId::INVALID),
        }
    }

    fn constant_value(&self) -> Option<i128> {
        self.data()
            .filter(|d| d.kind == CursorKind::EnumConstantDecl)
            .and_then(|d| d.value)
    }

    /// Folded value of an enum constant, read as signed.
    ///
    /// `None` when the constant expression could not be folded.
    #[must_use]
    pub fn enum_constant_value(&self) -> Option<i64> {
        let value = self.constant_value()?;
        i64::try_from(value)
            .ok()
            .or_else(|| u64::try_from(value).ok().map(|v| i64::from_ne_bytes(v.to_ne_bytes())))
    }

    /// Folded value of an enum constant, read as unsigned.
    #[must_use]
    pub fn enum_constant_unsigned_value(&self) -> Option<u64> {
        let value = self.constant_value()?;
        u64::try_from(value)
            .ok()
            .or_else(|| i64::try_from(value).ok().map(|v| u64::from_ne_bytes(v.to_ne_bytes())))
    }

    /// Source text of a value expression (enum constant initializer or
    /// macro body), when the source had one.
    #[must_use]
    pub fn value_text(&self) -> Option<&'tu str> {
        self.data().and_then(|d| d.value_text.as_deref())
    }

    /// Alignment requested by an `AlignedAttr` cursor.
    #[must_use]
    pub fn alignment(&self) -> Option<u64> {
        self.data()
            .filter(|d| d.kind == CursorKind::AlignedAttr)
            .and_then(|d| d.value)
            .and_then(|v| u64::try_from(v).ok())
    }

    #[must_use]
    pub fn storage_class(&self) -> StorageClass {
        self.data().map_or(StorageClass::None, |d| d.storage)
    }

    /// Whether this declaration is also the definition (has a body).
    #[must_use]
    pub fn is_definition(&self) -> bool {
        self.data().is_some_and(|d| d.is_definition)
    }

    /// The defining declaration of this entity, if the unit has one.
    #[must_use]
    pub fn definition(&self) -> Option<Self> {
        if self.is_definition() {
            return Some(*self);
        }
        self.cursor(self.data().and_then(|d| d.definition))
    }

    /// First declaration of this entity in the unit.
    #[must_use]
    pub fn canonical(&self) -> Self {
        self.cursor(self.data().and_then(|d| d.canonical))
            .unwrap_or(*self)
    }

    /// Entity a reference or `DeclRefExpr` points at.
    #[must_use]
    pub fn referenced(&self) -> Option<Self> {
        self.cursor(self.data().and_then(|d| d.referenced))
    }

    /// Typedef that names this anonymous record or enum.
    #[must_use]
    pub fn typedef_name(&self) -> Option<Self> {
        self.cursor(self.data().and_then(|d| d.typedef_name))
    }

    #[must_use]
    pub fn bit_width(&self) -> Option<u32> {
        self.data().and_then(|d| d.bit_width)
    }

    #[must_use]
    pub fn is_bitfield(&self) -> bool {
        self.bit_width().is_some()
    }

    #[must_use]
    pub fn is_variadic(&self) -> bool {
        self.ty().is_variadic()
    }

    /// Result type of a function declaration.
    #[must_use]
    pub fn result_type(&self) -> Type<'tu> {
        self.ty()
            .result_type()
            .unwrap_or_else(|| self.ty_of(TypeId::INVALID))
    }

    /// Parameter declarations of a function, in order.
    pub fn arguments(&self) -> impl Iterator<Item = Self> + 'tu {
        self.children()
            .filter(|child| child.kind() == CursorKind::ParmDecl)
    }

    #[must_use]
    pub fn macro_value(&self) -> Option<&'tu MacroValue> {
        self.data().and_then(|d| d.macro_value.as_ref())
    }

    #[must_use]
    pub fn is_function_like_macro(&self) -> bool {
        self.data().is_some_and(|d| d.function_like)
    }

    /// Documentation comment written directly above the declaration.
    #[must_use]
    pub fn comment(&self) -> Option<&'tu str> {
        self.data().and_then(|d| d.comment.as_deref())
    }

    /// Whether the node was synthesized rather than written in the source.
    #[must_use]
    pub fn is_implicit(&self) -> bool {
        self.data().is_some_and(|d| d.implicit)
    }
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.unit, other.unit) && self.id == other.id
    }
}

impl Eq for Cursor<'_> {}

impl Hash for Cursor<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.unit, state);
        self.id.hash(state);
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let location = self.location();
        f.debug_struct("Cursor")
            .field("kind", &self.kind())
            .field("spelling", &self.spelling())
            .field("line", &location.line)
            .field("column", &location.column)
            .finish()
    }
}

/// Lazy iterator over a cursor's direct children.
#[derive(Clone)]
pub struct Children<'tu> {
    unit: &'tu TranslationUnit,
    ids: std::slice::Iter<'tu, NodeId>,
}

impl<'tu> Iterator for Children<'tu> {
    type Item = Cursor<'tu>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|id| Cursor::new(self.unit, *id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.ids.next_back().map(|id| Cursor::new(self.unit, *id))
    }
}
