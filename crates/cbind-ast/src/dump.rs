//! Debug views of a translation unit: a serializable cursor tree and an
//! indented text rendering of it.

use serde::Serialize;

use crate::cursor::Cursor;
use crate::kind::CursorKind;
use crate::unit::TranslationUnit;
use crate::{ChildVisit, MacroValue};

/// One cursor and its children, in a form that serializes to JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DumpNode {
    pub kind: CursorKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub spelling: String,
    pub line: u32,
    pub column: u32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DumpNode>,
}

impl DumpNode {
    /// Snapshot `cursor` and everything below it.
    #[must_use]
    pub fn from_cursor(cursor: Cursor<'_>) -> Self {
        let location = cursor.location();
        let ty = cursor.ty();
        Self {
            kind: cursor.kind(),
            spelling: cursor.spelling().to_string(),
            line: location.line,
            column: location.column,
            ty: ty.is_valid().then(|| ty.spelling().to_string()),
            value: value_of(cursor),
            children: cursor.children().map(Self::from_cursor).collect(),
        }
    }

    /// Number of nodes in this tree, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

/// Serializable tree of the whole unit.
#[must_use]
pub fn dump_unit(unit: &TranslationUnit) -> DumpNode {
    DumpNode::from_cursor(unit.cursor())
}

/// Indented text rendering, one cursor per line.
///
/// `max_depth` limits how deep below the root the rendering goes; `None`
/// renders everything.
#[must_use]
pub fn render_text(unit: &TranslationUnit, max_depth: Option<usize>) -> String {
    let mut out = String::new();
    let mut depths = vec![(unit.cursor(), 0usize)];
    unit.cursor().visit_children(|child, parent| {
        while depths.last().is_some_and(|(cursor, _)| *cursor != parent) {
            depths.pop();
        }
        let depth = depths.last().map_or(0, |(_, depth)| *depth);
        out.push_str(&render_line(child, depth));
        if max_depth.is_some_and(|max| depth + 1 >= max) {
            return ChildVisit::Continue;
        }
        depths.push((child, depth + 1));
        ChildVisit::Recurse
    });
    out
}

fn render_line(cursor: Cursor<'_>, depth: usize) -> String {
    let mut line = format!("{}{}", "  ".repeat(depth), cursor.kind());
    if !cursor.spelling().is_empty() {
        line.push_str(&format!(" {}", cursor.spelling()));
    }
    let ty = cursor.ty();
    if ty.is_valid() {
        line.push_str(&format!(" '{}'", ty.spelling()));
    }
    match (cursor.kind(), value_of(cursor)) {
        (CursorKind::FieldDecl, Some(width)) => line.push_str(&format!(" : {width}")),
        (_, Some(value)) => line.push_str(&format!(" = {value}")),
        (_, None) => {}
    }
    let location = cursor.location();
    line.push_str(&format!(" <{}:{}>\n", location.line, location.column));
    line
}

fn value_of(cursor: Cursor<'_>) -> Option<String> {
    match cursor.kind() {
        CursorKind::EnumConstantDecl => cursor
            .enum_constant_value()
            .map(|v| v.to_string())
            .or_else(|| cursor.value_text().map(str::to_string)),
        CursorKind::MacroDefinition => match cursor.macro_value() {
            Some(MacroValue::Int { value, .. }) => Some(value.to_string()),
            Some(MacroValue::Float(value)) => Some(value.to_string()),
            Some(MacroValue::Bytes(bytes)) => Some(format!("{:?}", String::from_utf8_lossy(bytes))),
            None => cursor
                .value_text()
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        },
        CursorKind::AlignedAttr => cursor.alignment().map(|v| v.to_string()),
        CursorKind::FieldDecl => cursor.bit_width().map(|w| w.to_string()),
        _ => None,
    }
}
