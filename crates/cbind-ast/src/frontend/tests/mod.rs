use crate::{ChildVisit, Cursor, CursorKind, TranslationUnit, parse_source_unit};

mod enum_tests;
mod preprocessor_tests;
mod redeclaration_tests;

fn parse(source: &str) -> TranslationUnit {
    parse_source_unit(source, "test.h").expect("parse should succeed")
}

/// First cursor of `kind` named `name`, searching the whole unit.
fn find<'tu>(unit: &'tu TranslationUnit, kind: CursorKind, name: &str) -> Cursor<'tu> {
    try_find(unit, kind, name).unwrap_or_else(|| {
        let mut available = Vec::new();
        unit.cursor().visit_children(|c, _| {
            available.push(format!("{:?}: {:?}", c.kind(), c.spelling()));
            ChildVisit::Recurse
        });
        panic!(
            "{kind:?} {name:?} not found. Available cursors:\n{}",
            available.join("\n")
        );
    })
}

fn try_find<'tu>(unit: &'tu TranslationUnit, kind: CursorKind, name: &str) -> Option<Cursor<'tu>> {
    let mut found = None;
    unit.cursor().visit_children(|c, _| {
        if c.kind() == kind && c.spelling() == name {
            found = Some(c);
            ChildVisit::Break
        } else {
            ChildVisit::Recurse
        }
    });
    found
}

fn child_kinds(cursor: Cursor<'_>) -> Vec<CursorKind> {
    cursor.children().map(|c| c.kind()).collect()
}

fn child_names(cursor: Cursor<'_>, kind: CursorKind) -> Vec<String> {
    cursor
        .children()
        .filter(|c| c.kind() == kind)
        .map(|c| c.spelling().to_string())
        .collect()
}
