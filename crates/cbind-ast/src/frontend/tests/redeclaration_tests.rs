use pretty_assertions::assert_eq;

use super::*;

#[test]
fn forward_declaration_links_to_definition() {
    let unit = parse("struct node;\nstruct node { struct node *next; };");
    let decls: Vec<_> = unit.cursor().children().collect();
    assert_eq!(decls.len(), 2);
    let (forward, definition) = (decls[0], decls[1]);
    assert!(!forward.is_definition());
    assert!(definition.is_definition());
    assert_eq!(forward.definition(), Some(definition));
    assert_eq!(definition.definition(), Some(definition));
    assert_eq!(definition.canonical(), forward);
    assert_eq!(forward.canonical(), forward);
    assert_eq!(forward.ty(), definition.ty());
}

#[test]
fn self_referencing_field_uses_the_same_type() {
    let unit = parse("struct node { struct node *next; };");
    let node = find(&unit, CursorKind::StructDecl, "node");
    let next = find(&unit, CursorKind::FieldDecl, "next");
    assert_eq!(next.ty().pointee(), Some(node.ty()));
}

#[test]
fn repeated_prototypes_share_a_canonical_declaration() {
    let unit = parse("int init(void);\nint init(void);");
    let decls: Vec<_> = unit.cursor().children().collect();
    assert_eq!(decls[1].canonical(), decls[0]);
    assert!(decls[0].definition().is_none());
}

#[test]
fn prototype_links_to_later_body() {
    let unit = parse("int twice(int x);\nint twice(int x) { return x + x; }");
    let decls: Vec<_> = unit.cursor().children().collect();
    assert_eq!(decls[0].definition(), Some(decls[1]));
    assert_eq!(decls[1].canonical(), decls[0]);
}

#[test]
fn reference_to_unknown_tag_creates_implicit_declaration() {
    let unit = parse("struct opaque *make(void);");
    let decls = child_kinds(unit.cursor());
    assert_eq!(decls, vec![CursorKind::StructDecl, CursorKind::FunctionDecl]);
    let opaque = find(&unit, CursorKind::StructDecl, "opaque");
    assert!(opaque.is_implicit());
    assert!(opaque.definition().is_none());
}

#[test]
fn reference_to_known_tag_adds_no_declaration() {
    let unit = parse("struct point { int x; };\nstruct point origin;");
    assert_eq!(
        child_kinds(unit.cursor()),
        vec![CursorKind::StructDecl, CursorKind::VarDecl]
    );
}
