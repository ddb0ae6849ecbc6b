use pretty_assertions::assert_eq;

use super::*;
use crate::TypeKind;

// ── Value assignment ──────────────────────────────────────────────

#[test]
fn implicit_values_count_from_zero() {
    let unit = parse("enum color { RED, GREEN, BLUE };");
    let color = find(&unit, CursorKind::EnumDecl, "color");
    let values: Vec<_> = color
        .children()
        .map(|c| (c.spelling().to_string(), c.enum_constant_value()))
        .collect();
    assert_eq!(
        values,
        vec![
            ("RED".to_string(), Some(0)),
            ("GREEN".to_string(), Some(1)),
            ("BLUE".to_string(), Some(2)),
        ]
    );
}

#[test]
fn explicit_values_and_successors() {
    let unit = parse("enum status { OK = 0, RETRY = 10, AGAIN, FAILED = -1, NEXT };");
    let value = |name| find(&unit, CursorKind::EnumConstantDecl, name).enum_constant_value();
    assert_eq!(value("OK"), Some(0));
    assert_eq!(value("RETRY"), Some(10));
    assert_eq!(value("AGAIN"), Some(11));
    assert_eq!(value("FAILED"), Some(-1));
    assert_eq!(value("NEXT"), Some(0));
}

#[test]
fn values_can_reference_earlier_enumerators() {
    let unit = parse(
        "enum flags { NONE = 0, READ = 1 << 0, WRITE = 1 << 1, ALL = READ | WRITE };",
    );
    let all = find(&unit, CursorKind::EnumConstantDecl, "ALL");
    assert_eq!(all.enum_constant_value(), Some(3));
    assert_eq!(all.value_text(), Some("READ | WRITE"));
}

#[test]
fn unfoldable_values_keep_their_text() {
    let unit = parse("enum e { A = external_value, B, C };");
    let a = find(&unit, CursorKind::EnumConstantDecl, "A");
    let b = find(&unit, CursorKind::EnumConstantDecl, "B");
    let c = find(&unit, CursorKind::EnumConstantDecl, "C");
    assert_eq!(a.enum_constant_value(), None);
    assert_eq!(a.value_text(), Some("external_value"));
    assert_eq!(b.value_text(), Some("external_value + 1"));
    assert_eq!(c.value_text(), Some("external_value + 2"));
}

#[test]
fn compound_unfoldable_text_is_parenthesized() {
    let unit = parse("enum e { A = base | 4, B };");
    let b = find(&unit, CursorKind::EnumConstantDecl, "B");
    assert_eq!(b.value_text(), Some("(base | 4) + 1"));
}

// ── Integer type ──────────────────────────────────────────────────

#[test]
fn non_negative_enum_is_unsigned_int() {
    let unit = parse("enum color { RED, GREEN };");
    let color = find(&unit, CursorKind::EnumDecl, "color");
    assert_eq!(color.enum_integer_type().kind(), TypeKind::UInt);
}

#[test]
fn negative_value_makes_enum_signed() {
    let unit = parse("enum e { A = -5, B };");
    let e = find(&unit, CursorKind::EnumDecl, "e");
    assert_eq!(e.enum_integer_type().kind(), TypeKind::Int);
}

#[test]
fn wide_value_widens_enum() {
    let unit = parse("enum big { HUGE = 0x100000000 };");
    let big = find(&unit, CursorKind::EnumDecl, "big");
    assert_eq!(big.enum_integer_type().kind(), TypeKind::ULong);
    let huge = find(&unit, CursorKind::EnumConstantDecl, "HUGE");
    assert_eq!(huge.enum_constant_unsigned_value(), Some(0x1_0000_0000));
}

// ── Cursor shape ──────────────────────────────────────────────────

#[test]
fn explicit_value_expression_is_a_child() {
    let unit = parse("enum flags { WRITE = 1 << 1 };");
    let write = find(&unit, CursorKind::EnumConstantDecl, "WRITE");
    assert_eq!(child_kinds(write), vec![CursorKind::BinaryOperator]);
    let operator = write.children().next().expect("operator");
    assert_eq!(operator.spelling(), "<<");
    assert_eq!(
        child_kinds(operator),
        vec![CursorKind::IntegerLiteral, CursorKind::IntegerLiteral]
    );
}

#[test]
fn enum_definition_is_flagged() {
    let unit = parse("enum color { RED };");
    let color = find(&unit, CursorKind::EnumDecl, "color");
    assert!(color.is_definition());
    assert_eq!(color.ty().kind(), TypeKind::Enum);
    assert_eq!(color.ty().spelling(), "enum color");
}

#[test]
fn enumerators_inside_conditionals() {
    let unit = parse(
        "#define HAVE_EXTRA 1\nenum e {\n  A,\n#if HAVE_EXTRA\n  B,\n#endif\n  C\n};\n",
    );
    let e = find(&unit, CursorKind::EnumDecl, "e");
    assert_eq!(child_names(e, CursorKind::EnumConstantDecl), vec!["A", "B", "C"]);
    let c = find(&unit, CursorKind::EnumConstantDecl, "C");
    assert_eq!(c.enum_constant_value(), Some(2));
}
