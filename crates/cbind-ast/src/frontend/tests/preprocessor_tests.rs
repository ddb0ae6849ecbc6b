use pretty_assertions::assert_eq;

use super::*;
use crate::{MacroValue, ParseOptions, TypeKind, parse_source_unit_with};

fn var_names(unit: &TranslationUnit) -> Vec<String> {
    child_names(unit.cursor(), CursorKind::VarDecl)
}

// ── Includes and macros ───────────────────────────────────────────

#[test]
fn includes_are_recorded() {
    let unit = parse("#include <stddef.h>\n#include \"config.h\"\n");
    assert_eq!(
        child_names(unit.cursor(), CursorKind::InclusionDirective),
        vec!["stddef.h", "config.h"]
    );
}

#[test]
fn object_like_macro_values() {
    let unit = parse(
        "#define MAJOR 2\n#define VERSION ((MAJOR << 8) | 7)\n#define NAME \"demo\"\n#define RATIO 0.5\n#define EMPTY\n",
    );
    let value = |name| find(&unit, CursorKind::MacroDefinition, name).macro_value().cloned();
    assert_eq!(
        value("VERSION"),
        Some(MacroValue::Int {
            value: 519,
            unsigned: false
        })
    );
    assert_eq!(value("NAME"), Some(MacroValue::Bytes(b"demo".to_vec())));
    assert_eq!(value("RATIO"), Some(MacroValue::Float(0.5)));
    assert_eq!(value("EMPTY"), None);
    let version = find(&unit, CursorKind::MacroDefinition, "VERSION");
    assert_eq!(version.value_text(), Some("((MAJOR << 8) | 7)"));
}

#[test]
fn function_like_macro_is_flagged() {
    let unit = parse("#define MAX(a, b) ((a) > (b) ? (a) : (b))\n#define ONE 1\n");
    assert!(find(&unit, CursorKind::MacroDefinition, "MAX").is_function_like_macro());
    assert!(find(&unit, CursorKind::MacroDefinition, "MAX").macro_value().is_none());
    assert!(!find(&unit, CursorKind::MacroDefinition, "ONE").is_function_like_macro());
}

// ── Conditionals ──────────────────────────────────────────────────

#[test]
fn undefined_name_takes_the_alternative() {
    let unit = parse("#ifdef __cplusplus\nint cpp;\n#else\nint c;\n#endif\n");
    assert_eq!(var_names(&unit), vec!["c"]);
}

#[test]
fn ifndef_guard_body_is_lowered() {
    let unit = parse("#ifndef GUARD_H\n#define GUARD_H\nint inside;\n#endif\n");
    assert_eq!(var_names(&unit), vec!["inside"]);
    assert!(try_find(&unit, CursorKind::MacroDefinition, "GUARD_H").is_some());
}

#[test]
fn if_zero_is_skipped() {
    let unit = parse("#if 0\nint dead;\n#else\nint live;\n#endif\n");
    assert_eq!(var_names(&unit), vec!["live"]);
}

#[test]
fn defined_operator_sees_earlier_macros() {
    let unit = parse("#define FEATURE\n#if defined(FEATURE) && !defined(OTHER)\nint feature;\n#endif\n");
    assert_eq!(var_names(&unit), vec!["feature"]);
}

#[test]
fn elif_chain_picks_the_matching_branch() {
    let unit = parse(
        "#define LEVEL 2\n#if LEVEL == 1\nint one;\n#elif LEVEL == 2\nint two;\n#else\nint other;\n#endif\n",
    );
    assert_eq!(var_names(&unit), vec!["two"]);
}

#[test]
fn undef_removes_a_macro() {
    let unit = parse("#define X 1\n#undef X\n#ifdef X\nint yes;\n#else\nint no;\n#endif\n");
    assert_eq!(var_names(&unit), vec!["no"]);
}

#[test]
fn unfoldable_condition_takes_the_primary_branch() {
    let unit = parse("#if CHECK_VERSION(2, 1)\nint primary;\n#else\nint other;\n#endif\n");
    assert_eq!(var_names(&unit), vec!["primary"]);
}

#[test]
fn predefined_macros_drive_conditionals() {
    let options = ParseOptions {
        defines: vec!["FEATURE".to_string(), "LEVEL=3".to_string()],
    };
    let unit = parse_source_unit_with(
        "#ifdef FEATURE\nint feature;\n#endif\n#if LEVEL > 2\nint high;\n#endif\n",
        "test.h",
        &options,
    )
    .expect("parse should succeed");
    assert_eq!(var_names(&unit), vec!["feature", "high"]);
}

#[test]
fn extern_c_block_contents_are_lowered() {
    let unit = parse("extern \"C\" {\nint inside(void);\n}\n");
    assert!(try_find(&unit, CursorKind::FunctionDecl, "inside").is_some());
}

#[test]
fn linkage_guards_around_extern_c_are_transparent() {
    let unit = parse(
        "#ifdef __cplusplus\nextern \"C\" {\n#endif\n\nint a;\nstruct s { int x; };\n\n#ifdef __cplusplus\n}\n#endif\n",
    );
    assert!(!unit.has_errors(), "unexpected errors: {}", unit.error_count());
    assert_eq!(var_names(&unit), vec!["a"]);
    assert!(try_find(&unit, CursorKind::StructDecl, "s").is_some());
}

#[test]
fn defined_form_of_the_linkage_guard() {
    let unit = parse(
        "#if defined(__cplusplus)\nextern \"C\" {\n#endif\nint f(void);\n#if defined(__cplusplus)\n} /* extern \"C\" */\n#endif\n",
    );
    assert!(!unit.has_errors());
    assert!(try_find(&unit, CursorKind::FunctionDecl, "f").is_some());
}

// ── Empty macros ──────────────────────────────────────────────────

#[test]
fn empty_export_macro_expands_to_nothing() {
    let unit = parse("#define API\nAPI int f(void);\nAPI extern int count;\n");
    assert!(!unit.has_errors());
    let f = find(&unit, CursorKind::FunctionDecl, "f");
    assert_eq!(f.result_type().kind(), TypeKind::Int);
    assert_eq!(var_names(&unit), vec!["count"]);
}

#[test]
fn export_macro_takes_the_active_definition() {
    let unit = parse(
        "#if defined(_WIN32)\n#define API __declspec(dllexport)\n#else\n#define API\n#endif\nAPI int f(void);\n",
    );
    assert!(!unit.has_errors());
    assert_eq!(
        find(&unit, CursorKind::FunctionDecl, "f").result_type().kind(),
        TypeKind::Int
    );
}

#[test]
fn redefined_macro_stops_expanding_to_nothing() {
    let unit = parse("#define API\nAPI int before;\n#undef API\n#define API 1\nint after = API;\n");
    assert_eq!(var_names(&unit), vec!["before", "after"]);
}

#[test]
fn empty_predefined_macro_expands_to_nothing() {
    let options = ParseOptions {
        defines: vec!["API=".to_string()],
    };
    let unit = parse_source_unit_with("API int f(void);\n", "test.h", &options)
        .expect("parse should succeed");
    assert!(!unit.has_errors());
    assert!(try_find(&unit, CursorKind::FunctionDecl, "f").is_some());
}

// ── Errors and limits ─────────────────────────────────────────────

#[test]
fn missing_tokens_count_as_errors() {
    let unit = parse("struct s { int x;\n");
    assert!(unit.has_errors());
    assert!(unit.first_error().is_some());
}

#[test]
fn first_error_is_the_earliest() {
    let unit = parse("int ok;\n@@ not c @@\nint fine;\n@@ again @@\n");
    let first = unit.first_error().expect("errors should be recorded");
    assert_eq!((first.file, first.line), ("test.h", 2));
}

#[test]
fn deeply_nested_macro_is_left_unfolded() {
    let depth = 5000;
    let source = format!(
        "#define DEEP {}1{}\nint after;\n",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let unit = parse(&source);
    assert!(find(&unit, CursorKind::MacroDefinition, "DEEP").macro_value().is_none());
    assert_eq!(var_names(&unit), vec!["after"]);
}
