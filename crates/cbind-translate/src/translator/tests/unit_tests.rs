use pretty_assertions::assert_eq;

use super::*;
use crate::error::TranslateError;
use crate::options::AnonymousNaming;

// ── Preamble and layout ───────────────────────────────────────────

#[test]
fn preamble_names_the_file() {
    let (text, _) = translate_with("extern int a;", TranslateOptions::default());
    assert_eq!(
        text,
        "// Generated by cbind from `test.h`.

#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals, dead_code)]

unsafe extern \"C\" {
    pub static mut a: ::core::ffi::c_int;
}
"
    );
}

#[test]
fn items_are_separated_by_a_blank_line() {
    assert_eq!(
        translate("extern int a;\nextern int b;"),
        "unsafe extern \"C\" {
    pub static mut a: ::core::ffi::c_int;
}

unsafe extern \"C\" {
    pub static mut b: ::core::ffi::c_int;
}
"
    );
}

#[test]
fn custom_indent_and_ffi_prefix() {
    let options = TranslateOptions {
        indent_width: 2,
        ffi_prefix: "libc".to_string(),
        ..bare_options()
    };
    let (text, _) = translate_with("struct p { int x; };", options);
    assert!(text.contains("\n  pub x: libc::c_int,\n"));
}

#[test]
fn struct_derives_follow_options() {
    let options = TranslateOptions {
        struct_derives: Vec::new(),
        ..bare_options()
    };
    let (text, _) = translate_with("struct p { int x; };", options);
    assert!(!text.contains("#[derive"));
}

// ── Dispatch ──────────────────────────────────────────────────────

#[test]
fn cursors_without_a_handler_translate_to_nothing() {
    let unit = parse("#include <stdio.h>\n_Static_assert(1, \"ok\");");
    let mut translator = Translator::new(&unit, bare_options());
    let root = unit.cursor();
    for child in root.children() {
        assert_eq!(translator.translate_declaration(child, root), "");
    }
}

#[test]
fn forward_declaration_is_not_an_emission_site() {
    let unit = parse("struct s;\nstruct s { int a; };");
    let mut translator = Translator::new(&unit, bare_options());
    let root = unit.cursor();
    let decls: Vec<_> = root.children().collect();
    assert_eq!(translator.translate_declaration(decls[0], root), "");
    assert!(
        translator
            .translate_declaration(decls[1], root)
            .contains("pub struct s {")
    );
}

#[test]
fn nested_declaration_translates_under_its_record() {
    let unit = parse("struct outer { struct inner { int a; } in; };");
    let mut translator = Translator::new(&unit, bare_options());
    let outer = find(&unit, CursorKind::StructDecl, "outer");
    let inner = find(&unit, CursorKind::StructDecl, "inner");
    assert!(
        translator
            .translate_declaration(inner, outer)
            .starts_with("#[repr(C)]\n")
    );
}

#[test]
fn translating_twice_gives_the_same_text() {
    let unit = parse("struct { int a; } first;\nstruct { int b; } second;");
    let mut translator = Translator::new(&unit, bare_options());
    let root = unit.cursor();
    let tag = root.children().next().expect("first struct");
    let once = translator.translate_declaration(tag, root);
    let twice = translator.translate_declaration(tag, root);
    assert_eq!(once, twice);
    assert!(once.contains("pub struct _Anonymous_0 {"));
}

// ── Anonymous names ───────────────────────────────────────────────

#[test]
fn anonymous_names_are_stable_across_runs() {
    let source = "struct { int a; } first;\nunion { int b; } second;\nenum { C } third;";
    assert_eq!(translate(source), translate(source));
    let text = translate(source);
    assert!(text.contains("pub static mut first: _Anonymous_0;"));
    assert!(text.contains("pub static mut second: _Anonymous_1;"));
    assert!(text.contains("pub static mut third: _Anonymous_2;"));
}

#[test]
fn location_naming_uses_file_and_position() {
    let options = TranslateOptions {
        anonymous_naming: AnonymousNaming::Location,
        anonymous_prefix: "Anon_".to_string(),
        ..bare_options()
    };
    let (text, _) = translate_with("struct { int a; } v;", options);
    assert!(text.contains("pub struct Anon_test_1_1 {"));
    assert!(text.contains("pub static mut v: Anon_test_1_1;"));
}

// ── Diagnostics ───────────────────────────────────────────────────

#[test]
fn unresolved_field_does_not_stop_the_run() {
    let (text, diagnostics) = translate_with(
        "struct wide { long double x; int y; };\nextern int after;",
        bare_options(),
    );
    assert_eq!(
        text,
        "#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct wide {
    pub x: __UnknownType /* long double */,
    pub y: ::core::ffi::c_int,
}

unsafe extern \"C\" {
    pub static mut after: ::core::ffi::c_int;
}
"
    );
    assert_eq!(
        diagnostic_kinds(&diagnostics),
        vec![DiagnosticKind::UnresolvedType]
    );
}

#[test]
fn syntax_errors_are_reported_once() {
    let (text, diagnostics) = translate_with("extern int ok;\n@@ not c @@\n", bare_options());
    assert!(text.contains("pub static mut ok"));
    assert_eq!(
        diagnostic_kinds(&diagnostics),
        vec![DiagnosticKind::ParseErrors]
    );
}

#[test]
fn syntax_errors_point_at_the_first_error() {
    let (_, diagnostics) =
        translate_with("int before;\n@@ not c @@\nint after;\n@@ again @@\n", bare_options());
    let [diagnostic] = diagnostics.as_slice() else {
        panic!("expected one diagnostic, got {diagnostics:?}");
    };
    assert_eq!(diagnostic.kind, DiagnosticKind::ParseErrors);
    assert!(diagnostic.location.starts_with("test.h:2:"), "{}", diagnostic.location);
}

/// Log sink shared between a test and its subscriber.
#[derive(Clone, Default)]
struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn diagnostics_stay_below_warn_in_the_log() {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(move || writer.clone())
        .finish();
    let diagnostics = tracing::subscriber::with_default(subscriber, || {
        translate_with("extern long double x;", bare_options()).1
    });
    assert_eq!(diagnostics.len(), 1);
    let logged = buffer.0.lock().expect("log buffer").clone();
    assert_eq!(String::from_utf8_lossy(&logged), "");
}

#[test]
fn repeated_problems_are_reported_once() {
    let unit = parse("extern long double x;");
    let mut translator = Translator::new(&unit, bare_options());
    translator.translate_unit();
    translator.translate_unit();
    assert_eq!(translator.diagnostics().len(), 1);
}

#[test]
fn strict_mode_fails_on_diagnostics() {
    let unit = parse("extern long double x;");
    let options = TranslateOptions {
        strict: true,
        ..bare_options()
    };
    let mut translator = Translator::new(&unit, options);
    translator.translate_unit();
    let err = translator.finish().expect_err("strict run should fail");
    let TranslateError::Strict { count, first } = err;
    assert_eq!(count, 1);
    assert!(first.contains("unresolved type"));
}

#[test]
fn clean_run_finishes_without_diagnostics() {
    let unit = parse("extern int x;");
    let options = TranslateOptions {
        strict: true,
        ..bare_options()
    };
    let mut translator = Translator::new(&unit, options);
    translator.translate_unit();
    assert_eq!(translator.finish().expect("clean run"), Vec::new());
}
