use pretty_assertions::assert_eq;

use super::*;

const API_H: &str = include_str!("../../../tests/fixtures/api.h");
const GUARDED_H: &str = include_str!("../../../tests/fixtures/guarded.h");

fn api() -> (String, Vec<Diagnostic>) {
    let unit = parse_source_unit(API_H, "api.h").expect("parse api.h");
    let mut translator = Translator::new(&unit, TranslateOptions::default());
    let text = translator.translate_unit();
    (text, translator.diagnostics().to_vec())
}

#[test]
fn preamble_comes_first() {
    let (text, _) = api();
    assert!(text.starts_with(
        "// Generated by cbind from `api.h`.\n\n#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals, dead_code)]\n\n"
    ));
}

#[test]
fn macros_become_constants() {
    let (text, _) = api();
    assert!(text.contains("pub const API_VERSION: i32 = 3;\n"));
    assert!(text.contains("pub const API_NAME: &[u8; 4] = b\"api\\0\";\n"));
    assert!(text.contains("pub const API_SCALE: f64 = 1.5;\n"));
    assert!(!text.contains("API_MIN"));
    assert!(!text.contains("API_H"));
}

#[test]
fn enum_with_alias() {
    let (text, _) = api();
    assert!(text.contains(
        "/// Log levels.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum api_level {
    LEVEL_TRACE = 0,
    LEVEL_DEBUG = 1,
    LEVEL_INFO = 4,
}

impl api_level {
    pub const LEVEL_DEFAULT: api_level = api_level::LEVEL_INFO;
}
"
    ));
}

#[test]
fn buffer_hoists_its_anonymous_flags() {
    let (text, _) = api();
    assert!(text.contains(
        "#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct _Anonymous_0 {
    // bitfield: 1
    pub owned: ::core::ffi::c_uint,
    // bitfield: 1
    pub frozen: ::core::ffi::c_uint,
}

/// A byte buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct api_buffer {
    pub data: *mut u8,
    pub len: usize,
    pub flags: _Anonymous_0,
}
"
    ));
}

#[test]
fn variant_holding_a_union_is_not_debug() {
    let (text, _) = api();
    assert!(text.contains("#[derive(Clone, Copy)]\npub union api_value {"));
    assert!(text.contains("#[derive(Clone, Copy)]\npub struct api_variant {"));
}

#[test]
fn context_is_opaque() {
    let (text, _) = api();
    assert!(text.contains("pub struct api_context {\n    _unused: [u8; 0],\n}\n"));
}

#[test]
fn functions_and_variables() {
    let (text, _) = api();
    assert!(text.contains(
        "pub type api_callback = Option<unsafe extern \"C\" fn(*mut api_context, *mut ::core::ffi::c_void)>;\n"
    ));
    assert!(text.contains("    pub static api_banner: *const ::core::ffi::c_char;\n"));
    assert!(text.contains("    pub static mut api_errno: ::core::ffi::c_int;\n"));
    assert!(text.contains(
        "unsafe extern \"C\" {
    /// Create a context.
    pub fn api_open(path: *const ::core::ffi::c_char, on_event: api_callback, user: *mut ::core::ffi::c_void) -> *mut api_context;
}
"
    ));
    assert!(text.contains(
        "    pub fn api_printf(ctx: *mut api_context, fmt: *const ::core::ffi::c_char, ...) -> ::core::ffi::c_int;\n"
    ));
    assert!(!text.contains("api_twice"));
}

#[test]
fn diagnostics_name_what_degraded() {
    let (text, diagnostics) = api();
    assert!(text.contains("pub fn api_precise() -> __UnknownType /* long double */;"));
    assert_eq!(
        diagnostic_kinds(&diagnostics),
        vec![
            DiagnosticKind::BitfieldLayout,
            DiagnosticKind::BitfieldLayout,
            DiagnosticKind::UnresolvedType,
        ]
    );
}

#[test]
fn every_item_is_separated_by_one_blank_line() {
    let (text, _) = api();
    assert!(!text.contains("\n\n\n"));
    assert!(text.ends_with("}\n"));
}

// ── Export macros and linkage guards ──────────────────────────────

fn guarded() -> (String, Vec<Diagnostic>) {
    let unit = parse_source_unit(GUARDED_H, "guarded.h").expect("parse guarded.h");
    assert!(!unit.has_errors(), "unexpected errors: {}", unit.error_count());
    let mut translator = Translator::new(&unit, TranslateOptions::default());
    let text = translator.translate_unit();
    (text, translator.diagnostics().to_vec())
}

#[test]
fn guarded_header_translates_cleanly() {
    let (_, diagnostics) = guarded();
    assert_eq!(diagnostics, Vec::new());
}

#[test]
fn guarded_functions_lose_the_export_macro() {
    let (text, _) = guarded();
    assert!(text.contains(
        "    pub fn guarded_open(path: *const ::core::ffi::c_char) -> *mut guarded_ctx;\n"
    ));
    assert!(text.contains("    pub fn guarded_close(ctx: *mut guarded_ctx);\n"));
    assert!(text.contains(
        "    pub fn guarded_distance(a: *const guarded_point, b: *const guarded_point) -> ::core::ffi::c_int;\n"
    ));
    assert!(text.contains("    pub static mut guarded_count: ::core::ffi::c_int;\n"));
    assert!(!text.contains("GUARDED_API"));
}

#[test]
fn guarded_types_are_emitted_once() {
    let (text, _) = guarded();
    assert!(text.contains("pub struct guarded_ctx {\n    _unused: [u8; 0],\n}\n"));
    assert!(text.contains(
        "pub struct guarded_point {\n    pub x: ::core::ffi::c_int,\n    pub y: ::core::ffi::c_int,\n}\n"
    ));
    assert_eq!(text.matches("pub struct guarded_ctx").count(), 1);
    assert!(!text.contains("pub type guarded_ctx"));
}
