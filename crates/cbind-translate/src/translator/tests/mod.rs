use cbind_ast::{ChildVisit, Cursor, CursorKind, TranslationUnit, parse_source_unit};

use super::Translator;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::options::TranslateOptions;

mod fixture_translation;
mod unit_tests;

fn parse(source: &str) -> TranslationUnit {
    parse_source_unit(source, "test.h").expect("parse should succeed")
}

/// Options without the file preamble, so expectations start at the first
/// item.
fn bare_options() -> TranslateOptions {
    TranslateOptions {
        header_comment: false,
        allow_attributes: false,
        ..TranslateOptions::default()
    }
}

fn translate(source: &str) -> String {
    translate_with(source, bare_options()).0
}

fn translate_with(source: &str, options: TranslateOptions) -> (String, Vec<Diagnostic>) {
    let unit = parse(source);
    let mut translator = Translator::new(&unit, options);
    let text = translator.translate_unit();
    (text, translator.diagnostics().to_vec())
}

fn diagnostic_kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
    diagnostics.iter().map(|d| d.kind).collect()
}

/// First cursor of `kind` named `name`, searching the whole unit.
fn find<'tu>(unit: &'tu TranslationUnit, kind: CursorKind, name: &str) -> Cursor<'tu> {
    let mut found = None;
    unit.cursor().visit_children(|c, _| {
        if c.kind() == kind && c.spelling() == name {
            found = Some(c);
            ChildVisit::Break
        } else {
            ChildVisit::Recurse
        }
    });
    found.unwrap_or_else(|| panic!("{kind:?} {name:?} not found"))
}
