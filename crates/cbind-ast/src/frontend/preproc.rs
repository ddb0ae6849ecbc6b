//! Preprocessor directives: includes, macros and conditional blocks.
//!
//! Conditionals are evaluated against the macros defined so far in the
//! file (plus any predefined on the command line). Nothing else is
//! predefined, so `#ifdef __cplusplus` takes the alternative branch. A
//! condition that does not fold takes the primary branch.
//!
//! The grammar cannot see through two common idioms, so they are handled
//! on the text: `#ifdef __cplusplus` blocks that only open or close an
//! `extern "C"` block, and macros defined as nothing (`#define API`)
//! written in front of declarations.

use std::ops::Range;

use ast_grep_core::Node;
use ast_grep_language::{LanguageExt, SupportLang};

use crate::kind::CursorKind;
use crate::unit::{MacroValue, NodeId};

use super::const_eval::{
    self, ConstEnv, Folded, MAX_EXPRESSION_DEPTH, parse_float_literal, unescape,
};
use super::{Lowering, has_error_nodes};

impl Lowering {
    pub(super) fn lower_include<D: ast_grep_core::Doc>(&mut self, node: &Node<D>, parent: NodeId) {
        let Some(path) = node.field("path") else {
            return;
        };
        let text = path.text();
        let spelling = text
            .trim()
            .trim_start_matches(['"', '<'])
            .trim_end_matches(['"', '>']);
        self.add_node(parent, CursorKind::InclusionDirective, spelling, node);
    }

    pub(super) fn lower_define<D: ast_grep_core::Doc>(&mut self, node: &Node<D>, parent: NodeId) {
        let Some(name) = node.field("name").map(|n| n.text().to_string()) else {
            return;
        };
        let body = node
            .field("value")
            .map_or_else(String::new, |v| v.text().trim().to_string());
        let id = self.add_node(parent, CursorKind::MacroDefinition, &name, node);
        let (value, folded) = macro_value(&body, &self.env);
        let range = node.range();
        self.end_empty_macro(&name, range.start);
        if body.is_empty() || self.is_empty_macro(&body) {
            self.empty_macros.push(EmptyMacro {
                name: name.clone(),
                active: range.end..usize::MAX,
            });
        }
        self.builder.set_macro(id, value, body, false);
        self.env.define(&name, folded);
    }

    pub(super) fn lower_function_macro<D: ast_grep_core::Doc>(
        &mut self,
        node: &Node<D>,
        parent: NodeId,
    ) {
        let Some(name) = node.field("name").map(|n| n.text().to_string()) else {
            return;
        };
        let body = node
            .field("value")
            .map_or_else(String::new, |v| v.text().trim().to_string());
        let id = self.add_node(parent, CursorKind::MacroDefinition, &name, node);
        self.end_empty_macro(&name, node.range().start);
        self.builder.set_macro(id, None, body, true);
        self.env.define(&name, None);
    }

    /// `#undef NAME`; other directives carry no declarations.
    pub(super) fn lower_preproc_call<D: ast_grep_core::Doc>(&mut self, node: &Node<D>) {
        let directive = node.field("directive").map(|d| d.text().to_string());
        if directive.as_deref() != Some("#undef") {
            return;
        }
        if let Some(argument) = node.field("argument") {
            let name = argument.text().trim().to_string();
            self.end_empty_macro(&name, node.range().start);
            self.env.undefine(&name);
        }
    }

    /// Define `NAME` or `NAME=VALUE` before the first line.
    pub(super) fn predefine(&mut self, define: &str) {
        let (name, body) = define.split_once('=').unwrap_or((define, "1"));
        let name = name.trim();
        if body.trim().is_empty() {
            self.empty_macros.push(EmptyMacro {
                name: name.to_string(),
                active: 0..usize::MAX,
            });
        }
        let (_, folded) = macro_value(body, &self.env);
        self.env.define(name, folded);
    }

    /// Whether `name` currently expands to nothing.
    fn is_empty_macro(&self, name: &str) -> bool {
        self.empty_macros
            .iter()
            .any(|m| m.name == name && m.active.end == usize::MAX)
    }

    /// A redefinition or `#undef` at `offset` ends an empty expansion.
    fn end_empty_macro(&mut self, name: &str, offset: usize) {
        for empty in &mut self.empty_macros {
            if empty.name == name && empty.active.end == usize::MAX {
                empty.active.end = offset;
            }
        }
    }

    /// Items of the branch a conditional block takes.
    pub(super) fn select_branch<'r, D: ast_grep_core::Doc>(
        &self,
        node: &Node<'r, D>,
    ) -> Vec<Node<'r, D>> {
        let mut current = node.clone();
        loop {
            if self.branch_taken(&current) {
                return branch_items(&current);
            }
            match current.field("alternative") {
                Some(alternative) => current = alternative,
                None => return Vec::new(),
            }
        }
    }

    fn branch_taken<D: ast_grep_core::Doc>(&self, node: &Node<D>) -> bool {
        match node.kind().as_ref() {
            "preproc_ifdef" | "preproc_elifdef" => {
                let negated = node
                    .children()
                    .any(|c| matches!(c.kind().as_ref(), "#ifndef" | "#elifndef"));
                let defined = node
                    .field("name")
                    .is_some_and(|name| self.env.is_defined(&name.text()));
                defined != negated
            }
            "preproc_if" | "preproc_elif" => node
                .field("condition")
                .and_then(|condition| const_eval::fold_condition(&condition, &self.env))
                .is_none_or(|value| value.value != 0),
            _ => true,
        }
    }
}

/// A macro defined as nothing, and the byte range where that holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct EmptyMacro {
    pub(super) name: String,
    pub(super) active: Range<usize>,
}

/// Identifier tokens outside directives, comments and literals that name
/// an empty macro in effect at their position.
pub(super) fn empty_macro_uses<D: ast_grep_core::Doc>(
    root: &Node<D>,
    empty_macros: &[EmptyMacro],
) -> Vec<Range<usize>> {
    if empty_macros.is_empty() {
        return Vec::new();
    }
    let mut uses = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        let kind = node.kind();
        match kind.as_ref() {
            "preproc_def" | "preproc_function_def" | "preproc_call" | "preproc_include"
            | "comment" | "string_literal" | "char_literal" | "system_lib_string" => continue,
            "identifier" | "type_identifier" | "field_identifier" => {
                let range = node.range();
                let text = node.text();
                if empty_macros
                    .iter()
                    .any(|m| m.name == text && m.active.contains(&range.start))
                {
                    uses.push(range);
                }
                continue;
            }
            _ => {}
        }
        // Conditions and tested names are not expanded here.
        let tested: Vec<_> = ["condition", "name"]
            .into_iter()
            .filter(|_| kind.starts_with("preproc_"))
            .filter_map(|field| node.field(field).map(|n| n.range()))
            .collect();
        stack.extend(
            node.children()
                .filter(|child| !tested.contains(&child.range())),
        );
    }
    uses
}

/// Overwrite `range` with spaces; offsets and lines stay where they were.
pub(super) fn blank(text: &mut String, range: Range<usize>) {
    if let Some(slice) = text.get(range.clone()) {
        let spaces = " ".repeat(slice.len());
        text.replace_range(range, &spaces);
    }
}

/// `source` with `#ifdef __cplusplus` guards around `extern "C" {` and
/// its closing `}` blanked out.
///
/// Only a guard whose body is nothing but those lines (plus blanks and
/// comments) is touched; any other `__cplusplus` block is left for the
/// conditional evaluation.
pub(super) fn blank_linkage_guards(source: &str) -> String {
    let mut lines = Vec::new();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        lines.push(offset..offset + content.len());
        offset += line.len();
    }
    let mut text = source.to_string();
    let mut i = 0;
    while i < lines.len() {
        if is_cplusplus_test(&source[lines[i].clone()])
            && let Some(end) = linkage_guard_end(source, &lines, i)
        {
            for line in &lines[i..=end] {
                blank(&mut text, line.clone());
            }
            i = end + 1;
        } else {
            i += 1;
        }
    }
    text
}

/// Index of the `#endif` closing a linkage guard that starts at `start`.
fn linkage_guard_end(source: &str, lines: &[Range<usize>], start: usize) -> Option<usize> {
    let mut linkage = false;
    for (idx, line) in lines.iter().enumerate().skip(start + 1) {
        let code = compact(&source[line.clone()]);
        match code.as_str() {
            "" => {}
            "#endif" => return linkage.then_some(idx),
            "extern\"C\"{" | "}" => linkage = true,
            _ => return None,
        }
    }
    None
}

fn is_cplusplus_test(line: &str) -> bool {
    matches!(
        compact(line).as_str(),
        "#ifdef__cplusplus" | "#ifdefined(__cplusplus)" | "#ifdefined__cplusplus"
    )
}

/// A line without comments or whitespace.
fn compact(line: &str) -> String {
    let mut code = line.split("//").next().unwrap_or_default().to_string();
    while let Some(open) = code.find("/*") {
        let Some(close) = code[open..].find("*/") else {
            break;
        };
        code.replace_range(open..open + close + 2, " ");
    }
    code.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Children of a conditional branch, without its directive, condition
/// and alternative.
fn branch_items<'r, D: ast_grep_core::Doc>(node: &Node<'r, D>) -> Vec<Node<'r, D>> {
    let excluded: Vec<_> = ["name", "condition", "alternative"]
        .into_iter()
        .filter_map(|field| node.field(field).map(|n| n.range()))
        .collect();
    node.children()
        .filter(|child| !child.kind().starts_with('#'))
        .filter(|child| !excluded.contains(&child.range()))
        .collect()
}

/// Folded value of an object-like macro body.
///
/// The body is parsed as an initializer expression. Integer expressions
/// fold through the environment; floating and string literals are kept as
/// literal values.
fn macro_value(body: &str, env: &ConstEnv) -> (Option<MacroValue>, Option<Folded>) {
    let body = body.trim();
    if body.is_empty() {
        return (None, None);
    }
    let wrapped = format!("int __cbind_value = ({body});");
    let tree = SupportLang::C.ast_grep(wrapped.as_str());
    let root = tree.root();
    if has_error_nodes(&root) {
        return (None, None);
    }
    let Some(value) = root
        .children()
        .find(|c| c.kind().as_ref() == "declaration")
        .and_then(|d| d.field("declarator"))
        .and_then(|d| d.field("value"))
    else {
        return (None, None);
    };
    if let Some(folded) = const_eval::fold(&value, env) {
        let int = MacroValue::Int {
            value: folded.value,
            unsigned: folded.unsigned,
        };
        return (Some(int), Some(folded));
    }
    (literal_value(&value, 0), None)
}

fn literal_value<D: ast_grep_core::Doc>(node: &Node<D>, depth: usize) -> Option<MacroValue> {
    if depth >= MAX_EXPRESSION_DEPTH {
        return None;
    }
    match node.kind().as_ref() {
        "parenthesized_expression" => node
            .children()
            .find(|c| !matches!(c.kind().as_ref(), "(" | ")"))
            .and_then(|inner| literal_value(&inner, depth + 1)),
        "unary_expression" => {
            let negate = node.field("operator")?.text().as_ref() == "-";
            match literal_value(&node.field("argument")?, depth + 1)? {
                MacroValue::Float(value) if negate => Some(MacroValue::Float(-value)),
                float @ MacroValue::Float(_) => Some(float),
                _ => None,
            }
        }
        "number_literal" => parse_float_literal(&node.text()).map(MacroValue::Float),
        "string_literal" => string_bytes(node).map(MacroValue::Bytes),
        "concatenated_string" => {
            let mut bytes = Vec::new();
            for part in node
                .children()
                .filter(|c| c.kind().as_ref() == "string_literal")
            {
                bytes.extend(string_bytes(&part)?);
            }
            Some(MacroValue::Bytes(bytes))
        }
        _ => None,
    }
}

/// Bytes of a narrow string literal; wide literals are not representable.
fn string_bytes<D: ast_grep_core::Doc>(node: &Node<D>) -> Option<Vec<u8>> {
    let text = node.text();
    let text = text.strip_prefix("u8").unwrap_or(&text);
    let body = text.strip_prefix('"')?.strip_suffix('"')?;
    unescape(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_macro_folds() {
        let (value, folded) = macro_value("(1 << 3) | 1", &ConstEnv::default());
        assert_eq!(
            value,
            Some(MacroValue::Int {
                value: 9,
                unsigned: false
            })
        );
        assert_eq!(folded.map(|f| f.value), Some(9));
    }

    #[test]
    fn float_and_string_macros_keep_literals() {
        let (value, folded) = macro_value("-2.5", &ConstEnv::default());
        assert_eq!(value, Some(MacroValue::Float(-2.5)));
        assert!(folded.is_none());

        let (value, _) = macro_value(r#""ab" "c\n""#, &ConstEnv::default());
        assert_eq!(value, Some(MacroValue::Bytes(b"abc\n".to_vec())));
    }

    #[test]
    fn type_and_statement_bodies_do_not_fold() {
        assert_eq!(macro_value("unsigned int", &ConstEnv::default()).0, None);
        assert_eq!(macro_value("do { } while (0)", &ConstEnv::default()).0, None);
        assert_eq!(macro_value("", &ConstEnv::default()).0, None);
    }

    // ── Linkage guards ────────────────────────────────────────────────

    #[test]
    fn linkage_guards_become_spaces() {
        let source = "#ifdef __cplusplus\nextern \"C\" {\n#endif\nint a;\n#ifdef __cplusplus\n}\n#endif\n";
        let text = blank_linkage_guards(source);
        assert_eq!(text.len(), source.len());
        assert_eq!(text.find("int a;"), source.find("int a;"));
        assert_eq!(text.trim(), "int a;");
        assert_eq!(text.lines().count(), source.lines().count());
    }

    #[test]
    fn guards_with_other_code_are_kept() {
        let source = "#ifdef __cplusplus\nint cplusplus_only;\n#else\nint c_only;\n#endif\n";
        assert_eq!(blank_linkage_guards(source), source);
        let source = "#ifdef __cplusplus\n#endif\n";
        assert_eq!(blank_linkage_guards(source), source);
    }

    #[test]
    fn guard_comments_are_ignored() {
        let source = "#if defined(__cplusplus) // C++\n} /* extern \"C\" */\n#endif\r\n";
        assert_eq!(blank_linkage_guards(source).trim(), "");
    }
}
