//! Expression cursors for initializers and constant expressions.

use ast_grep_core::Node;

use crate::kind::CursorKind;
use crate::unit::NodeId;

use super::Lowering;
use super::const_eval::{self, MAX_EXPRESSION_DEPTH, parse_float_literal, parse_integer_literal};

fn expression_kind<D: ast_grep_core::Doc>(node: &Node<D>) -> Option<CursorKind> {
    let kind = match node.kind().as_ref() {
        "number_literal" => {
            let text = node.text();
            if parse_integer_literal(&text).is_none() && parse_float_literal(&text).is_some() {
                CursorKind::FloatingLiteral
            } else {
                CursorKind::IntegerLiteral
            }
        }
        "char_literal" => CursorKind::CharacterLiteral,
        "string_literal" | "concatenated_string" => CursorKind::StringLiteral,
        "identifier" => CursorKind::DeclRefExpr,
        "parenthesized_expression" => CursorKind::ParenExpr,
        "unary_expression" | "pointer_expression" => CursorKind::UnaryOperator,
        "binary_expression" => CursorKind::BinaryOperator,
        "conditional_expression" => CursorKind::ConditionalOperator,
        "cast_expression" => CursorKind::CStyleCastExpr,
        "sizeof_expression" | "alignof_expression" => CursorKind::UnaryExpr,
        "call_expression" => CursorKind::CallExpr,
        "initializer_list" => CursorKind::InitListExpr,
        "field_expression"
        | "subscript_expression"
        | "compound_literal_expression"
        | "comma_expression"
        | "update_expression"
        | "assignment_expression"
        | "offsetof_expression"
        | "generic_expression"
        | "true"
        | "false"
        | "null" => CursorKind::UnexposedExpr,
        _ => return None,
    };
    Some(kind)
}

impl Lowering {
    /// Lower `expr` and its operands as children of `parent`.
    pub(super) fn lower_expression<D: ast_grep_core::Doc>(
        &mut self,
        parent: NodeId,
        expr: &Node<D>,
    ) {
        self.lower_operand(parent, expr, 0);
    }

    /// Operands nested past [`MAX_EXPRESSION_DEPTH`] get no cursors.
    fn lower_operand<D: ast_grep_core::Doc>(
        &mut self,
        parent: NodeId,
        expr: &Node<D>,
        depth: usize,
    ) {
        if depth >= MAX_EXPRESSION_DEPTH {
            return;
        }
        let Some(kind) = expression_kind(expr) else {
            return;
        };
        let spelling = match kind {
            CursorKind::DeclRefExpr
            | CursorKind::IntegerLiteral
            | CursorKind::FloatingLiteral
            | CursorKind::CharacterLiteral
            | CursorKind::StringLiteral => expr.text().to_string(),
            CursorKind::UnaryOperator | CursorKind::BinaryOperator => expr
                .field("operator")
                .map_or_else(String::new, |op| op.text().to_string()),
            CursorKind::CallExpr => expr
                .field("function")
                .map_or_else(String::new, |f| f.text().to_string()),
            _ => String::new(),
        };
        let id = self.add_node(parent, kind, &spelling, expr);
        if let Some(folded) = const_eval::fold(expr, &self.env) {
            self.builder.set_value(id, Some(folded.value), None);
        }
        if kind == CursorKind::DeclRefExpr
            && let Some(target) = self.lookup_value(&spelling)
        {
            self.builder.set_referenced(id, target);
        }
        if kind == CursorKind::StringLiteral {
            return;
        }
        for child in expr.children() {
            if child.kind().as_ref() == "argument_list" {
                for argument in child.children() {
                    self.lower_operand(id, &argument, depth + 1);
                }
            } else {
                self.lower_operand(id, &child, depth + 1);
            }
        }
    }
}
