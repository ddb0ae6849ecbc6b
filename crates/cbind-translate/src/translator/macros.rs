use cbind_ast::{Cursor, MacroValue};

use crate::output::Output;

use super::Translator;

impl<'tu> Translator<'tu> {
    /// `pub const` for an object-like macro that folded to a literal.
    pub(super) fn translate_macro(&mut self, cursor: Cursor<'tu>, output: &mut Output) -> String {
        if !self.options.emit_macros || cursor.is_function_like_macro() {
            return String::new();
        }
        let Some(value) = cursor.macro_value() else {
            tracing::debug!(name = cursor.spelling(), "macro has no constant value");
            return String::new();
        };
        let name = self.name_of(cursor);
        let (ty, literal) = match value {
            MacroValue::Int { value, unsigned } => {
                (int_type(*value, *unsigned).to_string(), value.to_string())
            }
            MacroValue::Float(value) => ("f64".to_string(), float_literal(*value)),
            MacroValue::Bytes(bytes) => (
                format!("&[u8; {}]", bytes.len() + 1),
                byte_string_literal(bytes),
            ),
        };
        let mut scope = output.scope();
        self.doc_lines(cursor, &mut scope);
        scope.line(&format!("pub const {name}: {ty} = {literal};"));
        scope.finish()
    }
}

/// Narrowest of the usual constant types that holds `value`.
fn int_type(value: i128, unsigned: bool) -> &'static str {
    if unsigned {
        if u32::try_from(value).is_ok() {
            "u32"
        } else if u64::try_from(value).is_ok() {
            "u64"
        } else {
            "u128"
        }
    } else if i32::try_from(value).is_ok() {
        "i32"
    } else if i64::try_from(value).is_ok() {
        "i64"
    } else if u64::try_from(value).is_ok() {
        "u64"
    } else {
        "i128"
    }
}

fn float_literal(value: f64) -> String {
    if value.is_nan() {
        "f64::NAN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "f64::INFINITY" } else { "f64::NEG_INFINITY" }.to_string()
    } else {
        format!("{value:?}")
    }
}

/// `b"..\0"` with everything outside printable ASCII escaped.
fn byte_string_literal(bytes: &[u8]) -> String {
    let mut literal = String::from("b\"");
    for byte in bytes {
        literal.extend(std::ascii::escape_default(*byte).map(char::from));
    }
    literal.push_str("\\0\"");
    literal
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(7, false, "i32")]
    #[case(-1, false, "i32")]
    #[case(7, true, "u32")]
    #[case(0x1_0000_0000, false, "i64")]
    #[case(0x1_0000_0000, true, "u64")]
    #[case(-0x1_0000_0000, false, "i64")]
    #[case(0xFFFF_FFFF_FFFF_FFFF, false, "u64")]
    fn integer_types(#[case] value: i128, #[case] unsigned: bool, #[case] expected: &str) {
        assert_eq!(int_type(value, unsigned), expected);
    }

    #[test]
    fn byte_strings_escape_and_terminate() {
        assert_eq!(byte_string_literal(b"a\"b\n"), "b\"a\\\"b\\n\\0\"");
        assert_eq!(byte_string_literal(&[0xff]), "b\"\\xff\\0\"");
    }

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(float_literal(2.0), "2.0");
        assert_eq!(float_literal(0.5), "0.5");
        assert_eq!(float_literal(f64::INFINITY), "f64::INFINITY");
    }
}
