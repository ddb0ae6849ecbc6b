//! Integer constant folding over C expression nodes.
//!
//! Values follow LP64 C arithmetic: operands promote to at least 32 bits,
//! the usual arithmetic conversions pick signedness, and every result is
//! wrapped to its type's width.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use ast_grep_core::Node;

use crate::ty::TypeKind;

/// A folded integer constant together with its C type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Folded {
    pub(crate) value: i128,
    pub(crate) unsigned: bool,
    pub(crate) bits: u32,
}

impl Folded {
    pub(crate) fn new(value: i128, unsigned: bool, bits: u32) -> Self {
        Self {
            value: wrap(value, bits, unsigned),
            unsigned,
            bits,
        }
    }

    pub(crate) fn int(value: i128) -> Self {
        Self::new(value, false, 32)
    }

    const fn is_true(self) -> bool {
        self.value != 0
    }
}

fn wrap(value: i128, bits: u32, unsigned: bool) -> i128 {
    // `__int128` already has the width of the accumulator.
    if bits >= 128 {
        return value;
    }
    let modulus = 1_i128 << bits;
    let v = value.rem_euclid(modulus);
    if !unsigned && v >= modulus / 2 {
        v - modulus
    } else {
        v
    }
}

/// Nesting past which an expression is left unfolded.
pub(crate) const MAX_EXPRESSION_DEPTH: usize = 256;

/// Names visible to the folder: enumerators and object-like macros.
#[derive(Debug, Default)]
pub(crate) struct ConstEnv {
    values: HashMap<String, Folded>,
    defined: HashSet<String>,
}

impl ConstEnv {
    pub(crate) fn set(&mut self, name: &str, value: Folded) {
        self.values.insert(name.to_string(), value);
    }

    /// Register a macro; unfoldable bodies still count for `defined`.
    pub(crate) fn define(&mut self, name: &str, value: Option<Folded>) {
        self.defined.insert(name.to_string());
        match value {
            Some(value) => self.set(name, value),
            None => {
                self.values.remove(name);
            }
        }
    }

    pub(crate) fn undefine(&mut self, name: &str) {
        self.defined.remove(name);
        self.values.remove(name);
    }

    pub(crate) fn is_defined(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    fn get(&self, name: &str) -> Option<Folded> {
        self.values.get(name).copied()
    }
}

/// Fold an ordinary constant expression.
pub(crate) fn fold<D: ast_grep_core::Doc>(node: &Node<D>, env: &ConstEnv) -> Option<Folded> {
    Folder::new(env, false).fold(node)
}

/// Fold an `#if` condition: unknown identifiers read as zero and
/// `defined(NAME)` is answered from the environment.
pub(crate) fn fold_condition<D: ast_grep_core::Doc>(
    node: &Node<D>,
    env: &ConstEnv,
) -> Option<Folded> {
    Folder::new(env, true).fold(node)
}

struct Folder<'e> {
    env: &'e ConstEnv,
    preprocessor: bool,
    depth: Cell<usize>,
}

impl<'e> Folder<'e> {
    const fn new(env: &'e ConstEnv, preprocessor: bool) -> Self {
        Self {
            env,
            preprocessor,
            depth: Cell::new(0),
        }
    }

    fn fold<D: ast_grep_core::Doc>(&self, node: &Node<D>) -> Option<Folded> {
        let depth = self.depth.get();
        if depth >= MAX_EXPRESSION_DEPTH {
            return None;
        }
        self.depth.set(depth + 1);
        let folded = self.fold_node(node);
        self.depth.set(depth);
        folded
    }

    fn fold_node<D: ast_grep_core::Doc>(&self, node: &Node<D>) -> Option<Folded> {
        match node.kind().as_ref() {
            "number_literal" => parse_integer_literal(&node.text()),
            "char_literal" => parse_char_literal(&node.text()).map(Folded::int),
            "true" => Some(Folded::int(1)),
            "false" => Some(Folded::int(0)),
            "identifier" => {
                let name = node.text();
                self.env
                    .get(&name)
                    .or_else(|| self.preprocessor.then(|| Folded::int(0)))
            }
            "preproc_defined" => {
                let name = node
                    .children()
                    .find(|c| c.kind().as_ref() == "identifier")?
                    .text()
                    .to_string();
                Some(Folded::int(i128::from(self.env.is_defined(&name))))
            }
            "parenthesized_expression" | "preproc_parenthesized_expression" => {
                self.fold(&expression_children(node).next()?)
            }
            "unary_expression" | "preproc_unary_expression" => self.unary(node),
            "binary_expression" | "preproc_binary_expression" => self.binary(node),
            "conditional_expression" => {
                let condition = self.fold(&node.field("condition")?)?;
                if condition.is_true() {
                    self.fold(&node.field("consequence")?)
                } else {
                    self.fold(&node.field("alternative")?)
                }
            }
            "cast_expression" => {
                let value = self.fold(&node.field("value")?)?;
                let (bits, unsigned) = scalar_of_type_name(&node.field("type")?.text())?;
                let narrowed = Folded::new(value.value, unsigned, bits);
                Some(if bits < 32 {
                    Folded::int(narrowed.value)
                } else {
                    narrowed
                })
            }
            "sizeof_expression" => {
                let size = node
                    .field("type")
                    .and_then(|ty| size_of_type_name(&ty.text()))?;
                Some(Folded::new(i128::from(size), true, 64))
            }
            _ => None,
        }
    }

    fn unary<D: ast_grep_core::Doc>(&self, node: &Node<D>) -> Option<Folded> {
        let operator = node.field("operator")?.text().to_string();
        let operand = promote(self.fold(&node.field("argument")?)?);
        match operator.as_str() {
            "-" => Some(Folded::new(
                operand.value.wrapping_neg(),
                operand.unsigned,
                operand.bits,
            )),
            "+" => Some(operand),
            "~" => Some(Folded::new(!operand.value, operand.unsigned, operand.bits)),
            "!" => Some(Folded::int(i128::from(!operand.is_true()))),
            _ => None,
        }
    }

    fn binary<D: ast_grep_core::Doc>(&self, node: &Node<D>) -> Option<Folded> {
        let operator = node.field("operator")?.text().to_string();
        let left = self.fold(&node.field("left")?)?;
        // Short-circuit operators never evaluate the unused side.
        match operator.as_str() {
            "&&" if !left.is_true() => return Some(Folded::int(0)),
            "||" if left.is_true() => return Some(Folded::int(1)),
            _ => {}
        }
        let right = self.fold(&node.field("right")?)?;
        apply_binary(&operator, left, right)
    }
}

fn promote(value: Folded) -> Folded {
    if value.bits < 32 {
        Folded::int(value.value)
    } else {
        value
    }
}

fn common_type(left: Folded, right: Folded) -> (u32, bool) {
    let (left, right) = (promote(left), promote(right));
    match left.bits.cmp(&right.bits) {
        std::cmp::Ordering::Greater => (left.bits, left.unsigned),
        std::cmp::Ordering::Less => (right.bits, right.unsigned),
        std::cmp::Ordering::Equal => (left.bits, left.unsigned || right.unsigned),
    }
}

fn apply_binary(operator: &str, left: Folded, right: Folded) -> Option<Folded> {
    let (bits, unsigned) = common_type(left, right);
    // Re-read both operands in the common type before comparing.
    let l = wrap(left.value, bits, unsigned);
    let r = wrap(right.value, bits, unsigned);
    let arithmetic = |value: i128| Some(Folded::new(value, unsigned, bits));
    let truth = |value: bool| Some(Folded::int(i128::from(value)));
    match operator {
        "+" => arithmetic(l.wrapping_add(r)),
        "-" => arithmetic(l.wrapping_sub(r)),
        "*" => arithmetic(l.wrapping_mul(r)),
        "/" => (r != 0).then(|| l.wrapping_div(r)).and_then(arithmetic),
        "%" => (r != 0).then(|| l.wrapping_rem(r)).and_then(arithmetic),
        "&" => arithmetic(l & r),
        "|" => arithmetic(l | r),
        "^" => arithmetic(l ^ r),
        "<<" | ">>" => {
            let shifted = promote(left);
            let amount = u32::try_from(right.value).ok()?;
            if amount >= shifted.bits {
                return None;
            }
            let value = if operator == "<<" {
                shifted.value << amount
            } else {
                shifted.value >> amount
            };
            Some(Folded::new(value, shifted.unsigned, shifted.bits))
        }
        "==" => truth(l == r),
        "!=" => truth(l != r),
        "<" => truth(l < r),
        "<=" => truth(l <= r),
        ">" => truth(l > r),
        ">=" => truth(l >= r),
        "&&" => truth(l != 0 && r != 0),
        "||" => truth(l != 0 || r != 0),
        _ => None,
    }
}

fn expression_children<'r, D: ast_grep_core::Doc>(
    node: &Node<'r, D>,
) -> impl Iterator<Item = Node<'r, D>> {
    node.children()
        .filter(|c| !matches!(c.kind().as_ref(), "(" | ")" | "comment"))
}

/// Parse a C integer literal with its suffix into a typed value.
pub(crate) fn parse_integer_literal(text: &str) -> Option<Folded> {
    let text = text.replace('\'', "");
    // The grammar lexes a leading sign into the literal token.
    let (negative, text) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text.as_str()),
    };
    let lower = text.to_ascii_lowercase();
    let digits_end = lower
        .trim_end_matches(|c| c == 'u' || c == 'l')
        .len();
    let (digits, suffix) = lower.split_at(digits_end);
    let unsigned_suffix = suffix.contains('u');
    let long_suffix = suffix.contains('l');

    let (radix, body) = if let Some(hex) = digits.strip_prefix("0x") {
        (16, hex)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        (2, bin)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if body.is_empty() {
        return None;
    }
    let value = u64::from_str_radix(body, radix).ok()?;
    let value = i128::from(value);

    // The first type of the C11 6.4.4.1 list that can represent the value.
    let decimal = radix == 10;
    let candidates: &[(u32, bool)] = match (unsigned_suffix, long_suffix, decimal) {
        (true, true, _) => &[(64, true)],
        (true, false, _) => &[(32, true), (64, true)],
        (false, true, true) => &[(64, false)],
        (false, true, false) => &[(64, false), (64, true)],
        (false, false, true) => &[(32, false), (64, false)],
        (false, false, false) => &[(32, false), (32, true), (64, false), (64, true)],
    };
    let (bits, unsigned) = candidates
        .iter()
        .copied()
        .find(|(bits, unsigned)| fits(value, *bits, *unsigned))
        .unwrap_or((64, true));
    Some(Folded::new(
        if negative { -value } else { value },
        unsigned,
        bits,
    ))
}

fn fits(value: i128, bits: u32, unsigned: bool) -> bool {
    let max = if unsigned {
        (1_i128 << bits) - 1
    } else {
        (1_i128 << (bits - 1)) - 1
    };
    value <= max
}

/// Value of a character literal such as `'a'` or `'\n'`.
pub(crate) fn parse_char_literal(text: &str) -> Option<i128> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let bytes = unescape(inner)?;
    match bytes.as_slice() {
        [byte] => Some(i128::from(i8::from_ne_bytes([*byte]))),
        _ => None,
    }
}

/// Decode C escape sequences in the body of a string or char literal.
pub(crate) fn unescape(body: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let escape = chars.next()?;
        let byte = match escape {
            'n' => b'\n',
            't' => b'\t',
            'r' => b'\r',
            '0'..='7' => {
                let mut value = escape.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                u8::try_from(value).ok()?
            }
            'x' => {
                let mut value = 0_u32;
                let mut seen = false;
                while let Some(digit) = chars.peek().and_then(|c| c.to_digit(16)) {
                    value = value * 16 + digit;
                    seen = true;
                    chars.next();
                }
                if !seen {
                    return None;
                }
                u8::try_from(value).ok()?
            }
            'a' => 0x07,
            'b' => 0x08,
            'f' => 0x0c,
            'v' => 0x0b,
            'e' => 0x1b,
            '\\' | '\'' | '"' | '?' => u8::try_from(escape).ok()?,
            _ => return None,
        };
        out.push(byte);
    }
    Some(out)
}

/// Parse a decimal floating literal, ignoring its suffix.
pub(crate) fn parse_float_literal(text: &str) -> Option<f64> {
    let lower = text.replace('\'', "").to_ascii_lowercase();
    if lower.starts_with("0x") || !(lower.contains('.') || lower.contains('e')) {
        return None;
    }
    lower.trim_end_matches(['f', 'l']).parse().ok()
}

/// Builtin type named by a C type spelling, ignoring qualifiers.
pub(crate) fn builtin_kind(name: &str) -> Option<TypeKind> {
    let words: Vec<&str> = name
        .split_whitespace()
        .filter(|w| !matches!(*w, "const" | "volatile" | "restrict"))
        .collect();
    let kind = match words.as_slice() {
        ["void"] => TypeKind::Void,
        ["_Bool" | "bool"] => TypeKind::Bool,
        ["char"] => TypeKind::CharS,
        ["signed", "char"] => TypeKind::SChar,
        ["unsigned", "char"] => TypeKind::UChar,
        ["float"] => TypeKind::Float,
        ["double"] => TypeKind::Double,
        ["long", "double"] => TypeKind::LongDouble,
        ["__int128"] => TypeKind::Int128,
        ["unsigned", "__int128"] => TypeKind::UInt128,
        _ => integer_kind(&words)?,
    };
    Some(kind)
}

/// Integer kind of a list of `signed`/`unsigned`/`short`/`long`/`int` words.
pub(crate) fn integer_kind(words: &[&str]) -> Option<TypeKind> {
    let mut unsigned = false;
    let mut longs = 0;
    let mut short = false;
    let mut char_ = false;
    for word in words {
        match *word {
            "unsigned" => unsigned = true,
            "signed" | "int" => {}
            "long" => longs += 1,
            "short" => short = true,
            "char" => char_ = true,
            _ => return None,
        }
    }
    if words.is_empty() {
        return None;
    }
    let signed_char = words.contains(&"signed");
    Some(match (char_, short, longs, unsigned) {
        (true, _, _, true) => TypeKind::UChar,
        (true, _, _, false) if signed_char => TypeKind::SChar,
        (true, _, _, false) => TypeKind::CharS,
        (false, true, _, false) => TypeKind::Short,
        (false, true, _, true) => TypeKind::UShort,
        (false, false, 0, false) => TypeKind::Int,
        (false, false, 0, true) => TypeKind::UInt,
        (false, false, 1, false) => TypeKind::Long,
        (false, false, 1, true) => TypeKind::ULong,
        (false, false, _, false) => TypeKind::LongLong,
        (false, false, _, true) => TypeKind::ULongLong,
    })
}

/// Width and signedness of the fixed-size names the folder knows about.
fn scalar_of_type_name(name: &str) -> Option<(u32, bool)> {
    let trimmed = name.trim();
    let fixed = match trimmed {
        "int8_t" => Some((8, false)),
        "uint8_t" => Some((8, true)),
        "int16_t" => Some((16, false)),
        "uint16_t" => Some((16, true)),
        "int32_t" => Some((32, false)),
        "uint32_t" => Some((32, true)),
        "int64_t" | "intptr_t" | "ssize_t" | "ptrdiff_t" => Some((64, false)),
        "uint64_t" | "uintptr_t" | "size_t" => Some((64, true)),
        _ => None,
    };
    if fixed.is_some() {
        return fixed;
    }
    let kind = builtin_kind(trimmed)?;
    let bits = u32::try_from(kind.size_of()? * 8).ok()?;
    (kind.is_signed_integer() || kind.is_unsigned_integer())
        .then_some((bits, kind.is_unsigned_integer()))
}

fn size_of_type_name(name: &str) -> Option<u64> {
    if name.contains('*') {
        return TypeKind::Pointer.size_of();
    }
    if let Some((bits, _)) = scalar_of_type_name(name) {
        return Some(u64::from(bits / 8));
    }
    builtin_kind(name.trim()).and_then(TypeKind::size_of)
}
