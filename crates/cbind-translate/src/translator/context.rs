use cbind_ast::Cursor;

/// Scratch state for translating one declaration.
///
/// Created when a handler starts and dropped once its text is assembled.
#[derive(Debug)]
pub(crate) struct TranslationContext<'tu> {
    pub(crate) cursor: Cursor<'tu>,
    /// Rust name of the declaration.
    pub(crate) name: String,
    /// Member lines: enumerators, fields or parameters.
    pub(crate) members: Vec<String>,
    /// Enum constants that repeat an earlier value, as associated consts.
    pub(crate) aliases: Vec<String>,
    /// Nested declarations emitted in front of the declaration.
    pub(crate) hoisted: Vec<String>,
    anonymous_members: usize,
}

impl<'tu> TranslationContext<'tu> {
    pub(crate) const fn new(cursor: Cursor<'tu>, name: String) -> Self {
        Self {
            cursor,
            name,
            members: Vec::new(),
            aliases: Vec::new(),
            hoisted: Vec::new(),
            anonymous_members: 0,
        }
    }

    /// Field name for the next anonymous struct or union member.
    pub(crate) fn next_anonymous_member(&mut self) -> String {
        let name = format!("_anon_{}", self.anonymous_members);
        self.anonymous_members += 1;
        name
    }
}
