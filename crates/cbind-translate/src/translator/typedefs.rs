use cbind_ast::{Cursor, TypeKind};

use crate::output::Output;

use super::Translator;

impl<'tu> Translator<'tu> {
    pub(super) fn translate_typedef(&mut self, cursor: Cursor<'tu>, output: &mut Output) -> String {
        let name = self.name_of(cursor);
        let underlying = cursor.typedef_underlying_type();

        if matches!(underlying.kind(), TypeKind::Record | TypeKind::Enum)
            && let Some(tag) = underlying.declaration()
        {
            // `typedef struct { .. } name;` emits the struct as `name`, and
            // `typedef struct name name;` would only alias itself.
            let names_tag = tag
                .canonical()
                .typedef_name()
                .is_some_and(|typedef| typedef.canonical() == cursor.canonical());
            if names_tag || self.name_of(tag) == name {
                return String::new();
            }
        }

        let ty = self.resolve(underlying, cursor);
        let mut scope = output.scope();
        self.doc_lines(cursor, &mut scope);
        scope.line(&format!("pub type {name} = {ty};"));
        scope.finish()
    }
}
