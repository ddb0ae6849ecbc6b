use cbind_ast::{Cursor, StorageClass};

use crate::output::Output;

use super::{TranslationContext, Translator};

impl<'tu> Translator<'tu> {
    /// `pub static` in an extern block; `mut` unless the object is const.
    pub(super) fn translate_variable(
        &mut self,
        cursor: Cursor<'tu>,
        output: &mut Output,
    ) -> String {
        if cursor.storage_class() == StorageClass::Static {
            tracing::debug!(variable = cursor.spelling(), "static variable has no symbol");
            return String::new();
        }
        let name = self.name_of(cursor);
        let ctx = TranslationContext::new(cursor, name);
        let ty = cursor.ty();
        let rendered = self.resolve(ty, cursor);
        let mutability = if ty.is_const_qualified() { "" } else { "mut " };
        let item = format!("pub static {mutability}{}: {rendered};", ctx.name);
        self.extern_block(&ctx, &item, output)
    }
}
