use std::collections::HashSet;

use cbind_ast::{Cursor, StorageClass};

use crate::naming::rust_ident;
use crate::output::Output;

use super::{TranslationContext, Translator};

impl<'tu> Translator<'tu> {
    pub(super) fn translate_function(
        &mut self,
        cursor: Cursor<'tu>,
        output: &mut Output,
    ) -> String {
        if cursor.storage_class() == StorageClass::Static {
            tracing::debug!(function = cursor.spelling(), "static function has no symbol");
            return String::new();
        }
        let name = self.name_of(cursor);
        let mut ctx = TranslationContext::new(cursor, name);

        let mut taken = HashSet::new();
        for (index, param) in cursor.arguments().enumerate() {
            let mut param_name = if param.is_anonymous() {
                format!("arg{index}")
            } else {
                rust_ident(param.spelling())
            };
            while !taken.insert(param_name.clone()) {
                param_name.push('_');
            }
            let ty = self.resolve(param.ty(), param);
            ctx.members.push(format!("{param_name}: {ty}"));
        }
        if cursor.is_variadic() {
            ctx.members.push("...".to_string());
        }
        let result = self.resolve_result(cursor.result_type(), cursor);

        let item = format!("pub fn {}({}){result};", ctx.name, ctx.members.join(", "));
        self.extern_block(&ctx, &item, output)
    }
}
