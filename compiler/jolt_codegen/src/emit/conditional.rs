//! `cond ? consequent : alternative`.
//!
//! ```text
//! entry:     %cond.temp = alloca T
//!            <condition>  -> cond.true / cond.false
//! cond.true:  store <consequent>, %cond.temp ; br cond.end
//! cond.false: store <alternative>, %cond.temp ; br cond.end
//! cond.end:   %cond.value = load T, T* %cond.temp
//! ```

use jolt_llvm::ValueId;

use crate::ast::Conditional;
use crate::translator::Translator;
use crate::{CodegenError, Result};

impl Translator<'_, '_> {
    pub fn emit_conditional(&mut self, cond: &Conditional) -> Result<ValueId> {
        if cond.ty.is_void() {
            return Err(CodegenError::VoidValue {
                procedure: self.procedure_name(),
            }
            .raise());
        }
        let function = self.current("conditional expression")?.function;
        let ty = self.ir_type(&cond.ty)?;
        let temp = self.entry_alloca(ty, "cond.temp")?;
        let if_true = self.builder.append_block(function, "cond.true");
        let if_false = self.builder.append_block(function, "cond.false");
        let end = self.builder.append_block(function, "cond.end");

        self.emit_condition(&cond.cond, if_true, if_false)?;
        for (block, arm) in [(if_true, &cond.consequent), (if_false, &cond.alternative)] {
            self.builder.position_at_end(function, block);
            let value = self.emit_value(arm)?;
            let value = self.coerce(value, ty)?;
            self.builder.store(value, temp)?;
            self.builder.br_unless_terminated(end)?;
        }

        self.builder.position_at_end(function, end);
        Ok(self.builder.load(temp, "cond.value")?)
    }
}
