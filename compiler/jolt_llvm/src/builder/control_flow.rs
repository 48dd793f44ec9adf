//! Terminators (branch, return, unreachable) for `IrBuilder`.

use super::IrBuilder;
use crate::{BlockId, IrError, ValueId};

impl IrBuilder<'_> {
    fn check_target(&self, target: BlockId) -> Result<(), IrError> {
        let pos = self.require_position()?;
        let func = self.module.function(pos.function);
        if target.index() < func.block_count() {
            Ok(())
        } else {
            Err(IrError::InvalidIndex {
                ty: format!("blocks of `{}`", func.name),
                index: u64::from(target.raw()),
            })
        }
    }

    fn trace_terminator(&self, kind: &str) {
        if let Some(pos) = self.position {
            let func = self.module.function(pos.function);
            tracing::trace!(
                function = %func.name,
                block = %func.block_name(pos.block),
                kind,
                "terminate block"
            );
        }
    }

    /// Build an unconditional branch.
    pub fn br(&mut self, dest: BlockId) -> Result<(), IrError> {
        let pos = self.require_position()?;
        self.check_target(dest)?;
        self.trace_terminator("br");
        self.builder
            .build_unconditional_branch(self.basic_block(pos.function, dest))?;
        Ok(())
    }

    /// Branch to `dest` unless the current block already ends in a terminator.
    pub fn br_unless_terminated(&mut self, dest: BlockId) -> Result<(), IrError> {
        if self.current_block_terminated() {
            return Ok(());
        }
        self.br(dest)
    }

    /// Build a conditional branch on an `i1`.
    pub fn cond_br(
        &mut self,
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    ) -> Result<(), IrError> {
        let i1 = self.module.types.i1();
        self.expect_type(i1, self.module.value_type(cond))?;
        let pos = self.require_position()?;
        self.check_target(then_block)?;
        self.check_target(else_block)?;
        self.trace_terminator("cond_br");
        self.builder.build_conditional_branch(
            self.llvm(cond).into_int_value(),
            self.basic_block(pos.function, then_block),
            self.basic_block(pos.function, else_block),
        )?;
        Ok(())
    }

    /// Return a value of the function's return type.
    pub fn ret(&mut self, value: ValueId) -> Result<(), IrError> {
        let pos = self.require_position()?;
        let ret_ty = self.module.function(pos.function).return_type;
        self.expect_type(ret_ty, self.module.value_type(value))?;
        self.trace_terminator("ret");
        self.builder.build_return(Some(&self.llvm(value)))?;
        Ok(())
    }

    /// Return from a `void` function.
    pub fn ret_void(&mut self) -> Result<(), IrError> {
        let pos = self.require_position()?;
        let ret_ty = self.module.function(pos.function).return_type;
        if !self.module.types.is_void(ret_ty) {
            return Err(IrError::TypeMismatch {
                expected: self.type_name(ret_ty),
                found: "void".to_owned(),
            });
        }
        self.trace_terminator("ret void");
        self.builder.build_return(None)?;
        Ok(())
    }

    /// Build an `unreachable` terminator.
    pub fn unreachable(&mut self) -> Result<(), IrError> {
        self.require_position()?;
        self.trace_terminator("unreachable");
        self.builder.build_unreachable()?;
        Ok(())
    }
}
