//! Calls, parameters and global addresses for `IrBuilder`.

use inkwell::values::BasicMetadataValueEnum;

use super::IrBuilder;
use crate::{FunctionId, GlobalId, IrError, ValueId};

impl<'ctx> IrBuilder<'ctx> {
    /// Build a direct call.
    ///
    /// Returns `None` for `void` callees. Argument count and types must
    /// match the callee's signature exactly.
    pub fn call(
        &mut self,
        callee: FunctionId,
        args: &[ValueId],
        name: &str,
    ) -> Result<Option<ValueId>, IrError> {
        let func = self.module.function(callee);
        if func.params.len() != args.len() {
            return Err(IrError::ArityMismatch {
                name: func.name.clone(),
                expected: func.params.len(),
                found: args.len(),
            });
        }
        let (ret, target) = (func.return_type, func.value);
        let param_tys: Vec<_> = func
            .params
            .iter()
            .map(|&p| self.module.value_type(p))
            .collect();
        for (&expected, &arg) in param_tys.iter().zip(args) {
            self.expect_type(expected, self.module.value_type(arg))?;
        }
        self.require_position()?;

        let llvm_args: Vec<BasicMetadataValueEnum<'ctx>> =
            args.iter().map(|&arg| self.llvm(arg).into()).collect();
        let name = if self.module.types.is_void(ret) { "" } else { name };
        let site = self.builder.build_call(target, &llvm_args, name)?;
        Ok(site
            .try_as_basic_value()
            .basic()
            .map(|value| self.record(ret, value)))
    }

    /// Parameter `index` of `function`.
    pub fn param(&self, function: FunctionId, index: u32) -> Option<ValueId> {
        let params = &self.module.function(function).params;
        usize::try_from(index).ok().and_then(|i| params.get(i)).copied()
    }

    /// Address of a global.
    #[inline]
    pub fn global_address(&self, global: GlobalId) -> ValueId {
        self.module.global(global).address
    }
}
