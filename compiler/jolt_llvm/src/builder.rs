//! ID-based instruction builder over inkwell.
//!
//! `IrBuilder` owns the [`Module`] being built, an inkwell `Builder` and a
//! single insertion point. Callers only handle `Copy` IDs. Every
//! instruction is type-checked before it reaches LLVM and misuse is
//! reported as an [`IrError`] instead of an LLVM assertion.
//!
//! # Method Organization
//!
//! | Category | Methods |
//! |----------|---------|
//! | Memory | `alloca`, `entry_alloca`, `load`, `store`, `gep`, `struct_gep`, `bitcast` |
//! | Arithmetic | `binary`, `cmp`, `not`, `neg` |
//! | Conversions | `cast`, `convert_numeric` |
//! | Control flow | `br`, `cond_br`, `ret`, `ret_void`, `unreachable`, `br_unless_terminated` |
//! | Calls | `call`, `param`, `global_address` |
//! | Blocks | `append_block`, `position_at_end`, `current_block`, ... |
//!
//! Allocas built with `entry_alloca` go to the end of the function's entry
//! block regardless of the insertion point. The entry block stays open
//! until its terminator is built, so a function's prologue can keep
//! growing while its body is emitted elsewhere.

mod arithmetic;
mod calls;
mod control_flow;
mod conversions;
mod memory;

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder as InkwellBuilder;
use inkwell::values::BasicValueEnum;

use crate::{BlockId, FunctionId, IrError, Module, TypeId, ValueId};

/// A saved builder position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertPoint {
    pub function: FunctionId,
    pub block: BlockId,
}

/// ID-based IR builder. See the module docs.
pub struct IrBuilder<'ctx> {
    module: Module<'ctx>,
    builder: InkwellBuilder<'ctx>,
    position: Option<InsertPoint>,
}

impl<'ctx> IrBuilder<'ctx> {
    pub fn new(module: Module<'ctx>) -> Self {
        let builder = module.context().create_builder();
        Self {
            module,
            builder,
            position: None,
        }
    }

    #[inline]
    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    #[inline]
    pub fn module_mut(&mut self) -> &mut Module<'ctx> {
        &mut self.module
    }

    /// Finish building and take the module.
    pub fn into_module(self) -> Module<'ctx> {
        self.module
    }

    // -- Block management --

    /// Append a new basic block to a function.
    pub fn append_block(&mut self, function: FunctionId, name: &str) -> BlockId {
        let context = self.module.context();
        let func = self.module.function_mut(function);
        let id = BlockId::next(func.blocks.len());
        let block = context.append_basic_block(func.value, name);
        func.blocks.push(block);
        id
    }

    /// Position the builder at the end of a basic block.
    pub fn position_at_end(&mut self, function: FunctionId, block: BlockId) {
        let bb = self.module.function(function).block(block);
        self.builder.position_at_end(bb);
        self.position = Some(InsertPoint { function, block });
    }

    /// Get the current insertion point (if any).
    #[inline]
    pub fn insert_point(&self) -> Option<InsertPoint> {
        self.position
    }

    /// Restore a position saved with [`insert_point`](Self::insert_point).
    pub fn restore_position(&mut self, saved: Option<InsertPoint>) {
        match saved {
            Some(point) => self.position_at_end(point.function, point.block),
            None => {
                self.builder.clear_insertion_position();
                self.position = None;
            }
        }
    }

    /// Get the currently-active function.
    #[inline]
    pub fn current_function(&self) -> Option<FunctionId> {
        self.position.map(|p| p.function)
    }

    /// Get the current basic block.
    #[inline]
    pub fn current_block(&self) -> Option<BlockId> {
        self.position.map(|p| p.block)
    }

    /// Check if the current block is already terminated.
    pub fn current_block_terminated(&self) -> bool {
        self.position
            .is_some_and(|p| self.module.function(p.function).is_terminated(p.block))
    }

    // -- Internals --

    fn require_position(&self) -> Result<InsertPoint, IrError> {
        let pos = self.position.ok_or(IrError::NoInsertPoint)?;
        let func = self.module.function(pos.function);
        if func.is_terminated(pos.block) {
            return Err(IrError::BlockTerminated {
                function: func.name.clone(),
                block: func.block_name(pos.block),
            });
        }
        Ok(pos)
    }

    fn basic_block(&self, function: FunctionId, block: BlockId) -> BasicBlock<'ctx> {
        self.module.function(function).block(block)
    }

    /// Record a value the builder produced.
    fn record(&mut self, ty: TypeId, value: BasicValueEnum<'ctx>) -> ValueId {
        self.module.push_value(ty, value)
    }

    #[inline]
    fn llvm(&self, value: ValueId) -> BasicValueEnum<'ctx> {
        self.module.value(value).value
    }

    fn type_name(&self, ty: TypeId) -> String {
        self.module.types.display(ty)
    }

    fn expect_type(&self, expected: TypeId, found: TypeId) -> Result<(), IrError> {
        if expected == found {
            Ok(())
        } else {
            Err(IrError::TypeMismatch {
                expected: self.type_name(expected),
                found: self.type_name(found),
            })
        }
    }

    /// Pointee of a pointer-typed value.
    fn pointee_of(&self, ptr: ValueId) -> Result<TypeId, IrError> {
        let ty = self.module.value_type(ptr);
        self.module
            .types
            .pointee(ty)
            .ok_or_else(|| IrError::NotAPointer {
                found: self.type_name(ty),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod tests;
