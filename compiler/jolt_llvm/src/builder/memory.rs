//! Memory operations (alloca, load, store, GEP, bitcast) for `IrBuilder`.

use inkwell::values::IntValue;
use smallvec::SmallVec;

use super::IrBuilder;
use crate::{BlockId, FunctionId, GepIndex, IrError, IrType, TypeId, ValueId};

impl<'ctx> IrBuilder<'ctx> {
    /// Build a stack allocation at the current position.
    pub fn alloca(&mut self, ty: TypeId, name: &str) -> Result<ValueId, IrError> {
        self.require_position()?;
        self.module.types.check_sized(ty)?;
        let llvm_ty = self.module.types.basic_type(ty)?;
        let slot = self.builder.build_alloca(llvm_ty, name)?;
        let ptr = self.module.types.ptr_to(ty);
        Ok(self.record(ptr, slot.into()))
    }

    /// Build an alloca at the end of `function`'s entry block.
    ///
    /// The insertion point is left untouched. Fails once the entry block
    /// has been terminated.
    pub fn entry_alloca(
        &mut self,
        function: FunctionId,
        ty: TypeId,
        name: &str,
    ) -> Result<ValueId, IrError> {
        let func = self.module.function(function);
        let entry = BlockId::new(0);
        if func.is_declaration() {
            return Err(IrError::NoInsertPoint);
        }
        if func.is_terminated(entry) {
            return Err(IrError::BlockTerminated {
                function: func.name.clone(),
                block: func.block_name(entry),
            });
        }
        self.module.types.check_sized(ty)?;
        let llvm_ty = self.module.types.basic_type(ty)?;

        self.builder.position_at_end(self.basic_block(function, entry));
        let slot = self.builder.build_alloca(llvm_ty, name);
        if let Some(pos) = self.position {
            self.builder
                .position_at_end(self.basic_block(pos.function, pos.block));
        }

        let ptr = self.module.types.ptr_to(ty);
        Ok(self.record(ptr, slot?.into()))
    }

    /// Build a load through a typed pointer.
    pub fn load(&mut self, ptr: ValueId, name: &str) -> Result<ValueId, IrError> {
        let ty = self.pointee_of(ptr)?;
        self.require_position()?;
        self.module.types.check_sized(ty)?;
        let address = self.llvm(ptr).into_pointer_value();
        let loaded = self.builder.build_load(address, name)?;
        Ok(self.record(ty, loaded))
    }

    /// Build a store. The pointer's pointee must be the value's type.
    pub fn store(&mut self, value: ValueId, ptr: ValueId) -> Result<(), IrError> {
        let pointee = self.pointee_of(ptr)?;
        self.expect_type(pointee, self.module.value_type(value))?;
        self.require_position()?;
        let address = self.llvm(ptr).into_pointer_value();
        self.builder.build_store(address, self.llvm(value))?;
        Ok(())
    }

    /// Address of component `index` of the struct `ptr` points to.
    ///
    /// Equivalent to `getelementptr inbounds %T, %T* ptr, i32 0, i32 index`.
    pub fn struct_gep(&mut self, ptr: ValueId, index: u32, name: &str) -> Result<ValueId, IrError> {
        self.gep(ptr, &[GepIndex::Const(0), GepIndex::Const(index)], name)
    }

    /// Build an in-bounds `getelementptr`.
    ///
    /// The first index steps over whole pointees. Later indices walk into
    /// aggregates: struct components need constant indices, array elements
    /// accept any integer.
    #[allow(
        unsafe_code,
        reason = "LLVM C API requires unsafe for build_in_bounds_gep; indices are checked against the pointee first"
    )]
    pub fn gep(
        &mut self,
        ptr: ValueId,
        indices: &[GepIndex],
        name: &str,
    ) -> Result<ValueId, IrError> {
        let mut cur = self.pointee_of(ptr)?;
        for index in indices {
            if let GepIndex::Value(v) = index {
                let ty = self.module.value_type(*v);
                if self.module.types.int_width(ty).is_none() {
                    return Err(IrError::TypeMismatch {
                        expected: "integer".to_owned(),
                        found: self.type_name(ty),
                    });
                }
            }
        }
        for index in indices.iter().skip(1) {
            cur = self.gep_step(cur, *index)?;
        }
        self.require_position()?;

        let i32_ty = self.module.context().i32_type();
        let llvm_indices: SmallVec<[IntValue<'ctx>; 4]> = indices
            .iter()
            .map(|index| match *index {
                GepIndex::Const(i) => i32_ty.const_int(u64::from(i), false),
                GepIndex::Value(v) => self.llvm(v).into_int_value(),
            })
            .collect();
        let base = self.llvm(ptr).into_pointer_value();
        let address = unsafe { self.builder.build_in_bounds_gep(base, &llvm_indices, name) }?;
        let result_ty = self.module.types.ptr_to(cur);
        Ok(self.record(result_ty, address.into()))
    }

    fn gep_step(&self, cur: TypeId, index: GepIndex) -> Result<TypeId, IrError> {
        let types = &self.module.types;
        match (types.get(cur), index) {
            (IrType::Named(_) | IrType::Struct(_), GepIndex::Const(i)) => {
                let fields = types.struct_fields(cur)?;
                usize::try_from(i)
                    .ok()
                    .and_then(|slot| fields.get(slot))
                    .copied()
                    .ok_or_else(|| IrError::InvalidIndex {
                        ty: types.display(cur),
                        index: u64::from(i),
                    })
            }
            (IrType::Named(_) | IrType::Struct(_), GepIndex::Value(_)) => {
                Err(IrError::DynamicStructIndex {
                    ty: types.display(cur),
                })
            }
            (IrType::Array { elem, .. }, _) => Ok(*elem),
            _ => Err(IrError::NotAggregate {
                ty: types.display(cur),
            }),
        }
    }

    /// Reinterpret a pointer as another pointer type.
    pub fn bitcast(&mut self, value: ValueId, to: TypeId, name: &str) -> Result<ValueId, IrError> {
        self.pointee_of(value)?;
        if !self.module.types.is_pointer(to) {
            return Err(IrError::NotAPointer {
                found: self.type_name(to),
            });
        }
        if self.module.value_type(value) == to {
            return Ok(value);
        }
        self.require_position()?;
        let target = self.module.types.basic_type(to)?.into_pointer_type();
        let source = self.llvm(value).into_pointer_value();
        let cast = self.builder.build_pointer_cast(source, target, name)?;
        Ok(self.record(to, cast.into()))
    }
}
