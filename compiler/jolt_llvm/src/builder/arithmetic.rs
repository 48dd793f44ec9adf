//! Arithmetic, logical and comparison operations for `IrBuilder`.

use inkwell::values::{BasicValue, BasicValueEnum};
use inkwell::{FloatPredicate, IntPredicate};

use super::IrBuilder;
use crate::{BinaryOp, CmpPredicate, IrError, ValueId};

impl<'ctx> IrBuilder<'ctx> {
    /// Build a binary operation. Both operands must share one type, integer
    /// for integer ops and floating for `f*` ops.
    pub fn binary(
        &mut self,
        op: BinaryOp,
        lhs: ValueId,
        rhs: ValueId,
        name: &str,
    ) -> Result<ValueId, IrError> {
        let ty = self.module.value_type(lhs);
        self.expect_type(ty, self.module.value_type(rhs))?;
        let types = &self.module.types;
        let ok = if op.is_floating() {
            types.is_floating(ty)
        } else {
            types.int_width(ty).is_some()
        };
        if !ok {
            return Err(IrError::TypeMismatch {
                expected: if op.is_floating() { "floating point" } else { "integer" }.to_owned(),
                found: self.type_name(ty),
            });
        }
        self.require_position()?;
        let result = if op.is_floating() {
            self.float_binary(op, lhs, rhs, name)?
        } else {
            self.int_binary(op, lhs, rhs, name)?
        };
        Ok(self.record(ty, result))
    }

    fn int_binary(
        &self,
        op: BinaryOp,
        lhs: ValueId,
        rhs: ValueId,
        name: &str,
    ) -> Result<BasicValueEnum<'ctx>, IrError> {
        let (l, r) = (self.llvm(lhs).into_int_value(), self.llvm(rhs).into_int_value());
        let b = &self.builder;
        let v = match op {
            BinaryOp::Add => b.build_int_add(l, r, name)?,
            BinaryOp::Sub => b.build_int_sub(l, r, name)?,
            BinaryOp::Mul => b.build_int_mul(l, r, name)?,
            BinaryOp::SDiv => b.build_int_signed_div(l, r, name)?,
            BinaryOp::SRem => b.build_int_signed_rem(l, r, name)?,
            BinaryOp::And => b.build_and(l, r, name)?,
            BinaryOp::Or => b.build_or(l, r, name)?,
            BinaryOp::Xor => b.build_xor(l, r, name)?,
            BinaryOp::FAdd | BinaryOp::FSub | BinaryOp::FMul | BinaryOp::FDiv | BinaryOp::FRem => {
                return Err(IrError::TypeMismatch {
                    expected: "floating point".to_owned(),
                    found: "integer".to_owned(),
                })
            }
        };
        Ok(v.into())
    }

    fn float_binary(
        &self,
        op: BinaryOp,
        lhs: ValueId,
        rhs: ValueId,
        name: &str,
    ) -> Result<BasicValueEnum<'ctx>, IrError> {
        let (l, r) = (
            self.llvm(lhs).into_float_value(),
            self.llvm(rhs).into_float_value(),
        );
        let b = &self.builder;
        let v = match op {
            BinaryOp::FAdd => b.build_float_add(l, r, name)?,
            BinaryOp::FSub => b.build_float_sub(l, r, name)?,
            BinaryOp::FMul => b.build_float_mul(l, r, name)?,
            BinaryOp::FDiv => b.build_float_div(l, r, name)?,
            BinaryOp::FRem => b.build_float_rem(l, r, name)?,
            _ => {
                return Err(IrError::TypeMismatch {
                    expected: "integer".to_owned(),
                    found: "floating point".to_owned(),
                })
            }
        };
        Ok(v.into())
    }

    /// Build a comparison yielding `i1`.
    ///
    /// Integers compare signed and floats compare ordered. Pointers only
    /// support `Eq` and `Ne`.
    pub fn cmp(
        &mut self,
        pred: CmpPredicate,
        lhs: ValueId,
        rhs: ValueId,
        name: &str,
    ) -> Result<ValueId, IrError> {
        let ty = self.module.value_type(lhs);
        self.expect_type(ty, self.module.value_type(rhs))?;
        let types = &self.module.types;
        let pointer_eq =
            types.is_pointer(ty) && matches!(pred, CmpPredicate::Eq | CmpPredicate::Ne);
        let ok = types.int_width(ty).is_some() || types.is_floating(ty) || pointer_eq;
        if !ok {
            return Err(IrError::TypeMismatch {
                expected: "comparable operands".to_owned(),
                found: self.type_name(ty),
            });
        }
        self.require_position()?;

        let b = &self.builder;
        let (l, r) = (self.llvm(lhs), self.llvm(rhs));
        let result = if self.module.types.is_floating(ty) {
            b.build_float_compare(float_predicate(pred), l.into_float_value(), r.into_float_value(), name)?
                .as_basic_value_enum()
        } else if pointer_eq {
            b.build_int_compare(int_predicate(pred), l.into_pointer_value(), r.into_pointer_value(), name)?
                .as_basic_value_enum()
        } else {
            b.build_int_compare(int_predicate(pred), l.into_int_value(), r.into_int_value(), name)?
                .as_basic_value_enum()
        };
        let i1 = self.module.types.i1();
        Ok(self.record(i1, result))
    }

    /// Bitwise complement (`xor` with all ones). On `i1` this is logical not.
    pub fn not(&mut self, value: ValueId, name: &str) -> Result<ValueId, IrError> {
        let ty = self.module.value_type(value);
        let Some(bits) = self.module.types.int_width(ty) else {
            return Err(IrError::TypeMismatch {
                expected: "integer".to_owned(),
                found: self.type_name(ty),
            });
        };
        let ones = self.module.const_int(ty, if bits == 1 { 1 } else { -1 })?;
        self.binary(BinaryOp::Xor, value, ones, name)
    }

    /// Arithmetic negation, `0 - value` (or `-0.0 - value` for floats).
    pub fn neg(&mut self, value: ValueId, name: &str) -> Result<ValueId, IrError> {
        let ty = self.module.value_type(value);
        if self.module.types.is_floating(ty) {
            let zero = self.module.const_float(ty, -0.0)?;
            self.binary(BinaryOp::FSub, zero, value, name)
        } else {
            let zero = self.module.const_int(ty, 0)?;
            self.binary(BinaryOp::Sub, zero, value, name)
        }
    }
}

fn int_predicate(pred: CmpPredicate) -> IntPredicate {
    match pred {
        CmpPredicate::Eq => IntPredicate::EQ,
        CmpPredicate::Ne => IntPredicate::NE,
        CmpPredicate::Lt => IntPredicate::SLT,
        CmpPredicate::Le => IntPredicate::SLE,
        CmpPredicate::Gt => IntPredicate::SGT,
        CmpPredicate::Ge => IntPredicate::SGE,
    }
}

fn float_predicate(pred: CmpPredicate) -> FloatPredicate {
    match pred {
        CmpPredicate::Eq => FloatPredicate::OEQ,
        CmpPredicate::Ne => FloatPredicate::ONE,
        CmpPredicate::Lt => FloatPredicate::OLT,
        CmpPredicate::Le => FloatPredicate::OLE,
        CmpPredicate::Gt => FloatPredicate::OGT,
        CmpPredicate::Ge => FloatPredicate::OGE,
    }
}
