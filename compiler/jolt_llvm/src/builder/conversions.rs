//! Numeric conversions for `IrBuilder`.

use inkwell::values::BasicValueEnum;

use super::IrBuilder;
use crate::{CastOp, IrError, IrType, TypeId, ValueId};

impl<'ctx> IrBuilder<'ctx> {
    /// Build a numeric conversion of `value` to `to`.
    ///
    /// Integer extensions must widen and truncations must narrow. A
    /// conversion to the value's own type is returned unchanged.
    pub fn cast(
        &mut self,
        op: CastOp,
        value: ValueId,
        to: TypeId,
        name: &str,
    ) -> Result<ValueId, IrError> {
        let from = self.module.value_type(value);
        if from == to {
            return Ok(value);
        }
        let types = &self.module.types;
        let (from_int, to_int) = (types.int_width(from), types.int_width(to));
        let (from_fp, to_fp) = (types.is_floating(from), types.is_floating(to));
        let ok = match op {
            CastOp::SExt | CastOp::ZExt => matches!((from_int, to_int), (Some(a), Some(b)) if a < b),
            CastOp::Trunc => matches!((from_int, to_int), (Some(a), Some(b)) if a > b),
            CastOp::SIToFP => from_int.is_some() && to_fp,
            CastOp::FPToSI => from_fp && to_int.is_some(),
            CastOp::FPExt | CastOp::FPTrunc => from_fp && to_fp,
        };
        if !ok {
            return Err(IrError::TypeMismatch {
                expected: format!("operand valid for `{}` to `{}`", op.mnemonic(), self.type_name(to)),
                found: self.type_name(from),
            });
        }
        self.require_position()?;

        let target = self.module.types.basic_type(to)?;
        let source = self.llvm(value);
        let b = &self.builder;
        let converted: BasicValueEnum<'ctx> = match op {
            CastOp::SExt => b
                .build_int_s_extend(source.into_int_value(), target.into_int_type(), name)?
                .into(),
            CastOp::ZExt => b
                .build_int_z_extend(source.into_int_value(), target.into_int_type(), name)?
                .into(),
            CastOp::Trunc => b
                .build_int_truncate(source.into_int_value(), target.into_int_type(), name)?
                .into(),
            CastOp::SIToFP => b
                .build_signed_int_to_float(source.into_int_value(), target.into_float_type(), name)?
                .into(),
            CastOp::FPToSI => b
                .build_float_to_signed_int(source.into_float_value(), target.into_int_type(), name)?
                .into(),
            CastOp::FPExt => b
                .build_float_ext(source.into_float_value(), target.into_float_type(), name)?
                .into(),
            CastOp::FPTrunc => b
                .build_float_trunc(source.into_float_value(), target.into_float_type(), name)?
                .into(),
        };
        Ok(self.record(to, converted))
    }

    /// Convert between any two numeric types, picking the conversion.
    ///
    /// Integers are treated as signed. `i1` widens with zero extension.
    pub fn convert_numeric(
        &mut self,
        value: ValueId,
        to: TypeId,
        name: &str,
    ) -> Result<ValueId, IrError> {
        let from = self.module.value_type(value);
        let types = &self.module.types;
        let op = match (types.int_width(from), types.int_width(to)) {
            (Some(a), Some(b)) if a < b && a == 1 => CastOp::ZExt,
            (Some(a), Some(b)) if a < b => CastOp::SExt,
            (Some(a), Some(b)) if a > b => CastOp::Trunc,
            (Some(_), Some(_)) => return Ok(value),
            (Some(_), None) => CastOp::SIToFP,
            (None, Some(_)) => CastOp::FPToSI,
            (None, None) => {
                if matches!(types.get(to), IrType::Double) {
                    CastOp::FPExt
                } else {
                    CastOp::FPTrunc
                }
            }
        };
        self.cast(op, value, to, name)
    }
}
