//! Value-producing expressions.

use jolt_llvm::{BinaryOp as IrBinaryOp, CmpPredicate, GepIndex, IrError, IrType, TypeId, ValueId};
use jolt_stack::ensure_sufficient_stack;
use jolt_types::{ClassId, FieldId, MethodId, Type};

use crate::ast::{BinaryOp, Expr, ExprKind, IncDecOp, Literal, Place, Special, SpecialKind, UnaryOp};
use crate::translator::Translator;
use crate::{CodegenError, Result};

impl Translator<'_, '_> {
    /// Emit an expression. `None` for calls to `void` procedures.
    pub(crate) fn emit_expr(&mut self, expr: &Expr) -> Result<Option<ValueId>> {
        ensure_sufficient_stack(|| self.emit_expr_inner(expr))
    }

    /// Emit an expression used as a value.
    pub(crate) fn emit_value(&mut self, expr: &Expr) -> Result<ValueId> {
        match self.emit_expr(expr)? {
            Some(value) => Ok(value),
            None => Err(CodegenError::VoidValue {
                procedure: self.procedure_name(),
            }
            .raise()),
        }
    }

    fn emit_expr_inner(&mut self, expr: &Expr) -> Result<Option<ValueId>> {
        let value = match &expr.kind {
            ExprKind::Literal(lit) => self.emit_literal(*lit, &expr.ty)?,
            ExprKind::Local(local) => {
                let slot = self.local_slot(*local)?;
                self.builder.load(slot, "")?
            }
            ExprKind::Field { receiver, field } => {
                let addr = self.field_place(receiver, *field)?;
                self.builder.load(addr, "")?
            }
            ExprKind::StaticField(field) => {
                let addr = self.static_field_address(*field)?;
                self.builder.load(addr, "")?
            }
            ExprKind::ArrayElement { array, index } => {
                let addr = self.element_address(array, index)?;
                self.builder.load(addr, "")?
            }
            ExprKind::ArrayLength(array) => {
                let obj = self.emit_value(array)?;
                let length = self.classes.array_length_field();
                let addr = self.layout.field_address(&mut self.builder, obj, length)?;
                self.builder.load(addr, "length")?
            }
            ExprKind::Binary { op, lhs, rhs } => {
                if op.is_short_circuit() {
                    self.emit_boolean_value(expr)?
                } else {
                    self.emit_binary(*op, lhs, rhs, &expr.ty)?
                }
            }
            ExprKind::Unary { op, operand } => self.emit_unary(*op, operand, &expr.ty)?,
            ExprKind::IncDec { op, place } => self.emit_inc_dec(*op, place)?,
            ExprKind::Assign { place, value } => {
                let addr = self.place_address(place)?;
                let value = self.emit_value(value)?;
                let ty = self.slot_type(addr)?;
                let value = self.coerce(value, ty)?;
                self.builder.store(value, addr)?;
                value
            }
            ExprKind::Cast(inner) => {
                let value = self.emit_value(inner)?;
                self.coerce_to(value, &expr.ty)?
            }
            ExprKind::Conditional(cond) => self.emit_conditional(cond)?,
            ExprKind::Special(special) => self.emit_special(special)?,
            ExprKind::New { constructor, args } => self.emit_new(*constructor, args, &expr.ty)?,
            ExprKind::NewArray { length } => self.emit_new_array(length, &expr.ty)?,
            ExprKind::Call {
                method,
                receiver,
                args,
            } => return self.emit_call(*method, receiver.as_deref(), args, &expr.ty),
        };
        Ok(Some(value))
    }

    fn emit_literal(&mut self, lit: Literal, ty: &Type) -> Result<ValueId> {
        let module = self.builder.module_mut();
        Ok(match lit {
            Literal::Bool(b) => module.const_bool(b),
            Literal::Int(v) => module.const_i32(v),
            Literal::Long(v) => module.const_i64(v),
            Literal::Float(v) => {
                let f32 = module.types.f32();
                module.const_float(f32, f64::from(v))?
            }
            Literal::Double(v) => {
                let f64 = module.types.f64();
                module.const_float(f64, v)?
            }
            Literal::Char(c) => {
                let i16 = module.types.i16();
                module.const_int(i16, i64::from(c))?
            }
            Literal::Null => {
                let ptr = self.ir_type(ty)?;
                let module = self.builder.module_mut();
                let ptr = if module.types.is_pointer(ptr) {
                    ptr
                } else {
                    module.types.i8_ptr()
                };
                module.const_null(ptr)?
            }
        })
    }

    // ── Places ─────────────────────────────────────────────────

    /// Address of an assignable location.
    fn place_address(&mut self, place: &Place) -> Result<ValueId> {
        match place {
            Place::Local(local) => self.local_slot(*local),
            Place::Field { receiver, field } => self.field_place(receiver, *field),
            Place::StaticField(field) => self.static_field_address(*field),
            Place::ArrayElement { array, index } => self.element_address(array, index),
        }
    }

    fn field_place(&mut self, receiver: &Expr, field: FieldId) -> Result<ValueId> {
        if self.classes.field(field).is_static() {
            // Static access through an instance: evaluate it, ignore it.
            self.emit_expr(receiver)?;
            return self.static_field_address(field);
        }
        let obj = self.emit_value(receiver)?;
        self.layout.field_address(&mut self.builder, obj, field)
    }

    fn static_field_address(&mut self, field: FieldId) -> Result<ValueId> {
        let global = self.layout.static_field_global(self.builder.module_mut(), field)?;
        Ok(self.builder.global_address(global))
    }

    fn element_address(&mut self, array: &Expr, index: &Expr) -> Result<ValueId> {
        let obj = self.emit_value(array)?;
        let base = self.layout.array_base_address(&mut self.builder, obj, &array.ty)?;
        let index = self.emit_value(index)?;
        Ok(self.builder.gep(base, &[GepIndex::Value(index)], "elem.addr")?)
    }

    fn slot_type(&self, ptr: ValueId) -> Result<TypeId> {
        let types = &self.module().types;
        let ty = self.module().value_type(ptr);
        types.pointee(ty).ok_or_else(|| {
            CodegenError::Ir(IrError::NotAPointer {
                found: types.display(ty),
            })
            .raise()
        })
    }

    // ── Operators ──────────────────────────────────────────────

    fn emit_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr, ty: &Type) -> Result<ValueId> {
        let lhs = self.emit_value(lhs)?;
        let rhs = self.emit_value(rhs)?;
        let (lhs, rhs) = self.promote_pair(op, lhs, rhs, ty)?;

        let floating = self.module().types.is_floating(self.module().value_type(lhs));
        let result = if op.is_comparison() {
            let pred = match op {
                BinaryOp::Eq => CmpPredicate::Eq,
                BinaryOp::Ne => CmpPredicate::Ne,
                BinaryOp::Lt => CmpPredicate::Lt,
                BinaryOp::Le => CmpPredicate::Le,
                BinaryOp::Gt => CmpPredicate::Gt,
                _ => CmpPredicate::Ge,
            };
            self.builder.cmp(pred, lhs, rhs, "cmp")?
        } else {
            let ir_op = match (op, floating) {
                (BinaryOp::Add, false) => IrBinaryOp::Add,
                (BinaryOp::Add, true) => IrBinaryOp::FAdd,
                (BinaryOp::Sub, false) => IrBinaryOp::Sub,
                (BinaryOp::Sub, true) => IrBinaryOp::FSub,
                (BinaryOp::Mul, false) => IrBinaryOp::Mul,
                (BinaryOp::Mul, true) => IrBinaryOp::FMul,
                (BinaryOp::Div, false) => IrBinaryOp::SDiv,
                (BinaryOp::Div, true) => IrBinaryOp::FDiv,
                (BinaryOp::Rem, false) => IrBinaryOp::SRem,
                (BinaryOp::Rem, true) => IrBinaryOp::FRem,
                (BinaryOp::BitAnd, _) => IrBinaryOp::And,
                (BinaryOp::BitOr, _) => IrBinaryOp::Or,
                _ => IrBinaryOp::Xor,
            };
            self.builder.binary(ir_op, lhs, rhs, "")?
        };
        self.coerce_to(result, ty)
    }

    /// Bring both operands to one type.
    ///
    /// Booleans stay `i1`; other numbers widen to the larger of the two and
    /// at least `i32`. References only meet in `==` and `!=`, compared as
    /// `i8*`.
    fn promote_pair(&mut self, op: BinaryOp, lhs: ValueId, rhs: ValueId, ty: &Type) -> Result<(ValueId, ValueId)> {
        let module = self.builder.module_mut();
        let (lt, rt) = (module.value_type(lhs), module.value_type(rhs));
        if module.types.is_pointer(lt) || module.types.is_pointer(rt) {
            if !matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
                return Err(CodegenError::UnhandledReferenceType {
                    ty: self.classes.display_type(ty),
                    context: "as an arithmetic operand",
                }
                .raise());
            }
            let i8_ptr = module.types.i8_ptr();
            return Ok((self.coerce(lhs, i8_ptr)?, self.coerce(rhs, i8_ptr)?));
        }
        let i1 = module.types.i1();
        if lt == i1 && rt == i1 {
            return Ok((lhs, rhs));
        }
        let target = self.promoted_type(&[lt, rt]);
        Ok((self.coerce(lhs, target)?, self.coerce(rhs, target)?))
    }

    /// Binary numeric promotion over IR types.
    fn promoted_type(&mut self, operands: &[TypeId]) -> TypeId {
        let types = &mut self.builder.module_mut().types;
        let rank = operands
            .iter()
            .map(|&t| match types.get(t) {
                IrType::Double => 3,
                IrType::Float => 2,
                IrType::Int(64) => 1,
                _ => 0,
            })
            .max()
            .unwrap_or(0);
        match rank {
            3 => types.f64(),
            2 => types.f32(),
            1 => types.i64(),
            _ => types.i32(),
        }
    }

    fn emit_unary(&mut self, op: UnaryOp, operand: &Expr, ty: &Type) -> Result<ValueId> {
        let value = self.emit_value(operand)?;
        let result = match op {
            UnaryOp::Not => self.builder.not(value, "not")?,
            UnaryOp::Neg | UnaryOp::Plus | UnaryOp::BitNot => {
                let from = self.module().value_type(value);
                let target = self.promoted_type(&[from]);
                let value = self.coerce(value, target)?;
                match op {
                    UnaryOp::Neg => self.builder.neg(value, "neg")?,
                    UnaryOp::BitNot => self.builder.not(value, "not")?,
                    _ => value,
                }
            }
        };
        self.coerce_to(result, ty)
    }

    /// `++x`, `x++`, `--x`, `x--`: the prefix forms yield the updated value,
    /// the postfix forms the original one.
    fn emit_inc_dec(&mut self, op: IncDecOp, place: &Place) -> Result<ValueId> {
        let addr = self.place_address(place)?;
        let ty = self.slot_type(addr)?;
        let old = self.builder.load(addr, "")?;
        let module = self.builder.module_mut();
        let floating = module.types.is_floating(ty);
        let one = if floating {
            module.const_float(ty, 1.0)?
        } else {
            module.const_int(ty, 1)?
        };
        let ir_op = match (op.is_increment(), floating) {
            (true, false) => IrBinaryOp::Add,
            (false, false) => IrBinaryOp::Sub,
            (true, true) => IrBinaryOp::FAdd,
            (false, true) => IrBinaryOp::FSub,
        };
        let new = self.builder.binary(ir_op, old, one, if op.is_increment() { "inc" } else { "dec" })?;
        self.builder.store(new, addr)?;
        Ok(if op.is_prefix() { new } else { old })
    }

    // ── Allocation and calls ───────────────────────────────────

    /// Allocate `size` bytes through the runtime, view them as `class`
    /// and install its dispatch vector.
    fn allocate(&mut self, size: ValueId, class: ClassId) -> Result<ValueId> {
        let alloc = self.allocator()?;
        let Some(raw) = self.builder.call(alloc, &[size], "alloc")? else {
            return Err(CodegenError::VoidValue {
                procedure: self.procedure_name(),
            }
            .raise());
        };
        let ptr = self.layout.object_pointer_type(self.builder.module_mut(), class);
        let obj = self.builder.bitcast(raw, ptr, "obj")?;

        let dv = self.layout.dispatch_vector_global(self.builder.module_mut(), class)?;
        let dv_addr = self
            .layout
            .dispatch_vector_address(&mut self.builder, obj, &Type::class(class))?;
        let dv_value = self.builder.global_address(dv);
        self.builder.store(dv_value, dv_addr)?;
        Ok(obj)
    }

    fn emit_new(&mut self, constructor: MethodId, args: &[Expr], ty: &Type) -> Result<ValueId> {
        let class = self.layout.erased_class(ty, "cannot be instantiated")?;
        let size = self.layout.size_of(self.builder.module_mut(), ty)?;
        let obj = self.allocate(size, class)?;

        let function = self.declare_procedure(constructor)?;
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(obj);
        for arg in args {
            argv.push(self.emit_value(arg)?);
        }
        let argv = self.coerce_args(function, argv)?;
        self.builder.call(function, &argv, "")?;
        self.coerce_to(obj, ty)
    }

    /// `new T[n]`: header plus `n` elements, length stored, elements zero.
    fn emit_new_array(&mut self, length: &Expr, ty: &Type) -> Result<ValueId> {
        let Some(elem) = ty.array_element() else {
            return Err(CodegenError::UnhandledReferenceType {
                ty: self.classes.display_type(ty),
                context: "is not an array type",
            }
            .raise());
        };
        if matches!(elem, Type::Param(_)) {
            return Err(CodegenError::UnsupportedArrayElement {
                elem: self.classes.display_type(elem),
            }
            .raise());
        }
        let elem_ty = self.ir_type(elem)?;
        let module = self.builder.module_mut();
        let header = self.layout.header_size_in_bytes(module, ty)?;
        let elem_size = module.layout.size_of(&module.types, elem_ty)?;
        let header = self.layout.byte_constant(module, header, ty)?;
        let elem_size = self.layout.byte_constant(module, elem_size, ty)?;
        let i64 = module.types.i64();
        let i32 = module.types.i32();

        let count = self.emit_value(length)?;
        let count = self.coerce(count, i32)?;
        let wide = self.coerce(count, i64)?;
        let payload = self.builder.binary(IrBinaryOp::Mul, wide, elem_size, "payload")?;
        let size = self.builder.binary(IrBinaryOp::Add, payload, header, "size")?;

        let array_class = self.classes.array_class();
        let obj = self.allocate(size, array_class)?;
        let length_field = self.classes.array_length_field();
        let length_addr = self.layout.field_address(&mut self.builder, obj, length_field)?;
        self.builder.store(count, length_addr)?;
        self.coerce_to(obj, ty)
    }

    fn emit_call(
        &mut self,
        method: MethodId,
        receiver: Option<&Expr>,
        args: &[Expr],
        ty: &Type,
    ) -> Result<Option<ValueId>> {
        let decl = self.classes.method(method);
        let function = self.declare_procedure(method)?;
        let mut argv = Vec::with_capacity(args.len() + 1);
        match receiver {
            Some(receiver) if decl.has_receiver() => argv.push(self.emit_value(receiver)?),
            Some(receiver) => {
                self.emit_expr(receiver)?;
            }
            None if decl.has_receiver() => {
                let class = self.current("call")?.class;
                let this = Special {
                    kind: SpecialKind::This,
                    qualifier: None,
                    ty: Type::class(class),
                };
                argv.push(self.emit_special(&this)?);
            }
            None => {}
        }
        for arg in args {
            argv.push(self.emit_value(arg)?);
        }
        let argv = self.coerce_args(function, argv)?;
        match self.builder.call(function, &argv, "")? {
            Some(result) => Ok(Some(self.coerce_to(result, ty)?)),
            None => Ok(None),
        }
    }
}
