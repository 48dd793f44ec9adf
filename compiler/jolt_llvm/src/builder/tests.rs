use inkwell::context::Context;
use pretty_assertions::assert_eq;

use super::*;
use crate::{print_function, BinaryOp, CastOp, CmpPredicate, DataLayout, GepIndex, IrError};

/// Helper: a builder positioned in the entry block of `test_fn: i32 ()`.
fn setup_builder(context: &Context) -> (IrBuilder<'_>, FunctionId, BlockId) {
    let mut module = Module::new(context, "builder_test", DataLayout::default());
    let i32_ty = module.types.i32();
    let fn_ty = module.types.function(i32_ty, vec![]);
    let func = module
        .get_or_declare_function("test_fn", fn_ty)
        .unwrap();
    let mut irb = IrBuilder::new(module);
    let entry = irb.append_block(func, "entry");
    irb.position_at_end(func, entry);
    (irb, func, entry)
}

// -- Memory --

#[test]
fn alloca_yields_pointer_to_slot_type() {
    let context = Context::create();
    let (mut irb, func, _) = setup_builder(&context);
    let i64_ty = irb.module_mut().types.i64();
    let slot = irb.alloca(i64_ty, "x").unwrap();
    let ptr_ty = irb.module().value_type(slot);
    assert_eq!(irb.module().types.pointee(ptr_ty), Some(i64_ty));
    let text = print_function(irb.module(), func);
    assert!(text.contains("%x = alloca i64"), "{text}");
}

#[test]
fn store_checks_pointee_type() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let i64_ty = irb.module_mut().types.i64();
    let slot = irb.alloca(i64_ty, "x").unwrap();
    let wrong = irb.module_mut().const_i32(1);
    assert!(matches!(
        irb.store(wrong, slot),
        Err(IrError::TypeMismatch { .. })
    ));
    let right = irb.module_mut().const_i64(1);
    irb.store(right, slot).unwrap();
    let loaded = irb.load(slot, "v").unwrap();
    assert_eq!(irb.module().value_type(loaded), i64_ty);
}

#[test]
fn load_rejects_non_pointer() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let v = irb.module_mut().const_i32(3);
    assert!(matches!(irb.load(v, ""), Err(IrError::NotAPointer { .. })));
}

#[test]
fn struct_gep_walks_named_struct() {
    let context = Context::create();
    let (mut irb, func, _) = setup_builder(&context);
    let types = &mut irb.module_mut().types;
    let (i32_ty, i8p) = (types.i32(), types.i8_ptr());
    let id = types.get_or_create_named_struct("S");
    assert!(types.begin_fill(id));
    types.finish_fill(id, vec![i8p, i32_ty]).unwrap();
    let s = types.named(id);

    let slot = irb.alloca(s, "s").unwrap();
    let field = irb.struct_gep(slot, 1, "f").unwrap();
    let field_ty = irb.module().value_type(field);
    assert_eq!(irb.module().types.pointee(field_ty), Some(i32_ty));
    assert!(matches!(
        irb.struct_gep(slot, 2, ""),
        Err(IrError::InvalidIndex { index: 2, .. })
    ));
    let text = print_function(irb.module(), func);
    assert!(
        text.contains("%f = getelementptr inbounds %S, %S* %s, i32 0, i32 1"),
        "{text}"
    );
}

#[test]
fn gep_into_opaque_struct_fails() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let types = &mut irb.module_mut().types;
    let id = types.get_or_create_named_struct("Opaque");
    let s = types.named(id);
    let ptr_ty = types.ptr_to(s);
    let null = irb.module_mut().const_null(ptr_ty).unwrap();
    assert!(matches!(
        irb.struct_gep(null, 0, ""),
        Err(IrError::OpaqueStruct { .. })
    ));
    assert!(matches!(irb.load(null, ""), Err(IrError::OpaqueStruct { .. })));
}

#[test]
fn gep_rejects_dynamic_struct_index() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let types = &mut irb.module_mut().types;
    let i32_ty = types.i32();
    let s = types.literal_struct(vec![i32_ty, i32_ty]);
    let slot = irb.alloca(s, "").unwrap();
    let idx = irb.module_mut().const_i32(1);
    assert!(matches!(
        irb.gep(slot, &[GepIndex::Const(0), GepIndex::Value(idx)], ""),
        Err(IrError::DynamicStructIndex { .. })
    ));
}

#[test]
fn gep_into_array_accepts_value_index() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let types = &mut irb.module_mut().types;
    let i8_ty = types.i8();
    let arr = types.array(i8_ty, 0);
    let slot = irb.alloca(arr, "").unwrap();
    let idx = irb.module_mut().const_i64(5);
    let elem = irb
        .gep(slot, &[GepIndex::Const(0), GepIndex::Value(idx)], "e")
        .unwrap();
    let elem_ty = irb.module().value_type(elem);
    assert_eq!(irb.module().types.pointee(elem_ty), Some(i8_ty));
}

#[test]
fn bitcast_between_pointers() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let types = &mut irb.module_mut().types;
    let i64_ty = types.i64();
    let i8p = types.i8_ptr();
    let slot = irb.alloca(i64_ty, "").unwrap();
    let cast = irb.bitcast(slot, i8p, "raw").unwrap();
    assert_eq!(irb.module().value_type(cast), i8p);
    // Same type folds away.
    assert_eq!(irb.bitcast(cast, i8p, "").unwrap(), cast);
    assert!(matches!(
        irb.bitcast(slot, i64_ty, ""),
        Err(IrError::NotAPointer { .. })
    ));
}

#[test]
fn entry_alloca_ignores_insert_point() {
    let context = Context::create();
    let (mut irb, func, entry) = setup_builder(&context);
    let body = irb.append_block(func, "body");
    irb.position_at_end(func, body);
    let i32_ty = irb.module_mut().types.i32();
    irb.entry_alloca(func, i32_ty, "late").unwrap();
    // The insertion point survives: this lands in `body`.
    let zero = irb.module_mut().const_i32(0);
    irb.ret(zero).unwrap();

    let f = irb.module().function(func);
    assert!(f.block(entry).get_first_instruction().is_some());
    assert!(!f.is_terminated(entry));
    assert!(f.is_terminated(body));
    assert_eq!(irb.current_block(), Some(body));
}

#[test]
fn entry_alloca_after_entry_terminated_fails() {
    let context = Context::create();
    let (mut irb, func, _) = setup_builder(&context);
    let body = irb.append_block(func, "body");
    irb.br(body).unwrap();
    let i32_ty = irb.module_mut().types.i32();
    assert!(matches!(
        irb.entry_alloca(func, i32_ty, ""),
        Err(IrError::BlockTerminated { .. })
    ));
}

// -- Arithmetic --

#[test]
fn binary_requires_matching_operands() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let a = irb.module_mut().const_i32(1);
    let b = irb.module_mut().const_i64(2);
    assert!(matches!(
        irb.binary(BinaryOp::Add, a, b, ""),
        Err(IrError::TypeMismatch { .. })
    ));
    let f = irb.module_mut().types.f64();
    let x = irb.module_mut().const_float(f, 1.0).unwrap();
    assert!(matches!(
        irb.binary(BinaryOp::Add, x, x, ""),
        Err(IrError::TypeMismatch { .. })
    ));
    let sum = irb.binary(BinaryOp::FAdd, x, x, "").unwrap();
    assert_eq!(irb.module().value_type(sum), f);
}

#[test]
fn constant_operands_fold() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let a = irb.module_mut().const_i32(40);
    let b = irb.module_mut().const_i32(2);
    let sum = irb.binary(BinaryOp::Add, a, b, "sum").unwrap();
    assert_eq!(irb.module().value(sum).as_const_int(), Some(42));
    let neg = irb.neg(sum, "").unwrap();
    assert_eq!(irb.module().value(neg).as_const_int(), Some(-42));
}

#[test]
fn cmp_yields_i1() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let a = irb.module_mut().const_i32(1);
    let c = irb.cmp(CmpPredicate::Lt, a, a, "lt").unwrap();
    let i1 = irb.module_mut().types.i1();
    assert_eq!(irb.module().value_type(c), i1);
}

#[test]
fn pointers_compare_for_equality_only() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let i8p = irb.module_mut().types.i8_ptr();
    let null = irb.module_mut().const_null(i8p).unwrap();
    irb.cmp(CmpPredicate::Eq, null, null, "").unwrap();
    assert!(irb.cmp(CmpPredicate::Lt, null, null, "").is_err());
}

// -- Control flow --

#[test]
fn terminated_block_rejects_instructions() {
    let context = Context::create();
    let (mut irb, func, entry) = setup_builder(&context);
    let v = irb.module_mut().const_i32(0);
    irb.ret(v).unwrap();
    assert!(irb.current_block_terminated());
    assert!(matches!(irb.ret(v), Err(IrError::BlockTerminated { .. })));
    let i32_ty = irb.module_mut().types.i32();
    assert!(irb.alloca(i32_ty, "").is_err());
    assert!(irb.module().function(func).is_terminated(entry));
    let text = print_function(irb.module(), func);
    assert!(text.contains("ret i32 0"), "{text}");
}

#[test]
fn br_unless_terminated_is_idempotent() {
    let context = Context::create();
    let (mut irb, func, _) = setup_builder(&context);
    let next = irb.append_block(func, "next");
    let other = irb.append_block(func, "other");
    irb.br_unless_terminated(next).unwrap();
    irb.br_unless_terminated(other).unwrap();
    let text = print_function(irb.module(), func);
    assert!(text.contains("br label %next"), "{text}");
    assert!(!text.contains("br label %other"), "{text}");
}

#[test]
fn ret_checks_return_type() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let wrong = irb.module_mut().const_i64(0);
    assert!(matches!(irb.ret(wrong), Err(IrError::TypeMismatch { .. })));
    assert!(matches!(irb.ret_void(), Err(IrError::TypeMismatch { .. })));
}

#[test]
fn cond_br_requires_i1() {
    let context = Context::create();
    let (mut irb, func, _) = setup_builder(&context);
    let a = irb.append_block(func, "a");
    let b = irb.append_block(func, "b");
    let not_bool = irb.module_mut().const_i32(1);
    assert!(irb.cond_br(not_bool, a, b).is_err());
    let t = irb.module_mut().const_bool(true);
    irb.cond_br(t, a, b).unwrap();
}

#[test]
fn no_insert_point() {
    let context = Context::create();
    let module = Module::new(&context, "m", DataLayout::default());
    let mut irb = IrBuilder::new(module);
    assert!(matches!(irb.unreachable(), Err(IrError::NoInsertPoint)));
    assert!(!irb.current_block_terminated());
}

#[test]
fn save_and_restore_position() {
    let context = Context::create();
    let (mut irb, func, entry) = setup_builder(&context);
    let saved = irb.insert_point();
    let other = irb.append_block(func, "other");
    irb.position_at_end(func, other);
    irb.restore_position(saved);
    assert_eq!(irb.current_block(), Some(entry));
    assert_eq!(irb.current_function(), Some(func));
    // LLVM's insertion point follows the restored position.
    let v = irb.module_mut().const_i32(1);
    irb.ret(v).unwrap();
    assert!(irb.module().function(func).is_terminated(entry));
    assert!(!irb.module().function(func).is_terminated(other));
}

// -- Calls --

#[test]
fn call_checks_signature() {
    let context = Context::create();
    let (mut irb, func, _) = setup_builder(&context);
    let module = irb.module_mut();
    let (i32_ty, void) = (module.types.i32(), module.types.void());
    let callee_ty = module.types.function(void, vec![i32_ty]);
    let callee = module.get_or_declare_function("sink", callee_ty).unwrap();
    let arg = module.const_i32(7);

    assert!(matches!(
        irb.call(callee, &[], ""),
        Err(IrError::ArityMismatch {
            expected: 1,
            found: 0,
            ..
        })
    ));
    assert_eq!(irb.call(callee, &[arg], "ignored").unwrap(), None);
    let text = print_function(irb.module(), func);
    assert!(text.contains("call void @sink(i32 7)"), "{text}");
}

#[test]
fn params_are_indexed_by_position() {
    let context = Context::create();
    let mut module = Module::new(&context, "m", DataLayout::default());
    let i32_ty = module.types.i32();
    let fn_ty = module.types.function(i32_ty, vec![i32_ty, i32_ty]);
    let func = module.get_or_declare_function("pair", fn_ty).unwrap();
    module.set_param_name(func, 1, "second");
    let irb = IrBuilder::new(module);
    assert!(irb.param(func, 1).is_some());
    assert_eq!(irb.param(func, 2), None);
    let text = print_function(irb.module(), func);
    assert!(text.contains("declare i32 @pair(i32, i32)"), "{text}");
}

// -- Conversions --

#[test]
fn casts_check_direction() {
    let context = Context::create();
    let (mut irb, _, _) = setup_builder(&context);
    let types = &mut irb.module_mut().types;
    let (i32_ty, i64_ty, f64_ty) = (types.i32(), types.i64(), types.f64());
    let small = irb.module_mut().const_i32(1);
    let wide = irb.cast(CastOp::SExt, small, i64_ty, "").unwrap();
    assert_eq!(irb.module().value_type(wide), i64_ty);
    assert!(irb.cast(CastOp::Trunc, small, i64_ty, "").is_err());
    assert_eq!(irb.cast(CastOp::SExt, small, i32_ty, "").unwrap(), small);
    let fp = irb.convert_numeric(small, f64_ty, "").unwrap();
    assert_eq!(irb.module().value_type(fp), f64_ty);
}
