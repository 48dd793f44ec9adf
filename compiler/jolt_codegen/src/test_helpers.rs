//! Shared fixtures for unit tests.

use inkwell::context::Context;
use jolt_llvm::{DataLayout, FunctionId, IrBuilder, Module, TypeId, ValueId};
use jolt_types::{ClassId, ClassTable, Flags, Type};

pub(crate) fn test_module(context: &Context) -> Module<'_> {
    Module::new(context, "test", DataLayout::default())
}

/// A builder positioned in the entry block of `void @sink(<param>)`,
/// plus the parameter.
pub(crate) fn param_builder(mut module: Module<'_>, param: TypeId) -> (IrBuilder<'_>, FunctionId, ValueId) {
    let void = module.types.void();
    let fn_ty = module.types.function(void, vec![param]);
    let function = module.get_or_declare_function("sink", fn_ty).unwrap();
    let mut irb = IrBuilder::new(module);
    let entry = irb.append_block(function, "entry");
    irb.position_at_end(function, entry);
    let value = irb.param(function, 0).unwrap();
    (irb, function, value)
}

/// `app.Point { int x; long y; }` and `app.Point3 extends Point { int z; }`.
pub(crate) struct Points {
    pub classes: ClassTable,
    pub point: ClassId,
    pub point3: ClassId,
}

pub(crate) fn points() -> Points {
    let mut classes = ClassTable::new();
    let point = classes.declare_class("app.Point", Flags::PUBLIC, None);
    classes.add_field(point, "x", Type::INT, Flags::PRIVATE);
    classes.add_field(point, "y", Type::LONG, Flags::PRIVATE);
    let point3 = classes.declare_class("app.Point3", Flags::PUBLIC, Some(Type::class(point)));
    classes.add_field(point3, "z", Type::INT, Flags::PRIVATE);
    Points {
        classes,
        point,
        point3,
    }
}
