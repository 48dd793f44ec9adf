//! Per-unit translation state.
//!
//! The [`Translator`] owns the [`IrBuilder`] (and through it the module),
//! the object layout caches, the entry-point registry and the debug-info
//! recorder. A stack of [`FunctionContext`]s tracks the procedure whose
//! body is being emitted.

use inkwell::context::Context;
use jolt_llvm::{FunctionId, IrBuilder, IrError, Module, TypeId, ValueId};
use jolt_types::{ClassId, ClassTable, LocalId, MethodId, Type};
use rustc_hash::FxHashMap;

use crate::debug_info::DebugInfo;
use crate::entry::EntryPoints;
use crate::layout::ObjectLayout;
use crate::mangle::Mangler;
use crate::options::CodegenOptions;
use crate::{CodegenError, Result};

/// State of the procedure being emitted.
pub(crate) struct FunctionContext {
    pub function: FunctionId,
    pub class: ClassId,
    pub locals: FxHashMap<LocalId, ValueId>,
    /// Stack slot holding the receiver; `None` in static procedures.
    pub this_slot: Option<ValueId>,
}

pub struct Translator<'a, 'ctx> {
    pub(crate) classes: &'a ClassTable,
    pub(crate) options: &'a CodegenOptions,
    pub(crate) layout: ObjectLayout<'a>,
    pub(crate) builder: IrBuilder<'ctx>,
    pub(crate) functions: Vec<FunctionContext>,
    pub(crate) entry_points: EntryPoints,
    pub(crate) debug: DebugInfo,
}

impl<'a, 'ctx> Translator<'a, 'ctx> {
    /// A translator building into a fresh module in `context`.
    ///
    /// Struct names are unique per LLVM context, so a context should hold
    /// one unit's module at a time to keep class struct names unsuffixed.
    pub fn new(
        context: &'ctx Context,
        classes: &'a ClassTable,
        options: &'a CodegenOptions,
        mangler: &'a dyn Mangler,
    ) -> Self {
        let module = Module::new(context, &options.module_name, options.data_layout);
        Self {
            classes,
            options,
            layout: ObjectLayout::new(classes, mangler),
            builder: IrBuilder::new(module),
            functions: Vec::new(),
            entry_points: EntryPoints::new(),
            debug: DebugInfo::new(options.debug),
        }
    }

    #[inline]
    pub fn module(&self) -> &Module<'ctx> {
        self.builder.module()
    }

    #[inline]
    pub fn layout_mut(&mut self) -> &mut ObjectLayout<'a> {
        &mut self.layout
    }

    #[inline]
    pub fn entry_points(&self) -> &EntryPoints {
        &self.entry_points
    }

    #[inline]
    pub fn debug_info(&self) -> &DebugInfo {
        &self.debug
    }

    pub fn finish(self) -> (Module<'ctx>, EntryPoints, DebugInfo) {
        (self.builder.into_module(), self.entry_points, self.debug)
    }

    /// Run `f`, then put the insertion point back where it was, whether
    /// `f` succeeded or not.
    pub(crate) fn with_insert_point<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = self.builder.insert_point();
        let result = f(self);
        self.builder.restore_position(saved);
        result
    }

    // ── Procedure context ──────────────────────────────────────

    pub(crate) fn current(&self, what: &'static str) -> Result<&FunctionContext> {
        self.functions
            .last()
            .ok_or_else(|| CodegenError::NoEnclosingProcedure { what }.raise())
    }

    fn current_mut(&mut self, what: &'static str) -> Result<&mut FunctionContext> {
        match self.functions.last_mut() {
            Some(ctx) => Ok(ctx),
            None => Err(CodegenError::NoEnclosingProcedure { what }.raise()),
        }
    }

    /// Name of the procedure being emitted, for diagnostics.
    pub(crate) fn procedure_name(&self) -> String {
        self.functions.last().map_or_else(
            || "<none>".to_owned(),
            |ctx| self.module().function(ctx.function).name.clone(),
        )
    }

    pub(crate) fn bind_local(&mut self, local: LocalId, slot: ValueId) -> Result<()> {
        self.current_mut("local variable")?.locals.insert(local, slot);
        Ok(())
    }

    pub(crate) fn local_slot(&self, local: LocalId) -> Result<ValueId> {
        let ctx = self.current("local variable")?;
        match ctx.locals.get(&local) {
            Some(&slot) => Ok(slot),
            None => Err(CodegenError::UnboundLocal {
                local: local.raw(),
                procedure: self.procedure_name(),
            }
            .raise()),
        }
    }

    /// Stack slot in the current procedure's entry block.
    pub(crate) fn entry_alloca(&mut self, ty: TypeId, name: &str) -> Result<ValueId> {
        let function = self.current("stack slot")?.function;
        Ok(self.builder.entry_alloca(function, ty, name)?)
    }

    // ── Types and declarations ─────────────────────────────────

    pub(crate) fn ir_type(&mut self, ty: &Type) -> Result<TypeId> {
        self.layout.ir_type(self.builder.module_mut(), ty)
    }

    /// Declare (or look up) the function of a method or constructor.
    pub fn declare_procedure(&mut self, method: MethodId) -> Result<FunctionId> {
        let classes = self.classes;
        let decl = classes.method(method);
        let name = self.layout.mangler().procedure(classes, decl);
        let fn_ty = self.layout.function_type(self.builder.module_mut(), decl)?;
        Ok(self.builder.module_mut().get_or_declare_function(&name, fn_ty)?)
    }

    /// The runtime allocator, `i8* (i64)`.
    pub(crate) fn allocator(&mut self) -> Result<FunctionId> {
        let module = self.builder.module_mut();
        let i8_ptr = module.types.i8_ptr();
        let i64 = module.types.i64();
        let fn_ty = module.types.function(i8_ptr, vec![i64]);
        Ok(module.get_or_declare_function(&self.options.allocator, fn_ty)?)
    }

    /// Convert `value` to the IR type `to`.
    ///
    /// Pointers are bitcast (LLVM folds casts of constants, `null`
    /// included) and numbers go through [`IrBuilder::convert_numeric`].
    pub(crate) fn coerce(&mut self, value: ValueId, to: TypeId) -> Result<ValueId> {
        let module = self.builder.module_mut();
        let from = module.value_type(value);
        if from == to {
            return Ok(value);
        }
        let types = &module.types;
        match (types.is_pointer(from), types.is_pointer(to)) {
            (true, true) => Ok(self.builder.bitcast(value, to, "")?),
            (false, false) if !types.is_void(from) && !types.is_void(to) => {
                Ok(self.builder.convert_numeric(value, to, "")?)
            }
            _ => Err(CodegenError::Ir(IrError::TypeMismatch {
                expected: types.display(to),
                found: types.display(from),
            })
            .raise()),
        }
    }

    /// Lower `ty` and [`coerce`](Self::coerce) to it.
    pub(crate) fn coerce_to(&mut self, value: ValueId, ty: &Type) -> Result<ValueId> {
        let to = self.ir_type(ty)?;
        self.coerce(value, to)
    }

    /// Arguments coerced to `function`'s parameter types.
    pub(crate) fn coerce_args(&mut self, function: FunctionId, args: Vec<ValueId>) -> Result<Vec<ValueId>> {
        let module = self.module();
        let params: Vec<TypeId> = module
            .function(function)
            .params
            .iter()
            .map(|&p| module.value_type(p))
            .collect();
        if params.len() != args.len() {
            return Err(CodegenError::Ir(IrError::ArityMismatch {
                name: module.function(function).name.clone(),
                expected: params.len(),
                found: args.len(),
            })
            .raise());
        }
        args.into_iter()
            .zip(params)
            .map(|(arg, ty)| self.coerce(arg, ty))
            .collect()
    }
}
