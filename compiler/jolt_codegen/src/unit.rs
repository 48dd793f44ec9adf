//! Whole-unit translation.
//!
//! Two phases, so procedures can call each other in any order:
//!
//! 1. **Declare**: fill every class struct, add static field globals and
//!    dispatch vectors, declare every procedure's function.
//! 2. **Define**: emit each procedure body.
//!
//! The finished module goes through LLVM's verifier before it is returned.
//! The first error aborts the whole unit.

use inkwell::context::Context;
use jolt_llvm::{verify_module, Module};
use jolt_types::{ClassId, ClassTable};

use crate::ast::CompilationUnit;
use crate::debug_info::DebugInfo;
use crate::entry::EntryPoints;
use crate::layout::ClassLayoutInfo;
use crate::mangle::{JoltMangler, Mangler};
use crate::options::CodegenOptions;
use crate::translator::Translator;
use crate::{CodegenError, Result};

/// Result of translating one compilation unit.
#[derive(Debug)]
pub struct CodegenOutput<'ctx> {
    pub module: Module<'ctx>,
    pub entry_points: EntryPoints,
    /// Layout records of the unit's classes, in unit order.
    pub layouts: Vec<ClassLayoutInfo>,
    pub debug_info: DebugInfo,
}

/// Translate a unit with the default mangler.
pub fn compile_unit<'ctx>(
    context: &'ctx Context,
    classes: &ClassTable,
    unit: &CompilationUnit,
    options: &CodegenOptions,
) -> Result<CodegenOutput<'ctx>> {
    compile_unit_with(context, classes, unit, options, &JoltMangler)
}

#[tracing::instrument(level = "debug", skip_all, fields(module = %options.module_name))]
pub fn compile_unit_with<'ctx>(
    context: &'ctx Context,
    classes: &ClassTable,
    unit: &CompilationUnit,
    options: &CodegenOptions,
    mangler: &dyn Mangler,
) -> Result<CodegenOutput<'ctx>> {
    let mut translator = Translator::new(context, classes, options, mangler);

    let mut layouts = Vec::with_capacity(unit.classes.len());
    for body in &unit.classes {
        layouts.push(translator.declare_class(body.class)?);
    }
    for body in &unit.classes {
        for procedure in &body.procedures {
            let container = classes.method(procedure.method).container;
            if container != body.class {
                return Err(CodegenError::MissingProcedure {
                    class: classes.class(body.class).name.clone(),
                    procedure: classes.method(procedure.method).name.clone(),
                }
                .raise());
            }
            translator.declare_procedure(procedure.method)?;
        }
    }
    for body in &unit.classes {
        for procedure in &body.procedures {
            translator.emit_procedure(procedure)?;
        }
    }

    let (module, entry_points, debug_info) = translator.finish();
    if let Err(error) = verify_module(&module) {
        return Err(CodegenError::Verify(error).raise());
    }
    tracing::debug!(
        functions = module.functions().count(),
        entry_points = entry_points.len(),
        "unit translated"
    );
    Ok(CodegenOutput {
        module,
        entry_points,
        layouts,
        debug_info,
    })
}

impl Translator<'_, '_> {
    /// Lay out a class and add its module-level symbols: the dispatch
    /// vector and one global per static field.
    pub fn declare_class(&mut self, class: ClassId) -> Result<ClassLayoutInfo> {
        let module = self.builder.module_mut();
        self.layout.ensure_class_filled(module, class)?;
        self.layout.dispatch_vector_global(module, class)?;
        let info = self.layout.class_layout_info(module, class)?;
        tracing::debug!(class = %info.name, size = info.object_size, "declared class");
        Ok(info)
    }
}
