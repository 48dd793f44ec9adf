//! Procedure definitions.
//!
//! ```text
//! define <ret> @<mangled>(<receiver>, <formals>...) {
//! entry:                        ; prologue: one slot per formal
//!   %this = alloca %class.C*
//!   store %class.C* %0, %class.C** %this
//!   %x = alloca i32
//!   store i32 %1, i32* %x
//!   ...                         ; slots for locals and temporaries
//!   br label %body              ; emitted last
//!
//! body:
//!   ...
//!   ret void                    ; or `unreachable` when non-void
//! }
//! ```
//!
//! The entry block stays open while the body is emitted, so slots needed
//! anywhere in the body can still be added to it.

use jolt_llvm::{FunctionId, IrError};
use jolt_types::{Flags, MethodDecl, ProcedureKind, Type};

use crate::ast::{Block, ProcedureDecl};
use crate::translator::{FunctionContext, Translator};
use crate::{CodegenError, Result};

impl Translator<'_, '_> {
    /// Emit the definition of a procedure.
    ///
    /// Returns `None` for procedures without a body (native and abstract),
    /// for which nothing is emitted.
    #[tracing::instrument(level = "debug", skip_all, fields(method = decl.method.raw()))]
    pub fn emit_procedure(&mut self, decl: &ProcedureDecl) -> Result<Option<FunctionId>> {
        let classes = self.classes;
        let method = classes.method(decl.method);
        let Some(body) = &decl.body else {
            tracing::trace!(name = %method.name, "no body; nothing to emit");
            return Ok(None);
        };
        if method.flags.has_no_implementation() {
            tracing::warn!(name = %method.name, "native or abstract procedure has a body");
        }

        let function = self.declare_procedure(decl.method)?;
        if !self.module().function(function).is_declaration() {
            return Err(CodegenError::DuplicateDefinition {
                procedure: self.module().function(function).name.clone(),
            }
            .raise());
        }

        let name = self.module().function(function).name.clone();
        tracing::debug!(function = %name, "emit procedure");
        self.functions.push(FunctionContext {
            function,
            class: method.container,
            locals: rustc_hash::FxHashMap::default(),
            this_slot: None,
        });
        self.debug.open_scope(&name);

        let result = self.with_insert_point(|t| t.emit_definition(function, method, decl, body));

        self.debug.close_scope();
        self.functions.pop();
        result.map(|()| Some(function))
    }

    fn emit_definition(
        &mut self,
        function: FunctionId,
        method: &MethodDecl,
        decl: &ProcedureDecl,
        body: &Block,
    ) -> Result<()> {
        let entry = self.builder.append_block(function, "entry");
        let body_block = self.builder.append_block(function, "body");
        self.builder.position_at_end(function, entry);

        let mut arg_index: u32 = 0;
        if method.has_receiver() {
            let receiver = self.param(function, 0)?;
            let ty = self.module().value_type(receiver);
            let slot = self.builder.alloca(ty, "this")?;
            self.builder.store(receiver, slot)?;
            self.debug.declare_parameter("this", 1, slot);
            if let Some(ctx) = self.functions.last_mut() {
                ctx.this_slot = Some(slot);
            }
            arg_index = 1;
        }

        for formal in &decl.formals {
            let ty = self.ir_type(&formal.ty)?;
            let slot = self.builder.alloca(ty, &formal.name)?;
            let arg = self.param(function, arg_index)?;
            self.builder.store(arg, slot)?;
            self.bind_local(formal.local, slot)?;
            self.debug.declare_parameter(&formal.name, arg_index + 1, slot);
            arg_index += 1;
        }

        if self.is_entry_point(method) {
            let class = &self.classes.class(method.container).name;
            if self.entry_points.register(function, class) {
                tracing::debug!(class = %class, "registered entry point");
            }
        }

        self.builder.position_at_end(function, body_block);
        self.emit_block(body)?;

        if !self.builder.current_block_terminated() {
            if method.return_type.is_void() {
                self.builder.ret_void()?;
            } else {
                self.builder.unreachable()?;
            }
        }

        self.builder.position_at_end(function, entry);
        self.builder.br(body_block)?;
        Ok(())
    }

    fn param(&self, function: FunctionId, index: u32) -> Result<jolt_llvm::ValueId> {
        self.builder.param(function, index).ok_or_else(|| {
            let func = self.module().function(function);
            CodegenError::Ir(IrError::ArityMismatch {
                name: func.name.clone(),
                expected: func.params.len(),
                found: index as usize + 1,
            })
            .raise()
        })
    }

    /// `public static <entry name>(<String>[])`.
    fn is_entry_point(&self, method: &MethodDecl) -> bool {
        if method.kind != ProcedureKind::Method
            || method.name != self.options.entry_name
            || !method.flags.contains(Flags::PUBLIC | Flags::STATIC)
        {
            return false;
        }
        match method.formals.as_slice() {
            [Type::Array(elem)] => matches!(
                elem.as_ref(),
                Type::Class { class, .. } if self.classes.class(*class).name == self.options.string_class
            ),
            _ => false,
        }
    }
}
