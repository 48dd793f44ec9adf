//! `this` and `super`.
//!
//! Both read the receiver slot of the enclosing procedure. `super` is the
//! same object seen as the superclass: a pointer bitcast, no adjustment.

use jolt_llvm::ValueId;

use crate::ast::{Special, SpecialKind};
use crate::translator::Translator;
use crate::{CodegenError, Result};

impl Translator<'_, '_> {
    pub fn emit_special(&mut self, special: &Special) -> Result<ValueId> {
        if let Some(qualifier) = special.qualifier {
            return Err(CodegenError::QualifiedSelfReference {
                qualifier: self.classes.class(qualifier).name.clone(),
            }
            .raise());
        }
        let keyword = match special.kind {
            SpecialKind::This => "this",
            SpecialKind::Super => "super",
        };
        let Some(slot) = self.current(keyword)?.this_slot else {
            return Err(CodegenError::MissingReceiver {
                keyword,
                procedure: self.procedure_name(),
            }
            .raise());
        };
        let this = self.builder.load(slot, "this")?;
        let ty = self.ir_type(&special.ty)?;
        match special.kind {
            SpecialKind::This => self.coerce(this, ty),
            SpecialKind::Super => Ok(self.builder.bitcast(this, ty, "super")?),
        }
    }
}
