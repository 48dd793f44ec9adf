//! Static field globals and per-class layout records.
//!
//! [`ClassLayoutInfo`] is what the runtime's class registration needs:
//! object size plus name, byte offset and modifiers of every instance
//! field. Offsets come from the same flattened list and data layout as
//! the GEPs emitted by [`ObjectLayout::field_address`].

use jolt_llvm::{GlobalId, Module};
use jolt_types::{ClassId, FieldId, Flags};

use super::{Component, ObjectLayout};
use crate::{CodegenError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldLayoutInfo {
    pub name: String,
    /// Byte offset from the start of the object.
    pub offset: u64,
    pub flags: Flags,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticFieldInfo {
    pub name: String,
    /// Symbol of the backing global.
    pub symbol: String,
    pub flags: Flags,
}

/// Layout summary of one class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassLayoutInfo {
    pub name: String,
    pub superclass: Option<String>,
    pub object_size: u64,
    /// Instance fields, superclass fields first.
    pub fields: Vec<FieldLayoutInfo>,
    pub static_fields: Vec<StaticFieldInfo>,
    /// Number of method slots in the dispatch vector.
    pub dispatch_slots: usize,
}

impl ObjectLayout<'_> {
    /// The zero-initialized global backing a static field.
    pub fn static_field_global(&mut self, module: &mut Module<'_>, field: FieldId) -> Result<GlobalId> {
        if let Some(&id) = self.static_globals.get(&field) {
            return Ok(id);
        }
        let classes = self.classes;
        let decl = classes.field(field);
        if !decl.is_static() {
            return Err(CodegenError::FieldNotFound {
                field: decl.name.clone(),
                class: format!("{} (static fields)", classes.class(decl.container).name),
            }
            .raise());
        }
        let erased = classes.erase_field(field);
        let ty = self.ir_type(module, &erased.ty)?;
        let symbol = self.mangler.static_field(classes, decl);
        let id = module.get_or_add_global(&symbol, ty)?;
        self.static_globals.insert(field, id);
        Ok(id)
    }

    /// Layout summary of `class`. Fills its struct.
    pub fn class_layout_info(&mut self, module: &mut Module<'_>, class: ClassId) -> Result<ClassLayoutInfo> {
        let classes = self.classes;
        let id = self.ensure_class_filled(module, class)?;
        let named = module.types.named(id);
        let object_size = module.layout.size_of(&module.types, named)?;

        let mut fields = Vec::new();
        for (index, &field) in (0u64..).zip(self.instance_fields(class).to_vec().iter()) {
            let offset = module.layout.gep_offset(
                &module.types,
                named,
                &[0, u64::from(Component::Fields.index()), index],
            )?;
            let decl = classes.field(field);
            fields.push(FieldLayoutInfo {
                name: decl.name.clone(),
                offset,
                flags: decl.flags,
            });
        }

        let mut static_fields = Vec::new();
        for field in self.static_fields(class).to_vec() {
            let global = self.static_field_global(module, field)?;
            let decl = classes.field(field);
            static_fields.push(StaticFieldInfo {
                name: decl.name.clone(),
                symbol: module.global(global).name.clone(),
                flags: decl.flags,
            });
        }

        Ok(ClassLayoutInfo {
            name: classes.class(class).name.clone(),
            superclass: classes.superclass(class).map(|s| classes.class(s).name.clone()),
            object_size,
            fields,
            static_fields,
            dispatch_slots: self.dispatch_slots(class).len(),
        })
    }
}
