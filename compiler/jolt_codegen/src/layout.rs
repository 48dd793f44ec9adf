//! Object layout engine.
//!
//! Maps erased classes to named IR structs with a fixed component order:
//!
//! ```text
//! %class.<fqn> = type {
//!     %dv.<fqn>*,      ; 0: dispatch vector
//!     i8*,             ; 1: reserved synchronization word
//!     { fields... },   ; 2: flattened instance fields, superclass first
//!     [0 x i8]         ; 3: element region (array class only)
//! }
//! ```
//!
//! Every cache is keyed by the erased [`ClassId`], so `Box<String>` and
//! `Box<Integer>` share one struct, one field list and one dispatch vector.
//!
//! Class structs are declared opaque on first reference and filled on first
//! layout query. A field of type `Node` inside `Node` only needs a pointer to
//! the opaque struct, so cyclic class graphs fill without recursion into
//! themselves; a fill requested while the same struct is already being
//! filled returns immediately.

mod dispatch;
mod fields;
mod info;

use jolt_llvm::{GepIndex, GlobalId, IrBuilder, Module, StructId, TypeId, ValueId};
use jolt_types::{ClassId, ClassTable, FieldId, Type};
use rustc_hash::FxHashMap;

use crate::mangle::Mangler;
use crate::{CodegenError, Result};

pub use dispatch::DispatchSlot;
pub use info::{ClassLayoutInfo, FieldLayoutInfo, StaticFieldInfo};

/// Components of an object struct, in layout order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    DispatchVector,
    Sync,
    Fields,
    ArrayTail,
}

impl Component {
    #[inline]
    pub const fn index(self) -> u32 {
        match self {
            Component::DispatchVector => 0,
            Component::Sync => 1,
            Component::Fields => 2,
            Component::ArrayTail => 3,
        }
    }
}

/// Layout engine for one compilation unit.
///
/// Holds no IR itself; every operation takes the [`Module`] (or the
/// [`IrBuilder`] owning it) explicitly.
pub struct ObjectLayout<'a> {
    classes: &'a ClassTable,
    mangler: &'a dyn Mangler,
    structs: FxHashMap<ClassId, StructId>,
    dv_structs: FxHashMap<ClassId, StructId>,
    dv_globals: FxHashMap<ClassId, GlobalId>,
    static_globals: FxHashMap<FieldId, GlobalId>,
    instance_fields: FxHashMap<ClassId, Vec<FieldId>>,
    static_fields: FxHashMap<ClassId, Vec<FieldId>>,
    dispatch_slots: FxHashMap<ClassId, Vec<DispatchSlot>>,
}

impl<'a> ObjectLayout<'a> {
    pub fn new(classes: &'a ClassTable, mangler: &'a dyn Mangler) -> Self {
        Self {
            classes,
            mangler,
            structs: FxHashMap::default(),
            dv_structs: FxHashMap::default(),
            dv_globals: FxHashMap::default(),
            static_globals: FxHashMap::default(),
            instance_fields: FxHashMap::default(),
            static_fields: FxHashMap::default(),
            dispatch_slots: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn classes(&self) -> &'a ClassTable {
        self.classes
    }

    #[inline]
    pub fn mangler(&self) -> &'a dyn Mangler {
        self.mangler
    }

    /// Erased class of a reference type.
    pub fn erased_class(&self, ty: &Type, context: &'static str) -> Result<ClassId> {
        self.classes.erase_class(ty).ok_or_else(|| {
            CodegenError::UnhandledReferenceType {
                ty: self.classes.display_type(ty),
                context,
            }
            .raise()
        })
    }

    // ── Struct types ───────────────────────────────────────────

    /// Named struct of a reference type's erased class, declared opaque on
    /// first request.
    pub fn struct_type_ref(&mut self, module: &mut Module<'_>, ty: &Type) -> Result<StructId> {
        let class = self.erased_class(ty, "has no object layout")?;
        Ok(self.struct_for_class(module, class))
    }

    /// Named struct of an erased class, declared opaque on first request.
    pub fn struct_for_class(&mut self, module: &mut Module<'_>, class: ClassId) -> StructId {
        if let Some(&id) = self.structs.get(&class) {
            return id;
        }
        let name = self.mangler.class_struct(&self.classes.class(class).name);
        let id = module.types.get_or_create_named_struct(&name);
        tracing::trace!(class = %name, "declare class struct");
        self.structs.insert(class, id);
        id
    }

    /// `%class.<fqn>*` for an erased class.
    pub fn object_pointer_type(&mut self, module: &mut Module<'_>, class: ClassId) -> TypeId {
        let id = self.struct_for_class(module, class);
        let named = module.types.named(id);
        module.types.ptr_to(named)
    }

    /// Fill the struct of a reference type's erased class.
    ///
    /// Idempotent. Returns immediately while the same struct is being
    /// filled further up the stack.
    pub fn ensure_filled(&mut self, module: &mut Module<'_>, ty: &Type) -> Result<StructId> {
        let class = self.erased_class(ty, "cannot be laid out")?;
        self.ensure_class_filled(module, class)
    }

    pub fn ensure_class_filled(&mut self, module: &mut Module<'_>, class: ClassId) -> Result<StructId> {
        let id = self.struct_for_class(module, class);
        if !module.types.begin_fill(id) {
            return Ok(id);
        }
        match self.object_components(module, class) {
            Ok(body) => {
                module.types.finish_fill(id, body)?;
                tracing::debug!(class = %self.classes.class(class).name, "filled class struct");
                Ok(id)
            }
            Err(err) => {
                module.types.abort_fill(id);
                Err(err)
            }
        }
    }

    fn object_components(&mut self, module: &mut Module<'_>, class: ClassId) -> Result<Vec<TypeId>> {
        let dv = self.dispatch_vector_struct_ref(module, class);
        let dv_named = module.types.named(dv);
        let dv_ptr = module.types.ptr_to(dv_named);
        let sync = module.types.i8_ptr();

        let fields = self.instance_fields(class).to_vec();
        let mut field_tys = Vec::with_capacity(fields.len());
        for field in fields {
            let erased = self.classes.erase_field(field);
            field_tys.push(self.ir_type(module, &erased.ty)?);
        }
        let block = module.types.literal_struct(field_tys);

        let mut body = vec![dv_ptr, sync, block];
        if class == self.classes.array_class() {
            let i8 = module.types.i8();
            body.push(module.types.array(i8, 0));
        }
        Ok(body)
    }

    // ── Sizes ──────────────────────────────────────────────────

    /// Allocation size of an object of `ty`'s erased class, in bytes.
    pub fn size_in_bytes(&mut self, module: &mut Module<'_>, ty: &Type) -> Result<u64> {
        let id = self.ensure_filled(module, ty)?;
        let named = module.types.named(id);
        Ok(module.layout.size_of(&module.types, named)?)
    }

    /// [`size_in_bytes`](Self::size_in_bytes) as an `i64` constant.
    pub fn size_of(&mut self, module: &mut Module<'_>, ty: &Type) -> Result<ValueId> {
        let size = self.size_in_bytes(module, ty)?;
        self.byte_constant(module, size, ty)
    }

    /// A byte count of an object of `ty` as an `i64` constant.
    pub fn byte_constant(&self, module: &mut Module<'_>, bytes: u64, ty: &Type) -> Result<ValueId> {
        let bytes = i64::try_from(bytes).map_err(|_| {
            CodegenError::UnhandledReferenceType {
                ty: self.classes.display_type(ty),
                context: "is too large to allocate",
            }
            .raise()
        })?;
        Ok(module.const_i64(bytes))
    }

    /// Bytes up to the end of the instance-fields block, where an array's
    /// element region begins.
    pub fn header_size_in_bytes(&mut self, module: &mut Module<'_>, ty: &Type) -> Result<u64> {
        let id = self.ensure_filled(module, ty)?;
        let named = module.types.named(id);
        let fields_slot = Component::Fields.index() as usize;
        let types = &module.types;
        let block = types.struct_fields(named)?[fields_slot];
        let start = module.layout.element_offset(types, named, fields_slot)?;
        Ok(start + module.layout.size_of(types, block)?)
    }

    // ── Addresses ──────────────────────────────────────────────

    /// Reinterpret `instance` as a pointer to `class`'s filled struct.
    fn view_as(&mut self, irb: &mut IrBuilder<'_>, instance: ValueId, class: ClassId) -> Result<ValueId> {
        self.ensure_class_filled(irb.module_mut(), class)?;
        let ptr = self.object_pointer_type(irb.module_mut(), class);
        Ok(irb.bitcast(instance, ptr, "")?)
    }

    /// Address of the dispatch-vector slot of `instance`.
    pub fn dispatch_vector_address(
        &mut self,
        irb: &mut IrBuilder<'_>,
        instance: ValueId,
        ty: &Type,
    ) -> Result<ValueId> {
        let class = self.erased_class(ty, "has no dispatch vector")?;
        let obj = self.view_as(irb, instance, class)?;
        Ok(irb.struct_gep(obj, Component::DispatchVector.index(), "dv.addr")?)
    }

    /// Address of an instance field of `instance`.
    ///
    /// The field is erased to its declaring class, whose struct `instance`
    /// is viewed through.
    pub fn field_address(
        &mut self,
        irb: &mut IrBuilder<'_>,
        instance: ValueId,
        field: FieldId,
    ) -> Result<ValueId> {
        let erased = self.classes.erase_field(field);
        let index = self.field_index(erased.container, field)?;
        let obj = self.view_as(irb, instance, erased.container)?;
        let name = format!("{}.addr", self.classes.field(field).name);
        Ok(irb.gep(
            obj,
            &[
                GepIndex::Const(0),
                GepIndex::Const(Component::Fields.index()),
                GepIndex::Const(index),
            ],
            &name,
        )?)
    }

    /// Address of element 0 of an array, typed as a pointer to the lowered
    /// element type.
    pub fn array_base_address(
        &mut self,
        irb: &mut IrBuilder<'_>,
        instance: ValueId,
        array_ty: &Type,
    ) -> Result<ValueId> {
        let Some(elem) = array_ty.array_element() else {
            return Err(CodegenError::UnhandledReferenceType {
                ty: self.classes.display_type(array_ty),
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
        let elem_ty = self.ir_type(irb.module_mut(), elem)?;
        let array_class = self.classes.array_class();
        let obj = self.view_as(irb, instance, array_class)?;
        let tail = irb.struct_gep(obj, Component::ArrayTail.index(), "array.tail")?;
        let elem_ptr = irb.module_mut().types.ptr_to(elem_ty);
        Ok(irb.bitcast(tail, elem_ptr, "array.base")?)
    }
}
