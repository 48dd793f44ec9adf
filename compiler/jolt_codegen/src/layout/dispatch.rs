//! Dispatch vectors.
//!
//! ```text
//! %dv.<fqn> = type { i8*, <fn>*, <fn>*, ... }
//! ```
//!
//! Slot 0 holds the runtime class object. Method slots follow: the
//! superclass's slots first, an overriding method taking over the slot of
//! the method it overrides, new virtual methods appended in declaration
//! order. The per-class global is zero-initialized; the runtime populates
//! it when the class is registered.

use jolt_llvm::{GlobalId, Module, StructId, TypeId};
use jolt_types::{ClassId, MethodId};

use super::ObjectLayout;
use crate::Result;

/// One method slot of a dispatch vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchSlot {
    /// The method that introduced the slot; fixes the slot's signature.
    pub declared: MethodId,
    /// The most derived implementation for this class.
    pub implementation: MethodId,
}

/// Index of the first method slot in a dispatch-vector struct.
pub const FIRST_METHOD_SLOT: u32 = 1;

impl ObjectLayout<'_> {
    /// Method slots of `class`, inherited slots first.
    pub fn dispatch_slots(&mut self, class: ClassId) -> &[DispatchSlot] {
        if !self.dispatch_slots.contains_key(&class) {
            let mut slots = match self.classes.superclass(class) {
                Some(sup) => self.dispatch_slots(sup).to_vec(),
                None => Vec::new(),
            };
            let classes = self.classes;
            for &method in &classes.class(class).methods {
                if !classes.method(method).is_virtual() {
                    continue;
                }
                match slots.iter_mut().find(|s| self.overrides(method, s.declared)) {
                    Some(slot) => slot.implementation = method,
                    None => slots.push(DispatchSlot {
                        declared: method,
                        implementation: method,
                    }),
                }
            }
            self.dispatch_slots.insert(class, slots);
        }
        self.dispatch_slots.get(&class).map_or(&[][..], Vec::as_slice)
    }

    /// `method` overrides `base`: same name and same erased formals.
    fn overrides(&self, method: MethodId, base: MethodId) -> bool {
        let (m, b) = (self.classes.method(method), self.classes.method(base));
        m.name == b.name
            && m.formals.len() == b.formals.len()
            && m.formals
                .iter()
                .zip(&b.formals)
                .all(|(x, y)| self.classes.erase(x) == self.classes.erase(y))
    }

    /// Struct index of `method`'s slot in `class`'s dispatch vector.
    pub fn dispatch_slot_index(&mut self, class: ClassId, method: MethodId) -> Option<u32> {
        let position = self
            .dispatch_slots(class)
            .iter()
            .position(|s| s.declared == method || s.implementation == method)?;
        u32::try_from(position).ok().map(|p| p + FIRST_METHOD_SLOT)
    }

    /// The dispatch-vector struct of `class`, declared opaque on first request.
    pub(crate) fn dispatch_vector_struct_ref(&mut self, module: &mut Module<'_>, class: ClassId) -> StructId {
        if let Some(&id) = self.dv_structs.get(&class) {
            return id;
        }
        let name = self.mangler.dispatch_vector_struct(&self.classes.class(class).name);
        let id = module.types.get_or_create_named_struct(&name);
        self.dv_structs.insert(class, id);
        id
    }

    /// The filled dispatch-vector struct of `class`.
    pub fn dispatch_vector_struct(&mut self, module: &mut Module<'_>, class: ClassId) -> Result<StructId> {
        let id = self.dispatch_vector_struct_ref(module, class);
        if !module.types.begin_fill(id) {
            return Ok(id);
        }
        match self.dispatch_vector_components(module, class) {
            Ok(body) => {
                module.types.finish_fill(id, body)?;
                Ok(id)
            }
            Err(err) => {
                module.types.abort_fill(id);
                Err(err)
            }
        }
    }

    fn dispatch_vector_components(&mut self, module: &mut Module<'_>, class: ClassId) -> Result<Vec<TypeId>> {
        let classes = self.classes;
        let slots = self.dispatch_slots(class).to_vec();
        let mut body = Vec::with_capacity(slots.len() + 1);
        body.push(module.types.i8_ptr());
        for slot in slots {
            let fn_ty = self.function_type(module, classes.method(slot.declared))?;
            body.push(module.types.ptr_to(fn_ty));
        }
        Ok(body)
    }

    /// The global holding `class`'s dispatch vector.
    pub fn dispatch_vector_global(&mut self, module: &mut Module<'_>, class: ClassId) -> Result<GlobalId> {
        if let Some(&id) = self.dv_globals.get(&class) {
            return Ok(id);
        }
        let dv = self.dispatch_vector_struct(module, class)?;
        let ty = module.types.named(dv);
        let name = self.mangler.dispatch_vector_global(&self.classes.class(class).name);
        let id = module.get_or_add_global(&name, ty)?;
        tracing::trace!(global = %name, "declare dispatch vector");
        self.dv_globals.insert(class, id);
        Ok(id)
    }
}
