//! Inheritance-flattened field lists.
//!
//! Each list is computed once per erased class: the superclass list of the
//! same kind, then the class's own fields of that kind in declaration order.
//! The instance list decides the order of the fields block, so it is the
//! source of every field index.

use jolt_types::{ClassId, FieldId};

use super::ObjectLayout;
use crate::{CodegenError, Result};

#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Instance,
    Static,
}

impl ObjectLayout<'_> {
    /// Non-static fields of `class`, superclass fields first.
    pub fn instance_fields(&mut self, class: ClassId) -> &[FieldId] {
        self.flattened(class, FieldKind::Instance)
    }

    /// Static fields of `class` and its ancestors, superclass fields first.
    pub fn static_fields(&mut self, class: ClassId) -> &[FieldId] {
        self.flattened(class, FieldKind::Static)
    }

    fn flattened(&mut self, class: ClassId, kind: FieldKind) -> &[FieldId] {
        if !self.field_cache(kind).contains_key(&class) {
            let mut list = match self.classes.superclass(class) {
                Some(sup) => self.flattened(sup, kind).to_vec(),
                None => Vec::new(),
            };
            let classes = self.classes;
            list.extend(
                classes
                    .class(class)
                    .fields
                    .iter()
                    .copied()
                    .filter(|&f| classes.field(f).is_static() == (kind == FieldKind::Static)),
            );
            tracing::trace!(
                class = %classes.class(class).name,
                count = list.len(),
                is_static = kind == FieldKind::Static,
                "flattened field list"
            );
            self.field_cache(kind).insert(class, list);
        }
        self.field_cache(kind).get(&class).map_or(&[][..], Vec::as_slice)
    }

    fn field_cache(&mut self, kind: FieldKind) -> &mut rustc_hash::FxHashMap<ClassId, Vec<FieldId>> {
        match kind {
            FieldKind::Instance => &mut self.instance_fields,
            FieldKind::Static => &mut self.static_fields,
        }
    }

    /// Position of `field` in the fields block of `container`.
    pub fn field_index(&mut self, container: ClassId, field: FieldId) -> Result<u32> {
        let position = self.instance_fields(container).iter().position(|&f| f == field);
        match position.and_then(|i| u32::try_from(i).ok()) {
            Some(index) => Ok(index),
            None => Err(CodegenError::FieldNotFound {
                field: self.classes.field(field).name.clone(),
                class: self.classes.class(container).name.clone(),
            }
            .raise()),
        }
    }
}
