//! Generic type erasure.
//!
//! Jolt generics are erased: `Box<String>` and `Box<Integer>` share one
//! runtime class. The back-end only ever reasons about erased classes, so
//! every cache in the layout engine is keyed by the result of
//! [`ClassTable::erase_class`].
//!
//! Rules:
//!
//! - `C<A..>` erases to `C`.
//! - A type parameter erases to the erasure of its bound, or to the root
//!   object class when unbounded.
//! - Every array type erases to the built-in array class.
//! - Primitives, `null` and `void` have no class erasure.

use crate::{ClassId, ClassTable, FieldId, Type};

/// A field reference after erasure: the declaring class and the erased
/// declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErasedField {
    pub field: FieldId,
    pub container: ClassId,
    pub ty: Type,
}

impl ClassTable {
    /// Erase a reference type to its runtime class.
    ///
    /// Returns `None` for types without a class representative (primitives,
    /// `null`, `void`).
    pub fn erase_class(&self, ty: &Type) -> Option<ClassId> {
        match ty {
            Type::Class { class, .. } => Some(*class),
            Type::Param(param) => match &param.bound {
                Some(bound) => self.erase_class(bound),
                None => Some(self.object()),
            },
            Type::Array(_) => Some(self.array_class()),
            Type::Void | Type::Null | Type::Primitive(_) => None,
        }
    }

    /// Erase a type, dropping type arguments and replacing parameters by
    /// their bounds. Array element types are erased recursively.
    pub fn erase(&self, ty: &Type) -> Type {
        match ty {
            Type::Class { class, .. } => Type::class(*class),
            Type::Param(param) => match &param.bound {
                Some(bound) => self.erase(bound),
                None => Type::class(self.object()),
            },
            Type::Array(elem) => Type::array_of(self.erase(elem)),
            Type::Void | Type::Null | Type::Primitive(_) => ty.clone(),
        }
    }

    /// Erase a field to its declaration.
    ///
    /// A field seen through `Box<String>` and through `Box<Integer>` erases
    /// to the same declaration on `Box`, typed by the erased declared type.
    pub fn erase_field(&self, field: FieldId) -> ErasedField {
        let decl = self.field(field);
        ErasedField {
            field,
            container: decl.container,
            ty: self.erase(&decl.ty),
        }
    }
}
