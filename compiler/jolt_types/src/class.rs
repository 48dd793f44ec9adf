//! Class, field and method declarations.

use crate::{ClassId, Flags, Type};

/// A class declaration after name resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    /// Fully qualified name, e.g. `jolt.lang.Object`.
    pub name: String,
    pub flags: Flags,
    /// Declared superclass type. `None` only for the root object class.
    pub superclass: Option<Type>,
    /// Names of declared type parameters.
    pub type_params: Vec<String>,
    /// Declared fields (instance and static) in source order.
    pub fields: Vec<crate::FieldId>,
    /// Declared methods and constructors in source order.
    pub methods: Vec<crate::MethodId>,
}

/// A field declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    /// The class that declares the field.
    pub container: ClassId,
    /// Declared type; may mention the container's type parameters.
    pub ty: Type,
    pub flags: Flags,
}

impl FieldDecl {
    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.is_static()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcedureKind {
    Method,
    Constructor,
}

/// A method or constructor signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub container: ClassId,
    pub flags: Flags,
    pub kind: ProcedureKind,
    /// Declared formal types, receiver excluded.
    pub formals: Vec<Type>,
    /// `Type::Void` for constructors.
    pub return_type: Type,
}

impl MethodDecl {
    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.is_static()
    }

    /// Instance methods and constructors take the receiver as parameter 0.
    #[inline]
    pub fn has_receiver(&self) -> bool {
        !self.is_static()
    }

    /// Participates in dynamic dispatch.
    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.kind == ProcedureKind::Method && !self.is_static() && !self.flags.contains(Flags::PRIVATE)
    }
}
