//! Resolved static types.

use crate::ClassId;

/// Built-in value types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    /// Source-level spelling.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Char => "char",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

/// A type parameter of a generic class, e.g. `T extends Comparable`.
///
/// Parameters are erased to their bound, or to the root object class when
/// unbounded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParam {
    pub name: String,
    pub bound: Option<Box<Type>>,
}

/// A resolved static type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Return type of procedures that produce nothing.
    Void,
    /// The type of the `null` literal.
    Null,
    Primitive(PrimitiveType),
    /// A class type, possibly instantiated with type arguments.
    Class { class: ClassId, args: Vec<Type> },
    /// A reference to a class type parameter.
    Param(TypeParam),
    /// An array of the element type.
    Array(Box<Type>),
}

impl Type {
    pub const BOOLEAN: Type = Type::Primitive(PrimitiveType::Boolean);
    pub const BYTE: Type = Type::Primitive(PrimitiveType::Byte);
    pub const SHORT: Type = Type::Primitive(PrimitiveType::Short);
    pub const CHAR: Type = Type::Primitive(PrimitiveType::Char);
    pub const INT: Type = Type::Primitive(PrimitiveType::Int);
    pub const LONG: Type = Type::Primitive(PrimitiveType::Long);
    pub const FLOAT: Type = Type::Primitive(PrimitiveType::Float);
    pub const DOUBLE: Type = Type::Primitive(PrimitiveType::Double);

    /// A non-generic class type.
    pub fn class(class: ClassId) -> Self {
        Type::Class {
            class,
            args: Vec::new(),
        }
    }

    /// A generic class instantiation, e.g. `Box<String>`.
    pub fn generic(class: ClassId, args: Vec<Type>) -> Self {
        Type::Class { class, args }
    }

    pub fn array_of(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// An unbounded type parameter.
    pub fn param(name: impl Into<String>) -> Self {
        Type::Param(TypeParam {
            name: name.into(),
            bound: None,
        })
    }

    /// A type parameter with an upper bound.
    pub fn bounded_param(name: impl Into<String>, bound: Type) -> Self {
        Type::Param(TypeParam {
            name: name.into(),
            bound: Some(Box::new(bound)),
        })
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveType::Boolean))
    }

    /// Class, type parameter, array, or `null`.
    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class { .. } | Type::Param(_) | Type::Array(_) | Type::Null
        )
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    /// Element type of an array type.
    pub fn array_element(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }
}
