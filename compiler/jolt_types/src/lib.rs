//! Resolved program model for the Jolt native back-end.
//!
//! The front end (parsing, name resolution, type checking) hands the back-end
//! a fully resolved class hierarchy. This crate is that hand-off format:
//!
//! - **[`ClassTable`]**: arena of classes, fields and methods, indexed by
//!   [`ClassId`], [`FieldId`] and [`MethodId`]. Pre-seeded with the three
//!   built-in classes every program relies on (root object, string, array).
//! - **[`Type`]**: resolved static types: primitives, class instances with
//!   type arguments, type parameters, arrays, `null` and `void`.
//! - **Erasure**: [`ClassTable::erase_class`], [`ClassTable::erase`] and
//!   [`ClassTable::erase_field`] map generic types to their single runtime
//!   representative. Every layout decision downstream is keyed by the
//!   erased class.
//!
//! # Crate Dependencies
//!
//! No IR dependency. `jolt_codegen` consumes this crate together with
//! `jolt_llvm`.

mod class;
mod erasure;
mod flags;
mod ids;
mod table;
mod ty;

pub use class::{ClassDecl, FieldDecl, MethodDecl, ProcedureKind};
pub use erasure::ErasedField;
pub use flags::Flags;
pub use ids::{ClassId, FieldId, LocalId, MethodId};
pub use table::ClassTable;
pub use ty::{PrimitiveType, Type, TypeParam};
