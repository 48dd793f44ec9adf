//! Typed, ID-based LLVM IR construction for the Jolt native back-end.
//!
//! A thin layer over inkwell that keeps every LLVM value behind a `Copy` ID
//! and checks each instruction's operand types before LLVM sees them:
//!
//! - **Types** ([`TypeTable`], [`IrType`]): interned types, each backed by
//!   an LLVM type, plus named struct records that start opaque and are
//!   filled exactly once ([`StructState`]). Opaque structs can be pointed to
//!   before their body is known, which is how cyclic class graphs are
//!   declared.
//! - **Data layout** ([`DataLayout`], [`TargetLayout`]): sizes, alignments
//!   and element offsets from LLVM's `TargetData`. Querying the layout of an
//!   opaque struct is an error.
//! - **Module** ([`Module`], [`Function`], [`Global`]): one LLVM module plus
//!   the value arena ([`ValueId`]) the builder records into.
//! - **Builder** ([`IrBuilder`]): owns the module and a single insertion
//!   point.
//! - **Printing and verification** ([`print_module`], [`verify_module`]):
//!   LLVM's own assembly writer and module verifier.
//!
//! This crate knows nothing about classes; `jolt_codegen` maps the object
//! model onto it.

mod builder;
mod error;
mod ids;
mod layout;
mod module;
mod types;

pub use builder::{InsertPoint, IrBuilder};
pub use error::IrError;
pub use ids::{BlockId, FunctionId, GlobalId, StructId, TypeId, ValueId};
pub use layout::{DataLayout, TargetLayout};
pub use module::{
    print_function, print_module, verify_module, BinaryOp, CastOp, CmpPredicate, Function,
    GepIndex, Global, Module, ValueData, VerifyError,
};
pub use types::{IrType, StructDef, StructState, TypeTable};
