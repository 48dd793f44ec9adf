//! IR construction and layout errors.
//!
//! Every variant indicates a bug in the caller (the code generator), never a
//! problem in the source program. The builder checks operands before handing
//! them to LLVM, which would otherwise abort on malformed IR.

use inkwell::builder::BuilderError;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("builder has no insertion point")]
    NoInsertPoint,

    #[error("block `{block}` in `{function}` is already terminated")]
    BlockTerminated { function: String, block: String },

    #[error("expected a pointer, found `{found}`")]
    NotAPointer { found: String },

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },

    #[error("index {index} is out of range for `{ty}`")]
    InvalidIndex { ty: String, index: u64 },

    #[error("cannot index into non-aggregate type `{ty}`")]
    NotAggregate { ty: String },

    #[error("dynamic index into struct `{ty}`")]
    DynamicStructIndex { ty: String },

    #[error("struct `{name}` is opaque; its layout is unknown")]
    OpaqueStruct { name: String },

    #[error("struct `{name}` already has a body")]
    StructRefilled { name: String },

    #[error("type `{ty}` has no size")]
    Unsized { ty: String },

    #[error("`{name}` is already declared with type `{existing}`, requested `{requested}`")]
    SignatureMismatch {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("`{name}` expects {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("type `{ty}` is not a function type")]
    NotAFunction { ty: String },

    #[error("LLVM builder: {0}")]
    Builder(String),
}

impl From<BuilderError> for IrError {
    fn from(err: BuilderError) -> Self {
        IrError::Builder(err.to_string())
    }
}
