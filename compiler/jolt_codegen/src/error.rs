//! Internal compiler errors raised during code generation.
//!
//! None of these describe a defect in the source program. Each one means
//! the front end and the back-end disagree about the program, and each
//! aborts translation of the whole compilation unit.

use jolt_llvm::{IrError, VerifyError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodegenError>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A field is missing from the flattened field list of its erased
    /// container.
    #[error("field `{field}` not found in the field list of `{class}`")]
    FieldNotFound { field: String, class: String },

    /// A type with no class representative where an object layout is needed.
    #[error("unhandled reference type `{ty}` {context}")]
    UnhandledReferenceType { ty: String, context: &'static str },

    #[error("qualified `{qualifier}.this` is not supported")]
    QualifiedSelfReference { qualifier: String },

    #[error("`{keyword}` used without a receiver in `{procedure}`")]
    MissingReceiver {
        keyword: &'static str,
        procedure: String,
    },

    #[error("local #{local} is not bound in `{procedure}`")]
    UnboundLocal { local: u32, procedure: String },

    #[error("array element type `{elem}` is a type parameter; its tail layout is unknown")]
    UnsupportedArrayElement { elem: String },

    #[error("class `{class}` does not declare procedure `{procedure}`")]
    MissingProcedure { class: String, procedure: String },

    #[error("procedure `{procedure}` is defined more than once")]
    DuplicateDefinition { procedure: String },

    #[error("expression of type `void` used as a value in `{procedure}`")]
    VoidValue { procedure: String },

    #[error("`{what}` used outside of a procedure body")]
    NoEnclosingProcedure { what: &'static str },

    #[error("emitted IR failed verification: {0}")]
    Verify(VerifyError),

    #[error(transparent)]
    Ir(#[from] IrError),
}

impl CodegenError {
    /// Log the error and return it, for `return Err(err.raise())`.
    #[cold]
    pub(crate) fn raise(self) -> Self {
        tracing::error!(error = %self, "internal compiler error");
        self
    }
}
