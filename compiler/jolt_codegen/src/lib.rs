//! Object layout and IR emission for the Jolt native back-end.
//!
//! Takes a resolved program ([`jolt_types::ClassTable`] plus a
//! [`CompilationUnit`]) and produces a verified [`jolt_llvm::Module`], an
//! LLVM module in a caller-owned `inkwell` context.
//!
//! # Debug Environment Variables
//!
//! - `RUST_LOG=jolt_codegen=debug`: per-class and per-procedure events.
//! - `RUST_LOG=jolt_codegen=trace`: every struct declaration, field list and
//!   skipped procedure.
//! - `RUST_LOG=jolt_llvm=trace`: struct fills and block terminators.
//!
//! Tracing output is only installed by [`init_tracing`].
//!
//! # Architecture
//!
//! - **Layout** (`layout`): [`ObjectLayout`] maps erased classes to named
//!   structs `{ dv*, i8*, { fields }, [0 x i8]? }`, flattens field lists,
//!   computes field, dispatch-vector and array-element addresses.
//! - **Types** (`types`): lowering of Jolt types and signatures.
//! - **Emission** (`emit`): [`Translator`] methods for procedures,
//!   statements, expressions, conditions, `?:`, `this` and `super`.
//! - **Unit** (`unit`): [`compile_unit`], declare-then-define over a whole
//!   unit, followed by verification.
//!
//! # Example
//!
//! ```ignore
//! use inkwell::context::Context;
//! use jolt_codegen::{compile_unit, CodegenOptions};
//!
//! let context = Context::create();
//! let output = compile_unit(&context, &classes, &unit, &CodegenOptions::default())?;
//! println!("{}", jolt_llvm::print_module(&output.module));
//! ```

pub mod ast;
mod debug_info;
mod emit;
mod entry;
mod error;
mod layout;
mod mangle;
mod options;
mod translator;
mod types;
mod unit;

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod test_helpers;

pub use ast::CompilationUnit;
pub use debug_info::{DebugEvent, DebugInfo};
pub use entry::{EntryPoint, EntryPoints};
pub use error::{CodegenError, Result};
pub use layout::{ClassLayoutInfo, Component, DispatchSlot, FieldLayoutInfo, ObjectLayout, StaticFieldInfo};
pub use mangle::{JoltMangler, Mangler};
pub use options::{CodegenOptions, DebugLevel};
pub use translator::Translator;
pub use types::lower_primitive;
pub use unit::{compile_unit, compile_unit_with, CodegenOutput};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only runs once per process.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
