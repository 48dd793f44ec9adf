//! IR emission for procedure bodies.
//!
//! | Module | Emits |
//! |---|---|
//! | `procedure` | function definitions: prologue, body, implicit return |
//! | `stmt` | statements and blocks |
//! | `expr` | value-producing expressions |
//! | `condition` | boolean expressions as branches (`&&`, `\|\|`, `!`) |
//! | `conditional` | `c ? a : b` through a stack temporary |
//! | `special` | `this` and `super` |
//!
//! All of it is `impl Translator`, and every emitter leaves the builder at
//! the end of the block where control continues.

mod condition;
mod conditional;
mod expr;
mod procedure;
mod special;
mod stmt;
