//! mlpy compiler backend
//!
//! This module handles code generation from the resolved syntax tree to Python source.
//!
//! ## Module Organization
//!
//! - `codegen/` - Code generation from the tree to Python
//!   - `mod.rs` - Main PyCodegen struct and entry point
//!   - `statements.rs` - Statement emission
//!   - `expressions.rs` - Expression emission
//!   - `errors.rs` - Emission errors
//! - `py_emitter.rs` - Low-level Python line buffer and literal rendering

pub mod codegen;
pub mod py_emitter;

pub use codegen::{EmitError, PyCodegen};
