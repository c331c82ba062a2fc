//! mlpy compiler frontend
//!
//! The syntax tree and diagnostics come from the shared `mlpy_syntax` crate; this module adds the passes that
//! analyse a tree before generation:
//! - `resolve`: def/use analysis, role tagging and call/index disambiguation
//! - `symbols`: symbol table and scope summaries produced by resolution

pub use mlpy_syntax::{ast, diagnostics};

pub mod resolve;
pub mod symbols;
