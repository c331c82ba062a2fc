//! Provide the canonical vocabulary shared by the mlpy resolution and code generation passes.
//!
//! This crate is intentionally small and dependency-free. It contains `const` tables that describe:
//! - the source operators and how each one is spelled in generated Python,
//! - the entry points of the runtime array library that generated code calls into,
//! - the identifiers that collide with Python keywords or runtime builtins.
//!
//! ## Notes
//!
//! - No IO, no global mutable state, and no AST types: the tables are read-only shared configuration, so any number
//!   of files can be compiled in parallel against them.
//! - Changing a mapping here is the extension point for targeting a different runtime library.

pub mod lang;
