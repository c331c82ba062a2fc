#![forbid(unsafe_code)]
//! mlpy: a MATLAB to Python compiler
//!
//! mlpy takes the syntax tree of a MATLAB/Octave script, works out which `name(args)` expressions index arrays and
//! which call functions, and generates Python that runs against an array runtime library.
//! This crate provides the compiler: frontend (symbol resolution), backend (Python code generation), the pipeline
//! joining them and the batch CLI.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Malformed input**: Trees no front end should produce are reported as [`backend::EmitError`], never a panic.
//!
//! ## Examples
//!
//! ```
//! use mlpy::ast::{Expr, Program, Stmt};
//! use mlpy::{CompileConfig, compile};
//!
//! let mut program = Program::new(vec![
//!     Stmt::assign(Expr::ident("x", 1), Expr::int(3, 1)),
//!     Stmt::assign(Expr::ident("y", 2), Expr::apply(Expr::ident("x", 2), vec![Expr::int(2, 2)])),
//!     Stmt::assign(Expr::ident("z", 3), Expr::apply(Expr::ident("g", 3), vec![Expr::int(5, 3)])),
//! ]);
//! let compilation = compile(&mut program, &CompileConfig::default()).unwrap();
//! assert_eq!(compilation.code, "x=3\ny=x[2]\nz=g(5)\n");
//! ```

pub mod backend;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod frontend;
pub mod version;

pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::resolve;
pub use frontend::symbols;

pub use backend::PyCodegen;
pub use compiler::{Compilation, CompileError, compile, compile_unresolved};
pub use config::CompileConfig;
