//! Shared syntax layer for mlpy: the AST and the diagnostics attached to it.
//!
//! ## Notes
//! - This crate is intentionally "syntax-only": it does not resolve names or generate code.
//! - There is no lexer or parser here. An external front end produces the tree, usually as JSON through the `serde`
//!   derives on [`ast::Program`].
//!
//! ## Examples
//! ```rust
//! use mlpy_syntax::ast::{Expr, Program, Stmt};
//!
//! let program = Program::new(vec![Stmt::assign(Expr::ident("x", 1), Expr::int(3, 1))]);
//! assert_eq!(program.statements.len(), 1);
//! ```

pub mod ast;
pub mod diagnostics;
