//! mlpy vocabulary registries.
//!
//! Callers work with **stable IDs** (e.g. [`operators::OperatorId`], [`runtime::RuntimeFnId`]) and look up
//! spellings via the registry tables instead of comparing string literals across the compiler.
//!
//! ## Examples
//! ```rust
//! use mlpy_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("~="), Some(OperatorId::NotEq));
//! assert_eq!(operators::rewrite("~="), "!=");
//! assert_eq!(operators::rewrite("+"), "+");
//! ```

pub mod operators;
pub mod registry;
pub mod reserved;
pub mod runtime;
