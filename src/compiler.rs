//! The compilation pipeline: resolution followed by Python generation.
//!
//! ## Notes
//!
//! - [`compile`] resolves the tree in place before generating, so the caller's [`Program`] comes back annotated.
//! - [`compile_unresolved`] skips resolution. Indexed accesses the front end left ambiguous are emitted as calls.
//! - Non-fatal resolution diagnostics are returned alongside the code; strict mode turns them into
//!   [`CompileError::Resolve`].

use miette::Diagnostic as MietteDiagnostic;
use mlpy_syntax::ast::Program;
use mlpy_syntax::diagnostics::Diagnostic;
use thiserror::Error;

use crate::backend::{EmitError, PyCodegen};
use crate::config::CompileConfig;
use crate::frontend::resolve::{self, ResolveError};

/// Output of a successful compilation
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    /// Newline-terminated Python source, without prologue
    pub code: String,
    /// Resolution warnings, ordered by line
    pub diagnostics: Vec<Diagnostic>,
    /// Nodes re-tagged by resolution
    pub retagged: usize,
}

/// A fatal error for one program
#[derive(Debug, Error, MietteDiagnostic)]
pub enum CompileError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Emit(#[from] EmitError),
}

/// Resolve and generate a program
#[tracing::instrument(skip_all, fields(strict = config.strict))]
pub fn compile(program: &mut Program, config: &CompileConfig) -> Result<Compilation, CompileError> {
    let resolution = resolve::resolve(program, config)?;
    tracing::debug!(
        retagged = resolution.retagged,
        diagnostics = resolution.diagnostics.len(),
        "resolved"
    );
    let code = PyCodegen::new(config).generate(program)?;
    Ok(Compilation {
        code,
        diagnostics: resolution.diagnostics,
        retagged: resolution.retagged,
    })
}

/// Generate a program as-is, without resolution
pub fn compile_unresolved(program: &Program, config: &CompileConfig) -> Result<Compilation, CompileError> {
    let code = PyCodegen::new(config).generate(program)?;
    Ok(Compilation {
        code,
        diagnostics: Vec::new(),
        retagged: 0,
    })
}
