//! Python code generation
//!
//! [`PyCodegen`] walks a (normally resolved) syntax tree and renders Python source that targets the array runtime.
//!
//! ## Notes
//!
//! - **No emission state**: the generator only holds the configuration. Indentation is passed explicitly to every
//!   statement emitter and each call to [`PyCodegen::generate`] writes into its own [`PyEmitter`].
//! - **Degraded mode**: an `Apply` node that resolution never re-tagged is emitted as a call in value position and as
//!   an index in assignment-target position.
//! - **Failures**: only trees no front end should produce fail (wrong operand count for a fixed-arity operator, an
//!   assignment without targets); see [`EmitError`].
//!
//! ## Module Organization
//!
//! - `statements.rs` - statement lists, control flow and function declarations
//! - `expressions.rs` - operators, literals, indexing and calls
//! - `errors.rs` - [`EmitError`]

mod errors;
mod expressions;
mod statements;

pub use errors::EmitError;

use mlpy_syntax::ast::Program;

use crate::backend::py_emitter::PyEmitter;
use crate::config::CompileConfig;

/// Python code generator
#[derive(Debug, Clone, Copy)]
pub struct PyCodegen<'a> {
    config: &'a CompileConfig,
}

impl<'a> PyCodegen<'a> {
    pub fn new(config: &'a CompileConfig) -> Self {
        Self { config }
    }

    /// Generate Python source for a whole program; the result always ends with a newline.
    #[tracing::instrument(skip_all, fields(stmt_count = program.statements.len()))]
    pub fn generate(&self, program: &Program) -> Result<String, EmitError> {
        let mut out = PyEmitter::new(self.config.indent_width);
        self.emit_block(&mut out, &program.statements, 0)?;
        let code = out.finish();
        tracing::debug!(bytes = code.len(), "generated python");
        Ok(code)
    }
}
