//! Define error types for tree → Python emission.
//!
//! These errors represent *backend emission* failures (as opposed to resolution diagnostics). They are only raised for
//! trees no front end should produce, so every one is fatal for the file.

use miette::Diagnostic;
use mlpy_syntax::ast::Line;
use thiserror::Error;

/// Error during Python emission.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum EmitError {
    #[error("line {line}: malformed {node}: {detail}")]
    #[diagnostic(
        code(mlpy::emit::malformed),
        help("the syntax tree does not match what the front end should produce")
    )]
    Malformed {
        line: Line,
        node: &'static str,
        detail: String,
    },
}

impl EmitError {
    pub(super) fn malformed(line: Line, node: &'static str, detail: impl Into<String>) -> Self {
        EmitError::Malformed {
            line,
            node,
            detail: detail.into(),
        }
    }

    pub fn line(&self) -> Line {
        match self {
            EmitError::Malformed { line, .. } => *line,
        }
    }
}
