//! Diagnostics reported while analysing a program.
//!
//! A [`Diagnostic`] is attached to a 1-based source line. Resolution produces them best-effort; whether they stop a
//! file is the caller's decision (strict mode).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A name is indexed with array-only syntax but never defined.
    AmbiguousIndex,
    /// A multi-target assignment whose source cannot yield that many values.
    ArityMismatch,
}

impl DiagnosticKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::AmbiguousIndex => "mlpy::resolve::ambiguous_index",
            DiagnosticKind::ArityMismatch => "mlpy::resolve::arity_mismatch",
        }
    }
}

/// A diagnostic with location information.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("line {line}: {message}")]
pub struct Diagnostic {
    pub line: u32,
    pub message: String,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, severity: Severity, message: impl Into<String>, line: u32) -> Self {
        Self {
            line,
            message: message.into(),
            severity,
            kind,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>, line: u32) -> Self {
        Self::new(kind, Severity::Warning, message, line)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Raise the severity to [`Severity::Error`].
    pub fn escalate(mut self) -> Self {
        self.severity = Severity::Error;
        self
    }
}

impl miette::Diagnostic for Diagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Note => miette::Severity::Advice,
            Severity::Warning => miette::Severity::Warning,
            Severity::Error => miette::Severity::Error,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.hints.is_empty() {
            None
        } else {
            Some(Box::new(self.hints.join("\n")))
        }
    }
}

/// Render a diagnostic for terminal output.
///
/// Without source text only the line is known, so the layout is a header, a location arrow and the notes/hints.
pub fn render(file_name: &str, diagnostic: &Diagnostic, color: bool) -> String {
    let (red, cyan, yellow, bold, reset) = if color {
        ("\x1b[31m", "\x1b[36m", "\x1b[33m", "\x1b[1m", "\x1b[0m")
    } else {
        ("", "", "", "", "")
    };

    let kind_color = match diagnostic.severity {
        Severity::Error => red,
        Severity::Warning => yellow,
        Severity::Note => cyan,
    };

    let mut out = format!(
        "{bold}{kind_color}{severity}{reset}{bold}: {message}{reset}\n  {cyan}-->{reset} {file_name}:{line}\n",
        severity = diagnostic.severity,
        message = diagnostic.message,
        line = diagnostic.line,
    );
    for note in &diagnostic.notes {
        out.push_str(&format!("  {cyan}= note:{reset} {note}\n"));
    }
    for hint in &diagnostic.hints {
        out.push_str(&format!("  {cyan}= hint:{reset} {hint}\n"));
    }
    out
}

// ============================================================================
// Catalog: the diagnostics resolution can produce
// ============================================================================

pub mod catalog {
    use super::*;

    pub fn ambiguous_index(name: &str, line: u32) -> Diagnostic {
        Diagnostic::warning(
            DiagnosticKind::AmbiguousIndex,
            format!("'{name}' is indexed like an array but is never defined; treating it as a function call"),
            line,
        )
        .with_hint(format!("Assign '{name}' before indexing it, or declare a function named '{name}'"))
    }

    pub fn arity_mismatch(targets: usize, source: &str, line: u32) -> Diagnostic {
        Diagnostic::warning(
            DiagnosticKind::ArityMismatch,
            format!("cannot assign {targets} values from {source}"),
            line,
        )
        .with_note("Only function calls and cell references can produce several values")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line() {
        let d = catalog::ambiguous_index("g", 7);
        assert_eq!(
            d.to_string(),
            "line 7: 'g' is indexed like an array but is never defined; treating it as a function call"
        );
    }

    #[test]
    fn render_without_color() {
        let d = catalog::arity_mismatch(2, "a number literal", 3);
        let text = render("demo.m", &d, false);
        assert_eq!(
            text,
            "warning: cannot assign 2 values from a number literal\n  --> demo.m:3\n  \
             = note: Only function calls and cell references can produce several values\n"
        );
    }

    #[test]
    fn escalate_changes_severity_only() {
        let d = catalog::ambiguous_index("g", 1);
        let e = d.clone().escalate();
        assert_eq!(e.severity, Severity::Error);
        assert_eq!(e.message, d.message);
        assert_eq!(miette::Diagnostic::severity(&e), Some(miette::Severity::Error));
    }

    #[test]
    fn severity_orders_by_seriousness() {
        assert!(Severity::Note < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }
}
