//! Python code emitter - builds Python source text
//!
//! [`PyEmitter`] is a line buffer; the caller passes the indentation level of every line explicitly. The free
//! functions below render the leaves of the tree (identifiers, literals, comments).

use mlpy_core::lang::reserved::COLLISION_SUFFIX;
use mlpy_syntax::ast::Number;

/// A buffer of indented Python lines
#[derive(Debug)]
pub struct PyEmitter {
    buffer: String,
    indent_str: String,
}

impl PyEmitter {
    pub fn new(indent_width: usize) -> Self {
        Self {
            buffer: String::new(),
            indent_str: " ".repeat(indent_width),
        }
    }

    /// Get the generated code
    pub fn finish(self) -> String {
        self.buffer
    }

    /// Write a line at `level`; an empty line carries no indentation
    pub fn line(&mut self, level: usize, s: &str) {
        if !s.is_empty() {
            self.write_indent(level);
            self.buffer.push_str(s);
        }
        self.buffer.push('\n');
    }

    pub fn blank_line(&mut self) {
        self.buffer.push('\n');
    }

    fn write_indent(&mut self, level: usize) {
        for _ in 0..level {
            self.buffer.push_str(&self.indent_str);
        }
    }
}

/// Escape an identifier that collides with a Python keyword or runtime name
pub fn to_py_ident(name: &str, reserved: bool) -> String {
    if reserved {
        format!("{name}{COLLISION_SUFFIX}")
    } else {
        name.to_string()
    }
}

/// Render a string literal in single quotes
pub fn quote_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Integers print exactly; floats keep a decimal point or exponent so Python reads them back as floats
pub fn format_number(number: Number) -> String {
    match number {
        Number::Int(value) => value.to_string(),
        Number::Float(value) => format!("{value:?}"),
    }
}

/// Rewrite the leading comment markers (`%`, `%%`, `#`) of a comment line to `#`
pub fn comment_line(text: &str) -> String {
    let trimmed = text.trim_end();
    let body = trimmed.trim_start_matches(['%', '#']);
    if body.trim().is_empty() {
        return String::new();
    }
    if body.len() == trimmed.len() {
        // No marker at all: the front end dropped it
        return format!("# {}", body.trim_start());
    }
    format!("#{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_lines() {
        let mut out = PyEmitter::new(4);
        out.line(0, "if x:");
        out.line(1, "pass");
        out.line(2, "");
        out.blank_line();
        assert_eq!(out.finish(), "if x:\n    pass\n\n\n");
    }

    #[test]
    fn test_reserved_ident() {
        assert_eq!(to_py_ident("lambda", true), "lambda_");
        assert_eq!(to_py_ident("x", false), "x");
    }

    #[test]
    fn test_quote_str() {
        assert_eq!(quote_str("it's"), "'it\\'s'");
        assert_eq!(quote_str("a\\b"), "'a\\\\b'");
        assert_eq!(quote_str("tab\there"), "'tab\\there'");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(Number::Int(42)), "42");
        assert_eq!(format_number(Number::Float(1.0)), "1.0");
        assert_eq!(format_number(Number::Float(0.25)), "0.25");
    }

    #[test]
    fn test_comment_markers() {
        assert_eq!(comment_line("% compute the mean"), "# compute the mean");
        assert_eq!(comment_line("%% Section"), "# Section");
        assert_eq!(comment_line("# already python"), "# already python");
        assert_eq!(comment_line("%"), "");
        assert_eq!(comment_line("   "), "");
        assert_eq!(comment_line("a % b"), "# a % b");
    }
}
