//! Compilation configuration for mlpy
//!
//! A single immutable [`CompileConfig`] is built by the caller and passed by reference into both resolution and
//! code generation, so independent files can share one value across threads.

use std::collections::BTreeSet;

use mlpy_core::lang::reserved;

/// Compilation configuration
#[derive(Debug, Clone)]
pub struct CompileConfig {
    /// Number of spaces per indentation level
    pub indent_width: usize,
    /// Whether resolution diagnostics abort the file
    pub strict: bool,
    /// File name used in `# file:line` provenance comments; `None` disables them
    pub source_comments: Option<String>,
    /// Identifiers suffixed to avoid collisions with Python
    pub reserved: ReservedWords,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            strict: false,
            source_comments: None,
            reserved: ReservedWords::default(),
        }
    }
}

impl CompileConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation width
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Make resolution diagnostics fatal
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Emit `# <file>:<line>` after each assignment
    pub fn with_source_comments(mut self, file_name: impl Into<String>) -> Self {
        self.source_comments = Some(file_name.into());
        self
    }

    /// Add words to the reserved blacklist
    pub fn with_reserved_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(words);
        self
    }

    /// The whitespace for one indentation level repeated `level` times
    pub fn indent(&self, level: usize) -> String {
        " ".repeat(self.indent_width * level)
    }
}

/// Reserved-word blacklist, seeded from [`reserved::DEFAULT_RESERVED`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedWords {
    words: BTreeSet<String>,
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self {
            words: reserved::DEFAULT_RESERVED.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl ReservedWords {
    pub fn empty() -> Self {
        Self { words: BTreeSet::new() }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.words.contains(name)
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(words.into_iter().map(Into::into));
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
