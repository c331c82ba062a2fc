//! CLI module for the mlpy compiler
//!
//! This module provides the command-line interface for the compiler: batch translation of JSON-encoded syntax trees
//! into Python files.
//!
//! ## Modules
//!
//! - `commands` - Batch translation
//! - `prologue` - Header written at the top of every generated file
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod prologue;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::version::MLPY_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Translate MATLAB syntax trees to Python
#[derive(Parser, Debug)]
#[command(name = "mlpy")]
#[command(version = MLPY_VERSION)]
#[command(about = "Compile MATLAB/Octave programs to Python", long_about = None)]
pub struct Cli {
    /// JSON-encoded programs to translate (`foo.m.json` becomes `foo.py`)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Write all translations to one file ('-' for stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<String>,

    /// Directory for per-file outputs
    #[arg(short = 'd', long = "output-directory", value_name = "DIR", default_value = ".")]
    pub output_directory: PathBuf,

    /// Comma-separated file names to skip
    #[arg(short = 'x', long = "exclude", value_name = "NAMES", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Make resolution diagnostics fatal and stop at the first failing file
    #[arg(short = 'S', long = "strict")]
    pub strict: bool,

    /// Do not append `# file:line` comments to assignments
    #[arg(short = 'N', long = "no-numbers")]
    pub no_numbers: bool,

    /// Do not write the prologue
    #[arg(short = 'H', long = "no-header")]
    pub no_header: bool,

    /// Skip resolution; ambiguous accesses become calls
    #[arg(short = 'R', long = "no-resolve", conflicts_with = "no_backend")]
    pub no_resolve: bool,

    /// Resolve and report diagnostics only, write nothing
    #[arg(short = 'B', long = "no-backend")]
    pub no_backend: bool,

    /// Encoding named in the prologue
    #[arg(short = 'e', long = "encoding", value_name = "NAME", default_value = "utf-8")]
    pub encoding: String,

    /// Runtime module imported by the prologue
    #[arg(long = "runtime-module", value_name = "MODULE", default_value = "smop.libsmop")]
    pub runtime_module: String,

    /// Extra reserved words (comma separated)
    #[arg(long = "reserved", value_name = "WORDS", value_delimiter = ',')]
    pub reserved: Vec<String>,

    /// Print progress for every file
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    if cli.files.is_empty() {
        return Err(CliError::failure("Error: no input files (see --help)"));
    }
    let options = commands::TranslateOptions::from(&cli);
    commands::translate_files(&cli.files, &options)
}

// ============================================================================
// Tests
// ============================================================================
