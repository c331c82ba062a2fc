//! Batch translation
//!
//! Each input is a JSON-encoded [`Program`] named after its MATLAB source (`solver.m.json`). Files are compiled in
//! parallel and reported in command-line order, so diagnostics and combined output do not depend on scheduling.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use rayon::prelude::*;
use thiserror::Error;

use super::prologue;
use super::{CliError, CliResult, Cli, ExitCode};
use crate::ast::Program;
use crate::compiler::{self, CompileError};
use crate::config::CompileConfig;
use crate::diagnostics::{self, Diagnostic};
use crate::resolve;

/// Maximum input size (100 MB)
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Extension of accepted inputs
const INPUT_EXTENSION: &str = "json";

/// Name of `--output` meaning standard output
const STDOUT_MARKER: &str = "-";

// ============================================================================
// Options
// ============================================================================

/// How far each file goes through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Resolve, then generate
    Full,
    /// Generate the tree as given
    Unresolved,
    /// Resolve and report, write nothing
    ResolveOnly,
}

/// Batch settings, decoupled from clap so tests can build them directly
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub output: Option<String>,
    pub output_directory: PathBuf,
    pub exclude: Vec<String>,
    pub strict: bool,
    pub source_numbers: bool,
    pub header: bool,
    pub stage: Stage,
    pub encoding: String,
    pub runtime_module: String,
    pub reserved: Vec<String>,
    pub verbose: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            output: None,
            output_directory: PathBuf::from("."),
            exclude: Vec::new(),
            strict: false,
            source_numbers: true,
            header: true,
            stage: Stage::Full,
            encoding: "utf-8".to_string(),
            runtime_module: "smop.libsmop".to_string(),
            reserved: Vec::new(),
            verbose: false,
        }
    }
}

impl From<&Cli> for TranslateOptions {
    fn from(cli: &Cli) -> Self {
        let stage = if cli.no_backend {
            Stage::ResolveOnly
        } else if cli.no_resolve {
            Stage::Unresolved
        } else {
            Stage::Full
        };
        Self {
            output: cli.output.clone(),
            output_directory: cli.output_directory.clone(),
            exclude: cli.exclude.clone(),
            strict: cli.strict,
            source_numbers: !cli.no_numbers,
            header: !cli.no_header,
            stage,
            encoding: cli.encoding.clone(),
            runtime_module: cli.runtime_module.clone(),
            reserved: cli.reserved.clone(),
            verbose: cli.verbose,
        }
    }
}

impl TranslateOptions {
    /// Compilation settings for one source file
    pub fn config_for(&self, source_name: &str) -> CompileConfig {
        let mut config = CompileConfig::new()
            .with_strict(self.strict)
            .with_reserved_words(self.reserved.iter().cloned());
        if self.source_numbers {
            config = config.with_source_comments(source_name);
        }
        config
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure of a single input file. The batch records it and moves on unless strict.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum FileError {
    #[error("cannot access '{path}'")]
    #[diagnostic(code(mlpy::io))]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("'{path}' is too large ({size} bytes, max {max} bytes)", max = MAX_SOURCE_SIZE)]
    #[diagnostic(code(mlpy::io::too_large))]
    TooLarge { path: String, size: u64 },

    #[error("'{path}' does not contain a valid syntax tree")]
    #[diagnostic(code(mlpy::parse), help("inputs must be JSON-encoded programs"))]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to compile '{path}'")]
    #[diagnostic(code(mlpy::compile))]
    Compile {
        path: String,
        #[source]
        #[diagnostic_source]
        source: CompileError,
    },
}

impl FileError {
    fn io(path: &Path, source: io::Error) -> Self {
        FileError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// What the batch does with one command-line path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Translate,
    Ignored,
    Excluded,
}

/// Classify a path against the accepted extension and the exclusion list.
///
/// An exclusion matches the file name with or without the `.json` suffix, or its bare stem.
pub fn classify(path: &Path, exclude: &[String]) -> InputKind {
    if path.extension().and_then(|e| e.to_str()) != Some(INPUT_EXTENSION) {
        return InputKind::Ignored;
    }
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let source = source_name(path);
    let stem = Path::new(&source).file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if exclude.iter().any(|x| x == file_name || *x == source || x == stem) {
        InputKind::Excluded
    } else {
        InputKind::Translate
    }
}

/// Name of the MATLAB source an input was produced from: `dir/solver.m.json` gives `solver.m`.
pub fn source_name(path: &Path) -> String {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    file_name
        .strip_suffix(".json")
        .unwrap_or(file_name)
        .to_string()
}

/// Python file written for a source: `solver.m` gives `solver.py`.
pub fn output_name(source_name: &str) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source_name);
    format!("{stem}.py")
}

/// Read and decode one input.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file exceeds `MAX_SOURCE_SIZE` (100 MB)
/// - The contents are not a JSON-encoded program
pub fn read_program(path: &Path) -> Result<Program, FileError> {
    let metadata = fs::metadata(path).map_err(|e| FileError::io(path, e))?;
    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(FileError::TooLarge {
            path: path.display().to_string(),
            size: metadata.len(),
        });
    }
    let text = fs::read_to_string(path).map_err(|e| FileError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| FileError::Parse {
        path: path.display().to_string(),
        source,
    })
}

// ============================================================================
// Translation
// ============================================================================

/// Result of pushing one file through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub source_name: String,
    /// Generated Python, absent for [`Stage::ResolveOnly`]
    pub code: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile one input file
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn translate_file(path: &Path, options: &TranslateOptions) -> Result<Translation, FileError> {
    let mut program = read_program(path)?;
    let source_name = source_name(path);
    let config = options.config_for(&source_name);
    let compile_err = |source: CompileError| FileError::Compile {
        path: path.display().to_string(),
        source,
    };

    let (code, diagnostics) = match options.stage {
        Stage::Full => {
            let compilation = compiler::compile(&mut program, &config).map_err(compile_err)?;
            (Some(compilation.code), compilation.diagnostics)
        }
        Stage::Unresolved => {
            let compilation = compiler::compile_unresolved(&program, &config).map_err(compile_err)?;
            (Some(compilation.code), compilation.diagnostics)
        }
        Stage::ResolveOnly => {
            let resolution = resolve::resolve(&mut program, &config).map_err(|e| compile_err(e.into()))?;
            (None, resolution.diagnostics)
        }
    };
    tracing::debug!(diagnostics = diagnostics.len(), "translated");

    Ok(Translation {
        source_name,
        code,
        diagnostics,
    })
}

/// Where generated code goes
enum OutputSink {
    Stdout { started: bool },
    Combined { path: PathBuf, buffer: String },
    PerFile { directory: PathBuf },
}

impl OutputSink {
    fn open(options: &TranslateOptions) -> CliResult<Self> {
        match options.output.as_deref() {
            Some(STDOUT_MARKER) => Ok(OutputSink::Stdout { started: false }),
            Some(file) => Ok(OutputSink::Combined {
                path: PathBuf::from(file),
                buffer: String::new(),
            }),
            None => {
                fs::create_dir_all(&options.output_directory).map_err(|e| {
                    CliError::failure(format!(
                        "Cannot create output directory '{}': {}",
                        options.output_directory.display(),
                        e
                    ))
                })?;
                Ok(OutputSink::PerFile {
                    directory: options.output_directory.clone(),
                })
            }
        }
    }

    /// Text for one translation. Shared outputs carry the prologue once, later sources get a name comment.
    fn render(first: bool, translation: &Translation, code: &str, options: &TranslateOptions) -> String {
        let mut text = String::new();
        if options.header && first {
            text.push_str(&prologue::render(
                &options.encoding,
                &options.runtime_module,
                &translation.source_name,
            ));
        } else if !first {
            text.push_str(&format!("\n# {}\n", translation.source_name));
        }
        text.push_str(code);
        text
    }

    fn write(&mut self, translation: &Translation, code: &str, options: &TranslateOptions) -> Result<(), FileError> {
        match self {
            OutputSink::Stdout { started } => {
                let text = Self::render(!*started, translation, code, options);
                *started = true;
                io::stdout()
                    .lock()
                    .write_all(text.as_bytes())
                    .map_err(|e| FileError::io(Path::new(STDOUT_MARKER), e))
            }
            OutputSink::Combined { buffer, .. } => {
                let text = Self::render(buffer.is_empty(), translation, code, options);
                buffer.push_str(&text);
                Ok(())
            }
            OutputSink::PerFile { directory } => {
                let path = directory.join(output_name(&translation.source_name));
                let text = Self::render(true, translation, code, options);
                fs::write(&path, text).map_err(|e| FileError::io(&path, e))?;
                if options.verbose {
                    println!("\toutput: {}", path.display());
                }
                Ok(())
            }
        }
    }

    fn finish(self) -> CliResult<()> {
        if let OutputSink::Combined { path, buffer } = self {
            fs::write(&path, buffer)
                .map_err(|e| CliError::failure(format!("Error writing '{}': {}", path.display(), e)))?;
        }
        Ok(())
    }
}

/// Translate a batch of files.
///
/// Files with another extension are reported and skipped; excluded files are skipped silently unless verbose.
/// A failing file is counted and the batch continues, except in strict mode where it stops at the first failure.
pub fn translate_files(files: &[PathBuf], options: &TranslateOptions) -> CliResult<ExitCode> {
    let mut jobs = Vec::new();
    for (i, path) in files.iter().enumerate() {
        if options.verbose {
            println!("{} {}", i + 1, path.display());
        }
        match classify(path, &options.exclude) {
            InputKind::Translate => jobs.push(path.as_path()),
            InputKind::Ignored => {
                tracing::warn!("Ignored: '{}' (unexpected file type)", path.display());
            }
            InputKind::Excluded => {
                tracing::debug!(path = %path.display(), "excluded");
                if options.verbose {
                    println!("\tExcluded: '{}'", path.display());
                }
            }
        }
    }
    tracing::info!(files = jobs.len(), "translating");

    let results: Vec<Result<Translation, FileError>> =
        jobs.par_iter().map(|path| translate_file(path, options)).collect();

    let color = io::stderr().is_terminal();
    let mut sink = OutputSink::open(options)?;
    let mut errors = 0usize;
    for result in results {
        let outcome = result.and_then(|translation| {
            for diagnostic in &translation.diagnostics {
                eprint!("{}", diagnostics::render(&translation.source_name, diagnostic, color));
            }
            match &translation.code {
                Some(code) => sink.write(&translation, code, options),
                None => Ok(()),
            }
        });
        if let Err(err) = outcome {
            errors += 1;
            eprintln!("{:?}", miette::Report::new(err));
            if options.strict {
                break;
            }
        }
    }
    sink.finish()?;

    if errors > 0 {
        println!("Errors: {errors}");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
