//! Batch translation tests
//!
//! These drive `mlpy::cli::commands` directly against scratch directories: inputs are written as JSON, outputs are
//! read back from disk.

use std::fs;
use std::path::{Path, PathBuf};

use mlpy::ast::{Expr, Program, Stmt};
use mlpy::cli::ExitCode;
use mlpy::cli::commands::{FileError, Stage, TranslateOptions, translate_file, translate_files};
use tempfile::TempDir;

fn write_program(dir: &Path, name: &str, program: &Program) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(program).expect("encode")).expect("write input");
    path
}

fn simple_program() -> Program {
    Program::new(vec![
        Stmt::assign(Expr::ident("x", 1), Expr::int(3, 1)),
        Stmt::assign(Expr::ident("y", 2), Expr::apply(Expr::ident("x", 2), vec![Expr::int(2, 2)])),
    ])
}

/// `y = q(end)` with `q` never defined: one ambiguous-index warning
fn ambiguous_program() -> Program {
    Program::new(vec![Stmt::assign(
        Expr::ident("y", 1),
        Expr::apply(Expr::ident("q", 1), vec![Expr::op("end", vec![], 1)]),
    )])
}

fn options_into(dir: &Path) -> TranslateOptions {
    TranslateOptions {
        output_directory: dir.to_path_buf(),
        ..TranslateOptions::default()
    }
}

#[test]
fn test_per_file_output_with_prologue() {
    let input = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");
    let path = write_program(input.path(), "solver.m.json", &simple_program());

    let code = translate_files(&[path], &options_into(output.path())).expect("batch");
    assert_eq!(code, ExitCode::SUCCESS);

    let text = fs::read_to_string(output.path().join("solver.py")).expect("output written");
    assert!(text.starts_with("# -*- encoding: utf-8 -*-\n"));
    assert!(text.contains("from smop.libsmop import *"));
    assert!(text.contains("# solver.m\n"));
    assert!(text.ends_with("workspace_ = locals()\n\nx=3  # solver.m:1\ny=x[2]  # solver.m:2\n"));
}

#[test]
fn test_no_header_no_numbers() {
    let input = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");
    let path = write_program(input.path(), "solver.m.json", &simple_program());
    let options = TranslateOptions {
        header: false,
        source_numbers: false,
        ..options_into(output.path())
    };

    translate_files(&[path], &options).expect("batch");
    let text = fs::read_to_string(output.path().join("solver.py")).expect("output written");
    assert_eq!(text, "x=3\ny=x[2]\n");
}

#[test]
fn test_combined_output_keeps_command_line_order() {
    let input = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");
    let first = write_program(input.path(), "b.m.json", &simple_program());
    let second = write_program(input.path(), "a.m.json", &ambiguous_program());
    let combined = output.path().join("all.py");
    let options = TranslateOptions {
        output: Some(combined.display().to_string()),
        source_numbers: false,
        ..TranslateOptions::default()
    };

    let code = translate_files(&[first, second], &options).expect("batch");
    assert_eq!(code, ExitCode::SUCCESS);

    let text = fs::read_to_string(&combined).expect("combined output");
    assert_eq!(text.matches("workspace_ = locals()").count(), 1);
    let b = text.find("y=x[2]").expect("first file");
    let a = text.find("\n# a.m\ny=q(end())").expect("second file");
    assert!(b < a);
}

#[test]
fn test_ignored_and_excluded_inputs_write_nothing() {
    let input = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");
    let kept = write_program(input.path(), "keep.m.json", &simple_program());
    let skipped = write_program(input.path(), "skip.m.json", &simple_program());
    let stray = input.path().join("notes.txt");
    fs::write(&stray, "not a program").expect("write");
    let options = TranslateOptions {
        exclude: vec!["skip.m".to_string()],
        ..options_into(output.path())
    };

    let code = translate_files(&[kept, skipped, stray], &options).expect("batch");
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(output.path().join("keep.py").exists());
    assert!(!output.path().join("skip.py").exists());
    assert!(!output.path().join("notes.py").exists());
}

#[test]
fn test_bad_input_is_counted_and_batch_continues() {
    let input = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");
    let broken = input.path().join("broken.m.json");
    fs::write(&broken, "{ not json").expect("write");
    let good = write_program(input.path(), "good.m.json", &simple_program());

    let code = translate_files(&[broken, good], &options_into(output.path())).expect("batch");
    assert_eq!(code, ExitCode::FAILURE);
    assert!(output.path().join("good.py").exists());
}

#[test]
fn test_strict_stops_at_first_failure() {
    let input = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");
    let noisy = write_program(input.path(), "noisy.m.json", &ambiguous_program());
    let good = write_program(input.path(), "good.m.json", &simple_program());
    let options = TranslateOptions {
        strict: true,
        ..options_into(output.path())
    };

    let code = translate_files(&[noisy, good], &options).expect("batch");
    assert_eq!(code, ExitCode::FAILURE);
    assert!(!output.path().join("noisy.py").exists());
    assert!(!output.path().join("good.py").exists());
}

#[test]
fn test_warnings_do_not_fail_the_batch() {
    let input = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");
    let noisy = write_program(input.path(), "noisy.m.json", &ambiguous_program());

    let code = translate_files(&[noisy], &options_into(output.path())).expect("batch");
    assert_eq!(code, ExitCode::SUCCESS);
    let text = fs::read_to_string(output.path().join("noisy.py")).expect("output written");
    assert!(text.contains("y=q(end())"));
}

#[test]
fn test_resolve_only_reports_without_writing() {
    let input = TempDir::new().expect("tempdir");
    let output = TempDir::new().expect("tempdir");
    let noisy = write_program(input.path(), "noisy.m.json", &ambiguous_program());
    let options = TranslateOptions {
        stage: Stage::ResolveOnly,
        ..options_into(output.path())
    };

    let translation = translate_file(&noisy, &options).expect("translation");
    assert!(translation.code.is_none());
    assert_eq!(translation.diagnostics.len(), 1);

    translate_files(&[noisy], &options).expect("batch");
    assert!(!output.path().join("noisy.py").exists());
}

#[test]
fn test_unresolved_stage_emits_calls() {
    let input = TempDir::new().expect("tempdir");
    let path = write_program(input.path(), "solver.m.json", &simple_program());
    let options = TranslateOptions {
        stage: Stage::Unresolved,
        source_numbers: false,
        ..TranslateOptions::default()
    };

    let translation = translate_file(&path, &options).expect("translation");
    assert_eq!(translation.source_name, "solver.m");
    assert_eq!(translation.code.as_deref(), Some("x=3\ny=x(2)\n"));
}

#[test]
fn test_translate_file_errors() {
    let input = TempDir::new().expect("tempdir");
    let missing = input.path().join("missing.m.json");
    let err = translate_file(&missing, &TranslateOptions::default()).expect_err("missing file");
    assert!(matches!(err, FileError::Io { .. }));

    let broken = input.path().join("broken.m.json");
    fs::write(&broken, "[]").expect("write");
    let err = translate_file(&broken, &TranslateOptions::default()).expect_err("not a program");
    assert!(matches!(err, FileError::Parse { .. }));

    let noisy = write_program(input.path(), "noisy.m.json", &ambiguous_program());
    let strict = TranslateOptions {
        strict: true,
        ..TranslateOptions::default()
    };
    let err = translate_file(&noisy, &strict).expect_err("strict");
    assert!(matches!(err, FileError::Compile { .. }));
}
