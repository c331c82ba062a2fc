//! Golden snapshot tests for codegen
//!
//! These tests load JSON-encoded programs from `tests/codegen_snapshots/`, resolve them and compare the generated
//! Python against inline snapshots. This keeps codegen changes reviewed and intentional.
//!
//! Run with: `cargo test --test codegen_snapshot_tests`
//! Review changes: `cargo insta review`

use std::fs;

use mlpy::ast::{Expr, ExprKind, Program, Stmt};
use mlpy::diagnostics::DiagnosticKind;
use mlpy::{Compilation, CompileConfig, compile, compile_unresolved};

/// Load a program from the codegen_snapshots directory
fn load_program(name: &str) -> Program {
    let path = format!("tests/codegen_snapshots/{}.m.json", name);
    let text = fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read test file: {}", path));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("Failed to decode {}: {}", path, e))
}

/// Resolve and generate with default settings
fn compile_default(program: &mut Program) -> Compilation {
    compile(program, &CompileConfig::default()).expect("compilation failed")
}

#[test]
fn test_indexing_codegen() {
    let mut program = load_program("indexing");
    let compilation = compile_default(&mut program);
    insta::assert_snapshot!(compilation.code, @r"
    # Demo of index/call disambiguation
    x=3
    y=x[2]
    z=g(5)
    ");
    assert!(compilation.diagnostics.is_empty());
}

#[test]
fn test_flat_functions_codegen() {
    let mut program = load_program("flat_functions");
    let compilation = compile_default(&mut program);
    insta::assert_snapshot!(compilation.code, @r"
    @function
    def f(a,*args,**kwargs):
        varargin = f.varargin
        nargin = f.nargin
        y=a[1]
        return y
    @function
    def g(*args,**kwargs):
        varargin = g.varargin
        nargin = g.nargin
        p,q=f(2,nargout=2)
    ");
}

#[test]
fn test_loop_codegen() {
    let mut program = load_program("loop");
    let compilation = compile_default(&mut program);
    insta::assert_snapshot!(compilation.code, @r"
    total=0
    for k in arange(1,n).T:
        if k > 2:
            total=(total+v(end()))
        else:
            total=(total-1)
    ");
    assert_eq!(compilation.diagnostics.len(), 1);
    assert_eq!(compilation.diagnostics[0].kind, DiagnosticKind::AmbiguousIndex);
    assert_eq!(compilation.diagnostics[0].line, 4);
}

#[test]
fn test_source_comments_codegen() {
    let mut program = load_program("indexing");
    let config = CompileConfig::new().with_source_comments("indexing.m");
    let compilation = compile(&mut program, &config).expect("compilation failed");
    insta::assert_snapshot!(compilation.code, @r"
    # Demo of index/call disambiguation
    x=3  # indexing.m:2
    y=x[2]  # indexing.m:3
    z=g(5)  # indexing.m:4
    ");
}

#[test]
fn test_unresolved_codegen_emits_calls() {
    let program = load_program("indexing");
    let compilation = compile_unresolved(&program, &CompileConfig::default()).expect("generation failed");
    assert!(compilation.code.contains("y=x(2)"));
    assert_eq!(compilation.retagged, 0);
}

#[test]
fn test_resolution_annotates_loaded_tree() {
    let mut program = load_program("indexing");
    let compilation = compile_default(&mut program);
    assert!(compilation.retagged >= 2);
    let Some(Stmt { kind: mlpy::ast::StmtKind::Let(assign), .. }) = program.statements.get(2) else {
        panic!("expected an assignment");
    };
    assert!(matches!(assign.value.kind, ExprKind::ArrayRef(_)));
}

#[test]
fn test_annotated_tree_survives_json() {
    let mut program = load_program("loop");
    compile_default(&mut program);
    let json = serde_json::to_string(&program).expect("encode");
    let mut decoded: Program = serde_json::from_str(&json).expect("decode");
    assert_eq!(decoded, program);

    // Compiling an already-resolved tree changes nothing
    let again = compile_default(&mut decoded);
    assert_eq!(again.retagged, 0);
    assert_eq!(decoded, program);
}

#[test]
fn test_reserved_words_codegen() {
    let mut program = Program::new(vec![
        Stmt::assign(Expr::ident("lambda", 1), Expr::int(1, 1)),
        Stmt::assign(Expr::ident("y", 2), Expr::ident("lambda", 2)),
    ]);
    let compilation = compile_default(&mut program);
    insta::assert_snapshot!(compilation.code, @r"
    lambda_=1
    y=copy(lambda_)
    ");
}
