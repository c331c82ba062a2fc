//! Property-based tests for the mlpy compiler
//!
//! These tests use proptest to verify invariants across many randomly generated programs, catching edge cases
//! that hand-written tests might miss.

use mlpy::ast::{
    CatchClause, Expr, ExprKind, FieldSelector, ForStmt, Ident, IfStmt, Program, Stmt, StmtKind, TryStmt,
};
use mlpy::{CompileConfig, compile, resolve};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Names include a Python keyword so reserved handling is exercised
fn name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "x", "f", "lambda", "pass"]).prop_map(String::from)
}

fn expr_strategy() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        (0i64..100).prop_map(|v| Expr::int(v, 1)),
        name_strategy().prop_map(|n| Expr::ident(n, 1)),
    ];
    leaf.prop_recursive(3, 12, 3, |inner| {
        prop_oneof![
            (name_strategy(), prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(n, args)| Expr::apply(Expr::ident(n, 1), args)),
            (name_strategy(), Just(Expr::op("end", vec![], 1)))
                .prop_map(|(n, end)| Expr::apply(Expr::ident(n, 1), vec![end])),
            (inner.clone(), inner).prop_map(|(a, b)| Expr::binary("+", a, b)),
        ]
    })
}

fn stmt_strategy() -> impl Strategy<Value = Stmt> {
    let assign = (name_strategy(), expr_strategy()).prop_map(|(n, v)| Stmt::assign(Expr::ident(n, 1), v));
    let multi = (name_strategy(), name_strategy(), expr_strategy())
        .prop_map(|(a, b, v)| Stmt::multi_assign(vec![Expr::ident(a, 1), Expr::ident(b, 1)], v));
    let call = expr_strategy().prop_map(Stmt::expr);
    let simple = prop_oneof![4 => assign, 1 => multi, 1 => call];
    simple.prop_recursive(2, 16, 4, |inner| {
        let body = || prop::collection::vec(inner.clone(), 1..4);
        prop_oneof![
            (name_strategy(), expr_strategy(), body()).prop_map(|(var, iter, body)| {
                Stmt::new(
                    StmtKind::For(ForStmt {
                        var: Ident::new(var),
                        iter,
                        body,
                    }),
                    1,
                )
            }),
            (expr_strategy(), body(), prop::option::of(body())).prop_map(|(cond, then_body, else_body)| {
                Stmt::new(
                    StmtKind::If(IfStmt {
                        cond,
                        then_body,
                        else_body,
                    }),
                    1,
                )
            }),
            (body(), prop::option::of(name_strategy()), body()).prop_map(|(body, ident, handler)| {
                Stmt::new(
                    StmtKind::Try(TryStmt {
                        body,
                        catch: Some(CatchClause {
                            ident: ident.map(Ident::new),
                            body: handler,
                        }),
                        finally_body: None,
                    }),
                    1,
                )
            }),
        ]
    })
}

fn program_strategy() -> impl Strategy<Value = Program> {
    prop::collection::vec(stmt_strategy(), 0..8).prop_map(Program::new)
}

// =============================================================================
// Tree walking helpers
// =============================================================================

fn visit_stmts<'a>(stmts: &'a [Stmt], idents: &mut Vec<&'a Ident>, applies: &mut usize) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Expr(e) => visit_expr(e, idents, applies),
            StmtKind::Let(assign) => {
                for target in &assign.targets {
                    visit_expr(target, idents, applies);
                }
                visit_expr(&assign.value, idents, applies);
            }
            StmtKind::For(each) => {
                idents.push(&each.var);
                visit_expr(&each.iter, idents, applies);
                visit_stmts(&each.body, idents, applies);
            }
            StmtKind::If(branch) => {
                visit_expr(&branch.cond, idents, applies);
                visit_stmts(&branch.then_body, idents, applies);
                if let Some(body) = &branch.else_body {
                    visit_stmts(body, idents, applies);
                }
            }
            StmtKind::Try(attempt) => {
                visit_stmts(&attempt.body, idents, applies);
                if let Some(catch) = &attempt.catch {
                    idents.extend(catch.ident.as_ref());
                    visit_stmts(&catch.body, idents, applies);
                }
            }
            _ => {}
        }
    }
}

fn visit_expr<'a>(expr: &'a Expr, idents: &mut Vec<&'a Ident>, applies: &mut usize) {
    match &expr.kind {
        ExprKind::Ident(ident) => idents.push(ident),
        ExprKind::Op(op) => op.args.iter().for_each(|a| visit_expr(a, idents, applies)),
        ExprKind::Field(field) => {
            visit_expr(&field.object, idents, applies);
            if let FieldSelector::Dynamic(selector) = &field.selector {
                visit_expr(selector, idents, applies);
            }
        }
        ExprKind::Apply(index) => {
            *applies += 1;
            visit_expr(&index.target, idents, applies);
            index.args.iter().for_each(|a| visit_expr(a, idents, applies));
        }
        ExprKind::ArrayRef(index) | ExprKind::CellRef(index) => {
            visit_expr(&index.target, idents, applies);
            index.args.iter().for_each(|a| visit_expr(a, idents, applies));
        }
        ExprKind::Call(call) => {
            visit_expr(&call.target, idents, applies);
            call.args.iter().for_each(|a| visit_expr(a, idents, applies));
        }
        _ => {}
    }
}

// =============================================================================
// Resolution properties
// =============================================================================

proptest! {
    /// Property: resolving a resolved tree changes nothing
    #[test]
    fn resolution_is_idempotent(program in program_strategy()) {
        let config = CompileConfig::default();
        let mut once = program;
        let first = resolve::resolve(&mut once, &config).expect("non-strict resolution never fails");

        let mut twice = once.clone();
        let second = resolve::resolve(&mut twice, &config).expect("non-strict resolution never fails");

        prop_assert_eq!(second.retagged, 0);
        prop_assert_eq!(&first.diagnostics, &second.diagnostics);
        prop_assert_eq!(once, twice);
    }

    /// Property: no ambiguous access survives, and reserved flags agree with the blacklist everywhere
    #[test]
    fn resolution_retags_every_apply(program in program_strategy()) {
        let config = CompileConfig::default();
        let mut program = program;
        resolve::resolve(&mut program, &config).expect("non-strict resolution never fails");

        let mut idents = Vec::new();
        let mut applies = 0;
        visit_stmts(&program.statements, &mut idents, &mut applies);
        prop_assert_eq!(applies, 0);
        for ident in idents {
            prop_assert_eq!(ident.reserved, config.reserved.contains(&ident.name), "ident {}", ident.name);
        }
    }

    /// Property: diagnostics come out ordered by line
    #[test]
    fn diagnostics_are_ordered(program in program_strategy()) {
        let mut program = program;
        let resolution = resolve::resolve(&mut program, &CompileConfig::default()).expect("resolution");
        let lines: Vec<u32> = resolution.diagnostics.iter().map(|d| d.line).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        prop_assert_eq!(lines, sorted);
    }

    /// Property: every generated program compiles to newline-terminated text without reserved names
    #[test]
    fn generated_programs_compile(program in program_strategy()) {
        let mut program = program;
        let compilation = compile(&mut program, &CompileConfig::default()).expect("compilation");
        prop_assert!(compilation.code.ends_with('\n'));
        for line in compilation.code.lines() {
            let assigned = line.split('=').next().unwrap_or_default();
            prop_assert_ne!(assigned, "lambda");
        }
    }

    /// Property: strict mode fails exactly when non-strict mode reports something
    #[test]
    fn strict_fails_iff_diagnostics(program in program_strategy()) {
        let lenient = CompileConfig::default();
        let strict = CompileConfig::default().with_strict(true);

        let mut a = program.clone();
        let reported = resolve::resolve(&mut a, &lenient).expect("resolution").diagnostics.len();
        let mut b = program;
        let result = resolve::resolve(&mut b, &strict);

        match result {
            Ok(resolution) => prop_assert_eq!(reported, 0, "{:?}", resolution.diagnostics),
            Err(err) => prop_assert_eq!(reported, err.diagnostics().len()),
        }
    }
}
