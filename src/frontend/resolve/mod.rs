//! Symbol resolution for MATLAB programs.
//!
//! MATLAB spells array indexing and function calls the same way: `foo(x)` reads element `x` of a variable `foo` or
//! calls a function `foo`. Resolution decides which one every occurrence is, annotates the tree in place, and reports
//! the accesses it cannot classify confidently.
//!
//! ## Phases
//!
//! 1. **Numbering**: every identifier occurrence gets a stable [`NodeId`](mlpy_syntax::ast::NodeId) in depth-first
//!    order, and declared function names are collected.
//! 2. **Analysis**: a read-only reaching-definition walk builds the [`DefUseGraph`] and the [`SymbolTable`]. A use
//!    reached by some definition is a variable; an unreached use names a function.
//! 3. **Rewrite**: roles and reserved-word flags are written back onto the identifiers and every `Apply` /
//!    `ArrayRef` / `Call` node is re-tagged as an array reference or a call with its requested output count.
//!
//! ## Notes
//!
//! - **Idempotence**: numbering and analysis only depend on names and tree shape, so resolving an already resolved
//!   program reproduces the same tree and reports `retagged == 0`.
//! - **Strict mode**: with [`CompileConfig::strict`] set, any diagnostic is escalated to an error and returned as
//!   [`ResolveError::Strict`]. The tree is still annotated.
//!
//! ## Examples
//!
//! ```
//! use mlpy::ast::{Expr, ExprKind, Program, Stmt};
//! use mlpy::frontend::resolve::resolve;
//! use mlpy::CompileConfig;
//!
//! let mut program = Program::new(vec![
//!     Stmt::assign(Expr::ident("x", 1), Expr::int(3, 1)),
//!     Stmt::expr(Expr::apply(Expr::ident("x", 2), vec![Expr::int(1, 2)])),
//! ]);
//! let resolution = resolve(&mut program, &CompileConfig::default()).unwrap();
//! assert!(resolution.diagnostics.is_empty());
//! ```

mod analyze;
mod graph;
mod numbering;
mod rewrite;

pub use graph::{DefUseGraph, DefUseNode};

use miette::Diagnostic as MietteDiagnostic;
use mlpy_syntax::ast::Program;
use mlpy_syntax::diagnostics::Diagnostic;
use thiserror::Error;

use self::analyze::Analyzer;
use self::numbering::Numbering;
use self::rewrite::Rewriter;
use crate::config::CompileConfig;
use crate::frontend::symbols::SymbolTable;

/// Everything resolution learned about a program
#[derive(Debug)]
pub struct Resolution {
    /// Warnings, ordered by line
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: SymbolTable,
    pub graph: DefUseGraph,
    /// Number of nodes whose tag, role or reserved flag changed
    pub retagged: usize,
}

#[derive(Debug, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("{} resolution diagnostic(s) in strict mode", .diagnostics.len())]
    #[diagnostic(code(mlpy::resolve::strict), help("rerun without --strict to compile with warnings"))]
    Strict {
        #[related]
        diagnostics: Vec<Diagnostic>,
    },
}

impl ResolveError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ResolveError::Strict { diagnostics } => diagnostics,
        }
    }
}

/// Resolve every identifier in `program` and annotate the tree in place.
#[tracing::instrument(skip_all, fields(stmt_count = program.statements.len(), strict = config.strict))]
pub fn resolve(program: &mut Program, config: &CompileConfig) -> Result<Resolution, ResolveError> {
    let numbering = Numbering::run(program);
    tracing::debug!(identifiers = numbering.count(), "numbered identifiers");

    let analysis = Analyzer::new(numbering.declared_functions).run(program);
    tracing::debug!(
        nodes = analysis.graph.node_count(),
        edges = analysis.graph.edge_count(),
        "built def/use graph"
    );

    let mut rewriter = Rewriter::new(&analysis.symbols, &config.reserved);
    rewriter.block(&mut program.statements);
    let retagged = rewriter.retagged;

    for diagnostic in &analysis.diagnostics {
        tracing::warn!(line = diagnostic.line, kind = ?diagnostic.kind, "{}", diagnostic.message);
    }

    if config.strict && !analysis.diagnostics.is_empty() {
        let diagnostics = analysis.diagnostics.into_iter().map(Diagnostic::escalate).collect();
        return Err(ResolveError::Strict { diagnostics });
    }

    Ok(Resolution {
        diagnostics: analysis.diagnostics,
        symbols: analysis.symbols,
        graph: analysis.graph,
        retagged,
    })
}
