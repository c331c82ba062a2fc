//! Reaching-definition analysis that builds the def/use graph.
//!
//! The walk is read-only. It tracks, per name, the set of definition nodes that may reach the current program point:
//! - statements flow in order,
//! - both branches of a conditional run from the same entry state and are unioned at the join,
//! - loop bodies are re-walked until the state entering them stops growing (back edges).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use mlpy_core::lang::operators::{self, OperatorId};
use mlpy_core::lang::runtime;
use mlpy_syntax::ast::{
    Expr, ExprKind, FieldSelector, FunctionDecl, Ident, LetStmt, Line, NodeId, Program, Role, Stmt, StmtKind,
};
use mlpy_syntax::diagnostics::{Diagnostic, catalog};
use petgraph::graph::NodeIndex;

use super::graph::DefUseGraph;
use crate::frontend::symbols::{Occurrence, OccurrenceKind, ScopeId, ScopeKind, SymbolTable};

/// Result of the analysis
#[derive(Debug)]
pub(super) struct Analysis {
    pub graph: DefUseGraph,
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

/// Definitions that may reach a program point, per name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Flow {
    reaching: BTreeMap<String, BTreeSet<NodeIndex>>,
}

impl Flow {
    fn merge(&mut self, other: &Flow) {
        for (name, defs) in &other.reaching {
            self.reaching.entry(name.clone()).or_default().extend(defs.iter().copied());
        }
    }

    fn defs(&self, name: &str) -> Vec<NodeIndex> {
        self.reaching
            .get(name)
            .map(|defs| defs.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Declaration {
    Global,
    Persistent,
}

/// A multi-target assignment whose source can only be judged once roles are known
#[derive(Debug)]
struct PendingArity {
    line: Line,
    targets: usize,
    /// Occurrence the source is rooted at, `None` for computed sources
    root: Option<(NodeId, String)>,
}

pub(super) struct Analyzer {
    graph: DefUseGraph,
    symbols: SymbolTable,
    scope: ScopeId,
    /// Names declared `global`/`persistent` in a scope, with their synthetic definition
    pinned: HashMap<(ScopeId, String), NodeIndex>,
    /// Scope opened for each declaration; loop bodies revisit nested declarations
    function_scopes: HashMap<NodeId, ScopeId>,
    pending_arity: Vec<PendingArity>,
    diagnostics: Vec<Diagnostic>,
}

impl Analyzer {
    pub fn new(declared_functions: impl IntoIterator<Item = String>) -> Self {
        let mut symbols = SymbolTable::new();
        for name in declared_functions {
            symbols.declare_function(name);
        }
        Self {
            graph: DefUseGraph::new(),
            symbols,
            scope: SymbolTable::SCRIPT,
            pinned: HashMap::new(),
            function_scopes: HashMap::new(),
            pending_arity: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn run(mut self, program: &Program) -> Analysis {
        let mut flow = Flow::default();
        self.block(&program.statements, &mut flow);
        self.finish()
    }

    // ------------------------------------------------------------------
    // Occurrences
    // ------------------------------------------------------------------

    fn record(&mut self, ident: &Ident, line: Line, kind: OccurrenceKind, index_target: bool, array_syntax: bool) {
        let Some(id) = ident.id else {
            return;
        };
        self.symbols.record(Occurrence {
            id,
            name: ident.name.clone(),
            line,
            scope: self.scope,
            kind,
            index_target,
            array_syntax,
            role: Role::Unknown,
        });
    }

    fn use_ident(&mut self, ident: &Ident, line: Line, flow: &Flow, index_target: bool, array_syntax: bool) {
        let Some(id) = ident.id else {
            return;
        };
        let node = self.graph.occurrence(id, &ident.name, OccurrenceKind::Use);
        for def in flow.defs(&ident.name) {
            self.graph.connect(def, node);
        }
        self.record(ident, line, OccurrenceKind::Use, index_target, array_syntax);
    }

    fn define(&mut self, ident: &Ident, line: Line, flow: &mut Flow, kind: OccurrenceKind) {
        let Some(id) = ident.id else {
            return;
        };
        let node = self.graph.occurrence(id, &ident.name, kind);
        if kind == OccurrenceKind::PartialDef {
            for def in flow.defs(&ident.name) {
                self.graph.connect(def, node);
            }
            flow.reaching.entry(ident.name.clone()).or_default().insert(node);
        } else {
            let mut defs = BTreeSet::from([node]);
            if let Some(&pin) = self.pinned.get(&(self.scope, ident.name.clone())) {
                defs.insert(pin);
            }
            flow.reaching.insert(ident.name.clone(), defs);
        }
        self.record(ident, line, kind, false, false);
    }

    fn declare(&mut self, ident: &Ident, line: Line, flow: &mut Flow, declaration: Declaration) {
        let Some(id) = ident.id else {
            return;
        };
        let name = ident.name.clone();
        let pin = match declaration {
            Declaration::Global => self.graph.global(&name),
            Declaration::Persistent => self.graph.persistent(self.scope, &name),
        };
        self.pinned.insert((self.scope, name.clone()), pin);
        let node = self.graph.occurrence(id, &name, OccurrenceKind::Declaration);
        self.graph.connect(pin, node);
        flow.reaching.insert(name.clone(), BTreeSet::from([pin]));
        if let Some(scope) = self.symbols.scope_mut(self.scope) {
            match declaration {
                Declaration::Global => scope.globals.insert(name),
                Declaration::Persistent => scope.persistents.insert(name),
            };
        }
        self.record(ident, line, OccurrenceKind::Declaration, false, false);
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self, stmts: &[Stmt], flow: &mut Flow) {
        let mut i = 0;
        while i < stmts.len() {
            let stmt = &stmts[i];
            match &stmt.kind {
                StmtKind::Function(decl) if decl.is_flat() => {
                    // A flat declaration owns every following sibling up to the next declaration
                    let end = stmts[i + 1..]
                        .iter()
                        .position(|s| matches!(s.kind, StmtKind::Function(_)))
                        .map_or(stmts.len(), |offset| i + 1 + offset);
                    self.function(decl, stmt.line, &stmts[i + 1..end]);
                    i = end;
                }
                _ => {
                    self.stmt(stmt, flow);
                    i += 1;
                }
            }
        }
    }

    fn function(&mut self, decl: &FunctionDecl, line: Line, trailing: &[Stmt]) {
        self.record(&decl.name, line, OccurrenceKind::FunctionName, false, false);

        let outer = self.scope;
        self.scope = match decl.name.id.and_then(|id| self.function_scopes.get(&id)) {
            Some(&scope) => scope,
            None => {
                let scope = self
                    .symbols
                    .push_scope(ScopeKind::Function, Some(decl.name.name.clone()), line);
                if let Some(id) = decl.name.id {
                    self.function_scopes.insert(id, scope);
                }
                scope
            }
        };

        let mut flow = Flow::default();
        for &binding in runtime::IMPLICIT_FUNCTION_BINDINGS {
            let name = runtime::as_str(binding);
            let node = self.graph.implicit(self.scope, name);
            flow.reaching.insert(name.to_string(), BTreeSet::from([node]));
        }
        for param in &decl.params {
            if let Some(init) = &param.init {
                self.expr(init, &mut flow);
            }
            self.define(param, line, &mut flow, OccurrenceKind::Param);
        }
        self.block(&decl.body, &mut flow);
        self.block(trailing, &mut flow);

        self.scope = outer;
    }

    fn stmt(&mut self, stmt: &Stmt, flow: &mut Flow) {
        let line = stmt.line;
        match &stmt.kind {
            StmtKind::Expr(expr) => self.expr(expr, flow),
            StmtKind::Let(assign) => {
                self.expr(&assign.value, flow);
                for target in &assign.targets {
                    self.target(target, flow);
                }
                if assign.targets.len() > 1 {
                    self.check_arity(assign, line);
                }
            }
            StmtKind::If(branch) => {
                self.expr(&branch.cond, flow);
                let mut then_flow = flow.clone();
                self.block(&branch.then_body, &mut then_flow);
                let mut else_flow = flow.clone();
                if let Some(body) = &branch.else_body {
                    self.block(body, &mut else_flow);
                }
                then_flow.merge(&else_flow);
                *flow = then_flow;
            }
            StmtKind::For(each) => {
                self.expr(&each.iter, flow);
                self.repeat(flow, |this, iteration| {
                    this.define(&each.var, line, iteration, OccurrenceKind::Def);
                    this.block(&each.body, iteration);
                });
            }
            StmtKind::While(lp) => {
                self.repeat(flow, |this, iteration| {
                    this.expr(&lp.cond, iteration);
                    this.block(&lp.body, iteration);
                });
                // The condition is evaluated once more on exit
                self.expr(&lp.cond, flow);
            }
            StmtKind::Try(attempt) => {
                let mut body_flow = flow.clone();
                self.block(&attempt.body, &mut body_flow);
                let mut after = flow.clone();
                after.merge(&body_flow);
                if let Some(catch) = &attempt.catch {
                    let mut catch_flow = after.clone();
                    if let Some(ident) = &catch.ident {
                        self.define(ident, line, &mut catch_flow, OccurrenceKind::Def);
                    }
                    self.block(&catch.body, &mut catch_flow);
                    after.merge(&catch_flow);
                }
                if let Some(body) = &attempt.finally_body {
                    self.block(body, &mut after);
                }
                *flow = after;
            }
            StmtKind::Function(decl) => self.function(decl, line, &[]),
            StmtKind::Global(names) => {
                for name in names {
                    self.declare(name, line, flow, Declaration::Global);
                }
            }
            StmtKind::Persistent(names) => {
                for name in names {
                    self.declare(name, line, flow, Declaration::Persistent);
                }
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.expr(value, flow);
                }
            }
            StmtKind::Break | StmtKind::Continue | StmtKind::Pass | StmtKind::Null | StmtKind::Comment(_) => {}
        }
    }

    /// Walk a loop body until the state entering it reaches a fixpoint
    fn repeat(&mut self, flow: &mut Flow, mut body: impl FnMut(&mut Self, &mut Flow)) {
        let entry = flow.clone();
        let mut state = entry.clone();
        loop {
            let mut iteration = state.clone();
            body(self, &mut iteration);
            let mut next = entry.clone();
            next.merge(&iteration);
            if next == state {
                break;
            }
            state = next;
        }
        *flow = state;
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self, expr: &Expr, flow: &mut Flow) {
        match &expr.kind {
            ExprKind::Ident(ident) => self.use_ident(ident, expr.line, flow, false, false),
            ExprKind::Number(_) | ExprKind::Str(_) | ExprKind::Logical(_) => {}
            ExprKind::Op(op) => {
                for arg in &op.args {
                    self.expr(arg, flow);
                }
                if let Some(ret) = &op.ret {
                    self.define(ret, expr.line, flow, OccurrenceKind::Def);
                }
            }
            ExprKind::Field(field) => {
                self.expr(&field.object, flow);
                if let FieldSelector::Dynamic(selector) = &field.selector {
                    self.expr(selector, flow);
                }
            }
            ExprKind::Apply(index) | ExprKind::ArrayRef(index) => {
                self.index(&index.target, &index.args, flow, false);
            }
            ExprKind::CellRef(index) => self.index(&index.target, &index.args, flow, true),
            ExprKind::Call(call) => self.index(&call.target, &call.args, flow, false),
            ExprKind::Matrix(rows) | ExprKind::CellArray(rows) => {
                for element in rows.iter().flatten() {
                    self.expr(element, flow);
                }
            }
            ExprKind::Lambda(lambda) => {
                let mut inner = flow.clone();
                for param in &lambda.params {
                    self.define(param, expr.line, &mut inner, OccurrenceKind::Param);
                }
                self.expr(&lambda.body, &mut inner);
            }
        }
    }

    fn index(&mut self, target: &Expr, args: &[Expr], flow: &mut Flow, cell: bool) {
        for arg in args {
            self.expr(arg, flow);
        }
        match &target.kind {
            ExprKind::Ident(ident) => {
                let array_syntax = cell || args.iter().any(uses_array_syntax);
                self.use_ident(ident, target.line, flow, true, array_syntax);
            }
            _ => self.expr(target, flow),
        }
    }

    /// Assignment target: a plain name is redefined, anything indexed is updated in place
    fn target(&mut self, target: &Expr, flow: &mut Flow) {
        match &target.kind {
            ExprKind::Ident(ident) => self.define(ident, target.line, flow, OccurrenceKind::Def),
            ExprKind::Apply(index) | ExprKind::ArrayRef(index) | ExprKind::CellRef(index) => {
                for arg in &index.args {
                    self.expr(arg, flow);
                }
                self.updated(&index.target, flow);
            }
            ExprKind::Call(call) => {
                for arg in &call.args {
                    self.expr(arg, flow);
                }
                self.updated(&call.target, flow);
            }
            ExprKind::Field(field) => {
                if let FieldSelector::Dynamic(selector) = &field.selector {
                    self.expr(selector, flow);
                }
                self.updated(&field.object, flow);
            }
            _ => self.expr(target, flow),
        }
    }

    fn updated(&mut self, target: &Expr, flow: &mut Flow) {
        match &target.kind {
            ExprKind::Ident(ident) => self.define(ident, target.line, flow, OccurrenceKind::PartialDef),
            ExprKind::Apply(_)
            | ExprKind::ArrayRef(_)
            | ExprKind::CellRef(_)
            | ExprKind::Call(_)
            | ExprKind::Field(_) => self.target(target, flow),
            _ => self.expr(target, flow),
        }
    }

    fn check_arity(&mut self, assign: &LetStmt, line: Line) {
        let targets = assign.targets.len();
        let value = &assign.value;
        let structural = match &value.kind {
            ExprKind::CellRef(_) => return,
            ExprKind::Ident(ident) => {
                self.pending_arity.push(PendingArity {
                    line,
                    targets,
                    root: ident.id.map(|id| (id, ident.name.clone())),
                });
                return;
            }
            ExprKind::Apply(index) | ExprKind::ArrayRef(index) => {
                self.pending_arity.push(PendingArity {
                    line,
                    targets,
                    root: callee(&index.target),
                });
                return;
            }
            ExprKind::Call(call) => {
                self.pending_arity.push(PendingArity {
                    line,
                    targets,
                    root: callee(&call.target),
                });
                return;
            }
            ExprKind::Number(_) => "a number literal",
            ExprKind::Str(_) => "a string literal",
            ExprKind::Logical(_) => "a logical literal",
            ExprKind::Op(_) => "an operator expression",
            ExprKind::Field(_) => "a field access",
            ExprKind::Matrix(_) => "a matrix literal",
            ExprKind::CellArray(_) => "a cell array literal",
            ExprKind::Lambda(_) => "an anonymous function",
        };
        self.diagnostics.push(catalog::arity_mismatch(targets, structural, line));
    }

    // ------------------------------------------------------------------
    // Roles and diagnostics
    // ------------------------------------------------------------------

    fn finish(mut self) -> Analysis {
        let graph = &self.graph;
        for occurrence in self.symbols.occurrences_mut() {
            occurrence.role = match occurrence.kind {
                OccurrenceKind::FunctionName => Role::Function,
                OccurrenceKind::Use => {
                    let reached = graph.node_of(occurrence.id).is_some_and(|node| graph.is_reached(node));
                    if reached { Role::Variable } else { Role::Function }
                }
                _ => Role::Variable,
            };
        }

        let mut summaries: Vec<(ScopeId, String, Role)> = Vec::new();
        let mut ambiguous: Vec<Diagnostic> = Vec::new();
        for occurrence in self.symbols.occurrences() {
            if occurrence.kind != OccurrenceKind::FunctionName {
                summaries.push((occurrence.scope, occurrence.name.clone(), occurrence.role));
            }
            if occurrence.kind == OccurrenceKind::Use
                && occurrence.index_target
                && occurrence.array_syntax
                && occurrence.role == Role::Function
                && !self.symbols.is_declared_function(&occurrence.name)
            {
                ambiguous.push(catalog::ambiguous_index(&occurrence.name, occurrence.line));
            }
        }
        for (scope, name, role) in summaries {
            if let Some(scope) = self.symbols.scope_mut(scope) {
                match role {
                    Role::Variable => scope.variables.insert(name),
                    Role::Function | Role::Unknown => scope.functions.insert(name),
                };
            }
        }

        for pending in std::mem::take(&mut self.pending_arity) {
            let Some((id, name)) = pending.root else {
                self.diagnostics
                    .push(catalog::arity_mismatch(pending.targets, "an indexed expression", pending.line));
                continue;
            };
            if self.symbols.role_of(id) == Role::Variable {
                self.diagnostics.push(catalog::arity_mismatch(
                    pending.targets,
                    &format!("variable '{name}'"),
                    pending.line,
                ));
            }
        }

        self.diagnostics.extend(ambiguous);
        self.diagnostics.sort_by_key(|d| d.line);

        Analysis {
            graph: self.graph,
            symbols: self.symbols,
            diagnostics: self.diagnostics,
        }
    }
}

/// The identifier a call-or-index target is named by, through field accesses
pub(super) fn callee(target: &Expr) -> Option<(NodeId, String)> {
    match &target.kind {
        ExprKind::Ident(ident) => ident.id.map(|id| (id, ident.name.clone())),
        ExprKind::Field(field) => callee(&field.object),
        _ => None,
    }
}

/// `end`, a bare `:` or a bare `::` anywhere in an index argument, outside nested indexing
fn uses_array_syntax(arg: &Expr) -> bool {
    match &arg.kind {
        ExprKind::Op(op) => match operators::from_str(&op.op) {
            Some(OperatorId::End) => true,
            Some(OperatorId::Colon | OperatorId::Range) if op.args.is_empty() => true,
            _ => op.args.iter().any(uses_array_syntax),
        },
        _ => false,
    }
}
