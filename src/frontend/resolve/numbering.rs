//! Assign a [`NodeId`] to every identifier occurrence.
//!
//! Numbering follows a fixed depth-first order, so running it again on the same tree (resolved or not) reproduces
//! the same ids.

use std::collections::BTreeSet;

use mlpy_syntax::ast::{Expr, ExprKind, FieldSelector, Ident, NodeId, Program, Stmt, StmtKind};

#[derive(Debug, Default)]
pub(super) struct Numbering {
    next: u32,
    /// Names of every function declared in the file
    pub declared_functions: BTreeSet<String>,
}

impl Numbering {
    pub fn run(program: &mut Program) -> Self {
        let mut numbering = Numbering::default();
        numbering.block(&mut program.statements);
        numbering
    }

    /// Number of identifiers seen
    pub fn count(&self) -> u32 {
        self.next
    }

    fn ident(&mut self, ident: &mut Ident) {
        ident.id = Some(NodeId(self.next));
        self.next += 1;
        if let Some(init) = &mut ident.init {
            self.expr(init);
        }
    }

    fn block(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Expr(expr) => self.expr(expr),
            StmtKind::Let(stmt) => {
                for target in &mut stmt.targets {
                    self.expr(target);
                }
                self.expr(&mut stmt.value);
            }
            StmtKind::If(stmt) => {
                self.expr(&mut stmt.cond);
                self.block(&mut stmt.then_body);
                if let Some(body) = &mut stmt.else_body {
                    self.block(body);
                }
            }
            StmtKind::For(stmt) => {
                self.ident(&mut stmt.var);
                self.expr(&mut stmt.iter);
                self.block(&mut stmt.body);
            }
            StmtKind::While(stmt) => {
                self.expr(&mut stmt.cond);
                self.block(&mut stmt.body);
            }
            StmtKind::Try(stmt) => {
                self.block(&mut stmt.body);
                if let Some(catch) = &mut stmt.catch {
                    if let Some(ident) = &mut catch.ident {
                        self.ident(ident);
                    }
                    self.block(&mut catch.body);
                }
                if let Some(body) = &mut stmt.finally_body {
                    self.block(body);
                }
            }
            StmtKind::Function(decl) => {
                self.declared_functions.insert(decl.name.name.clone());
                self.ident(&mut decl.name);
                for param in &mut decl.params {
                    self.ident(param);
                }
                self.block(&mut decl.body);
            }
            StmtKind::Global(names) | StmtKind::Persistent(names) => {
                for name in names {
                    self.ident(name);
                }
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.expr(value);
                }
            }
            StmtKind::Break | StmtKind::Continue | StmtKind::Pass | StmtKind::Null | StmtKind::Comment(_) => {}
        }
    }

    fn expr(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::Ident(ident) => self.ident(ident),
            ExprKind::Number(_) | ExprKind::Str(_) | ExprKind::Logical(_) => {}
            ExprKind::Op(op) => {
                for arg in &mut op.args {
                    self.expr(arg);
                }
                if let Some(ret) = &mut op.ret {
                    self.ident(ret);
                }
            }
            ExprKind::Field(field) => {
                self.expr(&mut field.object);
                if let FieldSelector::Dynamic(selector) = &mut field.selector {
                    self.expr(selector);
                }
            }
            ExprKind::Apply(index) | ExprKind::ArrayRef(index) | ExprKind::CellRef(index) => {
                self.expr(&mut index.target);
                for arg in &mut index.args {
                    self.expr(arg);
                }
            }
            ExprKind::Call(call) => {
                self.expr(&mut call.target);
                for arg in &mut call.args {
                    self.expr(arg);
                }
            }
            ExprKind::Matrix(rows) | ExprKind::CellArray(rows) => {
                for element in rows.iter_mut().flatten() {
                    self.expr(element);
                }
            }
            ExprKind::Lambda(lambda) => {
                for param in &mut lambda.params {
                    self.ident(param);
                }
                self.expr(&mut lambda.body);
            }
        }
    }
}
