//! Write resolved roles back into the tree and re-tag indexed accesses.

use mlpy_syntax::ast::{CallExpr, Expr, ExprKind, FieldSelector, Ident, IndexExpr, Role, Stmt, StmtKind};

use crate::config::ReservedWords;
use crate::frontend::symbols::SymbolTable;

pub(super) struct Rewriter<'a> {
    symbols: &'a SymbolTable,
    reserved: &'a ReservedWords,
    /// Nodes whose variant, requested arity, role or reserved flag changed
    pub retagged: usize,
}

impl<'a> Rewriter<'a> {
    pub fn new(symbols: &'a SymbolTable, reserved: &'a ReservedWords) -> Self {
        Self {
            symbols,
            reserved,
            retagged: 0,
        }
    }

    pub fn block(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Expr(expr) => self.expr(expr, 1),
            StmtKind::Let(assign) => {
                // Only the whole right-hand side of a multi-target assignment asks for several results
                let nargout = assign.targets.len().max(1);
                self.expr(&mut assign.value, nargout);
                for target in &mut assign.targets {
                    self.target(target);
                }
            }
            StmtKind::If(branch) => {
                self.expr(&mut branch.cond, 1);
                self.block(&mut branch.then_body);
                if let Some(body) = &mut branch.else_body {
                    self.block(body);
                }
            }
            StmtKind::For(each) => {
                self.ident(&mut each.var);
                self.expr(&mut each.iter, 1);
                self.block(&mut each.body);
            }
            StmtKind::While(lp) => {
                self.expr(&mut lp.cond, 1);
                self.block(&mut lp.body);
            }
            StmtKind::Try(attempt) => {
                self.block(&mut attempt.body);
                if let Some(catch) = &mut attempt.catch {
                    if let Some(ident) = &mut catch.ident {
                        self.ident(ident);
                    }
                    self.block(&mut catch.body);
                }
                if let Some(body) = &mut attempt.finally_body {
                    self.block(body);
                }
            }
            StmtKind::Function(decl) => {
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
                    self.expr(value, 1);
                }
            }
            StmtKind::Break | StmtKind::Continue | StmtKind::Pass | StmtKind::Null | StmtKind::Comment(_) => {}
        }
    }

    fn ident(&mut self, ident: &mut Ident) {
        let role = ident.id.map_or(Role::Unknown, |id| self.symbols.role_of(id));
        if role != Role::Unknown && ident.role != role {
            ident.role = role;
            self.retagged += 1;
        }
        let reserved = self.reserved.contains(&ident.name);
        if ident.reserved != reserved {
            ident.reserved = reserved;
            self.retagged += 1;
        }
        if let Some(init) = &mut ident.init {
            self.expr(init, 1);
        }
    }

    fn expr(&mut self, expr: &mut Expr, nargout: usize) {
        match &mut expr.kind {
            ExprKind::Ident(ident) => self.ident(ident),
            ExprKind::Number(_) | ExprKind::Str(_) | ExprKind::Logical(_) => {}
            ExprKind::Op(op) => {
                for arg in &mut op.args {
                    self.expr(arg, 1);
                }
                if let Some(ret) = &mut op.ret {
                    self.ident(ret);
                }
            }
            ExprKind::Field(field) => {
                self.expr(&mut field.object, 1);
                if let FieldSelector::Dynamic(selector) = &mut field.selector {
                    self.expr(selector, 1);
                }
            }
            ExprKind::CellRef(index) => {
                self.expr(&mut index.target, 1);
                for arg in &mut index.args {
                    self.expr(arg, 1);
                }
            }
            ExprKind::Apply(_) | ExprKind::ArrayRef(_) | ExprKind::Call(_) => self.index(expr, nargout, false),
            ExprKind::Matrix(rows) | ExprKind::CellArray(rows) => {
                for element in rows.iter_mut().flatten() {
                    self.expr(element, 1);
                }
            }
            ExprKind::Lambda(lambda) => {
                for param in &mut lambda.params {
                    self.ident(param);
                }
                self.expr(&mut lambda.body, 1);
            }
        }
    }

    fn target(&mut self, target: &mut Expr) {
        match &mut target.kind {
            ExprKind::Ident(ident) => self.ident(ident),
            ExprKind::Field(field) => {
                self.target(&mut field.object);
                if let FieldSelector::Dynamic(selector) = &mut field.selector {
                    self.expr(selector, 1);
                }
            }
            ExprKind::CellRef(index) => {
                self.target(&mut index.target);
                for arg in &mut index.args {
                    self.expr(arg, 1);
                }
            }
            // Something being assigned into is always an array
            ExprKind::Apply(_) | ExprKind::ArrayRef(_) | ExprKind::Call(_) => self.index(target, 1, true),
            _ => self.expr(target, 1),
        }
    }

    /// Decide between array reference and call for `target(args)`
    fn index(&mut self, expr: &mut Expr, nargout: usize, assigned: bool) {
        let is_call = {
            let (target, args) = match &mut expr.kind {
                ExprKind::Apply(index) | ExprKind::ArrayRef(index) => (&mut index.target, &mut index.args),
                ExprKind::Call(call) => (&mut call.target, &mut call.args),
                _ => return,
            };
            if assigned {
                self.target(target);
            } else {
                self.expr(target, 1);
            }
            for arg in args.iter_mut() {
                self.expr(arg, 1);
            }
            !assigned && matches!(callee_role(target), Some(Role::Function | Role::Unknown))
        };

        let placeholder = ExprKind::Logical(false);
        let kind = std::mem::replace(&mut expr.kind, placeholder);
        let (resolved, changed) = match kind {
            ExprKind::Apply(index) => (retag(index.target, index.args, is_call, nargout), true),
            ExprKind::ArrayRef(index) => (retag(index.target, index.args, is_call, nargout), is_call),
            ExprKind::Call(call) => {
                let changed = !is_call || call.nargout != nargout;
                (retag(call.target, call.args, is_call, nargout), changed)
            }
            other => (other, false),
        };
        expr.kind = resolved;
        if changed {
            self.retagged += 1;
        }
    }
}

fn retag(target: Box<Expr>, args: Vec<Expr>, is_call: bool, nargout: usize) -> ExprKind {
    if is_call {
        ExprKind::Call(CallExpr { target, args, nargout })
    } else {
        ExprKind::ArrayRef(IndexExpr { target, args })
    }
}

/// Role of the name an indexed expression is rooted at; `None` when it indexes a computed value
fn callee_role(target: &Expr) -> Option<Role> {
    match &target.kind {
        ExprKind::Ident(ident) => Some(ident.role),
        ExprKind::Field(field) => callee_role(&field.object),
        _ => None,
    }
}
