//! Statement emission for code generation
//!
//! Handles statement lists, control flow, assignments and function declarations. The indentation `level` of every
//! emitted line is an explicit argument.

use mlpy_core::lang::runtime::{self, RuntimeFnId};
use mlpy_syntax::ast::{
    CatchClause, Expr, ExprKind, FieldSelector, FunctionDecl, Ident, IfStmt, LetStmt, Line, Stmt, StmtKind, TryStmt,
};

use super::{EmitError, PyCodegen};
use crate::backend::py_emitter::{PyEmitter, comment_line};

impl PyCodegen<'_> {
    /// Emit a statement list at `level`.
    ///
    /// A flat function declaration owns the siblings that follow it, so they are emitted one level deeper until the
    /// next declaration. A list with nothing but comments gets a trailing `pass`.
    pub(crate) fn emit_block(&self, out: &mut PyEmitter, stmts: &[Stmt], level: usize) -> Result<(), EmitError> {
        let mut current = level;
        // Set while a flat declaration has only seen no-op statements
        let mut flat_body_empty = false;
        for stmt in stmts {
            if let StmtKind::Function(decl) = &stmt.kind {
                if flat_body_empty {
                    out.line(level + 1, "pass");
                }
                self.emit_function(out, decl, level)?;
                flat_body_empty = decl.is_flat();
                current = if decl.is_flat() { level + 1 } else { level };
                continue;
            }
            self.emit_stmt(out, stmt, current)?;
            flat_body_empty &= stmt.is_noop();
        }
        if flat_body_empty {
            out.line(level + 1, "pass");
        }
        if stmts.iter().all(Stmt::is_noop) {
            out.line(level, "pass");
        }
        Ok(())
    }

    /// Emit a single statement
    pub(crate) fn emit_stmt(&self, out: &mut PyEmitter, stmt: &Stmt, level: usize) -> Result<(), EmitError> {
        match &stmt.kind {
            StmtKind::Expr(expr) => out.line(level, &self.emit_expr(expr)?),
            StmtKind::Let(assign) => out.line(level, &self.emit_let(assign, stmt.line)?),
            StmtKind::If(branch) => self.emit_if(out, branch, level, "if")?,
            StmtKind::For(each) => {
                let var = self.emit_ident(&each.var)?;
                let iter = self.emit_grouped(&each.iter)?;
                // Iterates the columns of the array
                out.line(level, &format!("for {var} in {iter}.{}:", runtime::TRANSPOSE_ATTR));
                self.emit_block(out, &each.body, level + 1)?;
            }
            StmtKind::While(lp) => {
                out.line(level, &format!("while {}:", self.emit_expr(&lp.cond)?));
                self.emit_block(out, &lp.body, level + 1)?;
            }
            StmtKind::Try(attempt) => self.emit_try(out, attempt, level)?,
            StmtKind::Function(decl) => self.emit_function(out, decl, level)?,
            StmtKind::Global(names) | StmtKind::Persistent(names) => {
                if names.is_empty() {
                    return Err(EmitError::malformed(stmt.line, "declaration", "declares no names"));
                }
                out.line(level, &format!("global {}", self.emit_names(names)?));
            }
            StmtKind::Return(None) => out.line(level, "return"),
            StmtKind::Return(Some(value)) => out.line(level, &format!("return {}", self.emit_expr(value)?)),
            StmtKind::Break => out.line(level, "break"),
            StmtKind::Continue => out.line(level, "continue"),
            StmtKind::Pass => out.line(level, "pass"),
            StmtKind::Null => out.blank_line(),
            StmtKind::Comment(text) => out.line(level, &comment_line(text)),
        }
        Ok(())
    }

    fn emit_names(&self, names: &[Ident]) -> Result<String, EmitError> {
        let names = names.iter().map(|n| self.emit_ident(n)).collect::<Result<Vec<_>, _>>()?;
        Ok(names.join(","))
    }

    /// `if`, with a lone nested `If` in the else branch folded into `elif`
    fn emit_if(&self, out: &mut PyEmitter, branch: &IfStmt, level: usize, keyword: &str) -> Result<(), EmitError> {
        out.line(level, &format!("{keyword} {}:", self.emit_expr(&branch.cond)?));
        self.emit_block(out, &branch.then_body, level + 1)?;
        match branch.else_body.as_deref() {
            None => Ok(()),
            Some([Stmt { kind: StmtKind::If(nested), .. }]) => self.emit_if(out, nested, level, "elif"),
            Some(body) => {
                out.line(level, "else:");
                self.emit_block(out, body, level + 1)
            }
        }
    }

    fn emit_try(&self, out: &mut PyEmitter, attempt: &TryStmt, level: usize) -> Result<(), EmitError> {
        out.line(level, "try:");
        self.emit_block(out, &attempt.body, level + 1)?;
        if let Some(CatchClause { ident, body }) = &attempt.catch {
            let header = match ident {
                Some(ident) => format!("except Exception as {}:", self.emit_ident(ident)?),
                None => "except Exception:".to_string(),
            };
            out.line(level, &header);
            self.emit_block(out, body, level + 1)?;
        }
        match (&attempt.catch, &attempt.finally_body) {
            (_, Some(body)) => {
                out.line(level, "finally:");
                self.emit_block(out, body, level + 1)?;
            }
            // `try:` needs at least one handler
            (None, None) => {
                out.line(level, "finally:");
                self.emit_block(out, &[], level + 1)?;
            }
            (Some(_), None) => {}
        }
        Ok(())
    }

    fn emit_function(&self, out: &mut PyEmitter, decl: &FunctionDecl, level: usize) -> Result<(), EmitError> {
        let name = self.emit_ident(&decl.name)?;
        let mut params = decl
            .params
            .iter()
            .map(|p| self.emit_ident(p))
            .collect::<Result<Vec<_>, _>>()?;
        params.extend(runtime::VARIADIC_TAIL.iter().map(|p| p.to_string()));

        out.line(level, &format!("@{}", runtime::as_str(RuntimeFnId::FunctionDecorator)));
        out.line(level, &format!("def {name}({}):", params.join(",")));
        for &binding in runtime::IMPLICIT_FUNCTION_BINDINGS {
            let binding = runtime::as_str(binding);
            out.line(level + 1, &format!("{binding} = {name}.{binding}"));
        }
        if !decl.is_flat() {
            self.emit_block(out, &decl.body, level + 1)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    fn emit_let(&self, assign: &LetStmt, line: Line) -> Result<String, EmitError> {
        let value = self.emit_expr(&assign.value)?;
        let copy = runtime::as_str(RuntimeFnId::Copy);
        let mut code = match assign.targets.as_slice() {
            [] => return Err(EmitError::malformed(line, "assignment", "has no target")),
            [target] => match (&target.kind, &assign.value.kind) {
                (ExprKind::Ident(_), ExprKind::Ident(_)) => {
                    format!("{}={copy}({value})", self.emit_target(target)?)
                }
                (ExprKind::Field(field), _) => {
                    let object = self.emit_target(&field.object)?;
                    match &field.selector {
                        FieldSelector::Dynamic(selector) => format!(
                            "{}({object},{},{value})",
                            runtime::as_str(RuntimeFnId::SetAttr),
                            self.emit_expr(selector)?
                        ),
                        FieldSelector::Name(name) => {
                            format!("{object}.{} = {copy}({value})", self.emit_field_name(name))
                        }
                    }
                }
                _ => format!("{}={value}", self.emit_target(target)?),
            },
            targets => {
                let targets = targets
                    .iter()
                    .map(|t| self.emit_target(t))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("{}={value}", targets.join(","))
            }
        };
        if let Some(file) = &self.config.source_comments {
            code.push_str(&format!("  # {file}:{line}"));
        }
        Ok(code)
    }

    /// Emit an assignment target; anything indexed is written as a subscript
    fn emit_target(&self, target: &Expr) -> Result<String, EmitError> {
        match &target.kind {
            ExprKind::Apply(index) | ExprKind::ArrayRef(index) | ExprKind::CellRef(index) => {
                let base = self.emit_target(&index.target)?;
                self.emit_subscript(base, &index.args)
            }
            ExprKind::Call(call) => {
                let base = self.emit_target(&call.target)?;
                self.emit_subscript(base, &call.args)
            }
            ExprKind::Field(field) => match &field.selector {
                FieldSelector::Name(name) => Ok(format!(
                    "{}.{}",
                    self.emit_target(&field.object)?,
                    self.emit_field_name(name)
                )),
                FieldSelector::Dynamic(_) => self.emit_expr(target),
            },
            _ => self.emit_expr(target),
        }
    }
}
