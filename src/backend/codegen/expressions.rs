//! Expression emission for code generation
//!
//! Handles emitting all expression kinds to Python. Every emitter returns the rendered text; expressions never span
//! lines.

use mlpy_core::lang::operators::{self, Fixity, OperatorId};
use mlpy_core::lang::runtime::{self, RuntimeFnId};
use mlpy_syntax::ast::{Expr, ExprKind, FieldExpr, FieldSelector, Ident, LambdaExpr, Line, OpExpr};

use super::{EmitError, PyCodegen};
use crate::backend::py_emitter::{format_number, quote_str, to_py_ident};

impl PyCodegen<'_> {
    /// Emit an expression
    pub(crate) fn emit_expr(&self, expr: &Expr) -> Result<String, EmitError> {
        match &expr.kind {
            ExprKind::Ident(ident) => self.emit_ident(ident),
            ExprKind::Number(number) => Ok(format_number(*number)),
            ExprKind::Str(value) => Ok(quote_str(value)),
            ExprKind::Logical(value) => {
                let id = if *value { RuntimeFnId::True } else { RuntimeFnId::False };
                Ok(runtime::as_str(id).to_string())
            }
            ExprKind::Op(op) => self.emit_op(op, expr.line),
            ExprKind::Field(field) => self.emit_field(field),
            // Never re-tagged: treat as a call
            ExprKind::Apply(index) => self.emit_call(&index.target, &index.args, 1),
            ExprKind::ArrayRef(index) | ExprKind::CellRef(index) => {
                let target = self.emit_expr(&index.target)?;
                self.emit_subscript(target, &index.args)
            }
            ExprKind::Call(call) => self.emit_call(&call.target, &call.args, call.nargout),
            ExprKind::Matrix(rows) => self.emit_matrix(rows),
            ExprKind::CellArray(rows) => {
                let rows = self.emit_rows(rows)?;
                Ok(format!("{}([{rows}])", runtime::as_str(RuntimeFnId::CellArray)))
            }
            ExprKind::Lambda(lambda) => self.emit_lambda(lambda),
        }
    }

    /// Emit an identifier, suffixing it when it collides with a reserved word
    pub(crate) fn emit_ident(&self, ident: &Ident) -> Result<String, EmitError> {
        let reserved = ident.reserved || self.config.reserved.contains(&ident.name);
        let name = to_py_ident(&ident.name, reserved);
        match &ident.init {
            Some(init) => Ok(format!("{name}={}", self.emit_expr(init)?)),
            None => Ok(name),
        }
    }

    /// Emit a comma-separated argument list
    pub(crate) fn emit_args(&self, args: &[Expr]) -> Result<String, EmitError> {
        let args = args.iter().map(|arg| self.emit_expr(arg)).collect::<Result<Vec<_>, _>>()?;
        Ok(args.join(","))
    }

    /// Emit `target[args]`; an empty index selects everything
    pub(crate) fn emit_subscript(&self, target: String, args: &[Expr]) -> Result<String, EmitError> {
        if args.is_empty() {
            return Ok(format!("{target}[{}]", operators::as_str(OperatorId::Colon)));
        }
        Ok(format!("{target}[{}]", self.emit_args(args)?))
    }

    /// Emit a field name, suffixed like any identifier when it collides with a reserved word
    pub(crate) fn emit_field_name(&self, name: &str) -> String {
        to_py_ident(name, self.config.reserved.contains(name))
    }

    /// Emit an operand that is combined with something on its right, parenthesised unless atomic
    pub(crate) fn emit_grouped(&self, expr: &Expr) -> Result<String, EmitError> {
        let text = self.emit_expr(expr)?;
        if is_atomic(expr) { Ok(text) } else { Ok(format!("({text})")) }
    }

    fn emit_call(&self, target: &Expr, args: &[Expr], nargout: usize) -> Result<String, EmitError> {
        let callee = self.emit_expr(target)?;
        let args = self.emit_args(args)?;
        let nargout_kw = runtime::as_str(RuntimeFnId::Nargout);
        let call = match (nargout, args.is_empty()) {
            (0 | 1, _) => format!("{callee}({args})"),
            (n, true) => format!("{callee}({nargout_kw}={n})"),
            (n, false) => format!("{callee}({args},{nargout_kw}={n})"),
        };

        // `load` fills the caller's workspace
        let loads_workspace = target.as_ident().is_some_and(|i| runtime::is_workspace_loader(&i.name));
        if loads_workspace {
            return Ok(format!(
                "{}.{}({call})",
                runtime::as_str(RuntimeFnId::Workspace),
                runtime::WORKSPACE_MERGE
            ));
        }
        Ok(call)
    }

    fn emit_field(&self, field: &FieldExpr) -> Result<String, EmitError> {
        let object = self.emit_expr(&field.object)?;
        match &field.selector {
            FieldSelector::Name(name) => Ok(format!("{object}.{}", self.emit_field_name(name))),
            FieldSelector::Dynamic(selector) => Ok(format!(
                "{}({object},{})",
                runtime::as_str(RuntimeFnId::GetAttr),
                self.emit_expr(selector)?
            )),
        }
    }

    fn emit_matrix(&self, rows: &[Vec<Expr>]) -> Result<String, EmitError> {
        if rows.iter().all(Vec::is_empty) {
            return Ok(format!("{}()", runtime::as_str(RuntimeFnId::EmptyArray)));
        }
        // A matrix holding a string literal is a string concatenation
        if rows.iter().flatten().any(Expr::is_string_literal) {
            let parts = rows
                .iter()
                .flatten()
                .map(|e| self.emit_expr(e))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(parts.join(" + "));
        }
        let rows = self.emit_rows(rows)?;
        Ok(format!("{}([{rows}])", runtime::as_str(RuntimeFnId::Concat)))
    }

    fn emit_rows(&self, rows: &[Vec<Expr>]) -> Result<String, EmitError> {
        let rows = rows
            .iter()
            .map(|row| Ok(format!("[{}]", self.emit_args(row)?)))
            .collect::<Result<Vec<_>, EmitError>>()?;
        Ok(rows.join(","))
    }

    fn emit_lambda(&self, lambda: &LambdaExpr) -> Result<String, EmitError> {
        let params = lambda
            .params
            .iter()
            .map(|p| self.emit_ident(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("lambda {}: {}", params.join(","), self.emit_expr(&lambda.body)?))
    }

    // ------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------

    fn emit_op(&self, op: &OpExpr, line: Line) -> Result<String, EmitError> {
        let Some(id) = operators::from_str(&op.op) else {
            return self.emit_generic_op(op);
        };
        match id {
            OperatorId::Not => {
                let [x] = operands(op, line)?;
                Ok(format!("{}({})", runtime::as_str(RuntimeFnId::LogicalNot), self.emit_expr(x)?))
            }
            OperatorId::ElemAnd | OperatorId::ElemOr | OperatorId::LeftDiv => {
                let [a, b] = operands(op, line)?;
                let func = match id {
                    OperatorId::ElemAnd => RuntimeFnId::LogicalAnd,
                    OperatorId::ElemOr => RuntimeFnId::LogicalOr,
                    _ => RuntimeFnId::LinearSolve,
                };
                Ok(format!(
                    "{}({},{})",
                    runtime::as_str(func),
                    self.emit_expr(a)?,
                    self.emit_expr(b)?
                ))
            }
            OperatorId::AndAnd | OperatorId::OrOr => {
                let [a, b] = operands(op, line)?;
                Ok(format!(
                    "{} {} {}",
                    self.emit_expr(a)?,
                    operators::target_for(id),
                    self.emit_expr(b)?
                ))
            }
            OperatorId::ElemLeftDiv => {
                // a .\ b divides b by a; swapped operands keep their own grouping
                let [a, b] = operands(op, line)?;
                Ok(format!(
                    "{} {} {}",
                    self.emit_grouped(b)?,
                    operators::target_for(id),
                    self.emit_grouped(a)?
                ))
            }
            OperatorId::Handle => {
                let [x] = operands(op, line)?;
                self.emit_expr(x)
            }
            OperatorId::Transpose => {
                let [x] = operands(op, line)?;
                Ok(format!("{}.{}", self.emit_grouped(x)?, runtime::TRANSPOSE_ATTR))
            }
            OperatorId::Parens => {
                let [x] = operands(op, line)?;
                Ok(format!("({})", self.emit_expr(x)?))
            }
            OperatorId::End => {
                let [] = operands(op, line)?;
                Ok(format!("{}()", runtime::as_str(RuntimeFnId::End)))
            }
            OperatorId::Range => self.emit_range(op, line),
            OperatorId::Colon if op.args.is_empty() => Ok(operators::as_str(OperatorId::Colon).to_string()),
            OperatorId::Colon => Ok(format!(
                "{}({})",
                runtime::as_str(RuntimeFnId::Arange),
                self.emit_args(&op.args)?
            )),
            OperatorId::Plus if op.args.len() == 2 => {
                if let (ExprKind::Number(a), ExprKind::Number(b)) = (&op.args[0].kind, &op.args[1].kind) {
                    let sum = a.checked_add(*b);
                    if sum.as_f64().is_finite() {
                        return Ok(format_number(sum));
                    }
                }
                Ok(format!("({}+{})", self.emit_expr(&op.args[0])?, self.emit_expr(&op.args[1])?))
            }
            OperatorId::Minus if op.args.len() == 2 => {
                Ok(format!("({}-{})", self.emit_expr(&op.args[0])?, self.emit_expr(&op.args[1])?))
            }
            _ => self.emit_generic_op(op),
        }
    }

    /// Slice ranges: `a:b`, and `a:step:b` reordered to the runtime's `a:b:step`
    fn emit_range(&self, op: &OpExpr, line: Line) -> Result<String, EmitError> {
        let colon = operators::as_str(OperatorId::Colon);
        match op.args.as_slice() {
            [] => Ok(colon.to_string()),
            [start, stop] => Ok(format!("{}{colon}{}", self.emit_expr(start)?, self.emit_expr(stop)?)),
            [start, step, stop] => Ok(format!(
                "{}{colon}{}{colon}{}",
                self.emit_expr(start)?,
                self.emit_expr(stop)?,
                self.emit_expr(step)?
            )),
            args => Err(EmitError::malformed(
                line,
                "range",
                format!("expected 0, 2 or 3 operands, found {}", args.len()),
            )),
        }
    }

    /// Table-driven fallback for every other operator
    fn emit_generic_op(&self, op: &OpExpr) -> Result<String, EmitError> {
        let spelling = operators::rewrite(&op.op);
        match op.args.as_slice() {
            [] => Ok(spelling.to_string()),
            [x] => match operators::from_str(&op.op).map(|id| operators::info_for(id).fixity) {
                Some(Fixity::Postfix) => Ok(format!("{}{spelling}", self.emit_grouped(x)?)),
                _ => Ok(format!("{spelling} {}", self.emit_expr(x)?)),
            },
            [a, b] => Ok(format!("{} {spelling} {}", self.emit_expr(a)?, self.emit_expr(b)?)),
            args => {
                let ret = match &op.ret {
                    Some(ret) => format!("{}=", self.emit_ident(ret)?),
                    None => String::new(),
                };
                Ok(format!("{ret}{}({})", op.op, self.emit_args(args)?))
            }
        }
    }
}

/// Operands of a fixed-arity operator
fn operands<const N: usize>(op: &OpExpr, line: Line) -> Result<[&Expr; N], EmitError> {
    let found = op.args.len();
    let args: Vec<&Expr> = op.args.iter().collect();
    args.try_into().map_err(|_| {
        EmitError::malformed(
            line,
            "operator",
            format!("'{}' expects {N} operand(s), found {found}", op.op),
        )
    })
}

/// Expressions that can take a trailing attribute or operator without parentheses
pub(super) fn is_atomic(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(_)
        | ExprKind::Field(_)
        | ExprKind::Apply(_)
        | ExprKind::ArrayRef(_)
        | ExprKind::CellRef(_)
        | ExprKind::Call(_)
        | ExprKind::CellArray(_) => true,
        ExprKind::Matrix(rows) => !rows.iter().flatten().any(Expr::is_string_literal),
        // Operators rendered as a call or a bracketed form
        ExprKind::Op(op) => match operators::from_str(&op.op) {
            Some(
                OperatorId::Parens
                | OperatorId::End
                | OperatorId::Not
                | OperatorId::ElemAnd
                | OperatorId::ElemOr
                | OperatorId::LeftDiv
                | OperatorId::Transpose,
            ) => true,
            Some(OperatorId::Colon) => !op.args.is_empty(),
            _ => false,
        },
        // `2.T` is a syntax error
        ExprKind::Number(_) | ExprKind::Str(_) | ExprKind::Logical(_) | ExprKind::Lambda(_) => false,
    }
}
