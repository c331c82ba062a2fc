//! Abstract Syntax Tree definitions for mlpy
//!
//! Every node owns its children outright. Information discovered by later passes is stored either as a tag on the
//! node itself (an identifier's [`Role`], the variant of an indexed access) or in side tables keyed by [`NodeId`].
//!
//! The tree derives `serde` so an external front end can hand it over as JSON.

use serde::{Deserialize, Serialize};

/// 1-based source line.
pub type Line = u32;

/// Identity of an identifier occurrence, assigned by resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// A program is a flat sequence of statements, possibly containing function declarations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}

// ============================================================================
// Identifiers
// ============================================================================

/// What an identifier occurrence denotes once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Unknown,
    Variable,
    Function,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    /// Default value, for formal parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Box<Expr>>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub reserved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            init: None,
            role: Role::Unknown,
            reserved: false,
            id: None,
        }
    }

    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(Box::new(init));
        self
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    Expr(Expr),
    Let(LetStmt),
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    Try(TryStmt),
    Function(FunctionDecl),
    Global(Vec<Ident>),
    Persistent(Vec<Ident>),
    Return(Option<Expr>),
    Break,
    Continue,
    Pass,
    /// Empty statement (a lone `;`).
    Null,
    /// Comment text including its source marker.
    Comment(String),
}

/// Assignment. A single target is the common case; `[a, b] = f(x)` has two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetStmt {
    pub targets: Vec<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_body: Vec<Stmt>,
    /// An `elseif` is an `If` as the only statement of this branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub else_body: Option<Vec<Stmt>>,
}

/// `for var = iter`, iterating the columns of `iter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub var: Ident,
    pub iter: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryStmt {
    pub body: Vec<Stmt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catch: Option<CatchClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finally_body: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ident: Option<Ident>,
    pub body: Vec<Stmt>,
}

/// Function declaration.
///
/// In the flat source form `body` is empty and the statements following the declaration in the enclosing list belong
/// to the function. The variadic tail and the implicit `varargin`/`nargin` bindings are never stored in `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: Ident,
    pub params: Vec<Ident>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

impl FunctionDecl {
    /// True when the statements that follow the declaration make up its body.
    pub fn is_flat(&self) -> bool {
        self.body.is_empty()
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Ident(Ident),
    Number(Number),
    Str(String),
    Logical(bool),
    Op(OpExpr),
    Field(FieldExpr),
    /// `target(args)` before resolution decides between indexing and calling.
    Apply(IndexExpr),
    ArrayRef(IndexExpr),
    CellRef(IndexExpr),
    Call(CallExpr),
    Matrix(Vec<Vec<Expr>>),
    CellArray(Vec<Vec<Expr>>),
    Lambda(LambdaExpr),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Add two literals, staying integral when the sum fits.
    pub fn checked_add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(sum) => Number::Int(sum),
                None => Number::Float(a as f64 + b as f64),
            },
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

/// Operator expression; `op` is the source spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpExpr {
    pub op: String,
    pub args: Vec<Expr>,
    /// Names the result, for forms that both compute and bind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ret: Option<Box<Ident>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExpr {
    pub object: Box<Expr>,
    pub selector: FieldSelector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSelector {
    /// `s.name`
    Name(String),
    /// `s.(expr)`
    Dynamic(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexExpr {
    pub target: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub target: Box<Expr>,
    pub args: Vec<Expr>,
    /// Number of results the caller wants.
    #[serde(default = "default_nargout")]
    pub nargout: usize,
}

fn default_nargout() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaExpr {
    pub params: Vec<Ident>,
    pub body: Box<Expr>,
}

impl Expr {
    pub fn new(kind: ExprKind, line: Line) -> Self {
        Self { kind, line }
    }

    pub fn ident(name: impl Into<String>, line: Line) -> Self {
        Self::new(ExprKind::Ident(Ident::new(name)), line)
    }

    pub fn int(value: i64, line: Line) -> Self {
        Self::new(ExprKind::Number(Number::Int(value)), line)
    }

    pub fn float(value: f64, line: Line) -> Self {
        Self::new(ExprKind::Number(Number::Float(value)), line)
    }

    pub fn string(value: impl Into<String>, line: Line) -> Self {
        Self::new(ExprKind::Str(value.into()), line)
    }

    pub fn op(op: impl Into<String>, args: Vec<Expr>, line: Line) -> Self {
        Self::new(
            ExprKind::Op(OpExpr {
                op: op.into(),
                args,
                ret: None,
            }),
            line,
        )
    }

    pub fn binary(op: impl Into<String>, lhs: Expr, rhs: Expr) -> Self {
        let line = lhs.line;
        Self::op(op, vec![lhs, rhs], line)
    }

    /// `target(args)`, unresolved.
    pub fn apply(target: Expr, args: Vec<Expr>) -> Self {
        let line = target.line;
        Self::new(
            ExprKind::Apply(IndexExpr {
                target: Box::new(target),
                args,
            }),
            line,
        )
    }

    pub fn cell_ref(target: Expr, args: Vec<Expr>) -> Self {
        let line = target.line;
        Self::new(
            ExprKind::CellRef(IndexExpr {
                target: Box::new(target),
                args,
            }),
            line,
        )
    }

    pub fn field(object: Expr, name: impl Into<String>) -> Self {
        let line = object.line;
        Self::new(
            ExprKind::Field(FieldExpr {
                object: Box::new(object),
                selector: FieldSelector::Name(name.into()),
            }),
            line,
        )
    }

    pub fn matrix(rows: Vec<Vec<Expr>>, line: Line) -> Self {
        Self::new(ExprKind::Matrix(rows), line)
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Str(_))
    }

    /// True for `target(args)` in any of its resolved or unresolved forms.
    pub fn is_index_shaped(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Apply(_) | ExprKind::ArrayRef(_) | ExprKind::CellRef(_) | ExprKind::Call(_)
        )
    }

    /// The identifier a chain of field accesses and indexing starts from, if any.
    pub fn root_ident(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::Ident(ident) => Some(ident),
            ExprKind::Field(field) => field.object.root_ident(),
            ExprKind::Apply(index) | ExprKind::ArrayRef(index) | ExprKind::CellRef(index) => {
                index.target.root_ident()
            }
            ExprKind::Call(call) => call.target.root_ident(),
            _ => None,
        }
    }
}

impl Stmt {
    pub fn new(kind: StmtKind, line: Line) -> Self {
        Self { kind, line }
    }

    pub fn expr(expr: Expr) -> Self {
        let line = expr.line;
        Self::new(StmtKind::Expr(expr), line)
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        let line = target.line;
        Self::new(
            StmtKind::Let(LetStmt {
                targets: vec![target],
                value,
            }),
            line,
        )
    }

    pub fn multi_assign(targets: Vec<Expr>, value: Expr) -> Self {
        let line = value.line;
        Self::new(StmtKind::Let(LetStmt { targets, value }), line)
    }

    pub fn function(name: &str, params: &[&str], body: Vec<Stmt>, line: Line) -> Self {
        Self::new(
            StmtKind::Function(FunctionDecl {
                name: Ident::new(name),
                params: params.iter().map(|p| Ident::new(*p)).collect(),
                body,
            }),
            line,
        )
    }

    pub fn comment(text: impl Into<String>, line: Line) -> Self {
        Self::new(StmtKind::Comment(text.into()), line)
    }

    /// Comments and empty statements produce no behavior.
    pub fn is_noop(&self) -> bool {
        matches!(self.kind, StmtKind::Comment(_) | StmtKind::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_ident_follows_fields_and_indexing() {
        let e = Expr::apply(Expr::field(Expr::ident("s", 1), "data"), vec![Expr::int(2, 1)]);
        assert_eq!(e.root_ident().map(|i| i.name.as_str()), Some("s"));
        assert!(e.is_index_shaped());
        assert_eq!(Expr::int(1, 1).root_ident(), None);
    }

    #[test]
    fn number_addition_stays_integral() {
        assert_eq!(Number::Int(2).checked_add(Number::Int(3)), Number::Int(5));
        assert_eq!(Number::Int(1).checked_add(Number::Float(0.5)), Number::Float(1.5));
        assert_eq!(
            Number::Int(i64::MAX).checked_add(Number::Int(1)),
            Number::Float(i64::MAX as f64 + 1.0)
        );
    }

    #[test]
    fn noop_statements() {
        assert!(Stmt::comment("% hi", 1).is_noop());
        assert!(Stmt::new(StmtKind::Null, 1).is_noop());
        assert!(!Stmt::new(StmtKind::Pass, 1).is_noop());
    }

    #[test]
    fn deserializes_front_end_json() {
        let json = r#"{
            "statements": [
                {"line": 1, "kind": {"let": {
                    "targets": [{"line": 1, "kind": {"ident": {"name": "x"}}}],
                    "value": {"line": 1, "kind": {"number": {"int": 3}}}
                }}},
                {"line": 2, "kind": {"expr": {"line": 2, "kind": {"call": {
                    "target": {"line": 2, "kind": {"ident": {"name": "disp"}}},
                    "args": [{"line": 2, "kind": {"str": "hi"}}]
                }}}}},
                {"line": 3, "kind": "break"}
            ]
        }"#;
        let program: Program = serde_json::from_str(json).unwrap();
        assert_eq!(program.statements.len(), 3);
        assert_eq!(
            program.statements[0],
            Stmt::assign(Expr::ident("x", 1), Expr::int(3, 1))
        );
        match &program.statements[1].kind {
            StmtKind::Expr(Expr {
                kind: ExprKind::Call(call),
                ..
            }) => assert_eq!(call.nargout, 1),
            other => panic!("expected a call statement, got {other:?}"),
        }
        assert_eq!(program.statements[2].kind, StmtKind::Break);
    }
}
