//! Operator vocabulary.
//!
//! This module defines the source operator set together with the Python spelling each one is rewritten to. It is the
//! operator table consumed by code generation: lookups are by stable [`OperatorId`], and [`rewrite`] implements the
//! lookup-with-default contract (unmapped spellings pass through unchanged).
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Several source spellings may share one id (`!` and `~` are both [`OperatorId::Not`]).
//! - A `target` of `None` means the source spelling is already valid Python (e.g. `+`, `<=`).
//! - Operators with a dedicated emission form (runtime calls, ranges, `end`) still carry a `target` where a plain
//!   inline spelling exists, so generic fallbacks stay consistent with the table.
//!
//! ## Examples
//! ```rust
//! use mlpy_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str(".^"), Some(OperatorId::ElemPower));
//! assert_eq!(operators::target_for(OperatorId::ElemPower), "**");
//! assert_eq!(operators::rewrite("<>"), "<>");
//! ```

/// Define where an operator's operands sit relative to its spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
    Postfix,
    /// Takes no operands (`end`).
    Nullary,
    /// Wraps a single operand (`parens`).
    Grouping,
    /// Takes a variable operand list (`:` and `::`).
    Variadic,
}

/// Stable identifier for every operator.
///
/// The discriminant order matches [`OPERATORS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Power,
    ElemMul,
    ElemDiv,
    ElemPower,
    LeftDiv,
    ElemLeftDiv,

    // Augmented elementwise
    ElemMulEq,
    ElemDivEq,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    Not,
    ElemAnd,
    ElemOr,
    AndAnd,
    OrOr,

    // Postfix
    Transpose,

    // Indexing
    Range,
    Colon,
    End,

    // Grouping and handles
    Parens,
    Handle,
}

/// Metadata for an operator.
///
/// ## Notes
/// - `spellings` lists every accepted source spelling; the first one is canonical.
/// - `target` is the Python spelling, or `None` when the source spelling is kept verbatim.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spellings: &'static [&'static str],
    pub target: Option<&'static str>,
    pub fixity: Fixity,
}

/// Registry of all operators, ordered by [`OperatorId`].
pub const OPERATORS: &[OperatorInfo] = &[
    // Arithmetic
    op(OperatorId::Plus, &["+"], None, Fixity::Infix),
    op(OperatorId::Minus, &["-"], None, Fixity::Infix),
    op(OperatorId::Star, &["*"], None, Fixity::Infix),
    op(OperatorId::Slash, &["/"], None, Fixity::Infix),
    op(OperatorId::Power, &["^", "**"], Some("**"), Fixity::Infix),
    op(OperatorId::ElemMul, &[".*"], Some("*"), Fixity::Infix),
    op(OperatorId::ElemDiv, &["./"], Some("/"), Fixity::Infix),
    op(OperatorId::ElemPower, &[".^"], Some("**"), Fixity::Infix),
    op(OperatorId::LeftDiv, &["\\"], None, Fixity::Infix),
    op(OperatorId::ElemLeftDiv, &[".\\"], Some("/"), Fixity::Infix),
    // Augmented elementwise
    op(OperatorId::ElemMulEq, &[".*="], Some("*"), Fixity::Infix),
    op(OperatorId::ElemDivEq, &["./="], Some("/"), Fixity::Infix),
    // Comparison
    op(OperatorId::EqEq, &["=="], None, Fixity::Infix),
    op(OperatorId::NotEq, &["~=", "!="], Some("!="), Fixity::Infix),
    op(OperatorId::Lt, &["<"], None, Fixity::Infix),
    op(OperatorId::LtEq, &["<="], None, Fixity::Infix),
    op(OperatorId::Gt, &[">"], None, Fixity::Infix),
    op(OperatorId::GtEq, &[">="], None, Fixity::Infix),
    // Logical
    op(OperatorId::Not, &["!", "~"], Some("not"), Fixity::Prefix),
    op(OperatorId::ElemAnd, &["&"], Some("and"), Fixity::Infix),
    op(OperatorId::ElemOr, &["|"], Some("or"), Fixity::Infix),
    op(OperatorId::AndAnd, &["&&"], Some("and"), Fixity::Infix),
    op(OperatorId::OrOr, &["||"], Some("or"), Fixity::Infix),
    // Postfix
    op(OperatorId::Transpose, &["'", ".'"], None, Fixity::Postfix),
    // Indexing
    op(OperatorId::Range, &["::"], None, Fixity::Variadic),
    op(OperatorId::Colon, &[":"], None, Fixity::Variadic),
    op(OperatorId::End, &["end"], None, Fixity::Nullary),
    // Grouping and handles
    op(OperatorId::Parens, &["parens"], None, Fixity::Grouping),
    op(OperatorId::Handle, &["@"], None, Fixity::Prefix),
];

/// Return the full metadata entry for an operator.
///
/// ## Parameters
/// - `id`: Operator identifier.
///
/// ## Returns
/// - The associated [`OperatorInfo`] from [`OPERATORS`].
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    &OPERATORS[id as usize]
}

/// Return the canonical source spelling of an operator.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spellings[0]
}

/// Return the Python spelling of an operator (the canonical source spelling when unmapped).
pub fn target_for(id: OperatorId) -> &'static str {
    let info = info_for(id);
    info.target.unwrap_or(info.spellings[0])
}

/// Resolve an operator spelling to its identifier.
///
/// ## Returns
/// - `Some(OperatorId)` if the spelling exists in [`OPERATORS`].
/// - `None` otherwise.
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|o| {
            let spellings: &[&str] = o.spellings;
            spellings.contains(&spelling)
        })
        .map(|o| o.id)
}

/// Rewrite a source operator spelling to its Python spelling.
///
/// Unmapped or unknown spellings are returned unchanged.
pub fn rewrite(spelling: &str) -> &str {
    match from_str(spelling).and_then(|id| info_for(id).target) {
        Some(target) => target,
        None => spelling,
    }
}

// --- helpers -----------------------------------------------------------------

const fn op(
    id: OperatorId,
    spellings: &'static [&'static str],
    target: Option<&'static str>,
    fixity: Fixity,
) -> OperatorInfo {
    OperatorInfo {
        id,
        spellings,
        target,
        fixity,
    }
}
