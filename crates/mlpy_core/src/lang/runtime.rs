//! Runtime library vocabulary.
//!
//! Generated Python calls into a runtime array library for everything whose semantics Python does not provide:
//! copy-on-assign, row concatenation, deferred `end`, logical reductions and the function-call packing that feeds
//! `varargin`/`nargin`. This module names those entry points so the code generator never spells them inline.
//!
//! ## Examples
//! ```rust
//! use mlpy_core::lang::runtime::{self, RuntimeFnId};
//!
//! assert_eq!(runtime::as_str(RuntimeFnId::Copy), "copy");
//! assert_eq!(runtime::from_str("matlabarray"), Some(RuntimeFnId::EmptyArray));
//! assert!(runtime::is_workspace_loader("load"));
//! ```

use super::registry::LangItemInfo;

/// Stable identifier for a runtime entry point or runtime-provided binding.
///
/// The discriminant order matches [`RUNTIME_FUNCTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeFnId {
    Copy,
    Concat,
    EmptyArray,
    CellArray,
    Arange,
    End,
    LogicalNot,
    LogicalAnd,
    LogicalOr,
    GetAttr,
    SetAttr,
    LinearSolve,
    FunctionDecorator,
    Varargin,
    Nargin,
    Nargout,
    True,
    False,
    Workspace,
}

/// Metadata for a runtime entry point.
pub type RuntimeFnInfo = LangItemInfo<RuntimeFnId>;

/// Registry of runtime entry points, ordered by [`RuntimeFnId`].
pub const RUNTIME_FUNCTIONS: &[RuntimeFnInfo] = &[
    info(RuntimeFnId::Copy, "copy", "Materialize an independent copy of a value."),
    info(RuntimeFnId::Concat, "concat", "Build an array from a list of rows."),
    info(RuntimeFnId::EmptyArray, "matlabarray", "Construct an empty array with source shape semantics."),
    info(RuntimeFnId::CellArray, "cellarray", "Build a cell array from a list of rows."),
    info(RuntimeFnId::Arange, "arange", "Construct an inclusive, 1-based index range."),
    info(RuntimeFnId::End, "end", "Deferred end-of-dimension marker, resolved by the indexed array."),
    info(RuntimeFnId::LogicalNot, "logical_not", "Elementwise negation."),
    info(RuntimeFnId::LogicalAnd, "logical_and", "Elementwise conjunction."),
    info(RuntimeFnId::LogicalOr, "logical_or", "Elementwise disjunction."),
    info(RuntimeFnId::GetAttr, "getattr", "Dynamic field read."),
    info(RuntimeFnId::SetAttr, "setattr", "Dynamic field write."),
    info(RuntimeFnId::LinearSolve, "numpy.linalg.solve", "Solve `a x = b` for left division."),
    info(RuntimeFnId::FunctionDecorator, "function", "Decorator that packs `varargin`/`nargin`/`nargout`."),
    info(RuntimeFnId::Varargin, "varargin", "Implicit binding: trailing positional arguments."),
    info(RuntimeFnId::Nargin, "nargin", "Implicit binding: number of actual arguments."),
    info(RuntimeFnId::Nargout, "nargout", "Keyword argument naming the requested output count."),
    info(RuntimeFnId::True, "true", "Logical true constant."),
    info(RuntimeFnId::False, "false", "Logical false constant."),
    info(RuntimeFnId::Workspace, "workspace_", "Dictionary simulating the script workspace."),
];

/// Bindings every emitted function declares before its first user statement, in emission order.
pub const IMPLICIT_FUNCTION_BINDINGS: &[RuntimeFnId] = &[RuntimeFnId::Varargin, RuntimeFnId::Nargin];

/// Variadic tail appended to every emitted parameter list.
pub const VARIADIC_TAIL: &[&str] = &["*args", "**kwargs"];

/// Attribute used for transposition.
pub const TRANSPOSE_ATTR: &str = "T";

/// Method on [`RuntimeFnId::Workspace`] that merges loaded variables.
pub const WORKSPACE_MERGE: &str = "update";

/// Builtins whose result is merged into the simulated workspace rather than bound by the caller.
pub const WORKSPACE_LOADERS: &[&str] = &["load"];

/// Return the full metadata entry for a runtime entry point.
pub fn info_for(id: RuntimeFnId) -> &'static RuntimeFnInfo {
    &RUNTIME_FUNCTIONS[id as usize]
}

/// Return the Python spelling of a runtime entry point.
pub fn as_str(id: RuntimeFnId) -> &'static str {
    info_for(id).canonical
}

/// Resolve a spelling to a runtime entry point.
pub fn from_str(name: &str) -> Option<RuntimeFnId> {
    RUNTIME_FUNCTIONS.iter().find(|f| f.canonical == name).map(|f| f.id)
}

/// Check whether a called name merges its result into the workspace.
pub fn is_workspace_loader(name: &str) -> bool {
    WORKSPACE_LOADERS.contains(&name)
}

const fn info(id: RuntimeFnId, canonical: &'static str, description: &'static str) -> RuntimeFnInfo {
    LangItemInfo {
        id,
        canonical,
        aliases: &[],
        description,
    }
}
