//! Symbol table and scope summaries for mlpy
//!
//! Resolution records every identifier occurrence here, keyed by the occurrence's [`NodeId`]. The tree only carries
//! the final role tag; everything else a caller may want to inspect (which scope an occurrence belongs to, whether it
//! defines or reads the name) lives in this side table.

use std::collections::{BTreeMap, BTreeSet};

use mlpy_syntax::ast::{Line, NodeId, Role};

/// Unique identifier for scopes
pub type ScopeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The implicit top-level scope of a script file
    Script,
    Function,
}

/// How an occurrence relates to its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccurrenceKind {
    /// Reads the name
    Use,
    /// Plain assignment target, loop variable, catch variable or result binding
    Def,
    /// Indexed or field assignment target: reads the old value and updates it
    PartialDef,
    /// Formal parameter of a function or lambda
    Param,
    /// `global` / `persistent` declaration
    Declaration,
    /// Name of a function declaration
    FunctionName,
}

impl OccurrenceKind {
    pub fn is_definition(self) -> bool {
        !matches!(self, OccurrenceKind::Use | OccurrenceKind::FunctionName)
    }
}

/// One identifier occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub id: NodeId,
    pub name: String,
    pub line: Line,
    pub scope: ScopeId,
    pub kind: OccurrenceKind,
    /// Used as the target of `name(args)` or `name{args}`
    pub index_target: bool,
    /// The indexing uses syntax only arrays accept (`end`, a bare `:`, cell braces)
    pub array_syntax: bool,
    pub role: Role,
}

/// Summary of one scope
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// Function name, `None` for the script scope
    pub name: Option<String>,
    pub line: Line,
    pub variables: BTreeSet<String>,
    pub functions: BTreeSet<String>,
    pub globals: BTreeSet<String>,
    pub persistents: BTreeSet<String>,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeKind, name: Option<String>, line: Line) -> Self {
        Self {
            id,
            kind,
            name,
            line,
            variables: BTreeSet::new(),
            functions: BTreeSet::new(),
            globals: BTreeSet::new(),
            persistents: BTreeSet::new(),
        }
    }
}

/// Symbol table built by resolution
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    occurrences: BTreeMap<NodeId, Occurrence>,
    declared_functions: BTreeSet<String>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// The script scope always exists and has id 0
    pub const SCRIPT: ScopeId = 0;

    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(Self::SCRIPT, ScopeKind::Script, None, 1)],
            occurrences: BTreeMap::new(),
            declared_functions: BTreeSet::new(),
        }
    }

    pub fn push_scope(&mut self, kind: ScopeKind, name: Option<String>, line: Line) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope::new(id, kind, name, line));
        id
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes.get_mut(id)
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn script_scope(&self) -> &Scope {
        &self.scopes[Self::SCRIPT]
    }

    /// Look up the scope of a function declared in the file
    pub fn function_scope(&self, name: &str) -> Option<&Scope> {
        self.scopes
            .iter()
            .find(|s| s.kind == ScopeKind::Function && s.name.as_deref() == Some(name))
    }

    pub fn declare_function(&mut self, name: impl Into<String>) {
        self.declared_functions.insert(name.into());
    }

    pub fn is_declared_function(&self, name: &str) -> bool {
        self.declared_functions.contains(name)
    }

    /// Record an occurrence the first time it is seen; loop bodies are walked more than once
    pub fn record(&mut self, occurrence: Occurrence) {
        self.occurrences.entry(occurrence.id).or_insert(occurrence);
    }

    pub fn occurrence(&self, id: NodeId) -> Option<&Occurrence> {
        self.occurrences.get(&id)
    }

    pub fn occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.values()
    }

    pub(crate) fn occurrences_mut(&mut self) -> impl Iterator<Item = &mut Occurrence> {
        self.occurrences.values_mut()
    }

    /// Resolved role of an occurrence, `Unknown` if it was never recorded
    pub fn role_of(&self, id: NodeId) -> Role {
        self.occurrences.get(&id).map_or(Role::Unknown, |o| o.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrence(id: u32, name: &str, kind: OccurrenceKind) -> Occurrence {
        Occurrence {
            id: NodeId(id),
            name: name.to_string(),
            line: 1,
            scope: SymbolTable::SCRIPT,
            kind,
            index_target: false,
            array_syntax: false,
            role: Role::Unknown,
        }
    }

    #[test]
    fn script_scope_exists() {
        let table = SymbolTable::new();
        assert_eq!(table.scopes().len(), 1);
        assert_eq!(table.script_scope().kind, ScopeKind::Script);
    }

    #[test]
    fn function_scope_lookup() {
        let mut table = SymbolTable::new();
        let id = table.push_scope(ScopeKind::Function, Some("f".to_string()), 4);
        assert_eq!(table.function_scope("f").map(|s| s.id), Some(id));
        assert!(table.function_scope("g").is_none());
    }

    #[test]
    fn record_keeps_first_entry() {
        let mut table = SymbolTable::new();
        table.record(occurrence(1, "x", OccurrenceKind::Def));
        table.record(occurrence(1, "y", OccurrenceKind::Use));
        assert_eq!(table.occurrence(NodeId(1)).map(|o| o.name.as_str()), Some("x"));
        assert_eq!(table.role_of(NodeId(2)), Role::Unknown);
    }

    #[test]
    fn definition_kinds() {
        assert!(OccurrenceKind::Param.is_definition());
        assert!(OccurrenceKind::PartialDef.is_definition());
        assert!(!OccurrenceKind::Use.is_definition());
        assert!(!OccurrenceKind::FunctionName.is_definition());
    }
}
