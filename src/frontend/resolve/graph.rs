//! Definition/use graph.
//!
//! Nodes live in a `petgraph` arena and are addressed by index, so loop back edges and self-reaching definitions
//! never create ownership cycles. An edge `def -> use` means the definition may reach the occurrence.

use std::collections::HashMap;

use mlpy_syntax::ast::NodeId;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::frontend::symbols::{OccurrenceKind, ScopeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefUseNode {
    /// An identifier occurrence in the tree
    Occurrence { id: NodeId, name: String, kind: OccurrenceKind },
    /// A binding every function scope starts with (`varargin`, `nargin`)
    Implicit { scope: ScopeId, name: String },
    /// Process-wide definition shared by every `global` declaration of a name
    Global { name: String },
    /// Per-scope definition behind a `persistent` declaration
    Persistent { scope: ScopeId, name: String },
}

impl DefUseNode {
    pub fn name(&self) -> &str {
        match self {
            DefUseNode::Occurrence { name, .. }
            | DefUseNode::Implicit { name, .. }
            | DefUseNode::Global { name }
            | DefUseNode::Persistent { name, .. } => name,
        }
    }
}

#[derive(Debug, Default)]
pub struct DefUseGraph {
    graph: DiGraph<DefUseNode, ()>,
    occurrences: HashMap<NodeId, NodeIndex>,
    implicit: HashMap<(ScopeId, String), NodeIndex>,
    globals: HashMap<String, NodeIndex>,
    persistents: HashMap<(ScopeId, String), NodeIndex>,
}

impl DefUseGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node for an occurrence, created on first visit
    pub fn occurrence(&mut self, id: NodeId, name: &str, kind: OccurrenceKind) -> NodeIndex {
        if let Some(&index) = self.occurrences.get(&id) {
            return index;
        }
        let index = self.graph.add_node(DefUseNode::Occurrence {
            id,
            name: name.to_string(),
            kind,
        });
        self.occurrences.insert(id, index);
        index
    }

    pub fn implicit(&mut self, scope: ScopeId, name: &str) -> NodeIndex {
        let graph = &mut self.graph;
        *self
            .implicit
            .entry((scope, name.to_string()))
            .or_insert_with(|| {
                graph.add_node(DefUseNode::Implicit {
                    scope,
                    name: name.to_string(),
                })
            })
    }

    pub fn global(&mut self, name: &str) -> NodeIndex {
        let graph = &mut self.graph;
        *self
            .globals
            .entry(name.to_string())
            .or_insert_with(|| graph.add_node(DefUseNode::Global { name: name.to_string() }))
    }

    pub fn persistent(&mut self, scope: ScopeId, name: &str) -> NodeIndex {
        let graph = &mut self.graph;
        *self
            .persistents
            .entry((scope, name.to_string()))
            .or_insert_with(|| {
                graph.add_node(DefUseNode::Persistent {
                    scope,
                    name: name.to_string(),
                })
            })
    }

    /// Add `def -> target` unless it already exists
    pub fn connect(&mut self, def: NodeIndex, target: NodeIndex) {
        self.graph.update_edge(def, target, ());
    }

    pub fn node_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.occurrences.get(&id).copied()
    }

    pub fn node(&self, index: NodeIndex) -> &DefUseNode {
        &self.graph[index]
    }

    /// True when at least one definition reaches the node
    pub fn is_reached(&self, index: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(index, Direction::Incoming)
            .next()
            .is_some()
    }

    /// Definitions reaching an occurrence
    pub fn reaching_definitions(&self, id: NodeId) -> Vec<&DefUseNode> {
        let Some(index) = self.node_of(id) else {
            return Vec::new();
        };
        let mut defs: Vec<_> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .collect();
        defs.sort();
        defs.into_iter().map(|d| &self.graph[d]).collect()
    }

    /// Occurrences a definition reaches
    pub fn reached_occurrences(&self, id: NodeId) -> Vec<NodeId> {
        let Some(index) = self.node_of(id) else {
            return Vec::new();
        };
        let mut uses: Vec<NodeId> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .filter_map(|n| match &self.graph[n] {
                DefUseNode::Occurrence { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        uses.sort();
        uses
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurrence_nodes_are_interned() {
        let mut graph = DefUseGraph::new();
        let a = graph.occurrence(NodeId(1), "x", OccurrenceKind::Def);
        let b = graph.occurrence(NodeId(1), "x", OccurrenceKind::Def);
        assert_eq!(a, b);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn connect_does_not_duplicate_edges() {
        let mut graph = DefUseGraph::new();
        let def = graph.occurrence(NodeId(1), "x", OccurrenceKind::Def);
        let target = graph.occurrence(NodeId(2), "x", OccurrenceKind::Use);
        graph.connect(def, target);
        graph.connect(def, target);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.is_reached(target));
        assert!(!graph.is_reached(def));
        assert_eq!(graph.reached_occurrences(NodeId(1)), vec![NodeId(2)]);
    }

    #[test]
    fn global_nodes_are_shared_across_scopes() {
        let mut graph = DefUseGraph::new();
        assert_eq!(graph.global("counter"), graph.global("counter"));
        assert_ne!(graph.persistent(1, "counter"), graph.persistent(2, "counter"));
        let counter = graph.global("counter");
        assert_eq!(graph.node(counter).name(), "counter");
    }
}
