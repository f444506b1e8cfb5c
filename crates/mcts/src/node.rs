//! Search tree nodes.
//!
//! Nodes live in a flat arena owned by [`crate::Tree`] and refer to each
//! other by [`NodeId`]; nothing holds a pointer into the arena.

use std::hash::Hash;

/// Handle to a node in the arena. Only meaningful for the tree that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Slot 0 always holds the root, including after a subtree is retained.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Visit statistics for the edge into a node.
///
/// `value_sum` is accumulated for the side to move at the node's own state,
/// so a parent reads it negated.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStats {
    pub visit_count: u32,
    pub value_sum: f32,
    /// Masked and renormalized prior from the parent's evaluation.
    pub prior: f32,
}

impl NodeStats {
    pub fn new(prior: f32) -> Self {
        Self {
            visit_count: 0,
            value_sum: 0.0,
            prior,
        }
    }

    /// Average backed-up value, 0.0 while unvisited.
    pub fn mean_value(&self) -> f32 {
        match self.visit_count {
            0 => 0.0,
            n => self.value_sum / n as f32,
        }
    }

    /// Q of this edge as seen by the parent's side to move.
    pub fn parent_q(&self) -> f32 {
        -self.mean_value()
    }

    /// Count one simulation that passed through this node.
    pub fn record(&mut self, value: f32) {
        self.visit_count += 1;
        self.value_sum += value;
    }
}

/// One position in the search tree.
#[derive(Clone, Debug)]
pub struct Node<A: Clone + Copy + Eq + Hash> {
    /// Move from the parent; None at the root.
    pub action: Option<A>,
    pub stats: NodeStats,
    /// `(action, child)` pairs, ascending by action index. Legal actions
    /// whose prior was zero have no entry.
    pub children: Vec<(A, NodeId)>,
    /// Set once the evaluator has been consulted for this position.
    pub expanded: bool,
    /// Exact result for a finished game, for the side to move.
    pub terminal_value: Option<f32>,
}

impl<A: Clone + Copy + Eq + Hash> Node<A> {
    pub fn new(action: Option<A>, prior: f32) -> Self {
        Self {
            action,
            stats: NodeStats::new(prior),
            children: Vec::new(),
            expanded: false,
            terminal_value: None,
        }
    }

    pub fn root() -> Self {
        Self::new(None, 1.0)
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal_value.is_some()
    }

    pub fn child(&self, action: A) -> Option<NodeId> {
        self.children
            .iter()
            .find_map(|&(a, id)| (a == action).then_some(id))
    }

    pub fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().map(|&(_, id)| id)
    }
}
