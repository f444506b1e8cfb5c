//! Node arena for one search.
//!
//! The root is always slot 0. Moving the root down the tree copies the kept
//! subtree into a fresh arena instead of leaving dead slots behind.

use std::collections::VecDeque;
use std::hash::Hash;

use crate::node::{Node, NodeId, NodeStats};

/// Flat storage for every node of a search tree.
#[derive(Debug)]
pub struct Tree<A: Clone + Copy + Eq + Hash> {
    nodes: Vec<Node<A>>,
}

impl<A: Clone + Copy + Eq + Hash> Tree<A> {
    /// A tree holding only an unexpanded root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    /// # Panics
    /// Panics if `id` did not come from this tree.
    pub fn get(&self, id: NodeId) -> &Node<A> {
        &self.nodes[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<A> {
        &mut self.nodes[id.0]
    }

    /// Append `node`; the caller links it to its parent.
    pub(crate) fn add(&mut self, node: Node<A>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Drop everything but a fresh root. Keeps the allocation.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::root());
    }

    /// Make `new_root` the root, keeping its whole subtree and dropping
    /// every other node.
    ///
    /// Kept nodes are renumbered breadth-first, so the new root lands at
    /// index 0 and children keep their order.
    pub(crate) fn retain_subtree(&mut self, new_root: NodeId) {
        let mut old: Vec<Option<Node<A>>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut kept = Vec::new();
        let mut queue = VecDeque::from([new_root]);

        while let Some(old_id) = queue.pop_front() {
            let mut node = old[old_id.0]
                .take()
                .expect("BUG: node reachable from two parents");
            // A child queued now is popped after everything already queued
            for (_, child) in node.children.iter_mut() {
                queue.push_back(*child);
                *child = NodeId(kept.len() + queue.len());
            }
            kept.push(node);
        }

        kept[0].action = None;
        self.nodes = kept;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree owns at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &Node<A> {
        self.get(NodeId::ROOT)
    }

    /// Children of a node with their statistics, in action order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (A, &NodeStats)> + '_ {
        self.get(id)
            .children
            .iter()
            .map(move |(action, child)| (*action, &self.get(*child).stats))
    }

    /// Every node in arena order, root first.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<A>)> + '_ {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }
}

impl<A: Clone + Copy + Eq + Hash> Default for Tree<A> {
    fn default() -> Self {
        Self::new()
    }
}
