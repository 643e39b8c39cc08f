//! Per-document node arena.
//!
//! Nodes are flattened into one `Vec` during a push/pop walk of the parser's
//! tree. Parents are stored as [`NodeId`]s, so the parent map is acyclic by
//! construction: a node can only point at something pushed before it.

use crate::config::NodeSelectionPolicy;
use groovyscope_api::{DocumentId, NodeId, NodeKind, Position, Range, SyntaxNode};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct IndexedNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub range: Range,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Frozen node index of one document.
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    document: DocumentId,
    nodes: Vec<IndexedNode>,
    class_nodes: Vec<NodeId>,
    /// Start position -> last node pushed at that position.
    tracker: BTreeMap<Position, NodeId>,
}

impl DocumentIndex {
    /// Index a whole tree in one walk.
    pub fn build(document: DocumentId, root: &SyntaxNode) -> Self {
        let mut builder = IndexBuilder::new(document);
        builder.walk(root);
        builder.finish()
    }

    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&IndexedNode> {
        self.nodes.first()
    }

    pub fn node(&self, id: NodeId) -> Option<&IndexedNode> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[IndexedNode] {
        &self.nodes
    }

    pub fn class_nodes(&self) -> impl Iterator<Item = &IndexedNode> {
        self.class_nodes.iter().filter_map(|id| self.node(*id))
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Walks the parent chain starting at `descendant` itself.
    pub fn contains(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let mut current = Some(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// Strict ancestors, innermost first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &IndexedNode> {
        std::iter::successors(self.parent_of(id), |cur| self.parent_of(*cur))
            .filter_map(|id| self.node(id))
    }

    pub fn enclosing_class(&self, id: NodeId) -> Option<&IndexedNode> {
        self.ancestors(id).find(|n| n.kind.is_type_declaration())
    }

    /// First child, i.e. the receiver of a member reference.
    pub fn first_child(&self, id: NodeId) -> Option<&IndexedNode> {
        self.node(id)
            .and_then(|n| n.children.first())
            .and_then(|c| self.node(*c))
    }

    /// Node reported by the position tracker: the latest-starting recorded
    /// node whose range covers `pos`.
    pub fn tracked_node_at(&self, pos: Position) -> Option<NodeId> {
        self.tracker
            .range(..=pos)
            .rev()
            .map(|(_, id)| *id)
            .find(|id| self.node(*id).is_some_and(|n| n.range.contains(pos)))
    }

    /// Deepest node containing `pos`, found by walking down from the root.
    pub fn narrowest_node_at(&self, pos: Position) -> Option<NodeId> {
        let mut current = self.root().filter(|r| r.range.contains(pos))?;
        loop {
            let next = current
                .children
                .iter()
                .filter_map(|c| self.node(*c))
                .find(|c| c.range.contains(pos));
            match next {
                Some(child) => current = child,
                None => return Some(current.id),
            }
        }
    }

    /// Node under the cursor.
    ///
    /// The tracker can answer with an enclosing container when no leaf was
    /// recorded at the exact position; under `PreferNarrower` a narrower node
    /// inside that container wins.
    pub fn select_node_at(&self, pos: Position, policy: NodeSelectionPolicy) -> Option<NodeId> {
        let tracked = self.tracked_node_at(pos);
        let narrow = self.narrowest_node_at(pos);
        match (tracked, narrow) {
            (Some(t), Some(n))
                if policy == NodeSelectionPolicy::PreferNarrower
                    && t != n
                    && self.node(t).is_some_and(|node| node.kind.is_container())
                    && self.contains(t, n) =>
            {
                Some(n)
            }
            (Some(t), _) => Some(t),
            (None, n) => n,
        }
    }
}

/// Traversal state used while a document is being indexed.
///
/// Owned by the compiling task; never shared.
pub struct IndexBuilder {
    document: DocumentId,
    nodes: Vec<IndexedNode>,
    class_nodes: Vec<NodeId>,
    tracker: BTreeMap<Position, NodeId>,
    stack: Vec<NodeId>,
}

impl IndexBuilder {
    pub fn new(document: DocumentId) -> Self {
        Self {
            document,
            nodes: Vec::new(),
            class_nodes: Vec::new(),
            tracker: BTreeMap::new(),
            stack: Vec::new(),
        }
    }

    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    /// Register `node`, parented to the current top of the stack, and make it
    /// the new top.
    pub fn push(&mut self, node: &SyntaxNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = self.stack.last().copied();
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }

        self.nodes.push(IndexedNode {
            id,
            kind: node.kind.clone(),
            range: node.range,
            parent,
            children: Vec::new(),
        });
        if node.kind.is_type_declaration() {
            self.class_nodes.push(id);
        }
        // Zero-width nodes are synthesized by the parser and carry no
        // usable position.
        if node.range.start() != node.range.end() {
            self.tracker.insert(node.range.start(), id);
        }

        self.stack.push(id);
        id
    }

    /// Drop the top of the stack. Popping an empty stack is a no-op.
    pub fn pop(&mut self) -> Option<NodeId> {
        self.stack.pop()
    }

    pub fn current(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn walk(&mut self, node: &SyntaxNode) {
        self.push(node);
        for child in &node.children {
            self.walk(child);
        }
        self.pop();
    }

    pub fn finish(self) -> DocumentIndex {
        DocumentIndex {
            document: self.document,
            nodes: self.nodes,
            class_nodes: self.class_nodes,
            tracker: self.tracker,
        }
    }
}
