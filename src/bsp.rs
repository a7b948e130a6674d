//! Split tree of a polyhedron: convex leaves under internal nodes that record
//! the plane cut separating their children.

use crate::face::Face;
use crate::mesh::PolygonId;
use slotmap::{SlotMap, new_key_type};
use tracing::debug;

new_key_type! {
    pub struct NodeId;
}

/// A node of the split tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A convex piece bounded by its faces.
    Leaf { faces: Vec<Face> },

    /// A piece cut in two; `separator` is the polygon both halves share.
    Split {
        front: NodeId,
        back: NodeId,
        separator: PolygonId,
    },

    /// A piece that has been clipped away.
    Empty,
}

impl Node {
    /// Faces of a leaf; nothing for other nodes.
    pub fn faces(&self) -> &[Face] {
        match self {
            Node::Leaf { faces } => faces,
            _ => &[],
        }
    }

    /// An explicit empty node, or a leaf with too few faces to enclose anything.
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Leaf { faces } => faces.len() < 4,
            Node::Split { .. } => false,
            Node::Empty => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl Tree {
    /// A tree with a single leaf.
    pub fn new(faces: Vec<Face>) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::Leaf { faces });
        Tree { nodes, root }
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Number of live nodes, whether leaves, splits or empty.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root piece has been clipped away entirely.
    pub fn is_clipped_away(&self) -> bool {
        self.nodes.get(self.root).is_none_or(Node::is_empty)
    }

    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        self.nodes.insert(node)
    }

    pub(crate) fn replace(&mut self, id: NodeId, node: Node) {
        if let Some(slot) = self.nodes.get_mut(id) {
            *slot = node;
        }
    }

    /// Non-empty leaves, front before back.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            match self.nodes.get(id) {
                Some(Node::Split { front, back, .. }) => {
                    stack.push(*back);
                    stack.push(*front);
                },
                Some(node) if !node.is_empty() => leaves.push(id),
                _ => {},
            }
        }
        leaves
    }

    pub fn make_empty(&mut self, id: NodeId) {
        self.replace(id, Node::Empty);
    }

    /// Collapse split nodes with an empty side into the other side.
    pub fn simplify(&mut self) {
        self.simplify_node(self.root);
    }

    /// Returns whether `id` is empty once simplified.
    fn simplify_node(&mut self, id: NodeId) -> bool {
        let (front, back) = match self.nodes.get(id) {
            Some(Node::Split { front, back, .. }) => (*front, *back),
            Some(node) => return node.is_empty(),
            None => return true,
        };

        let front_empty = self.simplify_node(front);
        let back_empty = self.simplify_node(back);
        match (front_empty, back_empty) {
            (true, true) => {
                self.nodes.remove(front);
                self.nodes.remove(back);
                self.replace(id, Node::Empty);
                debug!(?id, "both halves clipped away");
                true
            },
            (false, true) => {
                self.nodes.remove(back);
                if let Some(kept) = self.nodes.remove(front) {
                    self.replace(id, kept);
                }
                false
            },
            (true, false) => {
                self.nodes.remove(front);
                if let Some(kept) = self.nodes.remove(back) {
                    self.replace(id, kept);
                }
                false
            },
            (false, false) => false,
        }
    }
}
