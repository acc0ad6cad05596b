//! Arena nodes of the bounding volume hierarchy
//!
//! Nodes live in a single `Vec` owned by [`BvhTree`](crate::BvhTree) and
//! refer to each other by [`NodeId`]. Parent links are plain ids used to walk
//! upward during insertion; dropping the tree drops the arena in one go.

use void_math::AABB;

use crate::element::ElementId;

/// Index of a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Leaf wrapping exactly one element and its cached bounds
#[derive(Clone, Debug)]
pub struct Leaf {
    pub element: ElementId,
    /// Element bounds captured at insertion; assumed static afterwards
    pub bounds: AABB,
    pub parent: Option<NodeId>,
}

/// Binary node whose bounds cover both children
#[derive(Clone, Debug)]
pub struct InternalNode {
    pub left: NodeId,
    pub right: NodeId,
    pub bounds: AABB,
    pub parent: Option<NodeId>,
}

impl InternalNode {
    /// Swap `old` for `new` in whichever slot holds it
    #[inline]
    pub(crate) fn replace_child(&mut self, old: NodeId, new: NodeId) {
        if self.left == old {
            self.left = new;
        } else {
            debug_assert_eq!(self.right, old, "replaced node is not a child");
            self.right = new;
        }
    }
}

/// Tree node: a leaf or an internal node
#[derive(Clone, Debug)]
pub enum Node {
    Leaf(Leaf),
    Internal(InternalNode),
}

impl Node {
    #[inline]
    pub fn bounds(&self) -> AABB {
        match self {
            Node::Leaf(leaf) => leaf.bounds,
            Node::Internal(node) => node.bounds,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Leaf(leaf) => leaf.parent,
            Node::Internal(node) => node.parent,
        }
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Leaf(leaf) => leaf.parent = parent,
            Node::Internal(node) => node.parent = parent,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}
