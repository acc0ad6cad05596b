//! Incrementally built bounding volume hierarchy
//!
//! Leaves are added one at a time. Each insertion descends from the root
//! towards the cheaper child, splits the leaf it lands on into an internal
//! node holding {old leaf, new leaf}, then walks parent links back up to
//! grow ancestor bounds and find the (possibly new) root.
//!
//! No rotations are performed, so the shape depends on insertion order;
//! [`RaycastIndex`](crate::RaycastIndex) shuffles its input for that reason.

use void_math::{Ray, AABB};

use crate::config::InsertPolicy;
use crate::element::ElementId;
use crate::node::{InternalNode, Leaf, Node, NodeId};

/// Arena-backed binary BVH over element ids
#[derive(Clone, Debug, Default)]
pub struct BvhTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    policy: InsertPolicy,
}

impl BvhTree {
    /// Create an empty tree
    pub fn new(policy: InsertPolicy) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            policy,
        }
    }

    /// Create an empty tree sized for `elements` leaves
    pub fn with_capacity(policy: InsertPolicy, elements: usize) -> Self {
        Self {
            nodes: Vec::with_capacity((2 * elements).saturating_sub(1)),
            root: None,
            policy,
        }
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert a leaf for `element` with the given bounds. Returns the leaf id.
    pub fn insert(&mut self, element: ElementId, bounds: AABB) -> NodeId {
        let leaf = self.push(Node::Leaf(Leaf {
            element,
            bounds,
            parent: None,
        }));

        let Some(root) = self.root else {
            self.root = Some(leaf);
            return leaf;
        };

        // Descend to the leaf that will become the new leaf's sibling
        let mut target = root;
        while let Node::Internal(node) = &self.nodes[target.0] {
            target = self.choose_child(node, &bounds);
        }

        // Split it: old leaf and new leaf under a fresh internal node
        let old_parent = self.nodes[target.0].parent();
        let split_bounds = self.nodes[target.0].bounds().union(&bounds);
        let split = self.push(Node::Internal(InternalNode {
            left: target,
            right: leaf,
            bounds: split_bounds,
            parent: old_parent,
        }));
        self.nodes[target.0].set_parent(Some(split));
        self.nodes[leaf.0].set_parent(Some(split));

        if let Some(parent) = old_parent {
            if let Node::Internal(node) = &mut self.nodes[parent.0] {
                node.replace_child(target, split);
            }
        }

        // Grow every ancestor and relocate the root
        let mut top = split;
        while let Some(parent) = self.nodes[top.0].parent() {
            if let Node::Internal(node) = &mut self.nodes[parent.0] {
                node.bounds.grow_to_include(&bounds);
            }
            top = parent;
        }
        self.root = Some(top);

        leaf
    }

    fn choose_child(&self, node: &InternalNode, bounds: &AABB) -> NodeId {
        let left = self.nodes[node.left.0].bounds();
        let right = self.nodes[node.right.0].bounds();

        let go_left = match self.policy {
            InsertPolicy::LeastGrowth => {
                let grow_left = left.growth(bounds);
                let grow_right = right.growth(bounds);
                if grow_left == grow_right {
                    left.surface_area() <= right.surface_area()
                } else {
                    grow_left < grow_right
                }
            }
            InsertPolicy::SmallerArea => left.surface_area() <= right.surface_area(),
        };

        if go_left { node.left } else { node.right }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    // ========================================================================
    // Ray queries
    // ========================================================================

    /// Nearest accepted hit along `ray` closer than `max_distance`.
    ///
    /// `hit_test(element, best)` is asked for a distance strictly below the
    /// current best; the best distance shrinks with every accepted hit so
    /// subtrees behind it are pruned.
    pub fn nearest_hit<F>(&self, ray: &Ray, max_distance: f32, mut hit_test: F) -> Option<(ElementId, f32)>
    where
        F: FnMut(ElementId, f32) -> Option<f32>,
    {
        let mut best = max_distance;
        let mut found = None;

        self.traverse(ray, max_distance, |element, _| {
            if let Some(t) = hit_test(element, best) {
                if t < best {
                    best = t;
                    found = Some((element, t));
                }
            }
            (best, false)
        });

        found
    }

    /// First hit found closer than `max_distance`, in no particular order.
    ///
    /// Stops at the first accepted hit, which is all a visibility or
    /// occlusion test needs.
    pub fn any_hit<F>(&self, ray: &Ray, max_distance: f32, mut hit_test: F) -> Option<(ElementId, f32)>
    where
        F: FnMut(ElementId, f32) -> Option<f32>,
    {
        let mut found = None;

        self.traverse(ray, max_distance, |element, best| {
            match hit_test(element, best) {
                Some(t) if t < best => {
                    found = Some((element, t));
                    (t, true)
                }
                _ => (best, false),
            }
        });

        found
    }

    /// Front-to-back traversal with slab pruning.
    ///
    /// `visit(element, best)` returns the updated best distance and whether
    /// to stop.
    fn traverse<V>(&self, ray: &Ray, max_distance: f32, mut visit: V)
    where
        V: FnMut(ElementId, f32) -> (f32, bool),
    {
        let Some(root) = self.root else {
            return;
        };
        if !ray.is_valid() || max_distance.is_nan() || max_distance <= 0.0 {
            return;
        }

        let origin = ray.origin;
        let inv_dir = ray.inverse_direction();
        let mut best = max_distance;

        let Some(entry) = self.nodes[root.0].bounds().ray_slab(origin, inv_dir, best) else {
            return;
        };
        let mut stack = vec![(root, entry)];

        while let Some((id, entry)) = stack.pop() {
            // The best distance may have shrunk since this node was pushed
            if entry >= best {
                continue;
            }

            match &self.nodes[id.0] {
                Node::Leaf(leaf) => {
                    let (next_best, stop) = visit(leaf.element, best);
                    best = next_best;
                    if stop {
                        return;
                    }
                }
                Node::Internal(node) => {
                    let left = self.nodes[node.left.0].bounds().ray_slab(origin, inv_dir, best);
                    let right = self.nodes[node.right.0].bounds().ray_slab(origin, inv_dir, best);

                    // Push the farther child first so the nearer pops first
                    match (left, right) {
                        (Some(tl), Some(tr)) if tl <= tr => {
                            stack.push((node.right, tr));
                            stack.push((node.left, tl));
                        }
                        (Some(tl), Some(tr)) => {
                            stack.push((node.left, tl));
                            stack.push((node.right, tr));
                        }
                        (Some(tl), None) => stack.push((node.left, tl)),
                        (None, Some(tr)) => stack.push((node.right, tr)),
                        (None, None) => {}
                    }
                }
            }
        }
    }

    // ========================================================================
    // Box queries
    // ========================================================================

    /// Collect every element whose cached bounds overlap `query`
    pub fn query_aabb(&self, query: &AABB, results: &mut Vec<ElementId>) {
        let Some(root) = self.root else {
            return;
        };
        if query.is_empty() {
            return;
        }

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if !node.bounds().intersects(query) {
                continue;
            }
            match node {
                Node::Leaf(leaf) => results.push(leaf.element),
                Node::Internal(internal) => {
                    stack.push(internal.right);
                    stack.push(internal.left);
                }
            }
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Root node id, `None` while empty
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Aggregate bounds, or [`AABB::EMPTY`] for an empty tree
    pub fn root_bounds(&self) -> AABB {
        self.root.map_or(AABB::EMPTY, |root| self.nodes[root.0].bounds())
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Total nodes (leaves plus internal nodes)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty)
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };

        let mut deepest = 0;
        let mut stack = vec![(root, 1)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Node::Internal(node) = &self.nodes[id.0] {
                stack.push((node.left, depth + 1));
                stack.push((node.right, depth + 1));
            }
        }
        deepest
    }

    /// Structural check: every node reachable exactly once from the root,
    /// parent links agree with child links, and every internal node's bounds
    /// contain both children's bounds.
    pub fn is_consistent(&self) -> bool {
        let Some(root) = self.root else {
            return self.nodes.is_empty();
        };
        if self.nodes[root.0].parent().is_some() {
            return false;
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut visited[id.0], true) {
                return false;
            }
            if let Node::Internal(node) = &self.nodes[id.0] {
                for child in [node.left, node.right] {
                    let child_node = &self.nodes[child.0];
                    if child_node.parent() != Some(id) || !node.bounds.contains_aabb(&child_node.bounds()) {
                        return false;
                    }
                    stack.push(child);
                }
            }
        }

        visited.into_iter().all(|v| v)
    }

    /// Comparable description of the tree shape
    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            root: self.root.map(NodeId::index),
            nodes: self
                .nodes
                .iter()
                .map(|node| match node {
                    Node::Leaf(leaf) => SnapshotNode::Leaf {
                        element: leaf.element.index(),
                        bounds: leaf.bounds,
                    },
                    Node::Internal(internal) => SnapshotNode::Internal {
                        left: internal.left.index(),
                        right: internal.right.index(),
                        bounds: internal.bounds,
                    },
                })
                .collect(),
        }
    }
}

/// Plain-data copy of a tree's shape, for comparing builds
#[derive(Clone, Debug, PartialEq)]
pub struct TreeSnapshot {
    pub root: Option<usize>,
    pub nodes: Vec<SnapshotNode>,
}

/// Node entry of a [`TreeSnapshot`]
#[derive(Clone, Debug, PartialEq)]
pub enum SnapshotNode {
    Leaf { element: usize, bounds: AABB },
    Internal { left: usize, right: usize, bounds: AABB },
}

// ============================================================================
// Tests
// ============================================================================
