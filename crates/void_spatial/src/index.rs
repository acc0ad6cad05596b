//! Ray-query index: lifecycle, staging, and query surface
//!
//! ```text
//!   Empty ──open()──▶ Open ──close()──▶ Closed
//!                     │  ▲               │
//!                     └──┘ add/add_many  └─ queries
//! ```
//!
//! Elements are staged while `Open` and inserted in shuffled order on
//! `close()`. A closed index is immutable; build a new one to change the
//! element set.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use void_math::{Ray, Vec3, AABB};

use crate::config::IndexConfig;
use crate::element::{Element, ElementId};
use crate::error::{Result, SpatialError};
use crate::tree::BvhTree;

/// Lifecycle state of a [`RaycastIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexState {
    /// Created, not yet opened
    Empty,
    /// Accepting elements
    Open,
    /// Built and queryable
    Closed,
}

/// Nearest hit returned by a ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Element that was hit
    pub element: ElementId,
    /// Distance along the (normalized) ray
    pub distance: f32,
    /// World-space hit position
    pub point: Vec3,
}

/// Statistics for a built index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub element_count: usize,
    pub node_count: usize,
    pub depth: usize,
}

/// Build-once BVH over caller-provided elements
#[derive(Debug)]
pub struct RaycastIndex<E> {
    config: IndexConfig,
    state: IndexState,
    /// Staged elements, in the order they were added
    elements: Vec<E>,
    tree: BvhTree,
    /// Most recent `vector_intersect` hit
    last_hit: Option<HitResult>,
}

impl<E: Element> RaycastIndex<E> {
    /// Create an index with the default configuration
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: IndexConfig) -> Self {
        let tree = BvhTree::new(config.insert_policy);
        Self {
            config,
            state: IndexState::Empty,
            elements: Vec::new(),
            tree,
            last_hit: None,
        }
    }

    /// Build a closed index from `elements` in one call
    pub fn build(config: IndexConfig, elements: impl IntoIterator<Item = E>) -> Self {
        let mut index = Self::with_config(config);
        index.state = IndexState::Open;
        index.elements.extend(elements);
        index.finish();
        index
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn state(&self) -> IndexState {
        self.state
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start accepting elements. Only valid on a fresh index.
    pub fn open(&mut self) -> Result<()> {
        self.expect_state("open", IndexState::Empty)?;
        self.state = IndexState::Open;
        log::debug!("Opened raycast index");
        Ok(())
    }

    /// Stage one element
    pub fn add(&mut self, element: E) -> Result<ElementId> {
        self.expect_state("add", IndexState::Open)?;
        let id = ElementId(self.elements.len());
        self.elements.push(element);
        Ok(id)
    }

    /// Stage several elements, returning the id of the first one
    pub fn add_many(&mut self, elements: impl IntoIterator<Item = E>) -> Result<ElementId> {
        self.expect_state("add_many", IndexState::Open)?;
        let first = ElementId(self.elements.len());
        self.elements.extend(elements);
        Ok(first)
    }

    /// Build the tree from every staged element and seal the index
    pub fn close(&mut self) -> Result<()> {
        self.expect_state("close", IndexState::Open)?;
        self.finish();
        Ok(())
    }

    fn finish(&mut self) {
        let mut order: Vec<ElementId> = (0..self.elements.len()).map(ElementId).collect();

        if self.config.shuffle {
            let mut rng = match self.config.shuffle_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            order.shuffle(&mut rng);
        }

        let mut tree = BvhTree::with_capacity(self.config.insert_policy, order.len());
        for id in order {
            tree.insert(id, self.elements[id.0].bounds());
        }

        self.tree = tree;
        self.elements.shrink_to_fit();
        self.state = IndexState::Closed;

        log::debug!(
            "Closed raycast index: {} elements, {} nodes, depth {}",
            self.elements.len(),
            self.tree.node_count(),
            self.tree.depth()
        );
    }

    fn expect_state(&self, operation: &'static str, expected: IndexState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            log::warn!("Rejected `{}` on raycast index in state {:?}", operation, self.state);
            Err(SpatialError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    // ========================================================================
    // Self-contained queries
    // ========================================================================

    /// Nearest element hit by `ray` strictly closer than `max_distance`
    pub fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Result<Option<HitResult>> {
        self.expect_state("cast_ray", IndexState::Closed)?;

        let hit = self
            .tree
            .nearest_hit(ray, max_distance, |id, best| {
                self.elements[id.0].ray_intersect(ray, best)
            })
            .map(|(element, distance)| HitResult {
                element,
                distance,
                point: ray.at(distance),
            });

        log::trace!("Ray {:?} -> {:?}", ray, hit);
        Ok(hit)
    }

    /// Whether anything blocks `ray` before `max_distance`
    pub fn occluded(&self, ray: &Ray, max_distance: f32) -> Result<bool> {
        self.expect_state("occluded", IndexState::Closed)?;
        Ok(self
            .tree
            .any_hit(ray, max_distance, |id, best| {
                self.elements[id.0].ray_intersect(ray, best)
            })
            .is_some())
    }

    /// Elements whose bounds overlap `query`
    pub fn query_aabb(&self, query: &AABB) -> Result<Vec<ElementId>> {
        self.expect_state("query_aabb", IndexState::Closed)?;
        let mut results = Vec::new();
        self.tree.query_aabb(query, &mut results);
        Ok(results)
    }

    /// Surface normal at a hit
    pub fn hit_normal(&self, hit: &HitResult) -> Result<Vec3> {
        self.expect_state("hit_normal", IndexState::Closed)?;
        Ok(self.element(hit.element)?.normal_at(hit.point))
    }

    /// Texture coordinates at a hit
    pub fn hit_uv(&self, hit: &HitResult) -> Result<[f32; 2]> {
        self.expect_state("hit_uv", IndexState::Closed)?;
        Ok(self.element(hit.element)?.uv_at(hit.point))
    }

    /// Aggregate bounds of every element.
    ///
    /// An index closed with no elements returns [`AABB::EMPTY`].
    pub fn bounds(&self) -> Result<AABB> {
        self.expect_state("bounds", IndexState::Closed)?;
        Ok(self.tree.root_bounds())
    }

    // ========================================================================
    // Cached two-call queries
    // ========================================================================

    /// Ray query that remembers its hit for [`normal`](Self::normal) and
    /// [`uv`](Self::uv).
    ///
    /// `direction` need not be normalized; distances are measured along the
    /// normalized direction. Every call replaces the remembered hit, and a
    /// miss clears it.
    pub fn vector_intersect(&mut self, origin: Vec3, direction: Vec3, max_distance: f32) -> Result<bool> {
        self.last_hit = None;
        self.last_hit = self.cast_ray(&Ray::new(origin, direction), max_distance)?;
        Ok(self.last_hit.is_some())
    }

    /// The hit remembered by the last [`vector_intersect`](Self::vector_intersect)
    pub fn last_hit(&self) -> Option<&HitResult> {
        self.last_hit.as_ref()
    }

    /// Surface normal at `point` on the element from the last hit
    pub fn normal(&self, point: Vec3) -> Result<Vec3> {
        Ok(self.cached_element("normal")?.normal_at(point))
    }

    /// Texture coordinates at `point` on the element from the last hit
    pub fn uv(&self, point: Vec3) -> Result<[f32; 2]> {
        Ok(self.cached_element("uv")?.uv_at(point))
    }

    fn cached_element(&self, operation: &'static str) -> Result<&E> {
        self.expect_state(operation, IndexState::Closed)?;
        let hit = self.last_hit.ok_or(SpatialError::NoRecentHit { operation })?;
        self.element(hit.element)
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Indexed element by id
    pub fn element(&self, id: ElementId) -> Result<&E> {
        self.expect_state("element", IndexState::Closed)?;
        self.elements.get(id.0).ok_or(SpatialError::UnknownElement(id))
    }

    /// Number of elements staged or indexed
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The built tree. Empty until the index is closed.
    pub fn tree(&self) -> &BvhTree {
        &self.tree
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            element_count: self.elements.len(),
            node_count: self.tree.node_count(),
            depth: self.tree.depth(),
        }
    }
}

impl<E: Element> Default for RaycastIndex<E> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
