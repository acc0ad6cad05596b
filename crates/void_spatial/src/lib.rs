//! # void_spatial - Ray-Query Spatial Index
//!
//! A build-once bounding volume hierarchy answering "what does this ray hit
//! first?" for picking, line-of-sight and occlusion tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               RaycastIndex<E>                │
//! │  Empty ─open─▶ Open ─close─▶ Closed          │
//! │  ┌──────────────┐   ┌──────────────────────┐ │
//! │  │ staged E's   │──▶│ BvhTree (node arena) │ │
//! │  └──────────────┘   └──────────────────────┘ │
//! └──────────────────────────────────────────────┘
//!          │ Element trait
//!    ┌─────┴──────┐
//!    ▼            ▼
//! Triangle     Cuboid      (or any caller type / handle)
//! ```
//!
//! Elements are inserted one at a time in randomized order; see [`tree`]
//! for the insertion algorithm.
//!
//! # Example
//!
//! ```
//! use void_spatial::prelude::*;
//!
//! let mut index = RaycastIndex::with_config(IndexConfig::deterministic(42));
//! index.open()?;
//! index.add(Cuboid::from_center_size(Vec3::ZERO, Vec3::ONE))?;
//! index.add(Cuboid::from_center_size(Vec3::new(10.0, 0.0, 0.0), Vec3::ONE))?;
//! index.close()?;
//!
//! // Self-contained query
//! let ray = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X);
//! let hit = index.cast_ray(&ray, 5.0)?.expect("near cube is hit");
//! assert!((hit.distance - 0.5).abs() < 1e-5);
//! assert_eq!(index.hit_normal(&hit)?, Vec3::NEG_X);
//!
//! // Two-call form with the remembered hit
//! if index.vector_intersect(Vec3::new(-1.0, 0.0, 0.0), Vec3::X, 5.0)? {
//!     let normal = index.normal(Vec3::new(-0.5, 0.0, 0.0))?;
//!     assert_eq!(normal, Vec3::NEG_X);
//! }
//! # Ok::<(), void_spatial::SpatialError>(())
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod index;
pub mod node;
pub mod shapes;
pub mod tree;

pub use config::{IndexConfig, InsertPolicy};
pub use element::{Element, ElementId};
pub use error::{Result, SpatialError};
pub use index::{HitResult, IndexState, IndexStats, RaycastIndex};
pub use node::{InternalNode, Leaf, Node, NodeId};
pub use shapes::{Cuboid, Triangle};
pub use tree::{BvhTree, SnapshotNode, TreeSnapshot};

pub mod prelude {
    //! Common imports for ray queries
    pub use crate::config::{IndexConfig, InsertPolicy};
    pub use crate::element::{Element, ElementId};
    pub use crate::error::{Result, SpatialError};
    pub use crate::index::{HitResult, IndexState, RaycastIndex};
    pub use crate::shapes::{Cuboid, Triangle};
    pub use void_math::{Ray, Vec3, AABB};
}
