//! Integration tests for the ray-query index
//!
//! Covers:
//! - Tree invariants (containment, leaf count, bounds stability)
//! - Reproducible shapes under a pinned seed, seed-independent query results
//! - Nearest-hit selection, empty index, random scatter, stale hit cache

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use void_spatial::prelude::*;
use void_spatial::{BvhTree, Node, NodeId};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 1000 disjoint unit cubes, one per cell of a 10x10x10 grid with jitter
fn scatter_cubes(seed: u64) -> Vec<Cuboid> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cubes = Vec::with_capacity(1000);
    for i in 0..10 {
        for j in 0..10 {
            for k in 0..10 {
                let jitter = Vec3::new(
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(-0.5..0.5),
                );
                let center = Vec3::new(i as f32, j as f32, k as f32) * 3.0 + jitter;
                cubes.push(Cuboid::from_center_size(center, Vec3::ONE));
            }
        }
    }
    cubes
}

fn build<E: Element>(seed: u64, elements: impl IntoIterator<Item = E>) -> RaycastIndex<E> {
    let mut index = RaycastIndex::with_config(IndexConfig::deterministic(seed));
    index.open().expect("fresh index opens");
    index.add_many(elements).expect("open index accepts elements");
    index.close().expect("open index closes");
    index
}

/// Union of all leaf bounds below `id`, asserting containment on the way up
fn check_containment(tree: &BvhTree, id: NodeId) -> AABB {
    match tree.node(id).expect("node exists") {
        Node::Leaf(leaf) => leaf.bounds,
        Node::Internal(node) => {
            let below = check_containment(tree, node.left).union(&check_containment(tree, node.right));
            assert!(node.bounds.contains_aabb(&below), "node {:?} does not contain its descendants", id);
            below
        }
    }
}

// ============================================================================
// Tree invariants
// ============================================================================

#[test]
fn test_containment_and_count_invariants() {
    init_logging();
    let cubes = scatter_cubes(11);

    for seed in [1, 2, 3] {
        let index = build(seed, cubes.iter());
        let tree = index.tree();

        let root = tree.root().expect("non-empty tree has a root");
        let all = check_containment(tree, root);
        assert_eq!(all, tree.root_bounds());
        assert!(tree.is_consistent());

        assert_eq!(tree.leaf_count(), cubes.len());
        assert_eq!(tree.node_count(), 2 * cubes.len() - 1);
    }
}

#[test]
fn test_bounds_are_stable_across_queries() {
    let mut index = build(5, scatter_cubes(3));
    let before = index.bounds().unwrap();

    for i in 0..20 {
        let origin = Vec3::new(-5.0, i as f32, 1.0);
        index.vector_intersect(origin, Vec3::X, 100.0).unwrap();
        let _ = index.cast_ray(&Ray::new(origin, Vec3::Y), 100.0).unwrap();
    }

    assert_eq!(index.bounds().unwrap(), before);
    assert_eq!(index.bounds().unwrap(), index.bounds().unwrap());
}

#[test]
fn test_shuffle_keeps_sorted_input_shallow() {
    init_logging();
    let sorted: Vec<Cuboid> = (0..1000)
        .map(|i| Cuboid::from_center_size(Vec3::new(i as f32 * 2.0, 0.0, 0.0), Vec3::ONE))
        .collect();

    let shuffled = build(9, sorted.iter());
    let in_order = RaycastIndex::build(IndexConfig::deterministic(9).without_shuffle(), sorted.iter());

    let shallow = shuffled.stats().depth;
    let deep = in_order.stats().depth;
    assert!(shallow < 200, "shuffled depth {}", shallow);
    assert!(deep >= 500, "in-order depth {}", deep);
    assert!(in_order.tree().is_consistent());
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_pinned_seed_reproduces_tree_shape() {
    let cubes = scatter_cubes(21);
    let a = build(1234, cubes.iter());
    let b = build(1234, cubes.iter());
    assert_eq!(a.tree().snapshot(), b.tree().snapshot());

    for policy in [InsertPolicy::LeastGrowth, InsertPolicy::SmallerArea] {
        let config = IndexConfig::deterministic(99).with_policy(policy);
        let a = RaycastIndex::build(config.clone(), cubes.iter());
        let b = RaycastIndex::build(config, cubes.iter());
        assert_eq!(a.tree().snapshot(), b.tree().snapshot());
    }
}

#[test]
fn test_query_results_do_not_depend_on_seed() {
    let cubes = scatter_cubes(8);
    let indices: Vec<_> = [1, 2, 3, 4].iter().map(|&seed| build(seed, cubes.iter())).collect();
    assert_ne!(indices[0].tree().snapshot(), indices[1].tree().snapshot());

    let mut rng = StdRng::seed_from_u64(77);
    let mut hits = 0;
    for _ in 0..300 {
        let origin = Vec3::new(
            rng.gen_range(-5.0..32.0),
            rng.gen_range(-5.0..32.0),
            rng.gen_range(-5.0..32.0),
        );
        let direction = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let ray = Ray::new(origin, direction);

        let reference = indices[0].cast_ray(&ray, 50.0).unwrap();
        for index in &indices[1..] {
            let other = index.cast_ray(&ray, 50.0).unwrap();
            match (reference, other) {
                (Some(a), Some(b)) => {
                    assert_eq!(a.element, b.element);
                    assert_relative_eq!(a.distance, b.distance);
                    assert_eq!(indices[0].hit_normal(&a).unwrap(), index.hit_normal(&b).unwrap());
                    assert_eq!(indices[0].hit_uv(&a).unwrap(), index.hit_uv(&b).unwrap());
                }
                (None, None) => {}
                (a, b) => panic!("seed-dependent result for {:?}: {:?} vs {:?}", ray, a, b),
            }
        }
        hits += reference.is_some() as usize;
    }
    assert!(hits > 0, "fixture should produce some hits");
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_nearest_hit_selection() {
    init_logging();
    let near = Cuboid::from_center_size(Vec3::ZERO, Vec3::ONE);
    let far = Cuboid::from_center_size(Vec3::new(10.0, 0.0, 0.0), Vec3::ONE);

    for seed in 0..8 {
        let mut index = build(seed, [near, far]);

        assert!(index.vector_intersect(Vec3::new(-1.0, 0.0, 0.0), Vec3::X, 5.0).unwrap());
        let hit = *index.last_hit().unwrap();
        assert_eq!(hit.element.index(), 0);
        assert_relative_eq!(hit.distance, 0.5, epsilon = 1e-5);

        // Origin one unit in front of the near face
        let hit = index
            .cast_ray(&Ray::new(Vec3::new(-1.5, 0.0, 0.0), Vec3::X), 5.0)
            .unwrap()
            .unwrap();
        assert_eq!(hit.element.index(), 0);
        assert_relative_eq!(hit.distance, 1.0, epsilon = 1e-5);

        // Past the near cube, the far face sits at 5.5 and is out of range
        let past_near = Ray::new(Vec3::new(4.0, 0.0, 0.0), Vec3::X);
        assert!(index.cast_ray(&past_near, 5.0).unwrap().is_none());
        let hit = index.cast_ray(&past_near, 6.0).unwrap().unwrap();
        assert_eq!(hit.element.index(), 1);
    }
}

#[test]
fn test_empty_index() {
    let mut index: RaycastIndex<Triangle> = RaycastIndex::new();
    index.open().unwrap();
    index.close().unwrap();

    assert_eq!(index.bounds().unwrap(), AABB::EMPTY);
    assert!(index.bounds().unwrap().is_empty());
    assert!(!index.vector_intersect(Vec3::ZERO, Vec3::X, f32::MAX).unwrap());
    assert!(!index.occluded(&Ray::new(Vec3::ZERO, Vec3::Y), f32::MAX).unwrap());
    assert!(index.query_aabb(&AABB::new(Vec3::splat(-1.0), Vec3::ONE)).unwrap().is_empty());
    assert_eq!(index.stats().node_count, 0);
}

#[test]
fn test_random_scatter_face_hits() {
    init_logging();
    let cubes = scatter_cubes(2024);
    let triangles: Vec<Triangle> = cubes.iter().flat_map(|c| c.to_triangles()).collect();
    let mut index = build(7, triangles);
    assert_eq!(index.tree().leaf_count(), 12_000);

    let faces = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
    let mut rng = StdRng::seed_from_u64(4);

    for round in 0..60 {
        let target = cubes[rng.gen_range(0..cubes.len())];
        let normal = faces[round % faces.len()];
        let center = target.bounds.center();

        // Start 0.25 outside the face, off-center so the ray misses the diagonal
        let lateral = Vec3::new(0.13, -0.21, 0.17) * (Vec3::ONE - normal.abs());
        let origin = center + normal * 0.75 + lateral;

        assert!(index.vector_intersect(origin, -normal, 100.0).unwrap());
        let hit = *index.last_hit().unwrap();
        assert_relative_eq!(hit.distance, 0.25, epsilon = 1e-4);
        assert!(target.bounds.contains_aabb(&index.element(hit.element).unwrap().bounds()));

        let n = index.normal(hit.point).unwrap();
        assert!((n - normal).length() < 1e-5, "expected {:?}, got {:?}", normal, n);
    }
}

#[test]
fn test_normal_without_hit_is_invalid_state() {
    let mut index = build(1, scatter_cubes(5));

    let err = index.normal(Vec3::ZERO).unwrap_err();
    assert!(err.is_invalid_state());
    assert!(index.uv(Vec3::ZERO).unwrap_err().is_invalid_state());

    // A miss leaves nothing to read either
    assert!(!index.vector_intersect(Vec3::splat(-100.0), Vec3::NEG_X, 10.0).unwrap());
    assert!(index.normal(Vec3::ZERO).unwrap_err().is_invalid_state());
}

#[test]
fn test_degenerate_rays_are_misses() {
    let mut index = build(3, scatter_cubes(6));
    assert!(!index.vector_intersect(Vec3::splat(1.0), Vec3::ZERO, 100.0).unwrap());
    assert!(!index.vector_intersect(Vec3::splat(-5.0), Vec3::X, 0.0).unwrap());
    assert!(!index.occluded(&Ray::new(Vec3::ZERO, Vec3::ZERO), 100.0).unwrap());
}

#[test]
fn test_closed_index_is_shared_across_threads() {
    let index = build(12, scatter_cubes(13));
    let expected: Vec<_> = (0..10)
        .map(|j| index.cast_ray(&Ray::new(Vec3::new(-5.0, j as f32 * 3.0, 0.0), Vec3::X), 100.0).unwrap())
        .collect();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for (j, want) in expected.iter().enumerate() {
                    let ray = Ray::new(Vec3::new(-5.0, j as f32 * 3.0, 0.0), Vec3::X);
                    assert_eq!(&index.cast_ray(&ray, 100.0).unwrap(), want);
                }
            });
        }
    });
}
