#[cfg(test)]
mod integration_tests {
    use crate::{BuildPolicy, KdTree, Point, QueryPolicy};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_square_corner_scenario() {
        // Four corners of a 10x10 square, query just inside the origin corner.
        let points = [
            Point::new([0.0, 0.0], []),
            Point::new([10.0, 0.0], []),
            Point::new([0.0, 10.0], []),
            Point::new([10.0, 10.0], []),
        ];
        let tree = KdTree::build(&points, &BuildPolicy::default()).unwrap();

        let hit = tree.nearest(&[1.0, 1.0]).unwrap();
        assert_eq!(tree.point(hit.slot).position, [0.0, 0.0]);
        assert_eq!(hit.dist_sq, 2.0);

        let mut policy = QueryPolicy::new().sort_by_distance(true);
        let neighbors = tree.nearest_k(&[1.0, 1.0], 2, &mut policy).unwrap();
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].dist_sq, 2.0);
        assert_eq!(neighbors[1].dist_sq, 82.0);
        // The second neighbor is one of the two adjacent corners.
        let second = tree.point(neighbors[1].slot).position;
        assert!(second == [10.0, 0.0] || second == [0.0, 10.0]);
    }

    #[test]
    fn test_build_query_reorder_rebuild_cycle() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut points: Vec<Point<2, 4>> = (0..2000u32)
            .map(|i| {
                Point::new(
                    [rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)],
                    i.to_le_bytes(),
                )
            })
            .collect();
        let policy = BuildPolicy {
            bucket_size: 8,
            ..BuildPolicy::default()
        };
        let mut tree = KdTree::build(&points, &policy).unwrap();
        assert_eq!(tree.len(), 2000);

        // A batch of queries, answered once in input order...
        let queries: Vec<[f64; 2]> = (0..200)
            .map(|_| [rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)])
            .collect();
        let mut query_policy = QueryPolicy::with_capacity(10).sort_by_distance(true);
        let in_order: Vec<Vec<f64>> = queries
            .iter()
            .map(|q| {
                tree.nearest_k(q, 10, &mut query_policy)
                    .unwrap()
                    .iter()
                    .map(|n| n.dist_sq)
                    .collect()
            })
            .collect();

        // ...and once in locality order. Per-query results are identical.
        let mut order = tree.order_for_locality(&queries);
        order.sort_by_key(|&(index, key)| (key, index));
        for &(index, _) in &order {
            let reordered: Vec<f64> = tree
                .nearest_k(&queries[index], 10, &mut query_policy)
                .unwrap()
                .iter()
                .map(|n| n.dist_sq)
                .collect();
            assert_eq!(reordered, in_order[index], "reordering changed a result");
        }

        // Rebuild in place with a shifted point set; old answers are gone.
        for point in &mut points {
            point.position[0] += 1000.0;
        }
        tree.construct(&points, &policy).unwrap();
        let hit = tree.nearest(&[50.0, 50.0]).unwrap();
        assert!(
            tree.point(hit.slot).position[0] >= 1000.0,
            "stale point leaked through the rebuild"
        );
        assert_eq!(tree.len(), 2000);
    }

    #[test]
    fn test_concurrent_queries() {
        let mut rng = StdRng::seed_from_u64(77);
        let points: Vec<Point<2, 0>> = (0..5000)
            .map(|_| {
                Point::new(
                    [rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)],
                    [],
                )
            })
            .collect();
        let tree = KdTree::build(&points, &BuildPolicy::default()).unwrap();

        // Each thread owns its policy; the tree itself is shared read-only.
        std::thread::scope(|scope| {
            for t in 0..4u64 {
                let tree = &tree;
                let worker = scope.spawn(move || {
                    let mut thread_rng = StdRng::seed_from_u64(t);
                    let mut policy = QueryPolicy::with_capacity(5);
                    for _ in 0..500 {
                        let query = [
                            thread_rng.random_range(0.0..100.0),
                            thread_rng.random_range(0.0..100.0),
                        ];
                        let single = tree.nearest(&query).unwrap();
                        let many = tree.nearest_k(&query, 5, &mut policy).unwrap();
                        let best = many
                            .iter()
                            .map(|n| n.dist_sq)
                            .fold(f64::INFINITY, f64::min);
                        assert_eq!(single.dist_sq, best);
                    }
                });
                drop(worker); // joined by the scope
            }
        });
    }
}
