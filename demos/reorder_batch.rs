//! Reorder a query batch by tree locality before answering it.
use kdindex::prelude::*;

fn main() {
    let points: Vec<Point<2, 0>> = (0..1000)
        .map(|i| Point::new([f64::from(i % 100), f64::from(i / 100)], []))
        .collect();
    let policy = BuildPolicy {
        bucket_size: 8,
        ..BuildPolicy::default()
    };
    let tree = KdTree::build(&points, &policy).expect("valid policy");

    let queries = [[90.0, 5.0], [1.0, 1.0], [89.5, 4.5], [2.0, 0.5]];
    let mut order = tree.order_for_locality(&queries);
    order.sort_by_key(|&(index, key)| (key, index));

    println!("processing order (queries near the same leaves run together):");
    for (index, key) in order {
        let hit = tree.nearest(&queries[index]).expect("tree is not empty");
        println!(
            "  query #{index} {:?} -> leaf {key}, nearest {:?}",
            queries[index],
            tree.point(hit.slot).position
        );
    }
}
