//! Find the K nearest points to a query position, sorted by distance.
use kdindex::prelude::*;

fn main() {
    let points = [
        Point::new([0.0, 0.0], []),
        Point::new([2.5, 2.5], []),
        Point::new([4.5, 4.5], []),
        Point::new([6.5, 6.5], []),
    ];
    let tree = KdTree::build(&points, &BuildPolicy::default()).expect("valid policy");

    let mut policy = QueryPolicy::new().sort_by_distance(true);
    let neighbors = tree.nearest_k(&[2.6, 2.6], 2, &mut policy).expect("k fits policy");
    for n in neighbors {
        println!(
            "{:?} at squared distance {}",
            tree.point(n.slot).position,
            n.dist_sq
        );
    }
}
