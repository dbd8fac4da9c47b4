//! Find the single nearest point to a query position.
use kdindex::prelude::*;

fn main() {
    let points = [
        Point::new([0.0, 0.0], []),
        Point::new([10.0, 0.0], []),
        Point::new([0.0, 10.0], []),
        Point::new([10.0, 10.0], []),
    ];
    let tree = KdTree::build(&points, &BuildPolicy::default()).expect("valid policy");

    let hit = tree.nearest(&[1.0, 1.0]).expect("tree is not empty");
    println!(
        "nearest to (1, 1): {:?} at squared distance {}",
        tree.point(hit.slot).position,
        hit.dist_sq
    );
}
