//! Attach an opaque payload to each point and read it back from a query hit.
use kdindex::prelude::*;

fn main() {
    // Each point carries a 4-byte record id the index never looks at.
    let points: Vec<Point<2, 4>> = [(101u32, [0.0, 0.0]), (202, [5.0, 5.0]), (303, [9.0, 1.0])]
        .into_iter()
        .map(|(id, position)| Point::new(position, id.to_le_bytes()))
        .collect();
    let tree = KdTree::build(&points, &BuildPolicy::default()).expect("valid policy");

    let hit = tree.nearest(&[4.0, 4.0]).expect("tree is not empty");
    let id = u32::from_le_bytes(tree.point(hit.slot).payload);
    println!(
        "nearest to (4, 4) is record {id} at {:?}",
        tree.point(hit.slot).position
    );
}
