//! A k-d tree over cell bounding boxes.
//!
//! Built once per source mesh by recursive median splits on box centers,
//! alternating the split axis with depth. Each node carries the union box of
//! its subtree, so a range query prunes whole subtrees whose union does not
//! touch the query box. Expected query cost is logarithmic for meshes with
//! bounded overlap.

use crate::geometry::Point;

use super::bbox::Aabb;

/// Leaf bucket size; below this a node stores its items directly.
const LEAF_SIZE: usize = 8;

struct Node<P: Point> {
    /// Union of every box in this subtree.
    bbox: Aabb<P>,
    kind: NodeKind<P>,
}

enum NodeKind<P: Point> {
    Leaf { items: Vec<u32> },
    Split { left: Box<Node<P>>, right: Box<Node<P>> },
}

/// A static k-d tree over indexed bounding boxes.
pub struct KdTree<P: Point> {
    boxes: Vec<Aabb<P>>,
    root: Option<Node<P>>,
}

impl<P: Point> KdTree<P> {
    /// Build a tree over `boxes`; item `i` of the input keeps index `i`.
    pub fn build(boxes: Vec<Aabb<P>>) -> Self {
        if boxes.is_empty() {
            return Self { boxes, root: None };
        }
        let mut order: Vec<u32> = (0..boxes.len() as u32).collect();
        let root = build_node(&boxes, &mut order, 0);
        Self {
            boxes,
            root: Some(root),
        }
    }

    /// Number of indexed boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether the tree indexes nothing.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// All item indices whose box overlaps `query` (closed-interval test),
    /// in ascending index order.
    pub fn query(&self, query: &Aabb<P>) -> Vec<usize> {
        let mut hits = Vec::new();
        if let Some(root) = &self.root {
            collect(&self.boxes, root, query, &mut hits);
        }
        // The fixed ascending order is the start of the determinism
        // contract: downstream accumulation order must not depend on tree
        // shape.
        hits.sort_unstable();
        hits
    }
}

fn build_node<P: Point>(boxes: &[Aabb<P>], order: &mut [u32], depth: usize) -> Node<P> {
    let mut bbox = boxes[order[0] as usize];
    for &i in order[1..].iter() {
        bbox = bbox.union(&boxes[i as usize]);
    }
    if order.len() <= LEAF_SIZE {
        return Node {
            bbox,
            kind: NodeKind::Leaf {
                items: order.to_vec(),
            },
        };
    }

    let axis = depth % P::DIM;
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        let ca = boxes[a as usize].center().coord(axis);
        let cb = boxes[b as usize].center().coord(axis);
        ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
    });
    let (lo, hi) = order.split_at_mut(mid);
    Node {
        bbox,
        kind: NodeKind::Split {
            left: Box::new(build_node(boxes, lo, depth + 1)),
            right: Box::new(build_node(boxes, hi, depth + 1)),
        },
    }
}

fn collect<P: Point>(boxes: &[Aabb<P>], node: &Node<P>, query: &Aabb<P>, hits: &mut Vec<usize>) {
    if !node.bbox.overlaps(query) {
        return;
    }
    match &node.kind {
        NodeKind::Leaf { items } => {
            for &i in items {
                if boxes[i as usize].overlaps(query) {
                    hits.push(i as usize);
                }
            }
        }
        NodeKind::Split { left, right } => {
            collect(boxes, left, query, hits);
            collect(boxes, right, query, hits);
        }
    }
}
