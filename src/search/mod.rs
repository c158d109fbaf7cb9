//! Spatial search: candidate source cells for each target cell.
//!
//! A [`SearchIndex`] is built once per source mesh from cell bounding boxes
//! organized in a k-d tree. Queries return a conservative superset of the
//! truly overlapping cells: false positives are expected and filtered by the
//! intersector, false negatives are a correctness bug.

mod bbox;
mod kdtree;

pub use bbox::Aabb;
pub use kdtree::KdTree;

use thiserror::Error;

use crate::geometry::Point;
use crate::mesh::RemapMesh;

/// Error type for search configuration failures.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No target cell found any candidate source cell: the meshes do not
    /// cover a common domain. Continuing would silently produce zero fields.
    #[error(
        "disjoint meshes: no candidate source cells found for any of the {n_target} target cells"
    )]
    DisjointDomains {
        /// Number of target cells probed.
        n_target: usize,
    },
    /// The source mesh has no cells to index.
    #[error("source mesh has no cells")]
    EmptySourceMesh,
}

/// Bounding-box index over the cells of a source mesh.
pub struct SearchIndex<P: Point> {
    tree: KdTree<P>,
}

impl<P: Point> SearchIndex<P> {
    /// Build the index from a source mesh.
    pub fn build<M: RemapMesh<Coord = P>>(source: &M) -> Result<Self, SearchError> {
        if source.n_cells() == 0 {
            return Err(SearchError::EmptySourceMesh);
        }
        let boxes: Vec<Aabb<P>> = (0..source.n_cells()).map(|c| source.cell_bbox(c)).collect();
        Ok(Self {
            tree: KdTree::build(boxes),
        })
    }

    /// Candidate source cells for a target bounding box, ascending order.
    ///
    /// Boxes touching only at a boundary are reported; the intersector
    /// verifies actual overlap.
    pub fn candidates(&self, target: &Aabb<P>) -> Vec<usize> {
        self.tree.query(target)
    }

    /// Candidate source cells within `radius` of `center` (bounding-sphere
    /// query used by the meshfree mode). The box query over-reports the
    /// sphere; kernel weights vanish outside the support anyway.
    pub fn candidates_within(&self, center: P, radius: f64) -> Vec<usize> {
        self.tree.query(&Aabb::from_point(center).inflated(radius))
    }

    /// Verify that the source and target domains overlap at all.
    ///
    /// An empty candidate list for *every* target cell signals a mesh
    /// mismatch and is a fatal configuration error, not a zero field.
    pub fn verify_coverage<M: RemapMesh<Coord = P>>(&self, target: &M) -> Result<(), SearchError> {
        let n_target = target.n_cells();
        for c in 0..n_target {
            if !self.candidates(&target.cell_bbox(c)).is_empty() {
                return Ok(());
            }
        }
        Err(SearchError::DisjointDomains { n_target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::CartesianMesh2D;

    #[test]
    fn test_candidates_superset() {
        // 4x4 source over [0,4]^2; target box [0.5,1.5]^2 truly overlaps
        // four source cells; the candidate set must contain them all.
        let source = CartesianMesh2D::new(4, 4, [0.0, 0.0], [1.0, 1.0]);
        let index = SearchIndex::build(&source).unwrap();
        let hits = index.candidates(&Aabb::new([0.5, 0.5], [1.5, 1.5]));
        for cell in [0, 1, 4, 5] {
            assert!(hits.contains(&cell));
        }
    }

    #[test]
    fn test_disjoint_domains_is_fatal() {
        let source = CartesianMesh2D::new(4, 4, [0.0, 0.0], [1.0, 1.0]);
        let target = CartesianMesh2D::new(4, 4, [100.0, 100.0], [1.0, 1.0]);
        let index = SearchIndex::build(&source).unwrap();
        assert!(matches!(
            index.verify_coverage(&target),
            Err(SearchError::DisjointDomains { n_target: 16 })
        ));
    }

    #[test]
    fn test_coverage_ok_for_overlapping() {
        let source = CartesianMesh2D::new(4, 4, [0.0, 0.0], [1.0, 1.0]);
        let target = CartesianMesh2D::new(2, 2, [3.5, 3.5], [1.0, 1.0]);
        let index = SearchIndex::build(&source).unwrap();
        assert!(index.verify_coverage(&target).is_ok());
    }

    #[test]
    fn test_radius_query() {
        let source = CartesianMesh2D::new(8, 8, [0.0, 0.0], [1.0, 1.0]);
        let index = SearchIndex::build(&source).unwrap();
        let hits = index.candidates_within([4.0, 4.0], 1.0);
        // Center sits on the corner shared by cells (3,3),(4,3),(3,4),(4,4).
        for cell in [27, 28, 35, 36] {
            assert!(hits.contains(&cell));
        }
    }
}
