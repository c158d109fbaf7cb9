//! The remap driver: search, intersect, reconstruct, and accumulate.
//!
//! A [`Remapper`] is built once per source/target mesh pair and reused for
//! any number of fields. Each target cell gathers its candidate source cells
//! from the search index, clips them exactly, integrates the source-side
//! polynomials over the overlaps, and divides by the overlapped measure.
//!
//! Determinism contract: candidate lists are ascending by source cell index
//! and each target cell accumulates its contributions in that order, so a
//! serial run, a thread-parallel run, and a partitioned run all perform the
//! per-cell floating-point sums in the same order and produce bit-identical
//! values.

use thiserror::Error;

use crate::geometry::{Moments, Point, MOMENT_EPS};
use crate::intersect::intersect;
use crate::mesh::RemapMesh;
use crate::reconstruct::reconstruct_field;
use crate::search::{SearchError, SearchIndex};
use crate::state::FieldValues;

/// Error type for remap setup and execution failures.
#[derive(Debug, Error)]
pub enum RemapError {
    /// Index construction or domain coverage failure.
    #[error("search setup failed: {0}")]
    Search(#[from] SearchError),
    /// A field does not match the source mesh it claims to live on.
    #[error("field covers {field} cells but the source mesh has {mesh}")]
    CellCountMismatch { field: usize, mesh: usize },
    /// Reconstruction order outside the supported 0..=2 range.
    #[error("unsupported reconstruction order {0}, expected 0, 1, or 2")]
    InvalidOrder(usize),
}

/// Result of remapping one field onto the target mesh.
#[derive(Clone, Debug)]
pub struct RemappedField {
    /// Remapped per-cell values, same representation as the input field.
    pub values: FieldValues,
    /// Fraction of each target cell's measure covered by source cells.
    ///
    /// 1.0 on interior cells of a matching domain; below 1.0 where the
    /// target sticks out past the source boundary; 0.0 for a cell the
    /// source does not reach at all.
    pub coverage: Vec<f64>,
}

/// A prepared source-to-target remap.
pub struct Remapper<'a, S, T>
where
    S: RemapMesh,
    T: RemapMesh<Coord = S::Coord>,
{
    source: &'a S,
    target: &'a T,
    index: SearchIndex<S::Coord>,
}

impl<'a, S, T> Remapper<'a, S, T>
where
    S: RemapMesh,
    T: RemapMesh<Coord = S::Coord>,
{
    /// Build the search index and verify the domains overlap.
    ///
    /// # Errors
    /// Fails if the source mesh is empty or if no target cell finds any
    /// candidate source cell (disjoint domains).
    pub fn new(source: &'a S, target: &'a T) -> Result<Self, RemapError> {
        let index = SearchIndex::build(source)?;
        index.verify_coverage(target)?;
        Ok(Self {
            source,
            target,
            index,
        })
    }

    /// Remap one field at the given reconstruction order.
    ///
    /// Uniform fields stay uniform; multi-material fields are remapped one
    /// material at a time and a target cell carries exactly the materials
    /// whose source cells reach it. Uncovered target cells get 0.0 in a
    /// uniform field (their coverage entry is 0.0) and no entry in a
    /// multi-material one.
    ///
    /// # Errors
    /// Fails if the field's cell count does not match the source mesh or
    /// the order is not 0, 1, or 2.
    pub fn remap_field(
        &self,
        field: &FieldValues,
        order: usize,
    ) -> Result<RemappedField, RemapError> {
        if order > 2 {
            return Err(RemapError::InvalidOrder(order));
        }
        if field.n_cells() != self.source.n_cells() {
            return Err(RemapError::CellCountMismatch {
                field: field.n_cells(),
                mesh: self.source.n_cells(),
            });
        }

        let coverage = self.coverage_fractions();
        let values = match field {
            FieldValues::Uniform(_) => {
                let slice = field.material_slice(crate::state::UNIFORM_MATERIAL);
                let out = self.remap_slice(&slice, order);
                FieldValues::Uniform(out.into_iter().map(|v| v.unwrap_or(0.0)).collect())
            }
            FieldValues::MultiMaterial(_) => {
                let n_target = self.target.n_cells();
                let mut cells: Vec<Vec<(u32, f64)>> = vec![Vec::new(); n_target];
                // Materials ascending, so per-cell pair lists stay sorted.
                for material in field.all_materials() {
                    let slice = field.material_slice(material);
                    let out = self.remap_slice(&slice, order);
                    for (cell, value) in out.into_iter().enumerate() {
                        if let Some(v) = value {
                            cells[cell].push((material, v));
                        }
                    }
                }
                FieldValues::MultiMaterial(cells)
            }
        };
        Ok(RemappedField { values, coverage })
    }

    /// Remap a single per-cell `Option` slice.
    ///
    /// This is the per-material core; `None` marks source cells without the
    /// material and target cells the material does not reach.
    pub fn remap_slice(&self, values: &[Option<f64>], order: usize) -> Vec<Option<f64>> {
        let with_second = order >= 2;
        let polys = reconstruct_field(self.source, values, order);

        let remap_cell = |t: usize| -> Option<f64> {
            let region_t = self.target.cell_region(t);
            let mut integral = 0.0;
            let mut measure = 0.0;
            let mut vmin = f64::INFINITY;
            let mut vmax = f64::NEG_INFINITY;
            // Candidates come back ascending; accumulation order is fixed.
            for s in self.index.candidates(&self.target.cell_bbox(t)) {
                let (Some(avg), Some(poly)) = (values[s], polys[s].as_ref()) else {
                    continue;
                };
                let m = intersect(
                    &self.source.cell_region(s),
                    &region_t,
                    with_second,
                    MOMENT_EPS,
                );
                if m.is_empty() {
                    continue;
                }
                integral += poly.integrate(self.source.cell_centroid(s).padded(), &m);
                measure += m.m0;
                vmin = vmin.min(avg);
                vmax = vmax.max(avg);
            }
            if measure <= 0.0 {
                return None;
            }
            // Higher-order tails can overshoot near steep fronts; clamping
            // to the contributing source averages keeps the remap
            // bound-preserving.
            Some((integral / measure).clamp(vmin, vmax))
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..self.target.n_cells())
                .into_par_iter()
                .map(remap_cell)
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..self.target.n_cells()).map(remap_cell).collect()
        }
    }

    /// Covered fraction of every target cell, independent of any field.
    pub fn coverage_fractions(&self) -> Vec<f64> {
        let cover_cell = |t: usize| -> f64 {
            let region_t = self.target.cell_region(t);
            let mut measure = 0.0;
            for s in self.index.candidates(&self.target.cell_bbox(t)) {
                let m: Moments =
                    intersect(&self.source.cell_region(s), &region_t, false, MOMENT_EPS);
                measure += m.m0;
            }
            let volume = self.target.cell_volume(t);
            if volume > 0.0 {
                measure / volume
            } else {
                0.0
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..self.target.n_cells())
                .into_par_iter()
                .map(cover_cell)
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..self.target.n_cells()).map(cover_cell).collect()
        }
    }
}
