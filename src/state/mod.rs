//! Field storage interface between the remap core and the state manager.
//!
//! Fields are read-only to the core during a pass and written once per
//! target cell at the end. A field is either uniform (one scalar per cell)
//! or multi-material (a sparse per-cell set of material scalars); the two
//! representations are a closed tagged union so every consumer dispatches by
//! exhaustive match.

use std::collections::BTreeMap;

/// Identifier of a material within a multi-material field.
pub type MaterialId = u32;

/// Material id used for uniform fields in dump files.
pub const UNIFORM_MATERIAL: MaterialId = 0;

/// Per-cell values of one field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValues {
    /// One scalar per cell.
    Uniform(Vec<f64>),
    /// Per-cell sparse sets of `(material, value)` pairs, each sorted by
    /// material id.
    MultiMaterial(Vec<Vec<(MaterialId, f64)>>),
}

impl FieldValues {
    /// Number of cells the field covers.
    pub fn n_cells(&self) -> usize {
        match self {
            FieldValues::Uniform(v) => v.len(),
            FieldValues::MultiMaterial(v) => v.len(),
        }
    }

    /// Value of `material` in `cell`, if the cell carries it.
    ///
    /// Uniform fields answer only for [`UNIFORM_MATERIAL`].
    pub fn value(&self, cell: usize, material: MaterialId) -> Option<f64> {
        match self {
            FieldValues::Uniform(v) => {
                if material == UNIFORM_MATERIAL {
                    v.get(cell).copied()
                } else {
                    None
                }
            }
            FieldValues::MultiMaterial(v) => v
                .get(cell)?
                .iter()
                .find(|(m, _)| *m == material)
                .map(|(_, val)| *val),
        }
    }

    /// Material ids present in `cell`, ascending.
    pub fn cell_materials(&self, cell: usize) -> Vec<MaterialId> {
        match self {
            FieldValues::Uniform(_) => vec![UNIFORM_MATERIAL],
            FieldValues::MultiMaterial(v) => match v.get(cell) {
                Some(mats) => mats.iter().map(|(m, _)| *m).collect(),
                None => Vec::new(),
            },
        }
    }

    /// All material ids present anywhere in the field, ascending.
    pub fn all_materials(&self) -> Vec<MaterialId> {
        match self {
            FieldValues::Uniform(_) => vec![UNIFORM_MATERIAL],
            FieldValues::MultiMaterial(v) => {
                let mut mats: Vec<MaterialId> =
                    v.iter().flatten().map(|(m, _)| *m).collect();
                mats.sort_unstable();
                mats.dedup();
                mats
            }
        }
    }

    /// Extract one material as a per-cell `Option` slice.
    ///
    /// The reconstruction stage works on these: `None` marks cells that do
    /// not carry the material and are excluded from its stencils.
    pub fn material_slice(&self, material: MaterialId) -> Vec<Option<f64>> {
        (0..self.n_cells())
            .map(|c| self.value(c, material))
            .collect()
    }

    /// Flatten into `(global_id, material, value)` triples given a local-to-
    /// global id mapping, sorted by key. This is the dump-file ordering.
    pub fn triples(&self, global_id: &dyn Fn(usize) -> u64) -> Vec<(u64, MaterialId, f64)> {
        let mut out = Vec::new();
        for cell in 0..self.n_cells() {
            for m in self.cell_materials(cell) {
                if let Some(v) = self.value(cell, m) {
                    out.push((global_id(cell), m, v));
                }
            }
        }
        out.sort_by_key(|&(g, m, _)| (g, m));
        out
    }
}

/// Name-keyed store of fields, the state-manager boundary used by drivers.
///
/// A `BTreeMap` keeps iteration deterministic across runs.
#[derive(Clone, Debug, Default)]
pub struct FieldStore {
    fields: BTreeMap<String, FieldValues>,
}

impl FieldStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field.
    pub fn set(&mut self, name: impl Into<String>, values: FieldValues) {
        self.fields.insert(name.into(), values);
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValues> {
        self.fields.get(name)
    }

    /// Field names in deterministic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_access() {
        let f = FieldValues::Uniform(vec![1.0, 2.0, 3.0]);
        assert_eq!(f.n_cells(), 3);
        assert_eq!(f.value(1, UNIFORM_MATERIAL), Some(2.0));
        assert_eq!(f.value(1, 7), None);
        assert_eq!(f.cell_materials(2), vec![UNIFORM_MATERIAL]);
    }

    #[test]
    fn test_multimaterial_access() {
        let f = FieldValues::MultiMaterial(vec![
            vec![(1, 0.25), (3, 0.75)],
            vec![(3, 1.0)],
            vec![],
        ]);
        assert_eq!(f.value(0, 3), Some(0.75));
        assert_eq!(f.value(1, 1), None);
        assert_eq!(f.all_materials(), vec![1, 3]);
        assert_eq!(f.cell_materials(2), Vec::<MaterialId>::new());
    }

    #[test]
    fn test_material_slice() {
        let f = FieldValues::MultiMaterial(vec![vec![(2, 5.0)], vec![], vec![(2, 7.0)]]);
        assert_eq!(f.material_slice(2), vec![Some(5.0), None, Some(7.0)]);
    }

    #[test]
    fn test_triples_sorted_by_key() {
        let f = FieldValues::MultiMaterial(vec![vec![(2, 5.0), (1, 4.0)], vec![(1, 6.0)]]);
        // Reverse the id mapping so sorting actually has to reorder.
        let triples = f.triples(&|c| (1 - c) as u64);
        assert_eq!(
            triples,
            vec![(0, 1, 6.0), (1, 1, 4.0), (1, 2, 5.0)]
        );
    }

    #[test]
    fn test_store_deterministic_order() {
        let mut store = FieldStore::new();
        store.set("momentum", FieldValues::Uniform(vec![0.0]));
        store.set("density", FieldValues::Uniform(vec![1.0]));
        let names: Vec<&str> = store.names().collect();
        assert_eq!(names, vec!["density", "momentum"]);
    }
}
