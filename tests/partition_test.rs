//! Serial-vs-partitioned consistency through the dump-file comparator.
//!
//! The target mesh is split into disjoint blocks that keep their parent
//! global ids, each block is remapped independently against the full source
//! mesh, and the union of the partition dumps must reproduce the serial
//! dump bit for bit. Fixed ascending accumulation order makes a zero
//! tolerance achievable, not just a small one.

use std::path::PathBuf;

use remap_rs::{
    compare_dumps, write_dump, CartesianMesh2D, CompareError, FieldValues, RemapMesh, Remapper,
    DEFAULT_TOLERANCE,
};

fn source_mesh() -> CartesianMesh2D {
    CartesianMesh2D::uniform(0.0, 0.0, 3.0, 3.0, 6, 6)
}

fn target_mesh() -> CartesianMesh2D {
    CartesianMesh2D::uniform(0.0, 0.0, 3.0, 3.0, 4, 4)
}

fn test_field(source: &CartesianMesh2D) -> FieldValues {
    FieldValues::Uniform(
        (0..source.n_cells())
            .map(|c| {
                let p = source.cell_centroid(c);
                1.0 + (2.1 * p[0]).sin() * (1.3 * p[1]).cos()
            })
            .collect(),
    )
}

/// Remap onto a mesh and dump the result keyed by global id.
fn remap_and_dump(
    source: &CartesianMesh2D,
    target: &CartesianMesh2D,
    field: &FieldValues,
    order: usize,
    path: &PathBuf,
) {
    let remapper = Remapper::new(source, target).unwrap();
    let out = remapper.remap_field(field, order).unwrap();
    let triples = out.values.triples(&|c| target.global_id(c));
    write_dump(path, &triples).unwrap();
}

#[test]
fn partitioned_remap_matches_serial_bitwise() {
    let source = source_mesh();
    let target = target_mesh();
    let field = test_field(&source);
    let dir = tempfile::tempdir().unwrap();

    for order in 0..=2 {
        let serial = dir.path().join(format!("serial_o{order}.txt"));
        remap_and_dump(&source, &target, &field, order, &serial);

        // Four disjoint quadrants of the target, parent ids preserved.
        let blocks = [
            target.sub_block(0, 0, 2, 2),
            target.sub_block(2, 0, 2, 2),
            target.sub_block(0, 2, 2, 2),
            target.sub_block(2, 2, 2, 2),
        ];
        let mut parts = Vec::new();
        for (rank, block) in blocks.iter().enumerate() {
            let path = dir.path().join(format!("part{rank}_o{order}.txt"));
            remap_and_dump(&source, block, &field, order, &path);
            parts.push(path);
        }

        // Zero tolerance: the accumulation order per target cell is
        // identical in both runs.
        let report = compare_dumps(&serial, &parts, 0.0).unwrap();
        assert_eq!(report.n_keys, target.n_cells());
        assert_eq!(report.n_partitions, 4);
        assert_eq!(report.max_diff, 0.0, "order {order}");
    }
}

#[test]
fn uneven_partitioning_matches_serial() {
    let source = source_mesh();
    let target = target_mesh();
    let field = test_field(&source);
    let dir = tempfile::tempdir().unwrap();

    let serial = dir.path().join("serial.txt");
    remap_and_dump(&source, &target, &field, 1, &serial);

    // A single row strip plus the remaining block.
    let strip = target.sub_block(0, 0, 4, 1);
    let rest = target.sub_block(0, 1, 4, 3);
    let p0 = dir.path().join("part0.txt");
    let p1 = dir.path().join("part1.txt");
    remap_and_dump(&source, &strip, &field, 1, &p0);
    remap_and_dump(&source, &rest, &field, 1, &p1);

    let report = compare_dumps(&serial, &[p0, p1], 0.0).unwrap();
    assert_eq!(report.n_keys, 16);
}

#[test]
fn tampered_partition_value_is_detected() {
    let source = source_mesh();
    let target = target_mesh();
    let field = test_field(&source);
    let dir = tempfile::tempdir().unwrap();

    let serial = dir.path().join("serial.txt");
    remap_and_dump(&source, &target, &field, 0, &serial);

    let left = target.sub_block(0, 0, 2, 4);
    let right = target.sub_block(2, 0, 2, 4);
    let remapper = Remapper::new(&source, &left).unwrap();
    let out = remapper.remap_field(&field, 0).unwrap();
    let mut triples = out.values.triples(&|c| left.global_id(c));
    triples[3].2 += 1e-9;
    let p0 = dir.path().join("part0.txt");
    write_dump(&p0, &triples).unwrap();
    let p1 = dir.path().join("part1.txt");
    remap_and_dump(&source, &right, &field, 0, &p1);

    assert!(matches!(
        compare_dumps(&serial, &[p0, p1], DEFAULT_TOLERANCE),
        Err(CompareError::ValueMismatch { .. })
    ));
}

#[test]
fn missing_partition_is_detected() {
    let source = source_mesh();
    let target = target_mesh();
    let field = test_field(&source);
    let dir = tempfile::tempdir().unwrap();

    let serial = dir.path().join("serial.txt");
    remap_and_dump(&source, &target, &field, 0, &serial);

    // Only the left half shows up.
    let left = target.sub_block(0, 0, 2, 4);
    let p0 = dir.path().join("part0.txt");
    remap_and_dump(&source, &left, &field, 0, &p0);

    assert!(matches!(
        compare_dumps(&serial, &[p0], DEFAULT_TOLERANCE),
        Err(CompareError::MissingFromPartitions { .. })
    ));
}

#[test]
fn multimaterial_partition_round_trip() {
    let source = source_mesh();
    let target = target_mesh();
    let dir = tempfile::tempdir().unwrap();

    // Material 1 left of x = 1.5, material 2 right of it.
    let field = FieldValues::MultiMaterial(
        (0..source.n_cells())
            .map(|c| {
                let p = source.cell_centroid(c);
                if p[0] < 1.5 {
                    vec![(1, p[1] + 0.5)]
                } else {
                    vec![(2, 2.0 * p[0])]
                }
            })
            .collect(),
    );

    let serial = dir.path().join("serial.txt");
    remap_and_dump(&source, &target, &field, 1, &serial);

    let top = target.sub_block(0, 2, 4, 2);
    let bottom = target.sub_block(0, 0, 4, 2);
    let p0 = dir.path().join("part0.txt");
    let p1 = dir.path().join("part1.txt");
    remap_and_dump(&source, &top, &field, 1, &p0);
    remap_and_dump(&source, &bottom, &field, 1, &p1);

    let report = compare_dumps(&serial, &[p0, p1], 0.0).unwrap();
    // 8 boundary-straddling target cells carry both materials, 8 carry one.
    assert_eq!(report.n_partitions, 2);
    assert_eq!(report.max_diff, 0.0);
}
