//! Field dump files and the serial-vs-partitioned comparator.
//!
//! A field dump is plain text, one whitespace-separated
//! `global_id material_id value` triple per line, blank lines and `#`
//! comment lines ignored. A serial run writes one file; a partitioned run
//! writes one file per partition. The comparator matches rows by
//! `(global_id, material_id)` key and requires every serial key to appear in
//! the union of partition files (and nowhere else) with the values agreeing
//! below a tolerance. A failed comparison indicates a search or intersection
//! correctness bug and is a hard error, never a warning.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::state::MaterialId;

/// Default comparison tolerance on absolute value difference.
pub const DEFAULT_TOLERANCE: f64 = 1e-14;

/// Error type for dump reading and writing.
#[derive(Debug, Error)]
pub enum FieldDumpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A line that is not a triple, a comment, or blank.
    #[error("{path}:{line}: malformed dump line: {message}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        message: String,
    },
    /// The same `(global_id, material_id)` key appeared twice in one file.
    #[error("{path}:{line}: duplicate key ({global_id}, {material_id})")]
    DuplicateKey {
        path: PathBuf,
        line: usize,
        global_id: u64,
        material_id: MaterialId,
    },
}

/// Error type for comparator failures. Any variant means the partitioned
/// output does not reproduce the serial reference.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("dump file error: {0}")]
    Dump(#[from] FieldDumpError),
    /// No partition files were given where distributed output was expected.
    #[error("no partition dump files to compare against")]
    NoPartitions,
    /// A serial key is missing from every partition file.
    #[error("key ({global_id}, {material_id}) in serial output is missing from all partitions")]
    MissingFromPartitions {
        global_id: u64,
        material_id: MaterialId,
    },
    /// A partition produced a key the serial reference does not have.
    #[error("key ({global_id}, {material_id}) in partition output is absent from serial reference")]
    ExtraInPartitions {
        global_id: u64,
        material_id: MaterialId,
    },
    /// The same key appeared in two partition files. Partitions own
    /// disjoint target cells, so this is a partitioning bug.
    #[error("key ({global_id}, {material_id}) appears in more than one partition")]
    DuplicateAcrossPartitions {
        global_id: u64,
        material_id: MaterialId,
    },
    #[error(
        "value mismatch for key ({global_id}, {material_id}): \
         serial {serial} vs partitioned {partitioned} (|diff| {diff} > tol {tolerance})"
    )]
    ValueMismatch {
        global_id: u64,
        material_id: MaterialId,
        serial: f64,
        partitioned: f64,
        diff: f64,
        tolerance: f64,
    },
}

/// Summary of a successful comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct CompareReport {
    /// Number of `(global_id, material_id)` keys matched.
    pub n_keys: usize,
    /// Number of partition files read.
    pub n_partitions: usize,
    /// Largest absolute value difference seen.
    pub max_diff: f64,
}

/// Write `(global_id, material_id, value)` triples to a dump file.
///
/// Triples are written in ascending key order with full round-trip float
/// precision, so identical data produces byte-identical files.
pub fn write_dump(path: &Path, triples: &[(u64, MaterialId, f64)]) -> Result<(), FieldDumpError> {
    let mut sorted: Vec<&(u64, MaterialId, f64)> = triples.iter().collect();
    sorted.sort_by_key(|&&(g, m, _)| (g, m));
    let mut body = String::new();
    let _ = writeln!(body, "# global_id material_id value");
    for &&(g, m, v) in &sorted {
        let _ = writeln!(body, "{g} {m} {v:e}");
    }
    let mut file = File::create(path)?;
    file.write_all(body.as_bytes())?;
    Ok(())
}

/// Read a dump file into a key-ordered map.
///
/// # Errors
/// Fails on I/O errors, lines that do not parse as a triple, and duplicate
/// keys within the file.
pub fn read_dump(path: &Path) -> Result<BTreeMap<(u64, MaterialId), f64>, FieldDumpError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut map = BTreeMap::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let (Some(g), Some(m), Some(v), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(FieldDumpError::MalformedLine {
                path: path.to_path_buf(),
                line: line_no,
                message: format!("expected 3 fields: {trimmed:?}"),
            });
        };
        let parse_err = |what: &str| FieldDumpError::MalformedLine {
            path: path.to_path_buf(),
            line: line_no,
            message: format!("bad {what}: {trimmed:?}"),
        };
        let g: u64 = g.parse().map_err(|_| parse_err("global_id"))?;
        let m: MaterialId = m.parse().map_err(|_| parse_err("material_id"))?;
        let v: f64 = v.parse().map_err(|_| parse_err("value"))?;
        if map.insert((g, m), v).is_some() {
            return Err(FieldDumpError::DuplicateKey {
                path: path.to_path_buf(),
                line: line_no,
                global_id: g,
                material_id: m,
            });
        }
    }
    Ok(map)
}

/// Compare a serial reference dump against the union of partition dumps.
///
/// Every serial key must appear in exactly one partition file with a value
/// within `tolerance`, and no partition may carry a key the serial
/// reference lacks.
pub fn compare_dumps(
    serial: &Path,
    partitions: &[PathBuf],
    tolerance: f64,
) -> Result<CompareReport, CompareError> {
    if partitions.is_empty() {
        return Err(CompareError::NoPartitions);
    }
    let reference = read_dump(serial)?;

    let mut merged: BTreeMap<(u64, MaterialId), f64> = BTreeMap::new();
    for part in partitions {
        for (key, value) in read_dump(part)? {
            if merged.insert(key, value).is_some() {
                return Err(CompareError::DuplicateAcrossPartitions {
                    global_id: key.0,
                    material_id: key.1,
                });
            }
        }
    }

    for key in merged.keys() {
        if !reference.contains_key(key) {
            return Err(CompareError::ExtraInPartitions {
                global_id: key.0,
                material_id: key.1,
            });
        }
    }

    let mut max_diff = 0.0_f64;
    for (key, &serial_value) in &reference {
        let Some(&part_value) = merged.get(key) else {
            return Err(CompareError::MissingFromPartitions {
                global_id: key.0,
                material_id: key.1,
            });
        };
        let diff = (serial_value - part_value).abs();
        if diff > tolerance {
            return Err(CompareError::ValueMismatch {
                global_id: key.0,
                material_id: key.1,
                serial: serial_value,
                partitioned: part_value,
                diff,
                tolerance,
            });
        }
        max_diff = max_diff.max(diff);
    }

    Ok(CompareReport {
        n_keys: reference.len(),
        n_partitions: partitions.len(),
        max_diff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_lines(path: &Path, lines: &str) {
        std::fs::write(path, lines).unwrap();
    }

    #[test]
    fn test_dump_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("field.txt");
        let triples = vec![(2, 0, 1.5), (0, 1, -3.25e-7), (0, 0, 0.1)];
        write_dump(&path, &triples).unwrap();
        let map = read_dump(&path).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map[&(0, 0)], 0.1);
        assert_eq!(map[&(0, 1)], -3.25e-7);
        assert_eq!(map[&(2, 0)], 1.5);
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("field.txt");
        write_lines(&path, "# header\n\n1 0 2.0\n  # indented comment\n2 0 3.0\n");
        let map = read_dump(&path).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_malformed_line_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("field.txt");
        write_lines(&path, "1 0 2.0\n1 0\n");
        assert!(matches!(
            read_dump(&path),
            Err(FieldDumpError::MalformedLine { line: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("field.txt");
        write_lines(&path, "1 0 2.0\n1 0 2.0\n");
        assert!(matches!(
            read_dump(&path),
            Err(FieldDumpError::DuplicateKey {
                global_id: 1,
                material_id: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_compare_matching_partitions() {
        let dir = tempdir().unwrap();
        let serial = dir.path().join("serial.txt");
        let p0 = dir.path().join("part0.txt");
        let p1 = dir.path().join("part1.txt");
        write_dump(&serial, &[(0, 0, 1.0), (1, 0, 2.0), (2, 0, 3.0)]).unwrap();
        write_dump(&p0, &[(0, 0, 1.0), (2, 0, 3.0)]).unwrap();
        write_dump(&p1, &[(1, 0, 2.0)]).unwrap();
        let report = compare_dumps(&serial, &[p0, p1], DEFAULT_TOLERANCE).unwrap();
        assert_eq!(report.n_keys, 3);
        assert_eq!(report.n_partitions, 2);
        assert_eq!(report.max_diff, 0.0);
    }

    #[test]
    fn test_compare_value_mismatch() {
        let dir = tempdir().unwrap();
        let serial = dir.path().join("serial.txt");
        let p0 = dir.path().join("part0.txt");
        write_dump(&serial, &[(0, 0, 1.0)]).unwrap();
        write_dump(&p0, &[(0, 0, 1.0 + 1e-10)]).unwrap();
        assert!(matches!(
            compare_dumps(&serial, &[p0], DEFAULT_TOLERANCE),
            Err(CompareError::ValueMismatch {
                global_id: 0,
                material_id: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_compare_missing_key() {
        let dir = tempdir().unwrap();
        let serial = dir.path().join("serial.txt");
        let p0 = dir.path().join("part0.txt");
        write_dump(&serial, &[(0, 0, 1.0), (1, 0, 2.0)]).unwrap();
        write_dump(&p0, &[(0, 0, 1.0)]).unwrap();
        assert!(matches!(
            compare_dumps(&serial, &[p0], DEFAULT_TOLERANCE),
            Err(CompareError::MissingFromPartitions {
                global_id: 1,
                material_id: 0,
            })
        ));
    }

    #[test]
    fn test_compare_extra_key() {
        let dir = tempdir().unwrap();
        let serial = dir.path().join("serial.txt");
        let p0 = dir.path().join("part0.txt");
        write_dump(&serial, &[(0, 0, 1.0)]).unwrap();
        write_dump(&p0, &[(0, 0, 1.0), (7, 0, 9.0)]).unwrap();
        assert!(matches!(
            compare_dumps(&serial, &[p0], DEFAULT_TOLERANCE),
            Err(CompareError::ExtraInPartitions {
                global_id: 7,
                material_id: 0,
            })
        ));
    }

    #[test]
    fn test_compare_no_partitions() {
        let dir = tempdir().unwrap();
        let serial = dir.path().join("serial.txt");
        write_dump(&serial, &[(0, 0, 1.0)]).unwrap();
        assert!(matches!(
            compare_dumps(&serial, &[], DEFAULT_TOLERANCE),
            Err(CompareError::NoPartitions)
        ));
    }

    #[test]
    fn test_compare_overlapping_partitions() {
        let dir = tempdir().unwrap();
        let serial = dir.path().join("serial.txt");
        let p0 = dir.path().join("part0.txt");
        let p1 = dir.path().join("part1.txt");
        write_dump(&serial, &[(0, 0, 1.0)]).unwrap();
        write_dump(&p0, &[(0, 0, 1.0)]).unwrap();
        write_dump(&p1, &[(0, 0, 1.0)]).unwrap();
        assert!(matches!(
            compare_dumps(&serial, &[p0, p1], DEFAULT_TOLERANCE),
            Err(CompareError::DuplicateAcrossPartitions {
                global_id: 0,
                material_id: 0,
            })
        ));
    }
}
