//! MatrixMarket codec
//!
//! Writes `coordinate real general` files. Reads coordinate and array
//! layouts with real, integer or pattern fields and any supported symmetry.

use super::{file_io, format_chunks};
use crate::config::StoreConfig;
use crate::error::Result;
use matstore_core::validation::{parse_mtx_banner, parse_mtx_entry, parse_mtx_size, parse_mtx_value};
use matstore_core::{CooMatrix, CoreError, MtxHeader, MtxLayout, MtxSymmetry};
use std::fmt::Write as _;
use std::io::Write as _;
use std::ops::Range;
use std::path::Path;

/// Write `matrix` as coordinate real general, entries in row-major order
///
/// Repeated coordinates are written as they are stored.
pub fn write(path: &Path, matrix: &CooMatrix, config: &StoreConfig) -> Result<()> {
    let mut order: Vec<usize> = (0..matrix.nnz()).collect();
    let rows = matrix.row_indices();
    let cols = matrix.col_indices();
    order.sort_by_key(|&i| (rows[i], cols[i]));

    let values = matrix.values();
    let body = format_chunks(&order, |&i, out| {
        let _ = writeln!(out, "{} {} {}", rows[i] + 1, cols[i] + 1, config.format_value(values[i]));
    });

    file_io::write_atomic(path, |w| {
        writeln!(w, "{}", MtxHeader::COORDINATE_REAL_BANNER)?;
        writeln!(w, "{} {} {}", matrix.nrows(), matrix.ncols(), matrix.nnz())?;
        for chunk in &body {
            w.write_all(chunk.as_bytes())?;
        }
        Ok(())
    })
}

/// Read the whole matrix
pub fn read(path: &Path) -> Result<CooMatrix> {
    read_rows(path, |nrows| 0..nrows)
}

/// Read only the entries whose row lies in `rows(nrows)`
///
/// The result keeps the global shape. Every line is still validated.
pub fn read_rows(path: &Path, rows: impl FnOnce(usize) -> Range<usize>) -> Result<CooMatrix> {
    let text = file_io::read_to_string(path)?;
    Ok(parse(&text, rows)?)
}

/// Lines that are neither blank nor `%` comments, with 1-based numbers
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .skip(1)
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('%'))
}

fn parse(
    text: &str,
    rows: impl FnOnce(usize) -> Range<usize>,
) -> std::result::Result<CooMatrix, CoreError> {
    let header = parse_mtx_banner(text.lines().next().unwrap_or(""))?;
    let mut lines = content_lines(text);
    let (size_line, size_text) = lines
        .next()
        .ok_or(CoreError::malformed(0, "missing size line"))?;
    let size = parse_mtx_size(size_text, &header, size_line)?;
    let keep = rows(size.nrows);

    let mut matrix = CooMatrix::new(size.nrows, size.ncols);
    let mut store = |row: usize, col: usize, value: f64| -> std::result::Result<(), CoreError> {
        if keep.contains(&row) {
            matrix.push(row, col, value)?;
        }
        if header.is_mirrored() && row != col && keep.contains(&col) {
            let mirrored = match header.symmetry {
                MtxSymmetry::SkewSymmetric => -value,
                _ => value,
            };
            matrix.push(col, row, mirrored)?;
        }
        Ok(())
    };

    let mut count = 0;
    match header.layout {
        MtxLayout::Coordinate => {
            for (line, entry) in lines.by_ref().take(size.entries) {
                let (row, col, value) = parse_mtx_entry(entry, &header, &size, line)?;
                store(row, col, value)?;
                count += 1;
            }
        }
        MtxLayout::Array => {
            let mut cells = array_cells(&header, size.nrows, size.ncols);
            for (line, entry) in lines.by_ref().take(size.entries) {
                let value = parse_mtx_value(entry, line)?;
                let (row, col) = cells
                    .next()
                    .ok_or(CoreError::malformed(line, "more values than matrix cells"))?;
                if value != 0.0 {
                    store(row, col, value)?;
                }
                count += 1;
            }
        }
    }

    if count != size.entries || lines.next().is_some() {
        return Err(CoreError::malformed(0, "entry count differs from size line"));
    }
    Ok(matrix)
}

/// Cells of an array-layout file in storage order: column-major, lower
/// triangle only when mirrored
fn array_cells(
    header: &MtxHeader,
    nrows: usize,
    ncols: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let symmetry = header.symmetry;
    (0..ncols).flat_map(move |col| {
        let first = match symmetry {
            MtxSymmetry::General => 0,
            MtxSymmetry::Symmetric => col,
            MtxSymmetry::SkewSymmetric => col + 1,
        };
        (first..nrows).map(move |row| (row, col))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use matstore_core::sparse_to_dense;

    fn parse_all(text: &str) -> std::result::Result<CooMatrix, CoreError> {
        parse(text, |nrows| 0..nrows)
    }

    #[test]
    fn test_write_then_read_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.mtx");
        let matrix = CooMatrix::from_triplets(
            3,
            4,
            vec![(2, 0, 0.1), (0, 3, -1e-300), (0, 1, 123456789.125), (1, 1, 1.0 / 3.0)],
        )
        .unwrap();
        write(&path, &matrix, &StoreConfig::default()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(MtxHeader::COORDINATE_REAL_BANNER));
        assert_eq!(lines.next(), Some("3 4 4"));
        assert_eq!(lines.next(), Some("1 2 123456789.125"));

        assert_eq!(read(&path).unwrap(), matrix.to_canonical());
    }

    #[test]
    fn test_read_rows_keeps_global_shape() {
        let text = "%%MatrixMarket matrix coordinate real general\n% note\n\n4 2 3\n1 1 1\n3 2 2\n4 1 3\n";
        let part = parse(text, |_| 2..4).unwrap();
        assert_eq!(part.shape(), (4, 2));
        assert_eq!(part.triplets().collect::<Vec<_>>(), vec![(2, 1, 2.0), (3, 0, 3.0)]);
    }

    #[test]
    fn test_symmetric_and_pattern() {
        let sym = parse_all(
            "%%MatrixMarket matrix coordinate integer symmetric\n3 3 2\n1 1 4\n3 1 7\n",
        )
        .unwrap();
        let dense = sparse_to_dense(&sym).unwrap();
        assert_eq!(dense.get(0, 2), Some(7.0));
        assert_eq!(dense.get(2, 0), Some(7.0));
        assert_eq!(sym.nnz(), 3);

        let skew = parse_all(
            "%%MatrixMarket matrix coordinate real skew-symmetric\n2 2 1\n2 1 1.5\n",
        )
        .unwrap();
        assert_eq!(sparse_to_dense(&skew).unwrap().get(0, 1), Some(-1.5));

        let pattern =
            parse_all("%%MatrixMarket matrix coordinate pattern general\n2 2 2\n1 2\n2 1\n").unwrap();
        assert_eq!(pattern.values(), &[1.0, 1.0]);
    }

    #[test]
    fn test_array_layout() {
        let general =
            parse_all("%%MatrixMarket matrix array real general\n2 2\n1\n0\n3\n4\n").unwrap();
        let dense = sparse_to_dense(&general).unwrap();
        assert_eq!(dense.row(0), &[1.0, 3.0]);
        assert_eq!(dense.row(1), &[0.0, 4.0]);

        let sym = parse_all("%%MatrixMarket matrix array real symmetric\n2 2\n1\n2\n3\n").unwrap();
        let dense = sparse_to_dense(&sym).unwrap();
        assert_eq!(dense.row(0), &[1.0, 2.0]);
        assert_eq!(dense.row(1), &[2.0, 3.0]);
    }

    #[test]
    fn test_rejects_malformed_files() {
        let cases = [
            "20 65 260\n",
            "%%MatrixMarket matrix coordinate real general\n",
            "%%MatrixMarket matrix coordinate real general\n2 2 2\n1 1 1\n",
            "%%MatrixMarket matrix coordinate real general\n2 2 1\n1 1 1\n2 2 2\n",
            "%%MatrixMarket matrix coordinate real general\n2 2 1\n3 1 1\n",
            "%%MatrixMarket matrix coordinate real general\n2 2 1\n1 1 x\n",
            "%%MatrixMarket matrix coordinate complex general\n2 2 1\n1 1 1 0\n",
        ];
        for case in cases {
            assert!(
                matches!(parse_all(case), Err(CoreError::MalformedInput { .. })),
                "{case:?}"
            );
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(&dir.path().join("absent.mtx")).unwrap_err();
        assert!(matches!(err, crate::StoreError::Io { .. }));
    }
}
