//! Dense delimited text codec
//!
//! One line per row, values separated by the configured delimiter. Blank
//! lines and lines starting with `#` are skipped on read.

use super::{file_io, format_chunks};
use crate::config::StoreConfig;
use crate::error::Result;
use matstore_core::validation::parse_dense_row;
use matstore_core::{CoreError, DenseMatrix};
use std::io::Write as _;
use std::path::Path;

/// Write `matrix` one row per line
///
/// Rows without columns would be blank lines, which read back as nothing,
/// so an `n × 0` matrix with `n > 0` is rejected.
pub fn write(path: &Path, matrix: &DenseMatrix, config: &StoreConfig) -> Result<()> {
    if matrix.ncols() == 0 && matrix.nrows() > 0 {
        return Err(CoreError::ShapeMismatch {
            expected: matrix.shape(),
            found: (0, 0),
        }
        .into());
    }
    let rows: Vec<&[f64]> = matrix.rows().collect();
    let mut separator = [0u8; 4];
    let separator: &str = config.delimiter.encode_utf8(&mut separator);
    let body = format_chunks(&rows, |row, out| {
        for (index, &value) in row.iter().enumerate() {
            if index > 0 {
                out.push_str(separator);
            }
            out.push_str(&config.format_value(value));
        }
        out.push('\n');
    });
    file_io::write_atomic(path, |w| {
        for chunk in &body {
            w.write_all(chunk.as_bytes())?;
        }
        Ok(())
    })
}

pub fn read(path: &Path, config: &StoreConfig) -> Result<DenseMatrix> {
    let text = file_io::read_to_string(path)?;
    Ok(parse(&text, config.delimiter)?)
}

fn parse(text: &str, delimiter: char) -> std::result::Result<DenseMatrix, CoreError> {
    let mut values = Vec::new();
    let mut ncols = None;
    let mut nrows = 0;
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let before = values.len();
        parse_dense_row(trimmed, Some(delimiter), index + 1, &mut values)?;
        let width = values.len() - before;
        match ncols {
            None => ncols = Some(width),
            Some(expected) if expected != width => {
                return Err(CoreError::malformed(index + 1, "ragged row"));
            }
            Some(_) => {}
        }
        nrows += 1;
    }
    DenseMatrix::new(nrows, ncols.unwrap_or(0), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        let matrix = DenseMatrix::from_fn(3, 4, |r, c| (r as f64 + 1.0) / (c as f64 + 3.0));
        write(&path, &matrix, &StoreConfig::default()).unwrap();
        assert_eq!(read(&path, &StoreConfig::default()).unwrap(), matrix);

        let csv = StoreConfig::default().with_delimiter(',');
        write(&path, &matrix, &csv).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(text.lines().next().unwrap().split(',').count(), 4);
        assert_eq!(read(&path, &csv).unwrap(), matrix);
    }

    #[test]
    fn test_zero_width_rows_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        let err = write(&path, &DenseMatrix::zeros(3, 0).unwrap(), &StoreConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::StoreError::Core(CoreError::ShapeMismatch {
                expected: (3, 0),
                found: (0, 0)
            })
        ));
        assert!(!path.exists());

        write(&path, &DenseMatrix::default(), &StoreConfig::default()).unwrap();
        assert_eq!(read(&path, &StoreConfig::default()).unwrap().shape(), (0, 0));
    }

    #[test]
    fn test_parse_skips_comments_and_splits_whitespace() {
        let dense = parse("# header\n1  2\t3\n\n4 5 6\n", ' ').unwrap();
        assert_eq!(dense.shape(), (2, 3));
        assert_eq!(dense.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_edge_cases() {
        assert_eq!(parse("", ' ').unwrap().shape(), (0, 0));
        assert_eq!(
            parse("1 2\n3\n", ' '),
            Err(CoreError::malformed(2, "ragged row"))
        );
        assert!(matches!(parse("1 a\n", ' '), Err(CoreError::MalformedInput { line: 1, .. })));
    }
}
