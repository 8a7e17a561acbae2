//! Line parsers for the text formats
//!
//! Each parser handles one line and reports failures with the caller's
//! 1-based line number. Comment and blank-line skipping is left to the
//! caller, except for LIBSVM where trailing comments are part of the line
//! grammar.

use crate::format::{MtxField, MtxHeader, MtxLayout, MtxSymmetry};
use crate::validation::check_index;
use crate::{CoreError, Result};
use alloc::vec::Vec;

fn parse_f64(token: &str, line: usize) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| CoreError::malformed(line, "unparsable value"))
}

fn parse_usize(token: &str, line: usize) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| CoreError::malformed(line, "unparsable integer"))
}

/// Parse the `%%MatrixMarket matrix <layout> <field> <symmetry>` banner
pub fn parse_mtx_banner(line: &str) -> Result<MtxHeader> {
    let mut tokens = line.split_whitespace();
    let banner = tokens.next().unwrap_or("");
    if !banner.eq_ignore_ascii_case(MtxHeader::BANNER) {
        return Err(CoreError::malformed(1, "missing %%MatrixMarket banner"));
    }
    if !tokens.next().is_some_and(|t| t.eq_ignore_ascii_case("matrix")) {
        return Err(CoreError::malformed(1, "only matrix objects are supported"));
    }

    let layout = match tokens.next().map(str::to_ascii_lowercase).as_deref() {
        Some("coordinate") => MtxLayout::Coordinate,
        Some("array") => MtxLayout::Array,
        _ => return Err(CoreError::malformed(1, "unknown storage layout")),
    };
    let field = match tokens.next().map(str::to_ascii_lowercase).as_deref() {
        Some("real") | Some("double") => MtxField::Real,
        Some("integer") => MtxField::Integer,
        Some("pattern") => MtxField::Pattern,
        Some("complex") => return Err(CoreError::malformed(1, "complex values are not supported")),
        _ => return Err(CoreError::malformed(1, "unknown value field")),
    };
    let symmetry = match tokens.next().map(str::to_ascii_lowercase).as_deref() {
        Some("general") => MtxSymmetry::General,
        Some("symmetric") => MtxSymmetry::Symmetric,
        Some("skew-symmetric") => MtxSymmetry::SkewSymmetric,
        Some("hermitian") => return Err(CoreError::malformed(1, "hermitian matrices are not supported")),
        _ => return Err(CoreError::malformed(1, "unknown symmetry")),
    };
    if layout == MtxLayout::Array && field == MtxField::Pattern {
        return Err(CoreError::malformed(1, "pattern field requires coordinate layout"));
    }
    if tokens.next().is_some() {
        return Err(CoreError::malformed(1, "trailing tokens after banner"));
    }

    Ok(MtxHeader {
        layout,
        field,
        symmetry,
    })
}

/// Dimensions and number of data lines declared by the size line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MtxSize {
    pub nrows: usize,
    pub ncols: usize,
    /// Data lines that follow the size line
    pub entries: usize,
}

/// Parse the size line that follows the banner and comments
pub fn parse_mtx_size(text: &str, header: &MtxHeader, line: usize) -> Result<MtxSize> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let size = match (header.layout, tokens.as_slice()) {
        (MtxLayout::Coordinate, [rows, cols, nnz]) => MtxSize {
            nrows: parse_usize(rows, line)?,
            ncols: parse_usize(cols, line)?,
            entries: parse_usize(nnz, line)?,
        },
        (MtxLayout::Array, [rows, cols]) => {
            let nrows = parse_usize(rows, line)?;
            let ncols = parse_usize(cols, line)?;
            let entries = match header.symmetry {
                MtxSymmetry::General => nrows.checked_mul(ncols),
                MtxSymmetry::Symmetric => nrows
                    .checked_add(1)
                    .and_then(|n| n.checked_mul(nrows))
                    .map(|n| n / 2),
                MtxSymmetry::SkewSymmetric => nrows.checked_mul(nrows.saturating_sub(1)).map(|n| n / 2),
            }
            .ok_or(CoreError::malformed(line, "dimensions overflow"))?;
            MtxSize {
                nrows,
                ncols,
                entries,
            }
        }
        _ => return Err(CoreError::malformed(line, "wrong number of size fields")),
    };

    if header.is_mirrored() && size.nrows != size.ncols {
        return Err(CoreError::malformed(line, "symmetric matrix must be square"));
    }
    let cells = size
        .nrows
        .checked_mul(size.ncols)
        .ok_or(CoreError::malformed(line, "dimensions overflow"))?;
    if header.layout == MtxLayout::Coordinate && size.entries > cells {
        return Err(CoreError::malformed(line, "more entries than matrix cells"));
    }
    Ok(size)
}

/// Parse one coordinate entry into a 0-based triple
pub fn parse_mtx_entry(
    text: &str,
    header: &MtxHeader,
    size: &MtxSize,
    line: usize,
) -> Result<(usize, usize, f64)> {
    let mut tokens = text.split_whitespace();
    let row = parse_usize(tokens.next().unwrap_or(""), line)?;
    let col = parse_usize(
        tokens
            .next()
            .ok_or(CoreError::malformed(line, "missing column index"))?,
        line,
    )?;
    let value = match header.field {
        MtxField::Pattern => 1.0,
        MtxField::Real | MtxField::Integer => parse_f64(
            tokens
                .next()
                .ok_or(CoreError::malformed(line, "missing value"))?,
            line,
        )?,
    };
    if tokens.next().is_some() {
        return Err(CoreError::malformed(line, "trailing tokens after entry"));
    }

    let row = check_index(row, size.nrows, line)?;
    let col = check_index(col, size.ncols, line)?;
    if header.is_mirrored() && col > row {
        return Err(CoreError::malformed(line, "symmetric entry above the diagonal"));
    }
    if header.symmetry == MtxSymmetry::SkewSymmetric && col == row {
        return Err(CoreError::malformed(line, "skew-symmetric entry on the diagonal"));
    }
    Ok((row, col, value))
}

/// Parse one value line of an `array` layout file
pub fn parse_mtx_value(text: &str, line: usize) -> Result<f64> {
    let mut tokens = text.split_whitespace();
    let value = parse_f64(tokens.next().unwrap_or(""), line)?;
    if tokens.next().is_some() {
        return Err(CoreError::malformed(line, "expected a single value"));
    }
    Ok(value)
}

/// Parse one LIBSVM line: `label [qid:N] index:value ...`
///
/// Features are appended to `features` as 0-based (column, value) pairs.
/// Returns `None` for blank or comment-only lines.
pub fn parse_libsvm_line(
    text: &str,
    line: usize,
    zero_based: bool,
    features: &mut Vec<(usize, f64)>,
) -> Result<Option<f64>> {
    let content = text.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return Ok(None);
    }

    let mut tokens = content.split_whitespace();
    let label = parse_f64(tokens.next().unwrap_or(""), line)?;
    for token in tokens {
        let (index, value) = token
            .split_once(':')
            .ok_or(CoreError::malformed(line, "feature must be index:value"))?;
        if index == "qid" {
            continue;
        }
        let index = parse_usize(index, line)?;
        let column = if zero_based {
            index
        } else {
            index
                .checked_sub(1)
                .ok_or(CoreError::malformed(line, "feature index 0 in 1-based file"))?
        };
        features.push((column, parse_f64(value, line)?));
    }
    Ok(Some(label))
}

/// Parse one row of a dense text file into `values`
///
/// `None` or a whitespace delimiter splits on runs of whitespace.
pub fn parse_dense_row(
    text: &str,
    delimiter: Option<char>,
    line: usize,
    values: &mut Vec<f64>,
) -> Result<()> {
    match delimiter {
        Some(delim) if !delim.is_whitespace() => {
            for token in text.trim().split(delim) {
                values.push(parse_f64(token.trim(), line)?);
            }
        }
        _ => {
            for token in text.split_whitespace() {
                values.push(parse_f64(token, line)?);
            }
        }
    }
    Ok(())
}
