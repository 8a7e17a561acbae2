//! Shape and index validation

use crate::{CoreError, Result};

/// Fail with [`CoreError::ShapeMismatch`] unless `found == expected`
pub const fn ensure_shape(expected: (usize, usize), found: (usize, usize)) -> Result<()> {
    if expected.0 != found.0 || expected.1 != found.1 {
        return Err(CoreError::ShapeMismatch { expected, found });
    }
    Ok(())
}

/// Convert a 1-based index to 0-based, checking it against `bound`
pub const fn check_index(one_based: usize, bound: usize, line: usize) -> Result<usize> {
    if one_based == 0 || one_based > bound {
        return Err(CoreError::malformed(line, "index out of range"));
    }
    Ok(one_based - 1)
}
