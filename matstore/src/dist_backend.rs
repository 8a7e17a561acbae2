//! In-process distributed matrix engines
//!
//! Minimal distributed dense and sparse matrices over a [`Communicator`]:
//! enough surface for the stores to read and write shards, redistribute
//! dense data between layouts and walk sparse triples.
//!
//! [`Communicator`]: crate::Communicator

pub mod dense;
pub mod sparse;

pub use dense::DistDenseMatrix;
pub use sparse::DistSparseMatrix;

use std::ops::Range;

/// Overlap of two half-open ranges, empty when disjoint
pub(crate) fn overlap(a: &Range<usize>, b: &Range<usize>) -> Range<usize> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    start..end.max(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        assert_eq!(overlap(&(0..5), &(3..9)), 3..5);
        assert_eq!(overlap(&(0..3), &(3..9)), 3..3);
        assert!(overlap(&(6..8), &(0..2)).is_empty());
    }
}
