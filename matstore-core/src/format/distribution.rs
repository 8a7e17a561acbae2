//! Distribution tags for distributed dense matrices
//!
//! A distribution decides which rectangle of the global matrix each rank
//! owns. Every layout here owns a single contiguous block per rank, so a
//! local block is fully described by a row range and a column range.

use crate::CoreError;
use core::ops::Range;
use core::str::FromStr;

/// Layout of a distributed dense matrix across a process group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Distribution {
    /// Rank 0 owns every element (`CIRC_CIRC`)
    Root,
    /// Every rank owns a full copy (`STAR_STAR`)
    Replicated,
    /// Contiguous row blocks, one per rank (`VC_STAR`)
    RowBlock,
    /// Contiguous column blocks, one per rank (`STAR_VC`)
    #[default]
    ColumnBlock,
}

impl Distribution {
    pub const ALL: [Distribution; 4] = [
        Distribution::Root,
        Distribution::Replicated,
        Distribution::RowBlock,
        Distribution::ColumnBlock,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Distribution::Root => "root",
            Distribution::Replicated => "replicated",
            Distribution::RowBlock => "row-block",
            Distribution::ColumnBlock => "column-block",
        }
    }

    /// Elemental-style spelling of the layout
    pub const fn alias(self) -> &'static str {
        match self {
            Distribution::Root => "CIRC_CIRC",
            Distribution::Replicated => "STAR_STAR",
            Distribution::RowBlock => "VC_STAR",
            Distribution::ColumnBlock => "STAR_VC",
        }
    }

    /// Rows and columns owned by `rank` in a `size`-rank group
    pub fn local_extent(
        self,
        nrows: usize,
        ncols: usize,
        rank: usize,
        size: usize,
    ) -> (Range<usize>, Range<usize>) {
        match self {
            Distribution::Root if rank == 0 => (0..nrows, 0..ncols),
            Distribution::Root => (0..0, 0..0),
            Distribution::Replicated => (0..nrows, 0..ncols),
            Distribution::RowBlock => (block_range(nrows, rank, size), 0..ncols),
            Distribution::ColumnBlock => (0..nrows, block_range(ncols, rank, size)),
        }
    }

    /// Whether `rank` holds the authoritative copy of its block
    ///
    /// Replicated layouts hold the same data on every rank; only rank 0
    /// contributes it when shards are combined.
    pub const fn contributes(self, rank: usize) -> bool {
        match self {
            Distribution::Root | Distribution::Replicated => rank == 0,
            Distribution::RowBlock | Distribution::ColumnBlock => true,
        }
    }
}

impl core::fmt::Display for Distribution {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Distribution {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Distribution::ALL
            .into_iter()
            .find(|dist| dist.name() == s || dist.alias().eq_ignore_ascii_case(s))
            .ok_or(CoreError::malformed(0, "unknown distribution name"))
    }
}

/// Contiguous block of `0..n` owned by `rank` when split over `size` ranks
///
/// The first `n % size` ranks get one extra element.
pub fn block_range(n: usize, rank: usize, size: usize) -> Range<usize> {
    if size == 0 || rank >= size {
        return 0..0;
    }
    let base = n / size;
    let extra = n % size;
    let start = rank * base + rank.min(extra);
    let len = base + usize::from(rank < extra);
    start..start + len
}

/// Rank owning global index `index` under [`block_range`]
pub fn block_owner(n: usize, index: usize, size: usize) -> Option<usize> {
    if index >= n || size == 0 {
        return None;
    }
    let base = n / size;
    let extra = n % size;
    let wide = (base + 1) * extra;
    if index < wide {
        Some(index / (base + 1))
    } else if base == 0 {
        None
    } else {
        Some(extra + (index - wide) / base)
    }
}
