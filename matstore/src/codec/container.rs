//! Binary named-dataset container codec (the `hdf5` store format)
//!
//! Payloads are little-endian f64, row-major. Reads map the file when the
//! `mmap` feature is enabled and fall back to a buffered read otherwise.

use super::file_io;
use crate::error::{Result, StoreError};
use hashbrown::HashMap;
use matstore_core::{
    directory_entries, single_dataset_layout, CoreError, DatasetEntry, DenseMatrix,
};
use rayon::prelude::*;
use std::ops::{Deref, Range};
use std::path::Path;
use tracing::warn;

/// Encode `values` as little-endian bytes
fn encode_values(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

fn decode_values(bytes: &[u8]) -> Vec<f64> {
    bytes
        .par_chunks_exact(8)
        .map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            f64::from_le_bytes(word)
        })
        .collect()
}

/// Write a single-dataset container holding `matrix`
pub fn write(path: &Path, dataset: &str, matrix: &DenseMatrix) -> Result<()> {
    let (prefix, _) = single_dataset_layout(dataset, matrix.nrows(), matrix.ncols())?;
    let payload = encode_values(matrix.as_slice());
    file_io::write_atomic(path, |w| {
        use std::io::Write;
        w.write_all(&prefix)?;
        w.write_all(&payload)
    })
}

/// Create a zero-filled single-dataset container of the given shape
///
/// Blocks are then filled in with [`write_block`].
pub fn create(path: &Path, dataset: &str, nrows: usize, ncols: usize) -> Result<DatasetEntry> {
    let (prefix, entry) = single_dataset_layout(dataset, nrows, ncols)?;
    file_io::create_preallocated(path, entry.data_end()?)?;
    file_io::write_at(path, 0, &prefix)?;
    Ok(entry)
}

/// Write `block` with its top-left corner at global (`row`, `col`)
pub fn write_block(
    path: &Path,
    entry: &DatasetEntry,
    row: usize,
    col: usize,
    block: &DenseMatrix,
) -> Result<()> {
    let (nrows, ncols) = entry.shape();
    if row + block.nrows() > nrows || col + block.ncols() > ncols {
        return Err(CoreError::IndexOutOfBounds.into());
    }
    if block.ncols() == 0 {
        return Ok(());
    }
    if block.ncols() == ncols {
        // full-width rows are contiguous on disk
        return file_io::write_at(path, entry.element_offset(row, 0), &encode_values(block.as_slice()));
    }
    for (offset, values) in block.rows().enumerate() {
        file_io::write_at(path, entry.element_offset(row + offset, col), &encode_values(values))?;
    }
    Ok(())
}

/// File contents, mapped or buffered
enum Source {
    #[cfg(feature = "mmap")]
    Mapped(memmap2::Mmap),
    Buffered(Vec<u8>),
}

impl Deref for Source {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            #[cfg(feature = "mmap")]
            Source::Mapped(map) => &map[..],
            Source::Buffered(bytes) => &bytes[..],
        }
    }
}

#[cfg(feature = "mmap")]
fn open(path: &Path) -> Result<Source> {
    let file = std::fs::File::open(path).map_err(|source| StoreError::io(path, source))?;
    let len = file
        .metadata()
        .map_err(|source| StoreError::io(path, source))?
        .len();
    if len == 0 {
        return Ok(Source::Buffered(Vec::new()));
    }
    // SAFETY: stores never write a file in place while it is being read;
    // writers go through a temporary file and rename.
    let map = unsafe { memmap2::MmapOptions::new().map(&file) }
        .map_err(|source| StoreError::io(path, source))?;
    Ok(Source::Mapped(map))
}

#[cfg(not(feature = "mmap"))]
fn open(path: &Path) -> Result<Source> {
    std::fs::read(path)
        .map(Source::Buffered)
        .map_err(|source| StoreError::io(path, source))
}

/// Directory of a container, keyed by dataset name
fn directory(bytes: &[u8]) -> Result<HashMap<String, DatasetEntry>> {
    let entries = directory_entries(bytes)?;
    let mut by_name = HashMap::with_capacity(entries.len());
    for entry in entries {
        let end = entry.data_end()?;
        if end > bytes.len() as u64 {
            return Err(CoreError::InvalidHeader.into());
        }
        by_name.insert(entry.name().to_string(), entry);
    }
    Ok(by_name)
}

fn lookup(path: &Path, bytes: &[u8], dataset: &str) -> Result<DatasetEntry> {
    let mut directory = directory(bytes)?;
    directory.remove(dataset).ok_or_else(|| {
        let mut available: Vec<&String> = directory.keys().collect();
        available.sort();
        warn!(path = %path.display(), dataset, ?available, "dataset not found");
        StoreError::Core(CoreError::DatasetNotFound)
    })
}

/// Shape of `dataset`
pub fn shape(path: &Path, dataset: &str) -> Result<(usize, usize)> {
    let source = open(path)?;
    Ok(lookup(path, &source, dataset)?.shape())
}

/// Read the whole dataset
pub fn read(path: &Path, dataset: &str) -> Result<DenseMatrix> {
    Ok(read_rows(path, dataset, |nrows| 0..nrows)?.1)
}

/// Read the rows `rows(nrows)` of `dataset`
///
/// Returns the dataset's global shape and the stripe.
pub fn read_rows(
    path: &Path,
    dataset: &str,
    rows: impl FnOnce(usize) -> Range<usize>,
) -> Result<((usize, usize), DenseMatrix)> {
    let source = open(path)?;
    let entry = lookup(path, &source, dataset)?;
    let (nrows, ncols) = entry.shape();
    let stripe = rows(nrows);
    if stripe.start > stripe.end || stripe.end > nrows {
        return Err(CoreError::IndexOutOfBounds.into());
    }
    let start = entry.element_offset(stripe.start, 0) as usize;
    let end = entry.element_offset(stripe.end, 0) as usize;
    let values = decode_values(&source[start..end]);
    Ok(((nrows, ncols), DenseMatrix::new(stripe.len(), ncols, values)?))
}
