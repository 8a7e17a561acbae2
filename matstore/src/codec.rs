//! On-disk codecs, one per store format
//!
//! Codecs read and write files for a single process. They know nothing
//! about ranks; the store decides who calls them and with which rows.

pub mod container;
pub mod file_io;
pub mod libsvm;
pub mod mtx;
pub mod txt;

use rayon::prelude::*;

/// Format `items` into text in parallel chunks, preserving order
///
/// Each returned string holds the lines of one chunk, ready to be written
/// sequentially.
pub(crate) fn format_chunks<T, F>(items: &[T], format_item: F) -> Vec<String>
where
    T: Sync,
    F: Fn(&T, &mut String) + Sync,
{
    if items.is_empty() {
        return Vec::new();
    }
    let chunk_size = items.len().div_ceil(rayon::current_num_threads());
    items
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut text = String::with_capacity(chunk.len() * 16);
            for item in chunk {
                format_item(item, &mut text);
            }
            text
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_format_chunks_keeps_order() {
        let items: Vec<usize> = (0..1000).collect();
        let text: String = format_chunks(&items, |item, out| {
            let _ = writeln!(out, "{item}");
        })
        .concat();
        let parsed: Vec<usize> = text.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(parsed, items);
        assert!(format_chunks::<usize, _>(&[], |_, _| {}).is_empty());
    }
}
