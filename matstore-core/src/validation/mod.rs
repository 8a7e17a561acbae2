//! Validation and parsing utilities
//!
//! Pure functions over shapes, offsets and text lines; no I/O.

pub mod bounds;
pub mod format;
pub mod parsing;

pub use bounds::{check_index, ensure_shape};
pub use format::{align_to_8, align_to_boundary};
pub use parsing::{
    parse_dense_row, parse_libsvm_line, parse_mtx_banner, parse_mtx_entry, parse_mtx_size,
    parse_mtx_value, MtxSize,
};
