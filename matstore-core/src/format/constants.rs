//! Format constants shared by the codecs

/// Default alignment boundary for binary payloads
pub const ALIGNMENT_BOUNDARY: usize = 8;

/// Rank that performs root-only reads and writes
pub const ROOT_RANK: usize = 0;

/// Dataset name used when none is configured
pub const DEFAULT_DATASET: &str = "matrix";

/// Tolerance for comparing matrices that went through a text round trip
pub const DEFAULT_TOLERANCE: f64 = 1e-7;
