//! Layout arithmetic for binary payloads

use crate::format::constants::ALIGNMENT_BOUNDARY;

/// Align an offset to a power-of-two boundary
pub const fn align_to_boundary(offset: usize, boundary: usize) -> usize {
    (offset + boundary - 1) & !(boundary - 1)
}

/// Align an offset to the 8-byte payload boundary
pub const fn align_to_8(offset: usize) -> usize {
    align_to_boundary(offset, ALIGNMENT_BOUNDARY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align() {
        assert_eq!(align_to_8(0), 0);
        assert_eq!(align_to_8(1), 8);
        assert_eq!(align_to_8(128), 128);
        assert_eq!(align_to_boundary(13, 4), 16);
    }
}
