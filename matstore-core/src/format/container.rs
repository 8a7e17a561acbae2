//! Binary named-dataset container layout (the `hdf5` store format)
//!
//! ```text
//! 0      header (64 bytes)
//! 64     directory: dataset_count entries of 64 bytes
//! ...    8-byte aligned f64 payloads, row-major, little endian
//! ```

use crate::validation::align_to_8;
use crate::{CoreError, Result};
use alloc::vec::Vec;

fn read_u64(bytes: &[u8], at: usize) -> Result<u64> {
    bytes
        .get(at..at + 8)
        .and_then(|b| b.try_into().ok())
        .map(u64::from_le_bytes)
        .ok_or(CoreError::InvalidHeader)
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    bytes
        .get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(CoreError::InvalidHeader)
}

/// File header of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Magic bytes: "MXH5"
    pub magic: [u8; 4],
    /// Format version
    pub version: u8,
    /// 0 = little endian
    pub byte_order: u8,
    /// 1 = f64
    pub dtype: u8,
    /// 0 = row-major
    pub layout: u8,
    /// Number of directory entries
    pub dataset_count: u32,
    /// Offset of the directory from file start
    pub directory_offset: u64,
    /// Size of the directory in bytes
    pub directory_size: u64,
}

impl ContainerHeader {
    pub const MAGIC: [u8; 4] = *b"MXH5";
    pub const VERSION: u8 = 1;
    pub const DTYPE_F64: u8 = 1;
    pub const SIZE: usize = 64;

    /// Header for a container holding `dataset_count` datasets
    pub const fn new(dataset_count: u32) -> Self {
        Self {
            magic: Self::MAGIC,
            version: Self::VERSION,
            byte_order: 0,
            dtype: Self::DTYPE_F64,
            layout: 0,
            dataset_count,
            directory_offset: Self::SIZE as u64,
            directory_size: dataset_count as u64 * DatasetEntry::SIZE as u64,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes[5] = self.byte_order;
        bytes[6] = self.dtype;
        bytes[7] = self.layout;
        bytes[8..12].copy_from_slice(&self.dataset_count.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.directory_offset.to_le_bytes());
        bytes[24..32].copy_from_slice(&self.directory_size.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE || bytes[0..4] != Self::MAGIC {
            return Err(CoreError::InvalidHeader);
        }
        let header = Self {
            magic: Self::MAGIC,
            version: bytes[4],
            byte_order: bytes[5],
            dtype: bytes[6],
            layout: bytes[7],
            dataset_count: read_u32(bytes, 8)?,
            directory_offset: read_u64(bytes, 16)?,
            directory_size: read_u64(bytes, 24)?,
        };
        header.validate()?;
        Ok(header)
    }

    fn validate(&self) -> Result<()> {
        if self.version == 0 || self.version > Self::VERSION {
            return Err(CoreError::InvalidHeader);
        }
        if self.byte_order != 0 || self.dtype != Self::DTYPE_F64 || self.layout != 0 {
            return Err(CoreError::InvalidHeader);
        }
        let expected = (self.dataset_count as u64)
            .checked_mul(DatasetEntry::SIZE as u64)
            .ok_or(CoreError::InvalidHeader)?;
        if self.directory_size != expected {
            return Err(CoreError::InvalidHeader);
        }
        Ok(())
    }
}

/// Directory entry describing one dense dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetEntry {
    /// NUL-padded UTF-8 name
    pub name: [u8; 32],
    pub nrows: u64,
    pub ncols: u64,
    /// Offset of the first element from file start
    pub data_offset: u64,
    /// Payload size in bytes
    pub data_size: u64,
}

impl DatasetEntry {
    pub const SIZE: usize = 64;
    pub const MAX_NAME_LEN: usize = 32;

    /// Entry for a `nrows × ncols` dataset stored at `data_offset`
    pub fn new(name: &str, nrows: usize, ncols: usize, data_offset: u64) -> Result<Self> {
        if name.is_empty() || name.len() > Self::MAX_NAME_LEN || name.bytes().any(|b| b == 0) {
            return Err(CoreError::InvalidHeader);
        }
        let data_size = (nrows as u64)
            .checked_mul(ncols as u64)
            .and_then(|n| n.checked_mul(8))
            .ok_or(CoreError::InvalidHeader)?;
        let mut padded = [0u8; 32];
        padded[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self {
            name: padded,
            nrows: nrows as u64,
            ncols: ncols as u64,
            data_offset,
            data_size,
        })
    }

    /// Name with NUL padding stripped
    pub fn name(&self) -> &str {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(32);
        core::str::from_utf8(&self.name[..end]).unwrap_or("")
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows as usize, self.ncols as usize)
    }

    /// Byte offset of element (row, col)
    pub fn element_offset(&self, row: usize, col: usize) -> u64 {
        self.data_offset + ((row as u64) * self.ncols + col as u64) * 8
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..32].copy_from_slice(&self.name);
        bytes[32..40].copy_from_slice(&self.nrows.to_le_bytes());
        bytes[40..48].copy_from_slice(&self.ncols.to_le_bytes());
        bytes[48..56].copy_from_slice(&self.data_offset.to_le_bytes());
        bytes[56..64].copy_from_slice(&self.data_size.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(CoreError::InvalidHeader);
        }
        let mut name = [0u8; 32];
        name.copy_from_slice(&bytes[0..32]);
        let entry = Self {
            name,
            nrows: read_u64(bytes, 32)?,
            ncols: read_u64(bytes, 40)?,
            data_offset: read_u64(bytes, 48)?,
            data_size: read_u64(bytes, 56)?,
        };
        let expected = entry
            .nrows
            .checked_mul(entry.ncols)
            .and_then(|n| n.checked_mul(8))
            .ok_or(CoreError::InvalidHeader)?;
        if expected != entry.data_size || entry.data_offset % 8 != 0 {
            return Err(CoreError::InvalidHeader);
        }
        Ok(entry)
    }

    /// End of the payload, checked against overflow
    pub fn data_end(&self) -> Result<u64> {
        self.data_offset
            .checked_add(self.data_size)
            .ok_or(CoreError::InvalidHeader)
    }
}

/// Header and directory for a container with a single dataset
///
/// Returns the serialized prefix (header + directory) and the entry; the
/// payload starts right after the prefix.
pub fn single_dataset_layout(
    name: &str,
    nrows: usize,
    ncols: usize,
) -> Result<([u8; ContainerHeader::SIZE + DatasetEntry::SIZE], DatasetEntry)> {
    let header = ContainerHeader::new(1);
    let data_offset = align_to_8(ContainerHeader::SIZE + DatasetEntry::SIZE) as u64;
    let entry = DatasetEntry::new(name, nrows, ncols, data_offset)?;

    let mut prefix = [0u8; ContainerHeader::SIZE + DatasetEntry::SIZE];
    prefix[..ContainerHeader::SIZE].copy_from_slice(&header.to_bytes());
    prefix[ContainerHeader::SIZE..].copy_from_slice(&entry.to_bytes());
    Ok((prefix, entry))
}

/// Parse the header and every directory entry from a container's leading
/// bytes
///
/// `bytes` must cover at least the header and directory.
pub fn directory_entries(bytes: &[u8]) -> Result<Vec<DatasetEntry>> {
    let header = ContainerHeader::from_bytes(bytes)?;
    let start = header.directory_offset as usize;
    (0..header.dataset_count as usize)
        .map(|index| {
            let at = start + index * DatasetEntry::SIZE;
            DatasetEntry::from_bytes(bytes.get(at..).ok_or(CoreError::InvalidHeader)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_layout_is_findable() {
        let (prefix, entry) = single_dataset_layout("matrix", 3, 5).unwrap();
        assert_eq!(entry.data_offset, 128);
        assert_eq!(entry.data_size, 120);

        let entries = directory_entries(&prefix).unwrap();
        assert_eq!(entries, [entry]);
        assert_eq!(entries[0].name(), "matrix");
        assert_eq!(entries[0].shape(), (3, 5));
        assert_eq!(entries[0].element_offset(1, 2), 128 + 7 * 8);

        assert_eq!(directory_entries(&prefix[..100]), Err(CoreError::InvalidHeader));
    }

    #[test]
    fn test_header_rejects_corruption() {
        let mut bytes = ContainerHeader::new(1).to_bytes();
        assert!(ContainerHeader::from_bytes(&bytes).is_ok());

        bytes[6] = 9;
        assert_eq!(ContainerHeader::from_bytes(&bytes), Err(CoreError::InvalidHeader));

        let mut bad_magic = ContainerHeader::new(1).to_bytes();
        bad_magic[0] = b'X';
        assert_eq!(ContainerHeader::from_bytes(&bad_magic), Err(CoreError::InvalidHeader));
        assert_eq!(ContainerHeader::from_bytes(&[0u8; 10]), Err(CoreError::InvalidHeader));
    }

    #[test]
    fn test_dataset_names() {
        assert!(DatasetEntry::new("", 1, 1, 128).is_err());
        assert!(DatasetEntry::new("a_name_that_is_far_too_long_for_the_slot", 1, 1, 128).is_err());
        assert_eq!(DatasetEntry::new("A", 2, 2, 128).unwrap().name(), "A");
    }
}
