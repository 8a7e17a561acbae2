//! File helpers shared by the codecs
//!
//! Every write lands in a sibling temporary file that is renamed over the
//! destination once complete, so a failed write leaves the previous file
//! (or no file) in place.

use crate::error::{Result, StoreError};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Temporary sibling used while `path` is being written
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `path` through a temporary sibling
pub fn write_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let temp = temp_path(path);
    let written = File::create(&temp).and_then(|file| {
        let mut writer = BufWriter::new(file);
        fill(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    });
    match written {
        Ok(()) => commit(&temp, path),
        Err(source) => {
            discard(&temp);
            Err(StoreError::io(temp, source))
        }
    }
}

/// Create `path` with `len` zero bytes, replacing any existing file
pub fn create_preallocated(path: &Path, len: u64) -> Result<()> {
    File::create(path)
        .and_then(|file| file.set_len(len))
        .map_err(|source| StoreError::io(path, source))
}

/// Write `bytes` at `offset` of an existing file
pub fn write_at(path: &Path, offset: u64, bytes: &[u8]) -> Result<()> {
    OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|mut file| {
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(bytes)?;
            file.sync_data()
        })
        .map_err(|source| StoreError::io(path, source))
}

/// Move a finished temporary file into place
pub fn commit(temp: &Path, path: &Path) -> Result<()> {
    fs::rename(temp, path).map_err(|source| StoreError::io(path, source))
}

/// Best-effort removal of an abandoned temporary file
pub fn discard(temp: &Path) {
    let _ = fs::remove_file(temp);
}

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| StoreError::io(path, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_atomic(&path, |w| w.write_all(b"first")).unwrap();
        write_atomic(&path, |w| w.write_all(b"second")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_atomic(&path, |w| w.write_all(b"kept")).unwrap();
        let err = write_atomic(&path, |_| Err(std::io::Error::other("boom"))).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_preallocate_then_write_at() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        create_preallocated(&path, 8).unwrap();
        write_at(&path, 4, &[1, 2]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![0, 0, 0, 0, 1, 2, 0, 0]);
    }

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(temp_path(Path::new("/data/a.mtx")), PathBuf::from("/data/a.mtx.tmp"));
    }
}
