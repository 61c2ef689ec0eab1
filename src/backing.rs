use std::fs::{File, OpenOptions};
use std::path::Path;

use memmap2::{Mmap, MmapMut, MmapOptions};

use crate::{DiskMapError, Result};

/// How a table file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open an existing file for reads only.
    ReadOnly,
    /// Open an existing file for reads and writes.
    ReadWrite,
    /// Open for reads and writes, creating the file if it does not exist.
    Create,
}

impl OpenMode {
    pub(crate) fn is_writable(&self) -> bool {
        !matches!(self, OpenMode::ReadOnly)
    }
}

/// Where the table bytes live.
///
/// A handle starts out file-mapped; a read-only handle may transition to
/// `Memory` exactly once via load-to-memory, after which the file is closed
/// and all access goes through the anonymous copy.
#[derive(Debug)]
pub(crate) enum Backing {
    /// Writable mapping of the table file.
    Writable { file: File, map: MmapMut },
    /// Read-only mapping of the table file.
    ReadOnly { file: File, map: Mmap },
    /// Full in-memory copy; always read-only from the caller's view.
    Memory { buf: Vec<u8> },
}

impl Backing {
    /// Opens the table file according to `mode`.
    pub(crate) fn open_file(path: &Path, mode: OpenMode) -> Result<File> {
        let file = match mode {
            OpenMode::ReadOnly => OpenOptions::new().read(true).open(path)?,
            OpenMode::ReadWrite => OpenOptions::new().read(true).write(true).open(path)?,
            OpenMode::Create => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(path)?,
        };
        Ok(file)
    }

    /// Maps `file` writable over its whole length.
    pub(crate) fn map_writable(file: File) -> Result<Backing> {
        // SAFETY: the file is held open by this handle for the lifetime of
        // the mapping, and the crate's single-writer contract means no other
        // process resizes or rewrites it underneath us.
        let map = unsafe { MmapOptions::new().map_mut(&file) }
            .map_err(|e| DiskMapError::OutOfMemory(format!("mmap failed: {e}")))?;
        Ok(Backing::Writable { file, map })
    }

    /// Maps `file` read-only over its whole length.
    pub(crate) fn map_read_only(file: File) -> Result<Backing> {
        // SAFETY: same lifetime argument as `map_writable`; the mapping is
        // PROT_READ so the handle cannot violate the read-only contract.
        let map = unsafe { MmapOptions::new().map(&file) }
            .map_err(|e| DiskMapError::OutOfMemory(format!("mmap failed: {e}")))?;
        Ok(Backing::ReadOnly { file, map })
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        match self {
            Backing::Writable { map, .. } => &map[..],
            Backing::ReadOnly { map, .. } => &map[..],
            Backing::Memory { buf } => &buf[..],
        }
    }

    /// Mutable view of the mapping, or PermissionDenied for read-only and
    /// in-memory handles.
    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        match self {
            Backing::Writable { map, .. } => Ok(&mut map[..]),
            Backing::ReadOnly { .. } | Backing::Memory { .. } => Err(
                DiskMapError::PermissionDenied("table is open read-only".to_string()),
            ),
        }
    }

    #[inline]
    pub(crate) fn is_writable(&self) -> bool {
        matches!(self, Backing::Writable { .. })
    }

    #[inline]
    pub(crate) fn is_resident(&self) -> bool {
        matches!(self, Backing::Memory { .. })
    }

    /// Flushes dirty pages for writable mappings; a no-op otherwise.
    pub(crate) fn sync(&self) -> Result<()> {
        if let Backing::Writable { map, .. } = self {
            map.flush()?;
        }
        Ok(())
    }

    /// Releases the backing in close order: sync, unmap, truncate the file
    /// to `logical_len`, close. Failures are logged, not reported; this runs
    /// from Drop.
    pub(crate) fn shutdown(self, logical_len: u64) {
        if let Backing::Writable { file, map } = self {
            if let Err(error) = map.flush() {
                tracing::warn!(%error, "sync on close failed");
            }
            drop(map);
            if let Err(error) = file.set_len(logical_len) {
                tracing::warn!(%error, logical_len, "truncate on close failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_mode_writability() {
        assert!(!OpenMode::ReadOnly.is_writable());
        assert!(OpenMode::ReadWrite.is_writable());
        assert!(OpenMode::Create.is_writable());
    }

    #[test]
    fn test_writable_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.bin");
        let file = Backing::open_file(&path, OpenMode::Create).unwrap();
        file.set_len(128).unwrap();

        let mut backing = Backing::map_writable(file).unwrap();
        assert!(backing.is_writable());
        assert!(!backing.is_resident());
        assert_eq!(backing.bytes().len(), 128);

        backing.bytes_mut().unwrap()[0..4].copy_from_slice(b"data");
        backing.sync().unwrap();
        backing.shutdown(64);

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 64);
        let file = Backing::open_file(&path, OpenMode::ReadOnly).unwrap();
        let mut backing = Backing::map_read_only(file).unwrap();
        assert_eq!(&backing.bytes()[0..4], b"data");
        assert!(backing.bytes_mut().is_err());
    }

    #[test]
    fn test_memory_backing_is_read_only() {
        let mut backing = Backing::Memory {
            buf: vec![7u8; 32],
        };
        assert!(backing.is_resident());
        assert!(!backing.is_writable());
        assert_eq!(backing.bytes()[31], 7);
        assert!(matches!(
            backing.bytes_mut(),
            Err(DiskMapError::PermissionDenied(_))
        ));
        backing.sync().unwrap();
    }

    #[test]
    fn test_read_write_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bin");
        assert!(Backing::open_file(&path, OpenMode::ReadWrite).is_err());
        assert!(Backing::open_file(&path, OpenMode::Create).is_ok());
    }
}
