use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};

use crate::options::strip_protocol;
use crate::sector::{assert_sector_aligned, lba_to_offset, SectorExtent, SECTOR_SIZE};
use crate::{IoVector, OpenFlags, PrivMemError, Result};

/// A virtual disk backed by a private, copy-on-write mapping of an image file.
///
/// The image is opened read-only and mapped `MAP_PRIVATE` with read/write protection. Writes
/// land in anonymous copies of the touched pages: they are never written back to the file and
/// are invisible to any other mapping of it, including the copies that a `fork()`ed child
/// receives. This makes the disk cheap to hand to many forked workers that all restart from
/// the same image.
///
/// The logical size is the file length observed at open time. Sectors that straddle or lie
/// past that size read as zero beyond the end, and writes to those bytes are discarded.
pub struct PrivMemDisk {
    // Field order matters: the mapping is released before the descriptor.
    buffer: MmapMut,
    _file: File,
    size: u64,
    path: PathBuf,
}

impl PrivMemDisk {
    /// Open `filename`, stripping an optional `<scheme>:` prefix first.
    ///
    /// `flags` are accepted for host compatibility and ignored.
    pub fn open(filename: &str, flags: OpenFlags) -> Result<Self> {
        Self::open_path(Path::new(strip_protocol(filename)), flags)
    }

    pub fn open_path(path: &Path, _flags: OpenFlags) -> Result<Self> {
        match Self::map_image(path) {
            Ok(disk) => {
                tracing::debug!(path = %path.display(), size = disk.size, "privmem image mapped");
                Ok(disk)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "privmem open failed");
                Err(err)
            }
        }
    }

    fn map_image(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| PrivMemError::invalid_image(path, e))?;
        let meta = file
            .metadata()
            .map_err(|e| PrivMemError::invalid_image(path, e))?;
        if !meta.is_file() {
            return Err(PrivMemError::invalid_image(path, "not a regular file"));
        }

        let size = meta.len();
        let map_len = usize::try_from(size).map_err(|_| PrivMemError::MapFailed {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "image does not fit in the address space",
            ),
        })?;

        // SAFETY: the mapping is private, so our writes never reach the file. Pages that have
        // not been written yet still reflect the file, so it must not be truncated or modified
        // by others while the disk is open; image files are treated as immutable inputs.
        let buffer = unsafe { MmapOptions::new().len(map_len).map_copy(&file) }.map_err(
            |source| PrivMemError::MapFailed {
                path: path.to_path_buf(),
                source,
            },
        )?;

        Ok(Self {
            buffer,
            _file: file,
            size,
            path: path.to_path_buf(),
        })
    }

    /// Unmap the image and close its descriptor.
    pub fn close(self) {
        tracing::debug!(path = %self.path.display(), "privmem image closed");
        drop(self);
    }

    /// Logical size in bytes, fixed at open time.
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read `buf.len()` bytes starting at `offset`.
    ///
    /// Bytes past the logical end of the image read as zero.
    ///
    /// # Panics
    ///
    /// Panics if `offset` or `buf.len()` is not a multiple of [`SECTOR_SIZE`].
    pub fn read(&self, offset: u64, buf: &mut [u8]) {
        assert_sector_aligned(offset, buf.len());
        for (i, sector) in buf.chunks_exact_mut(SECTOR_SIZE).enumerate() {
            let imgoff = image_offset(offset, i * SECTOR_SIZE);
            let backed = SectorExtent::classify(imgoff, self.size).backed_len();
            if backed > 0 {
                let start = imgoff as usize;
                sector[..backed].copy_from_slice(&self.buffer[start..start + backed]);
            }
            sector[backed..].fill(0);
        }
    }

    /// Write `buf` starting at `offset`.
    ///
    /// Bytes that fall past the logical end of the image are silently dropped.
    ///
    /// # Panics
    ///
    /// Panics if `offset` or `buf.len()` is not a multiple of [`SECTOR_SIZE`].
    pub fn write(&mut self, offset: u64, buf: &[u8]) {
        assert_sector_aligned(offset, buf.len());
        for (i, sector) in buf.chunks_exact(SECTOR_SIZE).enumerate() {
            let imgoff = image_offset(offset, i * SECTOR_SIZE);
            let backed = SectorExtent::classify(imgoff, self.size).backed_len();
            if backed == 0 {
                continue;
            }
            let start = imgoff as usize;
            self.buffer[start..start + backed].copy_from_slice(&sector[..backed]);
        }
    }

    /// # Panics
    ///
    /// Panics if `buf.len()` is not a multiple of [`SECTOR_SIZE`] or `lba` overflows.
    pub fn read_sectors(&self, lba: u64, buf: &mut [u8]) {
        self.read(lba_offset(lba), buf);
    }

    /// # Panics
    ///
    /// Panics if `buf.len()` is not a multiple of [`SECTOR_SIZE`] or `lba` overflows.
    pub fn write_sectors(&mut self, lba: u64, buf: &[u8]) {
        self.write(lba_offset(lba), buf);
    }

    /// Vectored [`PrivMemDisk::read`]; the request length is `qiov.size()`.
    pub fn readv(&self, offset: u64, qiov: &mut IoVector<'_>) {
        let len = qiov.size();
        assert_sector_aligned(offset, len);
        for bufoff in (0..len).step_by(SECTOR_SIZE) {
            let imgoff = image_offset(offset, bufoff);
            let backed = SectorExtent::classify(imgoff, self.size).backed_len();
            if backed > 0 {
                let start = imgoff as usize;
                qiov.copy_from_buf(bufoff, &self.buffer[start..start + backed]);
            }
            qiov.memset(bufoff + backed, 0, SECTOR_SIZE - backed);
        }
    }

    /// Vectored [`PrivMemDisk::write`]; the request length is `qiov.size()`.
    pub fn writev(&mut self, offset: u64, qiov: &IoVector<'_>) {
        let len = qiov.size();
        assert_sector_aligned(offset, len);
        for bufoff in (0..len).step_by(SECTOR_SIZE) {
            let imgoff = image_offset(offset, bufoff);
            let backed = SectorExtent::classify(imgoff, self.size).backed_len();
            if backed == 0 {
                continue;
            }
            let start = imgoff as usize;
            qiov.copy_to_buf(bufoff, &mut self.buffer[start..start + backed]);
        }
    }
}

impl fmt::Debug for PrivMemDisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivMemDisk")
            .field("path", &self.path)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

// Offsets that saturate are past any mappable image and classify as `Beyond`.
fn image_offset(offset: u64, bufoff: usize) -> u64 {
    offset.saturating_add(bufoff as u64)
}

#[track_caller]
fn lba_offset(lba: u64) -> u64 {
    match lba_to_offset(lba) {
        Some(offset) => offset,
        None => panic!("lba {lba} overflows the byte offset range"),
    }
}
