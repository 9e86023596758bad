//! Private, copy-on-write memory disk backend.
//!
//! [`PrivMemDisk`] exposes an existing image file as a sector-addressed virtual disk whose
//! modifications never reach the file. The image is mapped `MAP_PRIVATE`, so every process that
//! inherits the mapping through `fork()` (e.g. a snapshot-restoring worker) gets its own,
//! independently mutable copy without copying the whole image up front.
//!
//! - [`PrivMemDisk`]: open/close, length, sector-granular reads and writes
//! - [`PrivMemDriver`]: [`BlockDriver`] factory used by host block layers
//! - [`IoVector`]: scatter-gather buffers for the vectored request path
//!
//! Reads past the logical end of the image are zero-filled and writes there are discarded; the
//! disk never grows.

mod disk;
mod driver;
mod error;
mod flags;
mod iovec;
mod options;
mod sector;

pub use disk::PrivMemDisk;
pub use driver::{BlockDriver, BlockDriverState, PrivMemDriver};
pub use error::{PrivMemError, Result};
pub use flags::{OpenFlags, RequestFlags};
pub use iovec::IoVector;
pub use options::{strip_protocol, PrivMemOptions};
pub use sector::{is_sector_aligned, lba_to_offset, SectorExtent, SECTOR_SHIFT, SECTOR_SIZE};

#[cfg(test)]
mod proptests;
