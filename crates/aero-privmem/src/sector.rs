/// Fixed request granularity for reads and writes.
pub const SECTOR_SIZE: usize = 512;
pub const SECTOR_SHIFT: u32 = 9;

const SECTOR_SIZE_U64: u64 = SECTOR_SIZE as u64;

/// How a single sector at image offset `imgoff` relates to the logical end of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorExtent {
    /// `imgoff + 512 <= size`: all 512 bytes are backed by the mapping.
    Full,
    /// `imgoff < size < imgoff + 512`: only the first `dist` bytes are backed.
    Partial(usize),
    /// `imgoff >= size`: nothing is backed.
    Beyond,
}

impl SectorExtent {
    pub fn classify(imgoff: u64, size: u64) -> Self {
        if imgoff >= size {
            return Self::Beyond;
        }
        match imgoff.checked_add(SECTOR_SIZE_U64) {
            Some(end) if end <= size => Self::Full,
            // `size - imgoff` is in 1..512 here, so the cast cannot truncate.
            _ => Self::Partial((size - imgoff) as usize),
        }
    }

    /// Number of bytes of this sector that live inside the image.
    pub fn backed_len(self) -> usize {
        match self {
            Self::Full => SECTOR_SIZE,
            Self::Partial(dist) => dist,
            Self::Beyond => 0,
        }
    }
}

pub fn is_sector_aligned(offset: u64, len: usize) -> bool {
    offset.is_multiple_of(SECTOR_SIZE_U64) && len.is_multiple_of(SECTOR_SIZE)
}

pub fn lba_to_offset(lba: u64) -> Option<u64> {
    lba.checked_mul(SECTOR_SIZE_U64)
}

/// Panics unless both `offset` and `len` are whole sectors.
#[track_caller]
pub(crate) fn assert_sector_aligned(offset: u64, len: usize) {
    assert!(
        is_sector_aligned(offset, len),
        "unaligned request: offset={offset} len={len} (expected multiples of {SECTOR_SIZE})"
    );
}
