use bitflags::bitflags;

bitflags! {
    /// Open-time flags handed over by the host block layer.
    ///
    /// The private memory backend accepts these for compatibility but does not consult them: the
    /// image file is always opened read-only and writability comes from the private mapping.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpenFlags: u32 {
        const READ_WRITE = 1 << 0;
        const NO_CACHE = 1 << 1;
        const SNAPSHOT = 1 << 2;
        const NO_FLUSH = 1 << 3;
    }
}

bitflags! {
    /// Per-request flags. Ignored; every request completes against resident memory.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RequestFlags: u32 {
        /// Force unit access.
        const FUA = 1 << 0;
        const NO_FALLBACK = 1 << 1;
    }
}
