//! Host-facing block driver contract.
//!
//! A host block layer opens backends through a [`BlockDriver`] factory and then issues
//! coroutine-style requests against the returned [`BlockDriverState`]. The request methods
//! return [`Ready`] futures: the work is done synchronously before the future is handed back,
//! so awaiting one never suspends.

use std::future::{ready, Ready};

use crate::sector::assert_sector_aligned;
use crate::{IoVector, OpenFlags, PrivMemDisk, PrivMemOptions, Result, RequestFlags};

pub trait BlockDriver {
    type Options;
    type State: BlockDriverState;

    const FORMAT_NAME: &'static str;
    const PROTOCOL_NAME: &'static str;

    fn file_open(&self, options: &Self::Options, flags: OpenFlags) -> Result<Self::State>;
}

pub trait BlockDriverState {
    fn getlength(&self) -> u64;

    fn co_preadv(
        &self,
        offset: u64,
        bytes: u64,
        qiov: &mut IoVector<'_>,
        flags: RequestFlags,
    ) -> Ready<Result<()>>;

    fn co_pwritev(
        &mut self,
        offset: u64,
        bytes: u64,
        qiov: &IoVector<'_>,
        flags: RequestFlags,
    ) -> Ready<Result<()>>;

    fn co_flush(&mut self) -> Ready<Result<()>> {
        ready(Ok(()))
    }

    fn close(self);
}

/// Factory for [`PrivMemDisk`] instances, registered with the host under `"privmem"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivMemDriver;

impl BlockDriver for PrivMemDriver {
    type Options = PrivMemOptions;
    type State = PrivMemDisk;

    const FORMAT_NAME: &'static str = "privmem";
    const PROTOCOL_NAME: &'static str = "privmem";

    fn file_open(&self, options: &PrivMemOptions, flags: OpenFlags) -> Result<PrivMemDisk> {
        options.validate()?;
        PrivMemDisk::open_path(options.resolved_path(), flags)
    }
}

impl BlockDriverState for PrivMemDisk {
    fn getlength(&self) -> u64 {
        self.len()
    }

    /// # Panics
    ///
    /// Panics if the request is not sector aligned or `bytes` differs from `qiov.size()`.
    fn co_preadv(
        &self,
        offset: u64,
        bytes: u64,
        qiov: &mut IoVector<'_>,
        _flags: RequestFlags,
    ) -> Ready<Result<()>> {
        check_request(offset, bytes, qiov);
        tracing::trace!(offset, bytes, "privmem preadv");
        self.readv(offset, qiov);
        ready(Ok(()))
    }

    /// # Panics
    ///
    /// Panics if the request is not sector aligned or `bytes` differs from `qiov.size()`.
    fn co_pwritev(
        &mut self,
        offset: u64,
        bytes: u64,
        qiov: &IoVector<'_>,
        _flags: RequestFlags,
    ) -> Ready<Result<()>> {
        check_request(offset, bytes, qiov);
        tracing::trace!(offset, bytes, "privmem pwritev");
        self.writev(offset, qiov);
        ready(Ok(()))
    }

    fn close(self) {
        PrivMemDisk::close(self);
    }
}

#[track_caller]
fn check_request(offset: u64, bytes: u64, qiov: &IoVector<'_>) {
    let size = qiov.size();
    assert_eq!(
        bytes, size as u64,
        "request length {bytes} does not match I/O vector size {size}"
    );
    assert_sector_aligned(offset, size);
}
