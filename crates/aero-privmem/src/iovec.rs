/// Scatter-gather request buffer made of borrowed segments.
///
/// Offsets are relative to the start of the vector, as if all segments were concatenated.
#[derive(Debug, Default)]
pub struct IoVector<'a> {
    segments: Vec<&'a mut [u8]>,
}

impl<'a> IoVector<'a> {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn from_slice(buf: &'a mut [u8]) -> Self {
        Self {
            segments: vec![buf],
        }
    }

    pub fn push(&mut self, segment: &'a mut [u8]) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[&'a mut [u8]] {
        &self.segments
    }

    /// Total byte length across all segments.
    pub fn size(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }

    /// Copy `src` into the vector starting at `offset`. Returns the number of bytes copied.
    pub fn copy_from_buf(&mut self, offset: usize, src: &[u8]) -> usize {
        let mut skip = offset;
        let mut done = 0usize;
        for seg in self.segments.iter_mut() {
            if done == src.len() {
                break;
            }
            if skip >= seg.len() {
                skip -= seg.len();
                continue;
            }
            let n = (seg.len() - skip).min(src.len() - done);
            seg[skip..skip + n].copy_from_slice(&src[done..done + n]);
            done += n;
            skip = 0;
        }
        done
    }

    /// Copy bytes starting at `offset` out of the vector into `dst`. Returns the number of bytes
    /// copied.
    pub fn copy_to_buf(&self, offset: usize, dst: &mut [u8]) -> usize {
        let mut skip = offset;
        let mut done = 0usize;
        for seg in self.segments.iter() {
            if done == dst.len() {
                break;
            }
            if skip >= seg.len() {
                skip -= seg.len();
                continue;
            }
            let n = (seg.len() - skip).min(dst.len() - done);
            dst[done..done + n].copy_from_slice(&seg[skip..skip + n]);
            done += n;
            skip = 0;
        }
        done
    }

    /// Fill `len` bytes starting at `offset` with `byte`. Returns the number of bytes filled.
    pub fn memset(&mut self, offset: usize, byte: u8, len: usize) -> usize {
        let mut skip = offset;
        let mut done = 0usize;
        for seg in self.segments.iter_mut() {
            if done == len {
                break;
            }
            if skip >= seg.len() {
                skip -= seg.len();
                continue;
            }
            let n = (seg.len() - skip).min(len - done);
            seg[skip..skip + n].fill(byte);
            done += n;
            skip = 0;
        }
        done
    }
}
