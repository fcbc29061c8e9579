use std::io;
use std::ops::Range;

use crate::source::ByteSource;

// NOTE: reads are split in two halves so the line reader can declare which
// region will receive the next block as soon as it has been vacated, while the
// actual read only happens when the window needs it. There is no background
// thread involved, `finish_read` is the blocking call.
pub(crate) struct BlockReader<S> {
    source: Option<S>,
    pending: Option<Range<usize>>,
}

impl<S: ByteSource> BlockReader<S> {
    pub(crate) fn new() -> Self {
        Self {
            source: None,
            pending: None,
        }
    }

    pub(crate) fn init(&mut self, source: S) {
        self.source = Some(source);
    }

    #[inline(always)]
    pub(crate) fn is_valid(&self) -> bool {
        self.source.is_some()
    }

    #[inline(always)]
    pub(crate) fn start_read(&mut self, offset: usize, len: usize) {
        self.pending = Some(offset..offset + len);
    }

    /// Perform the read previously requested through `start_read` and return
    /// the number of bytes written into `buffer`.
    ///
    /// The source is released as soon as it comes back short.
    pub(crate) fn finish_read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let (Some(source), Some(range)) = (self.source.as_mut(), self.pending.take()) else {
            return Ok(0);
        };

        let requested = range.len();
        let amt = source.read(&mut buffer[range])?;

        if amt < requested {
            self.source = None;
        }

        Ok(amt)
    }
}
