use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use memchr::memchr;
use tracing::{debug, trace};

use crate::block_reader::BlockReader;
use crate::error::{self, truncate_str, Error, ErrorKind};
use crate::source::{ByteSource, ReadSource, SliceSource};
use crate::utils::{trim_bom, trim_trailing_cr};

/// Default size of a block, i.e. the unit of buffering and reading.
pub const DEFAULT_BLOCK_LEN: usize = 1 << 20;

/// Maximum number of bytes of a file name kept for error messages.
pub const MAX_FILE_NAME_LEN: usize = 255;

enum State {
    Init,
    Streaming,
    Exhausted,
    Failed(Error),
}

/// A line reader working over a fixed-size buffer.
///
/// The buffer holds three blocks: the first two form the window in which lines
/// are searched, the third one receives the block read ahead of time. Once the
/// window start goes past the first block, everything is shifted back by one
/// block and the prefetched block is moved into place. This means there is one
/// actual read per block consumed, whatever the length of the lines.
///
/// This reader recognizes both `LF` & `CRLF` line terminators, but not single
/// `CR`. A leading UTF-8 BOM is skipped.
///
/// A line cannot be longer than a block minus one byte. Exceeding this limit,
/// as well as failing to read the source, makes the reader unusable: all
/// subsequent calls will return the same error.
pub struct LineReader<S> {
    source: Option<S>,
    reader: BlockReader<S>,
    buffer: Vec<u8>,
    block_len: usize,
    data_begin: usize,
    data_end: usize,
    file_name: String,
    file_line: u64,
    state: State,
}

impl<S: ByteSource> LineReader<S> {
    /// Create a new reader with default block size over the provided
    /// [`ByteSource`].
    pub fn from_source(source: S) -> Self {
        Self::with_block_len(DEFAULT_BLOCK_LEN, source)
    }

    /// Create a new reader with the provided block size over the provided
    /// [`ByteSource`].
    ///
    /// Note that the reader will allocate thrice this size when reading its
    /// first line.
    pub fn with_block_len(block_len: usize, source: S) -> Self {
        Self {
            source: Some(source),
            reader: BlockReader::new(),
            buffer: Vec::new(),
            block_len: block_len.max(1),
            data_begin: 0,
            data_end: 0,
            file_name: String::new(),
            file_line: 0,
            state: State::Init,
        }
    }

    fn fail(&mut self, err: Error) -> Error {
        debug!(file = %self.file_name, line = self.file_line, error = ?err.kind(), "line reader failed");
        self.state = State::Failed(err.clone());
        err
    }

    fn io_error(&self, err: std::io::Error) -> Error {
        Error::from(err)
            .in_file(&self.file_name)
            .at_line(self.file_line)
    }

    fn init(&mut self) -> error::Result<()> {
        let block_len = self.block_len;

        self.buffer = vec![0; 3 * block_len];
        self.data_begin = 0;

        let Some(mut source) = self.source.take() else {
            return Err(Error::new(ErrorKind::Internal("byte source already consumed")));
        };

        self.data_end = source
            .read(&mut self.buffer[..2 * block_len])
            .map_err(|err| self.io_error(err))?;

        self.data_begin = trim_bom(&self.buffer[..self.data_end]);

        if self.data_end == 2 * block_len {
            self.reader.init(source);
            self.reader.start_read(2 * block_len, block_len);
        }

        trace!(bytes = self.data_end, "filled initial window");

        self.state = State::Streaming;

        Ok(())
    }

    fn check_invariants(&self) -> error::Result<()> {
        if self.data_begin >= self.data_end {
            return Err(Error::new(ErrorKind::Internal("data_begin >= data_end")));
        }

        if self.data_end > 2 * self.block_len {
            return Err(Error::new(ErrorKind::Internal("data_end > block_len * 2")));
        }

        Ok(())
    }

    fn shift(&mut self) -> error::Result<()> {
        let block_len = self.block_len;

        self.buffer.copy_within(block_len..2 * block_len, 0);
        self.data_begin -= block_len;
        self.data_end -= block_len;

        if self.reader.is_valid() {
            let amt = self
                .reader
                .finish_read(&mut self.buffer)
                .map_err(|err| self.io_error(err))?;

            self.data_end += amt;
            self.buffer.copy_within(2 * block_len..3 * block_len, block_len);
            self.reader.start_read(2 * block_len, block_len);

            trace!(bytes = amt, "shifted window and consumed prefetched block");
        }

        Ok(())
    }

    fn advance(&mut self) -> error::Result<Option<(usize, usize)>> {
        match &self.state {
            State::Init => {
                if let Err(err) = self.init() {
                    return Err(self.fail(err));
                }
            }
            State::Streaming => (),
            State::Exhausted => return Ok(None),
            State::Failed(err) => return Err(err.clone()),
        };

        if self.data_begin == self.data_end {
            debug!(file = %self.file_name, lines = self.file_line, "reached end of data");
            self.state = State::Exhausted;
            return Ok(None);
        }

        self.file_line += 1;

        if let Err(err) = self.check_invariants() {
            return Err(self.fail(err));
        }

        if self.data_begin >= self.block_len {
            if let Err(err) = self.shift() {
                return Err(self.fail(err));
            }
        }

        let window = &self.buffer[self.data_begin..self.data_end];

        let line_end = match memchr(b'\n', window) {
            Some(offset) => self.data_begin + offset,
            None => self.data_end,
        };

        if line_end - self.data_begin + 1 > self.block_len {
            let err = Error::new(ErrorKind::LineTooLong {
                max_len: self.block_len - 1,
            })
            .in_file(&self.file_name)
            .at_line(self.file_line);

            return Err(self.fail(err));
        }

        let start = self.data_begin;

        // NOTE: the last line may lack a trailing newline
        self.data_begin = (line_end + 1).min(self.data_end);

        let end = start + trim_trailing_cr(&self.buffer[start..line_end]).len();

        Ok(Some((start, end)))
    }

    /// Attempt to read the next line.
    ///
    /// Will return `None` if the end of data was reached. The returned line
    /// does not contain its terminator.
    pub fn next_line(&mut self) -> error::Result<Option<&[u8]>> {
        Ok(self.advance()?.map(|(start, end)| &self.buffer[start..end]))
    }

    /// Advance to the next line for which `skip` returns `false` and return
    /// its bounds in the buffer, to be used with [`Self::line`] &
    /// [`Self::line_mut`] until the next call.
    pub(crate) fn next_line_bounds<F>(&mut self, mut skip: F) -> error::Result<Option<(usize, usize)>>
    where
        F: FnMut(&[u8]) -> bool,
    {
        while let Some((start, end)) = self.advance()? {
            if !skip(&self.buffer[start..end]) {
                return Ok(Some((start, end)));
            }
        }

        Ok(None)
    }

    #[inline(always)]
    pub(crate) fn line(&self, (start, end): (usize, usize)) -> &[u8] {
        &self.buffer[start..end]
    }

    // Lines are unescaped in place by the tokenizer.
    #[inline(always)]
    pub(crate) fn line_mut(&mut self, (start, end): (usize, usize)) -> &mut [u8] {
        &mut self.buffer[start..end]
    }

    /// Set the file name used in error messages. It will be truncated to 255
    /// bytes.
    pub fn set_file_name(&mut self, file_name: &str) {
        self.file_name = truncate_str(file_name, MAX_FILE_NAME_LEN).to_string();
    }

    /// Return the file name used in error messages.
    #[inline(always)]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Override the number of the last line read.
    #[inline(always)]
    pub fn set_file_line(&mut self, file_line: u64) {
        self.file_line = file_line;
    }

    /// Return the 1-based number of the last line read, `0` if none was.
    #[inline(always)]
    pub fn file_line(&self) -> u64 {
        self.file_line
    }

    /// Return the size of the blocks used by this reader.
    #[inline(always)]
    pub fn block_len(&self) -> usize {
        self.block_len
    }
}

impl<R: Read> LineReader<ReadSource<R>> {
    /// Create a new reader using the provided reader implementing
    /// [`std::io::Read`].
    ///
    /// Avoid providing a buffered reader because buffering will be handled for
    /// you by the [`LineReader`].
    pub fn from_reader(inner: R) -> Self {
        Self::from_source(ReadSource::new(inner))
    }
}

impl LineReader<ReadSource<File>> {
    /// Open the file at given path and create a reader over it.
    ///
    /// The path is also used as file name in error messages.
    pub fn from_path<P: AsRef<Path>>(path: P) -> error::Result<Self> {
        Self::from_path_with_block_len(path, DEFAULT_BLOCK_LEN)
    }

    pub(crate) fn from_path_with_block_len<P: AsRef<Path>>(
        path: P,
        block_len: usize,
    ) -> error::Result<Self> {
        let path = path.as_ref();
        let file_name = path.to_string_lossy();

        let file = File::open(path).map_err(|err| {
            Error::new(ErrorKind::CannotOpenFile(Arc::new(err)))
                .in_file(truncate_str(&file_name, MAX_FILE_NAME_LEN))
        })?;

        let mut reader = Self::with_block_len(block_len, ReadSource::new(file));
        reader.set_file_name(&file_name);

        Ok(reader)
    }
}

impl<'a> LineReader<SliceSource<'a>> {
    /// Create a new reader over an in-memory byte slice.
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self::from_source(SliceSource::new(bytes))
    }
}
