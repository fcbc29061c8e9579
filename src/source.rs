use std::io::{self, Read};

/// Something able to produce bytes for a [`LineReader`](crate::LineReader).
///
/// Contrary to [`std::io::Read`], a short read means the source is exhausted:
/// implementations must fill the given buffer as much as they can before
/// returning, and return `0` when no byte is left.
pub trait ByteSource {
    /// Write at most `buffer.len()` bytes into `buffer` and return how many
    /// were written.
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    #[inline]
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        (**self).read(buffer)
    }
}

/// A [`ByteSource`] pulling bytes from anything implementing
/// [`std::io::Read`].
///
/// Partial reads, as they happen with pipes or sockets, are retried until the
/// buffer is full or the reader reaches its end.
///
/// Pass a `&mut R` to keep ownership of the reader.
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let mut written: usize = 0;

        while written < buffer.len() {
            match self.inner.read(&mut buffer[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }

        Ok(written)
    }
}

/// A [`ByteSource`] over an in-memory byte slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> &'a [u8] {
        self.bytes
    }
}

impl ByteSource for SliceSource<'_> {
    #[inline]
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let amt = buffer.len().min(self.bytes.len());

        buffer[..amt].copy_from_slice(&self.bytes[..amt]);
        self.bytes = &self.bytes[amt..];

        Ok(amt)
    }
}
