use std::fmt;

use memchr::{memchr, memchr2};

use crate::error::ErrorKind;
use crate::utils::unescape_in_place;

/// A set of bytes, used to describe trimmed chars or comment starting chars.
#[derive(Default, Clone, Copy, PartialEq, Eq)]
pub struct ByteSet {
    bits: [u64; 4],
}

impl ByteSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn insert(&mut self, byte: u8) {
        self.bits[(byte >> 6) as usize] |= 1 << (byte & 63);
    }

    #[inline(always)]
    pub fn contains(&self, byte: u8) -> bool {
        self.bits[(byte >> 6) as usize] & (1 << (byte & 63)) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == [0; 4]
    }
}

impl From<&[u8]> for ByteSet {
    fn from(bytes: &[u8]) -> Self {
        let mut set = Self::new();

        for byte in bytes {
            set.insert(*byte);
        }

        set
    }
}

impl<const N: usize> From<&[u8; N]> for ByteSet {
    fn from(bytes: &[u8; N]) -> Self {
        Self::from(&bytes[..])
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set()
            .entries((0..=255u8).filter(|b| self.contains(*b)).map(char::from))
            .finish()
    }
}

/// How columns are delimited and escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotePolicy {
    /// Columns are split on every separator, quotes have no meaning.
    None { separator: u8 },
    /// Separators found inside a run of quote chars are part of the column,
    /// and two consecutive quote chars inside such a run stand for a literal
    /// quote char.
    Double { separator: u8, quote: u8 },
}

impl QuotePolicy {
    #[inline(always)]
    pub fn separator(&self) -> u8 {
        match self {
            Self::None { separator } | Self::Double { separator, .. } => *separator,
        }
    }
}

impl Default for QuotePolicy {
    fn default() -> Self {
        Self::None { separator: b',' }
    }
}

/// Which lines must be skipped as comments.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CommentPolicy {
    /// No line is a comment.
    #[default]
    None,
    /// Lines starting with one of the given bytes.
    StartsWith(ByteSet),
    /// Lines that are empty or only contain spaces & tabs.
    EmptyLine,
    /// Both of the above.
    StartsWithOrEmpty(ByteSet),
}

fn is_empty_line(line: &[u8]) -> bool {
    line.iter().all(|b| *b == b' ' || *b == b'\t')
}

impl CommentPolicy {
    #[inline]
    pub fn is_comment(&self, line: &[u8]) -> bool {
        let starts_with = |set: &ByteSet| line.first().is_some_and(|b| set.contains(*b));

        match self {
            Self::None => false,
            Self::StartsWith(set) => starts_with(set),
            Self::EmptyLine => is_empty_line(line),
            Self::StartsWithOrEmpty(set) => starts_with(set) || is_empty_line(line),
        }
    }
}

/// Splits lines into trimmed & unescaped columns.
///
/// Columns are processed in place, which means the given line is overwritten
/// when unescaping, and columns are reported as `(start, end)` bounds into it.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    trim: ByteSet,
    quote: QuotePolicy,
    comment: CommentPolicy,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            trim: ByteSet::from(b" \t"),
            quote: QuotePolicy::default(),
            comment: CommentPolicy::default(),
        }
    }
}

impl Tokenizer {
    pub fn new(trim: ByteSet, quote: QuotePolicy, comment: CommentPolicy) -> Self {
        Self {
            trim,
            quote,
            comment,
        }
    }

    #[inline(always)]
    pub fn is_comment(&self, line: &[u8]) -> bool {
        self.comment.is_comment(line)
    }

    /// Return the offset of the end of the column starting `text`, i.e. the
    /// offset of the next separator or `text.len()`.
    pub fn find_column_end(&self, text: &[u8]) -> Result<usize, ErrorKind> {
        let (separator, quote) = match self.quote {
            QuotePolicy::None { separator } => {
                return Ok(memchr(separator, text).unwrap_or(text.len()));
            }
            QuotePolicy::Double { separator, quote } => (separator, quote),
        };

        let mut pos: usize = 0;

        loop {
            // Here we are moving to next separator or quote
            let Some(offset) = memchr2(separator, quote, &text[pos..]) else {
                return Ok(text.len());
            };

            pos += offset;

            if text[pos] == separator {
                return Ok(pos);
            }

            // Here, `pos` is guaranteed to point to an opening quote
            loop {
                pos += 1;

                match memchr(quote, &text[pos..]) {
                    Some(offset) => pos += offset + 1,
                    None => return Err(ErrorKind::EscapedStringNotClosed),
                }

                if text.get(pos) != Some(&quote) {
                    break;
                }
            }
        }
    }

    fn trim(&self, cell: &[u8]) -> (usize, usize) {
        let mut start: usize = 0;
        let mut end = cell.len();

        while start < end && self.trim.contains(cell[start]) {
            start += 1;
        }

        while end > start && self.trim.contains(cell[end - 1]) {
            end -= 1;
        }

        (start, end)
    }

    // NOTE: trimming happens before unescaping, so that quotes are only
    // considered delimiters when flush with the trimmed cell bounds.
    fn clean(&self, cell: &mut [u8]) -> (usize, usize) {
        let (start, end) = self.trim(cell);

        match self.quote {
            QuotePolicy::None { .. } => (start, end),
            QuotePolicy::Double { quote, .. } => {
                let (s, e) = unescape_in_place(&mut cell[start..end], quote);
                (start + s, start + e)
            }
        }
    }

    /// Split `line` according to the column order table `order`: the cell of
    /// the nth column is written into `sorted[order[n]]`, unless `order[n]` is
    /// `None`, in which case the column is skipped.
    ///
    /// The line must have exactly as many columns as `order` has entries.
    pub fn split_line(
        &self,
        line: &mut [u8],
        order: &[Option<usize>],
        sorted: &mut [Option<(usize, usize)>],
    ) -> Result<(), ErrorKind> {
        let len = line.len();
        let mut cursor = Some(0);

        for target in order {
            let Some(start) = cursor else {
                return Err(ErrorKind::TooFewColumns);
            };

            let end = start + self.find_column_end(&line[start..])?;

            cursor = if end == len { None } else { Some(end + 1) };

            if let Some(i) = target {
                let (s, e) = self.clean(&mut line[start..end]);
                sorted[*i] = Some((start + s, start + e));
            }
        }

        if cursor.is_some() {
            return Err(ErrorKind::TooManyColumns);
        }

        Ok(())
    }

    /// Call `callback` with every trimmed & unescaped column of `line`, in
    /// order.
    pub fn for_each_column<F, E>(&self, line: &mut [u8], mut callback: F) -> Result<(), E>
    where
        F: FnMut(&[u8]) -> Result<(), E>,
        E: From<ErrorKind>,
    {
        let len = line.len();
        let mut start: usize = 0;

        loop {
            let end = start + self.find_column_end(&line[start..])?;

            let (s, e) = self.clean(&mut line[start..end]);
            callback(&line[start + s..start + e])?;

            if end == len {
                return Ok(());
            }

            start = end + 1;
        }
    }
}
