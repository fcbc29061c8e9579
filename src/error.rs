use std::sync::Arc;
use std::{error, fmt, io, result};

use bstr::{BStr, BString, ByteSlice};

/// Maximum number of bytes of a column name or content kept in an [`Error`].
pub(crate) const MAX_COLUMN_CONTEXT_LEN: usize = 63;

/// The specific type of an error.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The file could not be opened. Wraps the error reported by the OS.
    CannotOpenFile(Arc<io::Error>),

    /// The underlying byte source failed while being read.
    Io(Arc<io::Error>),

    /// A line, terminator included, did not fit into a single block.
    LineTooLong {
        /// Maximum number of bytes a line can have, terminator excluded.
        max_len: usize,
    },

    /// Buffer bookkeeping went wrong. This should never happen.
    Internal(&'static str),

    /// The header contains a column that was not declared.
    ExtraColumnInHeader,

    /// A declared column could not be found in the header.
    MissingColumnInHeader,

    /// The header contains the same declared column twice.
    DuplicatedColumnInHeader,

    /// The data ended before a header line could be read.
    HeaderMissing,

    /// A line has less columns than the header.
    TooFewColumns,

    /// A line has more columns than the header.
    TooManyColumns,

    /// A quoted column was still open when the line ended.
    EscapedStringNotClosed,

    /// A negative number was found in an unsigned column.
    IntegerMustBePositive,

    /// A number contains something else than digits.
    NoDigit,

    /// A number is too large for its target type.
    IntegerOverflow,

    /// A number is too small for its target type.
    IntegerUnderflow,

    /// A character column does not contain exactly one byte.
    InvalidSingleCharacter,

    /// A string column is not valid UTF-8.
    InvalidUtf8,
}

// NOTE: I/O errors are compared through their `io::ErrorKind` only.
impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        use ErrorKind::*;

        match (self, other) {
            (CannotOpenFile(a), CannotOpenFile(b)) | (Io(a), Io(b)) => a.kind() == b.kind(),
            (LineTooLong { max_len: a }, LineTooLong { max_len: b }) => a == b,
            (Internal(a), Internal(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

/// An error occurring when reading CSV data.
///
/// Besides its [`ErrorKind`], an error carries whatever context was known at
/// the point of failure: the file name, the 1-based line number, and for errors
/// related to a column, its name and content.
///
/// The human readable message is only built when the error is displayed.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    file_name: String,
    line: Option<u64>,
    column_name: Option<String>,
    column_content: Option<BString>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            file_name: String::new(),
            line: None,
            column_name: None,
            column_content: None,
        }
    }

    pub(crate) fn in_file(mut self, file_name: &str) -> Self {
        self.file_name = file_name.to_string();
        self
    }

    pub(crate) fn at_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }

    pub(crate) fn in_column(mut self, name: &str) -> Self {
        self.column_name = Some(truncate_str(name, MAX_COLUMN_CONTEXT_LEN).to_string());
        self
    }

    pub(crate) fn with_content(mut self, content: &[u8]) -> Self {
        let len = content.len().min(MAX_COLUMN_CONTEXT_LEN);
        self.column_content = Some(BString::from(&content[..len]));
        self
    }

    /// Return whether the error was caused by the byte source, i.e. opening
    /// or reading it.
    pub fn is_io_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Io(_) | ErrorKind::CannotOpenFile(_))
    }

    /// Return whether the reader that produced this error is now unusable,
    /// i.e. whether every subsequent read will fail the same way.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Io(_) | ErrorKind::LineTooLong { .. } | ErrorKind::Internal(_)
        )
    }

    /// Return a reference to the underlying [`ErrorKind`].
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Unwraps the error into its underlying [`ErrorKind`].
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Name of the file being read when the error occurred, truncated to 255
    /// bytes.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// 1-based number of the offending line, if the error relates to one.
    pub fn line(&self) -> Option<u64> {
        self.line
    }

    /// Name of the offending column, if the error relates to one.
    pub fn column_name(&self) -> Option<&str> {
        self.column_name.as_deref()
    }

    /// Content of the offending column, if the error relates to one.
    pub fn column_content(&self) -> Option<&BStr> {
        self.column_content.as_ref().map(|content| content.as_bstr())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::new(ErrorKind::Io(Arc::new(err)))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        Self::new(io::ErrorKind::Other, err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::CannotOpenFile(err) | ErrorKind::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorKind::*;

        let file = &self.file_name;
        let line = self.line.unwrap_or(0);
        let name = self.column_name.as_deref().unwrap_or("");
        let content = self
            .column_content
            .as_ref()
            .map(|content| content.as_bstr())
            .unwrap_or_else(|| b"".as_bstr());

        match &self.kind {
            CannotOpenFile(err) => {
                write!(f, "Can not open file \"{}\" because \"{}\".", file, err)
            }
            Io(err) => write!(f, "Can not read file \"{}\" because \"{}\".", file, err),
            LineTooLong { max_len } => write!(
                f,
                "Line number {} in file \"{}\" exceeds the maximum length of {} bytes.",
                line, file, max_len
            ),
            Internal(detail) => write!(f, "Internal error: {}", detail),
            ExtraColumnInHeader => write!(
                f,
                "Extra column \"{}\" in header of file \"{}\"",
                name, file
            ),
            MissingColumnInHeader => write!(
                f,
                "Missing column \"{}\" in header of file \"{}\"",
                name, file
            ),
            DuplicatedColumnInHeader => write!(
                f,
                "Duplicated column \"{}\" in header of file \"{}\"",
                name, file
            ),
            HeaderMissing => write!(f, "Header missing in file \"{}\"", file),
            TooFewColumns => write!(f, "Too few columns in line {} in file \"{}\"", line, file),
            TooManyColumns => write!(f, "Too many columns in line {} in file \"{}\"", line, file),
            EscapedStringNotClosed => write!(
                f,
                "Escaped string was not closed in line {} in file {}",
                line, file
            ),
            IntegerMustBePositive => write!(
                f,
                "The integer {} must be positive or 0 in column {} in file {} in line {}",
                content, name, file, line
            ),
            NoDigit => write!(
                f,
                "The integer {} contains an invalid digit in column {} in file {} in line {}",
                content, name, file, line
            ),
            IntegerOverflow => write!(
                f,
                "The integer {} overflows in column {} in file {} in line {}",
                content, name, file, line
            ),
            IntegerUnderflow => write!(
                f,
                "The integer {} underflows in column {} in file {} in line {}",
                content, name, file, line
            ),
            InvalidSingleCharacter => write!(
                f,
                "The content {} of column {} in file {} in line {} is not a single character.",
                content, name, file, line
            ),
            InvalidUtf8 => write!(
                f,
                "The content {} of column {} in file {} in line {} is not valid UTF-8.",
                content, name, file, line
            ),
        }
    }
}

/// Truncate a string to at most `max_len` bytes without splitting a char.
pub(crate) fn truncate_str(string: &str, max_len: usize) -> &str {
    if string.len() <= max_len {
        return string;
    }

    let mut end = max_len;

    while !string.is_char_boundary(end) {
        end -= 1;
    }

    &string[..end]
}

/// A type alias for `Result<T, linecsv::Error>`.
pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::new(ErrorKind::ExtraColumnInHeader)
            .in_file("2.csv")
            .in_column("b");

        assert_eq!(err.to_string(), "Extra column \"b\" in header of file \"2.csv\"");

        let err = Error::new(ErrorKind::TooFewColumns)
            .in_file("6.csv")
            .at_line(4);

        assert_eq!(err.to_string(), "Too few columns in line 4 in file \"6.csv\"");

        let err = Error::new(ErrorKind::IntegerMustBePositive)
            .in_file("9.csv")
            .at_line(2)
            .in_column("b")
            .with_content(b"-1");

        assert_eq!(
            err.to_string(),
            "The integer -1 must be positive or 0 in column b in file 9.csv in line 2"
        );
        assert_eq!(err.column_content().unwrap(), "-1");
    }

    #[test]
    fn test_field_and_io_messages() {
        let err = Error::new(ErrorKind::InvalidSingleCharacter)
            .in_file("chars.csv")
            .at_line(3)
            .in_column("initial")
            .with_content(b"ab");

        assert_eq!(
            err.to_string(),
            "The content ab of column initial in file chars.csv in line 3 is not a single character."
        );

        let err = Error::new(ErrorKind::InvalidUtf8)
            .in_file("names.csv")
            .at_line(7)
            .in_column("name")
            .with_content(b"j\xffohn");

        assert_eq!(
            err.to_string(),
            "The content j\u{FFFD}ohn of column name in file names.csv in line 7 is not valid UTF-8."
        );

        let err = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
            .in_file("pipe.csv");

        assert_eq!(
            err.to_string(),
            "Can not read file \"pipe.csv\" because \"broken pipe\"."
        );

        let err = Error::new(ErrorKind::Internal("data_begin >= data_end"));

        assert_eq!(err.to_string(), "Internal error: data_begin >= data_end");
    }

    #[test]
    fn test_context_truncation() {
        let long = "é".repeat(40);
        let err = Error::new(ErrorKind::NoDigit)
            .in_column(&long)
            .with_content(&[b'7'; 100]);

        assert_eq!(err.column_name().unwrap().len(), 62);
        assert_eq!(err.column_content().unwrap().len(), MAX_COLUMN_CONTEXT_LEN);
    }

    #[test]
    fn test_io_source() {
        let err = Error::from(io::Error::new(io::ErrorKind::UnexpectedEof, "boom"));

        assert!(err.is_io_error());
        assert!(err.is_fatal());
        assert!(error::Error::source(&err).is_some());
        assert!(!Error::new(ErrorKind::HeaderMissing).is_io_error());
        assert!(!Error::new(ErrorKind::TooFewColumns).is_fatal());
    }
}
