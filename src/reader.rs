use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{self, Error, ErrorKind};
use crate::field::{OverflowPolicy, Row};
use crate::header::{self, IgnoreColumns};
use crate::line_reader::{LineReader, DEFAULT_BLOCK_LEN};
use crate::source::{ByteSource, ReadSource, SliceSource};
use crate::tokenizer::{ByteSet, CommentPolicy, QuotePolicy, Tokenizer};

/// Builds a [`Reader`] with given configuration.
#[derive(Debug, Clone)]
pub struct ReaderBuilder {
    trim: ByteSet,
    quote: QuotePolicy,
    comment: CommentPolicy,
    overflow: OverflowPolicy,
    block_len: usize,
    file_name: Option<String>,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self {
            trim: ByteSet::from(b" \t"),
            quote: QuotePolicy::default(),
            comment: CommentPolicy::default(),
            overflow: OverflowPolicy::default(),
            block_len: DEFAULT_BLOCK_LEN,
            file_name: None,
        }
    }
}

impl ReaderBuilder {
    /// Create a new [`ReaderBuilder`] with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bytes trimmed from both ends of each column.
    ///
    /// Will default to spaces & tabs.
    pub fn trim<T: Into<ByteSet>>(&mut self, chars: T) -> &mut Self {
        self.trim = chars.into();
        self
    }

    /// Set how columns are delimited & escaped.
    ///
    /// Will default to [`QuotePolicy::None`] with a comma separator.
    pub fn quote_policy(&mut self, policy: QuotePolicy) -> &mut Self {
        self.quote = policy;
        self
    }

    /// Set the separator to be used by the created [`Reader`], keeping the
    /// current quoting mode.
    ///
    /// This separator must be a single byte.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.quote = match self.quote {
            QuotePolicy::None { .. } => QuotePolicy::None {
                separator: delimiter,
            },
            QuotePolicy::Double { quote, .. } => QuotePolicy::Double {
                separator: delimiter,
                quote,
            },
        };
        self
    }

    /// Enable quoting using the given quote char.
    ///
    /// This char must be a single byte.
    pub fn quote(&mut self, quote: u8) -> &mut Self {
        self.quote = QuotePolicy::Double {
            separator: self.quote.separator(),
            quote,
        };
        self
    }

    /// Set which lines must be skipped as comments.
    ///
    /// Will default to [`CommentPolicy::None`].
    pub fn comment_policy(&mut self, policy: CommentPolicy) -> &mut Self {
        self.comment = policy;
        self
    }

    /// Set what happens when an integer does not fit its target type.
    ///
    /// Will default to [`OverflowPolicy::Clamp`].
    pub fn overflow_policy(&mut self, policy: OverflowPolicy) -> &mut Self {
        self.overflow = policy;
        self
    }

    /// Set the size of the blocks read from the source. Lines cannot be longer
    /// than a block minus one byte.
    ///
    /// Will default to 1MiB.
    pub fn block_len(&mut self, block_len: usize) -> &mut Self {
        self.block_len = block_len;
        self
    }

    /// Set the file name reported by errors.
    ///
    /// When reading from a path, will default to the path itself.
    pub fn file_name(&mut self, file_name: &str) -> &mut Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(self.trim, self.quote, self.comment)
    }

    fn build<S: ByteSource, const N: usize>(&self, mut lines: LineReader<S>) -> Reader<S, N> {
        if let Some(file_name) = &self.file_name {
            lines.set_file_name(file_name);
        }

        Reader {
            lines,
            tokenizer: self.tokenizer(),
            overflow: self.overflow,
            names: std::array::from_fn(|i| format!("col{}", i + 1)),
            order: (0..N).map(Some).collect(),
            columns: [None; N],
        }
    }

    /// Create a new [`Reader`] over the provided [`ByteSource`].
    pub fn from_source<S: ByteSource, const N: usize>(&self, source: S) -> Reader<S, N> {
        self.build(LineReader::with_block_len(self.block_len, source))
    }

    /// Create a new [`Reader`] using the provided reader implementing
    /// [`std::io::Read`].
    pub fn from_reader<R: Read, const N: usize>(&self, reader: R) -> Reader<ReadSource<R>, N> {
        self.from_source(ReadSource::new(reader))
    }

    /// Create a new [`Reader`] over an in-memory byte slice.
    pub fn from_slice<'a, const N: usize>(&self, bytes: &'a [u8]) -> Reader<SliceSource<'a>, N> {
        self.from_source(SliceSource::new(bytes))
    }

    /// Open the file at given path and create a new [`Reader`] over it.
    pub fn from_path<P: AsRef<Path>, const N: usize>(
        &self,
        path: P,
    ) -> error::Result<Reader<ReadSource<File>, N>> {
        let lines = LineReader::from_path_with_block_len(path, self.block_len)?;

        Ok(self.build(lines))
    }
}

/// The columns of a row, as found in the line.
///
/// Columns are ordered as declared, not as found in the file, and are already
/// trimmed & unescaped.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a, const N: usize> {
    line: &'a [u8],
    columns: &'a [Option<(usize, usize)>; N],
}

impl<'a, const N: usize> RawRow<'a, N> {
    /// Return the column declared at `index`, or `None` if it is missing from
    /// the file or out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&'a [u8]> {
        let (start, end) = (*self.columns.get(index)?)?;
        Some(&self.line[start..end])
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&'a [u8]>> + '_ {
        (0..N).map(|i| self.get(i))
    }

    /// The whole line. Note that unescaping happens in place, so the line
    /// will not be the same as in the file when quoted columns were found.
    #[inline(always)]
    pub fn line(&self) -> &'a [u8] {
        self.line
    }
}

/// An already configured reader decoding lines into `N` declared columns.
///
/// # Configuration
///
/// To configure a [`Reader`], if you need a custom separator, quoting or to
/// tweak the size of the blocks for instance, check out the
/// [`ReaderBuilder`].
///
/// # Errors
///
/// Failing to read the source or meeting a line longer than a block makes the
/// reader unusable: every subsequent call will return the same error. Any
/// other error only concerns the line that produced it, and reading can
/// resume on the next one. See [`Error::is_fatal`].
pub struct Reader<S, const N: usize> {
    lines: LineReader<S>,
    tokenizer: Tokenizer,
    overflow: OverflowPolicy,
    names: [String; N],
    order: Vec<Option<usize>>,
    columns: [Option<(usize, usize)>; N],
}

impl<S: ByteSource, const N: usize> Reader<S, N> {
    pub fn from_source(source: S) -> Self {
        ReaderBuilder::new().from_source(source)
    }

    fn next_bounds(&mut self) -> error::Result<Option<(usize, usize)>> {
        let tokenizer = &self.tokenizer;

        self.lines
            .next_line_bounds(|line| tokenizer.is_comment(line))
    }

    fn line_error(&self, kind: ErrorKind) -> Error {
        Error::new(kind)
            .in_file(self.lines.file_name())
            .at_line(self.lines.file_line())
    }

    fn split(&mut self, bounds: (usize, usize)) -> error::Result<()> {
        self.columns = [None; N];

        let line = self.lines.line_mut(bounds);

        self.tokenizer
            .split_line(line, &self.order, &mut self.columns)
            .map_err(|kind| self.line_error(kind))
    }

    /// Read the header line and match its columns against `names`.
    ///
    /// Columns can be found in any order in the file, but must match the
    /// declared names exactly, unless told otherwise using `ignore`. Comment
    /// lines found before the header are skipped.
    pub fn read_header(&mut self, ignore: IgnoreColumns, names: [&str; N]) -> error::Result<()> {
        let names = names.map(String::from);

        let Some(bounds) = self.next_bounds()? else {
            return Err(Error::new(ErrorKind::HeaderMissing).in_file(self.lines.file_name()));
        };

        let line = self.lines.line_mut(bounds);

        let order = header::resolve(&self.tokenizer, line, &names, ignore).map_err(|err| {
            err.in_file(self.lines.file_name())
                .at_line(self.lines.file_line())
        })?;

        debug!(file = %self.lines.file_name(), columns = order.len(), "read header");

        self.order = order;
        self.names = names;

        Ok(())
    }

    /// Declare the column names without reading a header, meaning the file
    /// columns are expected in declaration order.
    pub fn set_header(&mut self, names: [&str; N]) {
        self.names = names.map(String::from);
        self.order = (0..N).map(Some).collect();
    }

    /// Return whether `name` was declared and can be found in the file.
    pub fn has_column(&self, name: &str) -> bool {
        self.names
            .iter()
            .position(|n| n == name)
            .is_some_and(|i| self.order.contains(&Some(i)))
    }

    /// Read the next row into `row`, returning `false` when the end of data
    /// was reached.
    ///
    /// Targets whose column is missing from the file are left untouched. On
    /// error, targets declared before the offending column may already have
    /// been written.
    pub fn read_row<R: Row<N>>(&mut self, row: &mut R) -> error::Result<bool> {
        let Some(bounds) = self.next_bounds()? else {
            return Ok(false);
        };

        self.split(bounds)?;

        let line = self.lines.line(bounds);

        for (i, column) in self.columns.iter().enumerate() {
            let Some((start, end)) = *column else {
                continue;
            };

            let field = &line[start..end];

            if let Err(kind) = row.set_field(i, field, self.overflow) {
                return Err(self
                    .line_error(kind)
                    .in_column(&self.names[i])
                    .with_content(field));
            }
        }

        Ok(true)
    }

    /// Read the next row without parsing its columns.
    pub fn read_raw_row(&mut self) -> error::Result<Option<RawRow<'_, N>>> {
        let Some(bounds) = self.next_bounds()? else {
            return Ok(None);
        };

        self.split(bounds)?;

        Ok(Some(RawRow {
            line: self.lines.line(bounds),
            columns: &self.columns,
        }))
    }

    /// Read the next line as is, comments included.
    pub fn next_line(&mut self) -> error::Result<Option<&[u8]>> {
        self.lines.next_line()
    }

    #[inline(always)]
    pub fn file_name(&self) -> &str {
        self.lines.file_name()
    }

    pub fn set_file_name(&mut self, file_name: &str) {
        self.lines.set_file_name(file_name);
    }

    /// Return the 1-based number of the last line read.
    #[inline(always)]
    pub fn file_line(&self) -> u64 {
        self.lines.file_line()
    }

    #[inline(always)]
    pub fn set_file_line(&mut self, file_line: u64) {
        self.lines.set_file_line(file_line);
    }
}

impl<R: Read, const N: usize> Reader<ReadSource<R>, N> {
    pub fn from_reader(reader: R) -> Self {
        ReaderBuilder::new().from_reader(reader)
    }
}

impl<'a, const N: usize> Reader<SliceSource<'a>, N> {
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        ReaderBuilder::new().from_slice(bytes)
    }
}

impl<const N: usize> Reader<ReadSource<File>, N> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> error::Result<Self> {
        ReaderBuilder::new().from_path(path)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bstr::BString;

    use super::*;

    fn raw_rows<S: ByteSource, const N: usize>(
        reader: &mut Reader<S, N>,
    ) -> error::Result<Vec<Vec<Option<String>>>> {
        let mut rows = Vec::new();

        while let Some(row) = reader.read_raw_row()? {
            rows.push(
                row.iter()
                    .map(|cell| cell.map(|c| String::from_utf8_lossy(c).into_owned()))
                    .collect::<Vec<_>>(),
            );
        }

        Ok(rows)
    }

    #[test]
    fn test_basic_scenario() -> error::Result<()> {
        for block_len in [1 << 10, 16] {
            let mut reader: Reader<_, 4> = ReaderBuilder::new()
                .block_len(block_len)
                .from_reader(Cursor::new("a,b,c,d\n1,2,3,4\n"));

            reader.read_header(IgnoreColumns::NONE, ["a", "b", "c", "d"])?;

            let mut row = (0i32, 0i32, 0i32, 0i32);

            assert!(reader.read_row(&mut row)?);
            assert_eq!(row, (1, 2, 3, 4));
            assert!(!reader.read_row(&mut row)?);
            assert!(!reader.read_row(&mut row)?);
        }

        Ok(())
    }

    fn quoted_reader(data: &[u8]) -> Reader<SliceSource<'_>, 2> {
        let mut builder = ReaderBuilder::new();
        builder.quote(b'"');
        builder.from_slice(data)
    }

    #[test]
    fn test_slice_reader_outlives_builder() -> error::Result<()> {
        let data = br#"a,b
"1",2
"#.to_vec();

        let mut reader = quoted_reader(&data);
        reader.read_header(IgnoreColumns::NONE, ["a", "b"])?;

        let mut row = [0u8; 2];
        assert!(reader.read_row(&mut row)?);
        assert_eq!(row, [1, 2]);

        Ok(())
    }

    #[test]
    fn test_reordered_header() -> error::Result<()> {
        let mut reader = Reader::from_slice(b"c, b ,a\n3,2,1\n6,5,4");

        reader.read_header(IgnoreColumns::NONE, ["a", "b", "c"])?;

        let mut row = [0u8; 3];
        let mut rows = Vec::new();

        while reader.read_row(&mut row)? {
            rows.push(row);
        }

        assert_eq!(rows, vec![[1, 2, 3], [4, 5, 6]]);
        assert_eq!(reader.file_line(), 3);

        Ok(())
    }

    #[test]
    fn test_header_missing() {
        let mut reader: Reader<_, 1> = ReaderBuilder::new()
            .file_name("empty.csv")
            .comment_policy(CommentPolicy::EmptyLine)
            .from_slice(b"\n   \n");

        let err = reader.read_header(IgnoreColumns::NONE, ["a"]).unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::HeaderMissing);
        assert_eq!(err.to_string(), "Header missing in file \"empty.csv\"");
    }

    #[test]
    fn test_header_errors() {
        let mut reader: Reader<_, 2> = ReaderBuilder::new()
            .file_name("2.csv")
            .from_slice(b"a,b,c\n1,2,3\n");

        let err = reader
            .read_header(IgnoreColumns::NONE, ["a", "b"])
            .unwrap_err();

        assert_eq!(err.to_string(), "Extra column \"c\" in header of file \"2.csv\"");
        assert_eq!(err.line(), Some(1));

        // Defaults survive a failed header
        assert!(reader.has_column("col1"));
        assert!(!reader.has_column("a"));
    }

    #[test]
    fn test_ignore_columns() -> error::Result<()> {
        let mut reader = Reader::from_slice(b"x,b,y\n1,2,3\n4,5,6\n");

        reader.read_header(IgnoreColumns::EXTRA | IgnoreColumns::MISSING, ["a", "b"])?;

        assert!(!reader.has_column("a"));
        assert!(reader.has_column("b"));
        assert!(!reader.has_column("x"));

        let mut row = (String::from("untouched"), 0u64);

        assert!(reader.read_row(&mut row)?);
        assert_eq!(row, ("untouched".to_string(), 2));
        assert!(reader.read_row(&mut row)?);
        assert_eq!(row.1, 5);
        assert!(!reader.read_row(&mut row)?);

        Ok(())
    }

    #[test]
    fn test_has_column_is_pure() -> error::Result<()> {
        let mut reader = Reader::from_slice(b"a,b\n1,2\n");
        reader.read_header(IgnoreColumns::NONE, ["a", "b"])?;

        for _ in 0..3 {
            assert!(reader.has_column("a"));
            assert!(!reader.has_column("z"));
        }

        assert_eq!(reader.file_line(), 1);

        let mut row = [0u8; 2];
        assert!(reader.read_row(&mut row)?);
        assert_eq!(row, [1, 2]);

        Ok(())
    }

    #[test]
    fn test_set_header() -> error::Result<()> {
        let mut reader = Reader::from_slice(b"1,2\n3,4\n");

        assert!(reader.has_column("col2"));

        reader.set_header(["x", "y"]);

        assert!(reader.has_column("x"));
        assert!(!reader.has_column("col1"));

        let mut row = (0u8, 0u8);
        assert!(reader.read_row(&mut row)?);
        assert_eq!(row, (1, 2));

        Ok(())
    }

    #[test]
    fn test_column_count_errors() -> error::Result<()> {
        let mut reader: Reader<_, 2> = ReaderBuilder::new()
            .file_name("6.csv")
            .from_slice(b"a,b\n1,2\n1\n1,2,3\n5,6\n");

        reader.read_header(IgnoreColumns::NONE, ["a", "b"])?;

        let mut row = (0u8, 0u8);

        assert!(reader.read_row(&mut row)?);

        let err = reader.read_row(&mut row).unwrap_err();
        assert_eq!(err.to_string(), "Too few columns in line 3 in file \"6.csv\"");
        assert!(!err.is_fatal());

        let err = reader.read_row(&mut row).unwrap_err();
        assert_eq!(err.to_string(), "Too many columns in line 4 in file \"6.csv\"");

        // Row errors do not prevent reading further
        assert!(reader.read_row(&mut row)?);
        assert_eq!(row, (5, 6));

        Ok(())
    }

    #[test]
    fn test_field_errors() -> error::Result<()> {
        let mut reader: Reader<_, 2> = ReaderBuilder::new()
            .file_name("9.csv")
            .overflow_policy(OverflowPolicy::Error)
            .from_slice(b"a,b\n1,-1\n1,300\nx,1\n");

        reader.read_header(IgnoreColumns::NONE, ["a", "b"])?;

        let mut row = (0u8, 0u8);

        let err = reader.read_row(&mut row).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The integer -1 must be positive or 0 in column b in file 9.csv in line 2"
        );
        assert_eq!(err.column_name(), Some("b"));
        assert_eq!(err.column_content().map(|c| c.to_vec()), Some(b"-1".to_vec()));

        let err = reader.read_row(&mut row).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IntegerOverflow);
        assert_eq!(
            err.to_string(),
            "The integer 300 overflows in column b in file 9.csv in line 3"
        );

        let err = reader.read_row(&mut row).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NoDigit);
        assert_eq!(err.column_name(), Some("a"));

        assert!(!reader.read_row(&mut row)?);

        Ok(())
    }

    #[test]
    fn test_char_fields() -> error::Result<()> {
        let mut reader: Reader<_, 1> = ReaderBuilder::new()
            .file_name("chars.csv")
            .from_slice(b"a\nz\n\xe9\nok\n");

        reader.read_header(IgnoreColumns::NONE, ["a"])?;

        let mut row = ['x'];

        assert!(reader.read_row(&mut row)?);
        assert_eq!(row, ['z']);

        let err = reader.read_row(&mut row).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidSingleCharacter);
        assert_eq!(err.line(), Some(3));
        assert_eq!(row, ['z']);

        let err = reader.read_row(&mut row).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidSingleCharacter);
        assert_eq!(
            err.to_string(),
            "The content ok of column a in file chars.csv in line 4 is not a single character."
        );

        Ok(())
    }

    #[test]
    fn test_comments() -> error::Result<()> {
        let data = b"# generated\n\nname,age\n  \n# john is skipped\nlucy,32\n";

        let mut reader: Reader<_, 2> = ReaderBuilder::new()
            .comment_policy(CommentPolicy::StartsWithOrEmpty(ByteSet::from(b"#")))
            .from_slice(data);

        reader.read_header(IgnoreColumns::NONE, ["name", "age"])?;

        let mut row = (String::new(), 0u8);
        assert!(reader.read_row(&mut row)?);
        assert_eq!(row, ("lucy".to_string(), 32));
        assert_eq!(reader.file_line(), 6);
        assert!(!reader.read_row(&mut row)?);

        Ok(())
    }

    #[test]
    fn test_next_line_keeps_comments() -> error::Result<()> {
        let mut reader: Reader<_, 1> = ReaderBuilder::new()
            .comment_policy(CommentPolicy::StartsWith(ByteSet::from(b"#")))
            .from_slice(b"#skip\nvalue\n");

        assert_eq!(reader.next_line()?, Some(&b"#skip"[..]));

        let mut row = [String::new()];
        assert!(reader.read_row(&mut row)?);
        assert_eq!(row[0], "value");

        Ok(())
    }

    #[test]
    fn test_quoted_rows() -> error::Result<()> {
        let data = "name,surname,age\n\"john\",\"landy, the \"\"everlasting\"\" bastard\",45\nlucy,rose,\"67\"\n";

        let mut reader: Reader<_, 3> = ReaderBuilder::new().quote(b'"').from_slice(data.as_bytes());

        reader.read_header(IgnoreColumns::NONE, ["name", "surname", "age"])?;

        let mut row = (String::new(), BString::default(), 0u32);

        assert!(reader.read_row(&mut row)?);
        assert_eq!(row.0, "john");
        assert_eq!(row.1, "landy, the \"everlasting\" bastard");
        assert_eq!(row.2, 45);

        assert!(reader.read_row(&mut row)?);
        assert_eq!(row.2, 67);

        Ok(())
    }

    #[test]
    fn test_escaped_string_not_closed() -> error::Result<()> {
        let mut reader: Reader<_, 2> = ReaderBuilder::new()
            .quote(b'"')
            .file_name("8.csv")
            .from_slice(b"a,b\n\"1,2\n3,4\n");

        reader.read_header(IgnoreColumns::NONE, ["a", "b"])?;

        let err = reader.read_raw_row().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Escaped string was not closed in line 2 in file 8.csv"
        );

        let row = reader.read_raw_row()?.unwrap();
        assert_eq!(row.get(0), Some(&b"3"[..]));

        Ok(())
    }

    #[test]
    fn test_delimiter_and_trim() -> error::Result<()> {
        let mut reader: Reader<_, 2> = ReaderBuilder::new()
            .delimiter(b'\t')
            .trim(b"_")
            .from_slice(b"__a__\tb\n x \t_y_\n");

        reader.read_header(IgnoreColumns::NONE, ["a", "b"])?;

        assert_eq!(
            raw_rows(&mut reader)?,
            vec![vec![Some(" x ".to_string()), Some("y".to_string())]]
        );

        Ok(())
    }

    #[test]
    fn test_raw_rows_with_missing_columns() -> error::Result<()> {
        let mut reader = Reader::from_slice(b"b\n1\n2\n");

        reader.read_header(IgnoreColumns::MISSING, ["a", "b"])?;

        assert_eq!(
            raw_rows(&mut reader)?,
            vec![
                vec![None, Some("1".to_string())],
                vec![None, Some("2".to_string())]
            ]
        );

        Ok(())
    }

    #[test]
    fn test_line_too_long_is_fatal() -> error::Result<()> {
        let mut reader: Reader<_, 1> = ReaderBuilder::new()
            .block_len(8)
            .from_slice(b"a\n123456789\n1\n");

        reader.read_header(IgnoreColumns::NONE, ["a"])?;

        let mut row = [0u32];

        let err = reader.read_row(&mut row).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::LineTooLong { max_len: 7 }));
        assert!(err.is_fatal());

        let err = reader.read_row(&mut row).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::LineTooLong { .. }));

        Ok(())
    }

    #[test]
    fn test_agrees_with_csv_crate() -> error::Result<()> {
        let data = "name,surname,age\n\"john\",\"landy, the \"\"everlasting\"\" bastard\",45\nlucy,rose,\"67\"\n\"karine\",\"loucan, the \"\"\"\"flying\"\"\"\" fish\",33\n,,\n\"\",\"\",\"\"\n";

        let mut expected = Vec::new();

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(data.as_bytes());

        for record in csv_reader.byte_records() {
            let record = record.unwrap();

            expected.push(
                record
                    .iter()
                    .map(|cell| Some(String::from_utf8_lossy(cell).into_owned()))
                    .collect::<Vec<_>>(),
            );
        }

        for block_len in [1 << 10, 64] {
            let mut reader: Reader<_, 3> = ReaderBuilder::new()
                .quote(b'"')
                .trim(ByteSet::new())
                .block_len(block_len)
                .from_slice(data.as_bytes());

            assert_eq!(raw_rows(&mut reader)?, expected);
        }

        Ok(())
    }
}
