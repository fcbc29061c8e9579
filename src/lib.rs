/*!
The `linecsv` crate provides a streaming reader of CSV data decoding each line
into a fixed number of typed columns, declared at compile time.

It is geared towards large, machine-generated files where one line is one
record: quoted cells are supported, but they cannot span multiple lines. In
exchange, the whole pipeline runs over a single fixed-size buffer, never
allocates per row, and never panics on malformed data.

# Examples

*Reading typed rows from a file*

```
use linecsv::{IgnoreColumns, Reader};

let mut reader = Reader::from_path("ram.csv")?;
reader.read_header(IgnoreColumns::EXTRA, ["vendor", "size", "speed"])?;

let mut row = (String::new(), 0u32, 0.0f64);

while reader.read_row(&mut row)? {
    dbg!(&row);
}
```

*Using a builder to configure your reader*

```
use linecsv::{ByteSet, CommentPolicy, ReaderBuilder};

let mut reader = ReaderBuilder::new()
    .delimiter(b';')
    .quote(b'"')
    .comment_policy(CommentPolicy::StartsWith(ByteSet::from(b"#")))
    .from_path("data.csv")?;
```

*Accessing columns without parsing them*

```
use linecsv::{IgnoreColumns, Reader};

let mut reader = Reader::from_slice(b"b,a\n2,1\n");
reader.read_header(IgnoreColumns::NONE, ["a", "b"])?;

while let Some(row) = reader.read_raw_row()? {
    // Columns are in declaration order, trimmed & unescaped
    dbg!(row.get(0));
}
```

*Reading lines as fast as possible*

```
use linecsv::LineReader;

let mut reader = LineReader::from_path("data.csv")?;

while let Some(line) = reader.next_line()? {
    dbg!(line);
}
```

# Readers

- [`Reader`], [`ReaderBuilder`]: a streaming reader matching a header against
  declared column names, and delivering rows as tuples or arrays of types
  implementing [`FromField`], or as zero-copy [`RawRow`].
- [`LineReader`]: a streaming zero-copy line splitter that does not handle
  columns at all.

Both can read from a path, anything implementing [`std::io::Read`], an
in-memory slice, or any custom [`ByteSource`].

# Design notes

## Buffering

The [`LineReader`] allocates a buffer of three blocks (1MiB each by default)
once, when reading its first line, and never grows it. The first two blocks
form a window in which lines are searched using
[`memchr`](https://docs.rs/memchr/latest/memchr/), while the third one receives
the block read ahead. When the window start moves past the first block,
everything is shifted back by one block.

This means a line, terminator included, cannot be longer than a block. Such a
line yields [`ErrorKind::LineTooLong`] and the reader cannot be used anymore.

## Columns

Columns are split, trimmed & unescaped in place, directly in the line buffer.
Header columns are matched against declared names to build a column order
table, so that columns can be found in any order in the file.

Conversions never allocate except for owned string types, and integer
overflows are handled according to an [`OverflowPolicy`].

# Caveats

## Regarding line terminators

Line terminators are expected to be either CRLF or single LF, but not single
CR. A leading UTF-8 BOM is skipped.

## Regarding quotes

Quotes only delimit a cell when they sit flush with its trimmed bounds. Quotes
found in the middle of a cell still protect separators from splitting, but
are kept as is.
*/
mod block_reader;
mod error;
mod field;
mod header;
mod line_reader;
mod reader;
mod source;
mod tokenizer;
mod utils;

pub use error::{Error, ErrorKind, Result};
pub use field::{FromField, OverflowPolicy, Row};
pub use header::IgnoreColumns;
pub use line_reader::{LineReader, DEFAULT_BLOCK_LEN, MAX_FILE_NAME_LEN};
pub use reader::{RawRow, Reader, ReaderBuilder};
pub use source::{ByteSource, ReadSource, SliceSource};
pub use tokenizer::{ByteSet, CommentPolicy, QuotePolicy, Tokenizer};
