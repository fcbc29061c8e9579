use std::ops::{BitOr, BitOrAssign};

use bstr::ByteSlice;
use tracing::trace;

use crate::error::{Error, ErrorKind};
use crate::tokenizer::Tokenizer;

/// Flags telling a [`Reader`](crate::Reader) which header mismatches should
/// be tolerated. Flags can be combined using `|`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IgnoreColumns(u8);

impl IgnoreColumns {
    /// Header must contain exactly the declared columns, in any order.
    pub const NONE: Self = Self(0);

    /// Columns of the header that were not declared will be skipped.
    pub const EXTRA: Self = Self(1);

    /// Declared columns missing from the header will never be written when
    /// reading rows, so that their target keeps its former value.
    pub const MISSING: Self = Self(2);

    #[inline(always)]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for IgnoreColumns {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for IgnoreColumns {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Build the column order table matching the columns of a header line to
/// declared names.
///
/// Each entry of the returned table corresponds to a column of the line and
/// holds the index of the matching declared name, or `None` if the column must
/// be skipped.
pub(crate) fn resolve<const N: usize>(
    tokenizer: &Tokenizer,
    line: &mut [u8],
    names: &[String; N],
    ignore: IgnoreColumns,
) -> Result<Vec<Option<usize>>, Error> {
    let mut order = Vec::with_capacity(N);
    let mut found = [false; N];

    tokenizer.for_each_column(line, |cell| -> Result<(), Error> {
        match names.iter().position(|name| name.as_bytes() == cell) {
            Some(i) => {
                if found[i] {
                    return Err(Error::new(ErrorKind::DuplicatedColumnInHeader)
                        .in_column(&cell.to_str_lossy()));
                }

                found[i] = true;
                order.push(Some(i));
            }
            None => {
                if !ignore.contains(IgnoreColumns::EXTRA) {
                    return Err(Error::new(ErrorKind::ExtraColumnInHeader)
                        .in_column(&cell.to_str_lossy()));
                }

                order.push(None);
            }
        }

        Ok(())
    })?;

    if !ignore.contains(IgnoreColumns::MISSING) {
        if let Some(i) = found.iter().position(|f| !f) {
            return Err(Error::new(ErrorKind::MissingColumnInHeader).in_column(&names[i]));
        }
    }

    trace!(?order, "resolved header");

    Ok(order)
}
