const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

#[inline]
pub fn trim_trailing_cr(line: &[u8]) -> &[u8] {
    let len = line.len();

    if !line.is_empty() && line[len - 1] == b'\r' {
        &line[..len - 1]
    } else {
        line
    }
}

/// Return the number of bytes to skip at the beginning of `input` to get past
/// a UTF-8 BOM.
#[inline]
pub fn trim_bom(input: &[u8]) -> usize {
    if input.starts_with(UTF8_BOM) {
        UTF8_BOM.len()
    } else {
        0
    }
}

/// Strip surrounding quotes and collapse doubled quotes, in place.
///
/// Only cells starting and ending with the quote char are unescaped. Returns
/// the bounds of the unescaped cell inside `cell`.
pub fn unescape_in_place(cell: &mut [u8], quote: u8) -> (usize, usize) {
    let len = cell.len();

    if len < 2 || cell[0] != quote || cell[len - 1] != quote {
        return (0, len);
    }

    let end = len - 1;
    let mut out: usize = 1;
    let mut i: usize = 1;

    while i < end {
        if cell[i] == quote && i + 1 < end && cell[i + 1] == quote {
            i += 1;
        }

        cell[out] = cell[i];
        out += 1;
        i += 1;
    }

    (1, out)
}
