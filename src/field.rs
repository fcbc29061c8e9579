use bstr::BString;

use crate::error::ErrorKind;

/// What to do when an integer does not fit into its target type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Stop parsing and use the type's maximum (resp. minimum).
    #[default]
    Clamp,
    /// Stop parsing and keep the value accumulated before the digit that
    /// would have overflowed. The resulting value is therefore meaningless,
    /// but no error is reported.
    Ignore,
    /// Report an [`ErrorKind::IntegerOverflow`] (resp.
    /// [`ErrorKind::IntegerUnderflow`]).
    Error,
}

/// A type that can be parsed from the trimmed & unescaped bytes of a column.
pub trait FromField: Sized {
    fn from_field(field: &[u8], overflow: OverflowPolicy) -> Result<Self, ErrorKind>;
}

impl FromField for char {
    /// The field must be made of exactly one ASCII byte.
    fn from_field(field: &[u8], _overflow: OverflowPolicy) -> Result<Self, ErrorKind> {
        match field {
            [byte] if byte.is_ascii() => Ok(char::from(*byte)),
            _ => Err(ErrorKind::InvalidSingleCharacter),
        }
    }
}

impl FromField for String {
    fn from_field(field: &[u8], _overflow: OverflowPolicy) -> Result<Self, ErrorKind> {
        std::str::from_utf8(field)
            .map(String::from)
            .map_err(|_| ErrorKind::InvalidUtf8)
    }
}

impl FromField for Vec<u8> {
    #[inline]
    fn from_field(field: &[u8], _overflow: OverflowPolicy) -> Result<Self, ErrorKind> {
        Ok(field.to_vec())
    }
}

impl FromField for BString {
    #[inline]
    fn from_field(field: &[u8], _overflow: OverflowPolicy) -> Result<Self, ErrorKind> {
        Ok(BString::from(field))
    }
}

trait Integer: Copy {
    const ZERO: Self;
    const MIN: Self;
    const MAX: Self;

    /// `self * 10 + digit`, if it does not overflow.
    fn push_digit(self, digit: u8) -> Option<Self>;

    /// `self * 10 - digit`, if it does not underflow.
    fn push_negative_digit(self, digit: u8) -> Option<Self>;
}

macro_rules! impl_integer {
    ($($t: ty),*) => {
        $(
            impl Integer for $t {
                const ZERO: Self = 0;
                const MIN: Self = <$t>::MIN;
                const MAX: Self = <$t>::MAX;

                #[inline(always)]
                fn push_digit(self, digit: u8) -> Option<Self> {
                    self.checked_mul(10)?.checked_add(digit as $t)
                }

                #[inline(always)]
                fn push_negative_digit(self, digit: u8) -> Option<Self> {
                    self.checked_mul(10)?.checked_sub(digit as $t)
                }
            }
        )*
    };
}

impl_integer!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

fn parse_unsigned<T: Integer>(field: &[u8], overflow: OverflowPolicy) -> Result<T, ErrorKind> {
    if field.first() == Some(&b'-') {
        return Err(ErrorKind::IntegerMustBePositive);
    }

    let mut x = T::ZERO;

    for byte in field {
        if !byte.is_ascii_digit() {
            return Err(ErrorKind::NoDigit);
        }

        match x.push_digit(byte - b'0') {
            Some(y) => x = y,
            None => {
                return match overflow {
                    OverflowPolicy::Clamp => Ok(T::MAX),
                    OverflowPolicy::Ignore => Ok(x),
                    OverflowPolicy::Error => Err(ErrorKind::IntegerOverflow),
                };
            }
        }
    }

    Ok(x)
}

fn parse_signed<T: Integer>(field: &[u8], overflow: OverflowPolicy) -> Result<T, ErrorKind> {
    match field.first() {
        Some(b'-') => (),
        Some(b'+') => return parse_unsigned(&field[1..], overflow),
        _ => return parse_unsigned(field, overflow),
    };

    // NOTE: accumulating in the negative range directly so that `MIN` can be
    // reached, its magnitude being out of the positive range.
    let mut x = T::ZERO;

    for byte in &field[1..] {
        if !byte.is_ascii_digit() {
            return Err(ErrorKind::NoDigit);
        }

        match x.push_negative_digit(byte - b'0') {
            Some(y) => x = y,
            None => {
                return match overflow {
                    OverflowPolicy::Clamp => Ok(T::MIN),
                    OverflowPolicy::Ignore => Ok(x),
                    OverflowPolicy::Error => Err(ErrorKind::IntegerUnderflow),
                };
            }
        }
    }

    Ok(x)
}

macro_rules! impl_from_field {
    ($parser: ident, $($t: ty),*) => {
        $(
            impl FromField for $t {
                #[inline]
                fn from_field(field: &[u8], overflow: OverflowPolicy) -> Result<Self, ErrorKind> {
                    $parser(field, overflow)
                }
            }
        )*
    };
}

impl_from_field!(parse_unsigned, u8, u16, u32, u64, u128, usize);
impl_from_field!(parse_signed, i8, i16, i32, i64, i128, isize);

trait Float:
    Copy
    + std::ops::Add<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Div<Output = Self>
    + std::ops::Neg<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;
    const TEN: Self;
    const TENTH: Self;

    fn from_digit(digit: u8) -> Self;
}

macro_rules! impl_float {
    ($($t: ty),*) => {
        $(
            impl Float for $t {
                const ZERO: Self = 0.0;
                const ONE: Self = 1.0;
                const TEN: Self = 10.0;
                const TENTH: Self = 0.1;

                #[inline(always)]
                fn from_digit(digit: u8) -> Self {
                    digit as $t
                }
            }

            impl FromField for $t {
                #[inline]
                fn from_field(field: &[u8], _overflow: OverflowPolicy) -> Result<Self, ErrorKind> {
                    parse_float(field)
                }
            }
        )*
    };
}

impl_float!(f32, f64);

fn parse_float<T: Float>(field: &[u8]) -> Result<T, ErrorKind> {
    let mut pos: usize = 0;
    let mut is_negative = false;

    match field.first() {
        Some(b'-') => {
            is_negative = true;
            pos += 1;
        }
        Some(b'+') => pos += 1,
        _ => (),
    };

    let digit_at = |pos: usize| field.get(pos).filter(|b| b.is_ascii_digit()).map(|b| b - b'0');

    let mut x = T::ZERO;

    while let Some(digit) = digit_at(pos) {
        x = x * T::TEN + T::from_digit(digit);
        pos += 1;
    }

    if matches!(field.get(pos), Some(b'.' | b',')) {
        pos += 1;

        let mut weight = T::ONE;

        while let Some(digit) = digit_at(pos) {
            weight = weight / T::TEN;
            x = x + T::from_digit(digit) * weight;
            pos += 1;
        }
    }

    if matches!(field.get(pos), Some(b'e' | b'E')) {
        let exponent: i32 = parse_signed(&field[pos + 1..], OverflowPolicy::Clamp)?;

        if exponent != 0 {
            let mut base = if exponent < 0 { T::TENTH } else { T::TEN };
            let mut e = exponent.unsigned_abs();

            // Exponentiation by squaring
            while e != 1 {
                if e & 1 == 0 {
                    base = base * base;
                    e >>= 1;
                } else {
                    x = x * base;
                    e -= 1;
                }
            }

            x = x * base;
        }
    } else if pos != field.len() {
        return Err(ErrorKind::NoDigit);
    }

    Ok(if is_negative { -x } else { x })
}

/// A set of `N` typed targets receiving the columns of a row.
///
/// This trait is implemented for arrays `[T; N]` and for tuples of up to 12
/// elements whose types implement [`FromField`].
pub trait Row<const N: usize> {
    /// Parse `field` into the target at `index`.
    fn set_field(
        &mut self,
        index: usize,
        field: &[u8],
        overflow: OverflowPolicy,
    ) -> Result<(), ErrorKind>;
}

impl<T: FromField, const N: usize> Row<N> for [T; N] {
    #[inline]
    fn set_field(
        &mut self,
        index: usize,
        field: &[u8],
        overflow: OverflowPolicy,
    ) -> Result<(), ErrorKind> {
        self[index] = T::from_field(field, overflow)?;
        Ok(())
    }
}

macro_rules! impl_row_for_tuple {
    ($len: literal => $($t: ident $i: tt),+) => {
        impl<$($t: FromField),+> Row<$len> for ($($t,)+) {
            fn set_field(
                &mut self,
                index: usize,
                field: &[u8],
                overflow: OverflowPolicy,
            ) -> Result<(), ErrorKind> {
                match index {
                    $($i => self.$i = $t::from_field(field, overflow)?,)+
                    _ => return Err(ErrorKind::Internal("row index out of bounds")),
                };

                Ok(())
            }
        }
    };
}

impl_row_for_tuple!(1 => A 0);
impl_row_for_tuple!(2 => A 0, B 1);
impl_row_for_tuple!(3 => A 0, B 1, C 2);
impl_row_for_tuple!(4 => A 0, B 1, C 2, D 3);
impl_row_for_tuple!(5 => A 0, B 1, C 2, D 3, E 4);
impl_row_for_tuple!(6 => A 0, B 1, C 2, D 3, E 4, F 5);
impl_row_for_tuple!(7 => A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_row_for_tuple!(8 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
impl_row_for_tuple!(9 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
impl_row_for_tuple!(10 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);
impl_row_for_tuple!(11 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10);
impl_row_for_tuple!(12 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11);
