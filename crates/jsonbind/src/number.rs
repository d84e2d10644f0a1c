//! Lossless JSON numbers.

use std::fmt;

use crate::lexer::{Token, next_token};

/// A JSON number, stored as its source lexeme.
///
/// Nothing is converted at parse time, so `3.14000` and
/// `123456789012345678901234567890` survive a parse/render cycle unchanged.
/// Integer and floating-point views are parsed from the lexeme on each call
/// and not cached, which keeps `Number` plain data; hold on to the result
/// when it is needed repeatedly.
///
/// Two numbers compare equal when they denote exactly the same decimal value
/// (`1.0 == 1`, `1e2 == 100`, `-0 == 0`). Equality never goes through `f64`,
/// so it stays transitive for integers beyond 2^53.
///
/// ```
/// use jsonbind::Number;
///
/// let n: Number = "3.14000".parse().unwrap();
/// assert_eq!(n.as_str(), "3.14000");
/// assert_eq!(n.as_f64(), Some(3.14));
/// assert_eq!(n.as_i64(), None);
/// ```
#[derive(Clone)]
pub struct Number {
    lexeme: String,
}

impl Number {
    /// Wraps a lexeme that the lexer already validated.
    pub(crate) fn from_lexeme_unchecked(lexeme: &str) -> Self {
        Self {
            lexeme: lexeme.to_owned(),
        }
    }

    /// Builds a number from a lexeme, rejecting anything that is not exactly
    /// one JSON number.
    #[must_use]
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match next_token(lexeme.as_bytes(), 0) {
            Ok((Token::Number(n), end)) if end == lexeme.len() && n.len() == lexeme.len() => {
                Some(Self::from_lexeme_unchecked(n))
            }
            _ => None,
        }
    }

    /// Converts a finite float. Returns `None` for NaN and infinities, which
    /// JSON cannot represent.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        value.is_finite().then(|| Self {
            lexeme: format!("{value:?}"),
        })
    }

    /// The source lexeme.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.lexeme
    }

    /// `true` if the lexeme has neither a fraction nor an exponent.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        !self.lexeme.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'))
    }

    /// The value as `i64`, if the lexeme is an integer in range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.lexeme.parse().ok()
        } else {
            None
        }
    }

    /// The value as `u64`, if the lexeme is a non-negative integer in range.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        if self.is_integer() {
            self.lexeme.parse().ok()
        } else {
            None
        }
    }

    /// The value as `i128`, if the lexeme is an integer in range.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        if self.is_integer() {
            self.lexeme.parse().ok()
        } else {
            None
        }
    }

    /// The nearest `f64`. Returns `None` only when the magnitude overflows.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.lexeme
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

/// Exact decimal form of a lexeme: `digits * 10^exponent`, with the digits
/// stripped of leading and trailing zeros. Zero has no digits and no sign.
struct Decimal<'a> {
    negative: bool,
    int: &'a str,
    frac: &'a str,
    exponent: i128,
}

impl<'a> Decimal<'a> {
    fn new(lexeme: &'a str) -> Self {
        let (negative, rest) = match lexeme.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, lexeme),
        };
        let (mantissa, exponent) = match rest.find(['e', 'E']) {
            Some(i) => (&rest[..i], parse_exponent(&rest[i + 1..])),
            None => (rest, 0),
        };
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));

        // Move trailing fraction zeros out first, then the integer part's
        // when the fraction is empty.
        let frac = frac.trim_end_matches('0');
        let int = int.trim_start_matches('0');
        let (int, exponent) = if frac.is_empty() {
            let trimmed = int.trim_end_matches('0');
            (trimmed, exponent.saturating_add((int.len() - trimmed.len()) as i128))
        } else {
            (int, exponent)
        };
        let exponent = exponent.saturating_sub(frac.len() as i128);

        // Leading zeros of the fraction only matter when there is no integer
        // part; they are then folded into the exponent.
        let frac = if int.is_empty() {
            frac.trim_start_matches('0')
        } else {
            frac
        };
        if int.is_empty() && frac.is_empty() {
            return Self {
                negative: false,
                int: "",
                frac: "",
                exponent: 0,
            };
        }
        Self {
            negative,
            int,
            frac,
            exponent,
        }
    }

    fn digits(&self) -> impl Iterator<Item = u8> + '_ {
        self.int.bytes().chain(self.frac.bytes())
    }
}

/// Saturates far beyond any exponent that distinguishes real inputs.
fn parse_exponent(s: &str) -> i128 {
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = digits.bytes().fold(0i128, |acc, d| {
        acc.saturating_mul(10).saturating_add(i128::from(d - b'0'))
    });
    if negative { -magnitude } else { magnitude }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        if self.lexeme == other.lexeme {
            return true;
        }
        let (a, b) = (Decimal::new(&self.lexeme), Decimal::new(&other.lexeme));
        a.negative == b.negative && a.exponent == b.exponent && a.digits().eq(b.digits())
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number({})", self.lexeme)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexeme)
    }
}

/// Error returned when a string is not a single JSON number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a JSON number")]
pub struct InvalidNumber;

impl std::str::FromStr for Number {
    type Err = InvalidNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_lexeme(s).ok_or(InvalidNumber)
    }
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Self { lexeme: value.to_string() }
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32, u64);

#[cfg(any(test, feature = "serde"))]
impl serde::Serialize for Number {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(n) = self.as_u64() {
            serializer.serialize_u64(n)
        } else if let Some(n) = self.as_i64() {
            serializer.serialize_i64(n)
        } else {
            serializer.serialize_f64(self.as_f64().unwrap_or(f64::NAN))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", "1.0")]
    #[case("100", "1e2")]
    #[case("-0.5", "-5E-1")]
    #[case("7", "007")]
    #[case("0", "-0.000e5")]
    #[case("0.050", "5e-2")]
    #[case("1200", "12.0e2")]
    #[case("1e400", "10e399")]
    #[case("123456789012345678901234567890", "1.2345678901234567890123456789e29")]
    fn numerically_equal_lexemes_compare_equal(#[case] a: &str, #[case] b: &str) {
        assert_eq!(a.parse::<Number>().unwrap(), b.parse::<Number>().unwrap());
    }

    #[rstest]
    #[case("1", "10")]
    #[case("0.5", "-0.5")]
    #[case("1.05", "1.5")]
    #[case("1e2", "1e-2")]
    #[case("9007199254740993", "9007199254740993.0000001")]
    fn different_values_compare_unequal(#[case] a: &str, #[case] b: &str) {
        assert_ne!(a.parse::<Number>().unwrap(), b.parse::<Number>().unwrap());
    }

    #[test]
    fn equality_is_transitive_beyond_f64_precision() {
        let a: Number = "9007199254740992".parse().unwrap();
        let b: Number = "9007199254740993".parse().unwrap();
        let c: Number = "9007199254740993.0".parse().unwrap();
        assert_ne!(a, b);
        assert_eq!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn big_integers_keep_precision() {
        let a: Number = "9007199254740993".parse().unwrap();
        let b: Number = "9007199254740992".parse().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_i64(), Some(9_007_199_254_740_993));
        assert_eq!(a.to_string(), "9007199254740993");
    }

    #[test]
    fn integer_views_respect_range_and_sign() {
        let n = Number::from(u64::MAX);
        assert_eq!(n.as_u64(), Some(u64::MAX));
        assert_eq!(n.as_i64(), None);
        assert_eq!(Number::from(-3i32).as_u64(), None);
        assert_eq!("1.5".parse::<Number>().unwrap().as_i128(), None);
    }

    #[test]
    fn from_f64_rejects_non_finite() {
        assert!(Number::from_f64(f64::NAN).is_none());
        assert!(Number::from_f64(f64::INFINITY).is_none());
        assert_eq!(Number::from_f64(2.5).unwrap().as_str(), "2.5");
        assert_eq!(Number::from_f64(1.0).unwrap().as_f64(), Some(1.0));
    }

    #[rstest]
    #[case("")]
    #[case("1 ")]
    #[case(" 1")]
    #[case("1.")]
    #[case("+1")]
    #[case("1,2")]
    fn from_str_rejects_non_numbers(#[case] input: &str) {
        assert_eq!(input.parse::<Number>(), Err(InvalidNumber));
    }

    #[test]
    fn overflowing_magnitude_has_no_f64_view() {
        let n: Number = "1e400".parse().unwrap();
        assert_eq!(n.as_f64(), None);
        assert_eq!(n.as_str(), "1e400");
    }

    #[quickcheck_macros::quickcheck]
    fn integers_survive_their_lexeme(n: i64) -> bool {
        let number = Number::from(n);
        number.as_i64() == Some(n) && number.as_str().parse::<Number>() == Ok(number.clone())
    }

    #[quickcheck_macros::quickcheck]
    fn finite_floats_survive_their_lexeme(f: f64) -> bool {
        match Number::from_f64(f) {
            Some(number) => number.as_f64() == Some(f),
            None => !f.is_finite(),
        }
    }
}
