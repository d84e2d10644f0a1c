//! Accumulates the four hexadecimal digits of a `\uXXXX` escape.
//!
//! The buffer yields a UTF-16 code unit rather than a `char`: surrogate
//! halves are only meaningful in pairs, so combining them is left to the
//! string scanner.

use crate::error::StringError;

#[derive(Debug, Default, Clone)]
pub(crate) struct UnicodeEscapeBuffer {
    unit: u16,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.unit = 0;
        self.len = 0;
    }

    /// Feeds one ASCII hex digit.
    ///
    /// Returns `Ok(Some(unit))` once the fourth digit arrives, after which
    /// the buffer is ready for the next escape.
    pub fn feed(&mut self, byte: u8) -> Result<Option<u16>, StringError> {
        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err(StringError::InvalidUnicodeEscape),
        };

        self.unit = (self.unit << 4) | u16::from(nibble);
        self.len += 1;

        if self.len == 4 {
            let unit = self.unit;
            self.reset();
            Ok(Some(unit))
        } else {
            Ok(None)
        }
    }
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Combines a surrogate pair into a scalar value.
pub(crate) fn combine_surrogates(high: u16, low: u16) -> Option<char> {
    let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(buf: &mut UnicodeEscapeBuffer, digits: &[u8]) -> Option<u16> {
        let mut out = None;
        for &d in digits {
            out = buf.feed(d).unwrap();
        }
        out
    }

    #[test]
    fn basic_decoding() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(buf.feed(b'0').unwrap(), None);
        assert_eq!(buf.feed(b'0').unwrap(), None);
        assert_eq!(buf.feed(b'4').unwrap(), None);
        assert_eq!(buf.feed(b'1').unwrap(), Some(0x41));
    }

    #[test]
    fn mixed_case_hex() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(feed_all(&mut buf, b"AbCd"), Some(0xABCD));
    }

    #[test]
    fn resets_after_each_escape() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(feed_all(&mut buf, b"00e9"), Some(0xE9));
        assert_eq!(feed_all(&mut buf, b"2028"), Some(0x2028));
    }

    #[test]
    fn invalid_hex_error() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(buf.feed(b'G'), Err(StringError::InvalidUnicodeEscape));
    }

    #[test]
    fn surrogate_pairs_combine() {
        assert!(is_high_surrogate(0xD83D));
        assert!(is_low_surrogate(0xDE00));
        assert_eq!(combine_surrogates(0xD83D, 0xDE00), Some('😀'));
    }
}
