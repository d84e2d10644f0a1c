use super::Token;

/// What happened after feeding one more byte into the literal matcher?
pub(crate) enum Step {
    /// Byte matched, but the literal is not finished yet.
    NeedMore,
    /// Byte matched *and* it was the last byte of the literal.
    Done(Token<'static>),
    /// Byte did **not** match the expected byte.
    Reject,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ExpectedLiteralValue {
    Null,
    True,
    False,
}

impl ExpectedLiteralValue {
    fn token(self) -> Token<'static> {
        match self {
            ExpectedLiteralValue::Null => Token::Null,
            ExpectedLiteralValue::True => Token::True,
            ExpectedLiteralValue::False => Token::False,
        }
    }
}

/// Remaining bytes of a `true` / `false` / `null` literal while matching.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ExpectedLiteralBuffer {
    rest: &'static [u8],
    kind: ExpectedLiteralValue,
}

impl ExpectedLiteralBuffer {
    /// Start matching after the *first* byte (`n`, `t`, or `f`).
    pub fn new(first: u8) -> Option<Self> {
        let (rest, kind) = match first {
            b'n' => (&b"ull"[..], ExpectedLiteralValue::Null),
            b't' => (&b"rue"[..], ExpectedLiteralValue::True),
            b'f' => (&b"alse"[..], ExpectedLiteralValue::False),
            _ => return None,
        };
        Some(Self { rest, kind })
    }

    pub fn step(&mut self, byte: u8) -> Step {
        match self.rest.split_first() {
            Some((&expected, rest)) if expected == byte => {
                self.rest = rest;
                if rest.is_empty() {
                    Step::Done(self.kind.token())
                } else {
                    Step::NeedMore
                }
            }
            _ => Step::Reject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whole_literal() {
        let mut lit = ExpectedLiteralBuffer::new(b'f').unwrap();
        assert!(matches!(lit.step(b'a'), Step::NeedMore));
        assert!(matches!(lit.step(b'l'), Step::NeedMore));
        assert!(matches!(lit.step(b's'), Step::NeedMore));
        assert!(matches!(lit.step(b'e'), Step::Done(Token::False)));
    }

    #[test]
    fn rejects_mismatch() {
        let mut lit = ExpectedLiteralBuffer::new(b'n').unwrap();
        assert!(matches!(lit.step(b'u'), Step::NeedMore));
        assert!(matches!(lit.step(b'x'), Step::Reject));
    }

    #[test]
    fn only_literal_initials_start_a_match() {
        assert!(ExpectedLiteralBuffer::new(b'x').is_none());
    }
}
