use bstr::ByteSlice;
use thiserror::Error;

use crate::lexer::TokenKind;

/// A failed parse: what went wrong and where.
///
/// `offset` is the byte offset into the input; `line` and `column` are
/// 1-based and count bytes, so they point at the offending byte even inside
/// multi-byte UTF-8 sequences.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {line}:{column}")]
pub struct ParseError {
    /// The category of failure.
    pub kind: ParseErrorKind,
    /// Byte offset of the failure.
    pub offset: usize,
    /// 1-based line of the failure.
    pub line: usize,
    /// 1-based column of the failure.
    pub column: usize,
}

impl ParseError {
    pub(crate) fn at(kind: ParseErrorKind, input: &[u8], offset: usize) -> Self {
        let offset = offset.min(input.len());
        let consumed = &input[..offset];
        let line = consumed.iter().filter(|&&b| b == b'\n').count() + 1;
        let column = match consumed.rfind_byte(b'\n') {
            Some(nl) => offset - nl,
            None => offset + 1,
        };
        Self {
            kind,
            offset,
            line,
            column,
        }
    }

    pub(crate) fn from_lex(err: LexError, input: &[u8]) -> Self {
        let offset = err.offset();
        Self::at(ParseErrorKind::Lex(err), input, offset)
    }
}

/// Structural and lexical failure categories.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("mismatched bracket: expected {expected}, found '{found}'")]
    MismatchedBracket {
        /// What would have closed the innermost container, or
        /// `"nothing"` when no container was open.
        expected: &'static str,
        /// The closing bracket that was read.
        found: char,
    },
    #[error("unexpected {0}")]
    UnexpectedToken(TokenKind),
    #[error("trailing data after the root value")]
    TrailingData,
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),
}

/// Errors raised while scanning a single token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{}'", printable(.byte))]
    UnexpectedCharacter { offset: usize, byte: u8 },
    #[error("invalid string: {reason}")]
    InvalidString { offset: usize, reason: StringError },
    #[error("invalid number")]
    InvalidNumber { offset: usize },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput { offset: usize },
}

impl LexError {
    /// Byte offset at which the lexer gave up.
    #[must_use]
    pub fn offset(&self) -> usize {
        match *self {
            LexError::UnexpectedCharacter { offset, .. }
            | LexError::InvalidString { offset, .. }
            | LexError::InvalidNumber { offset }
            | LexError::UnexpectedEndOfInput { offset } => offset,
        }
    }
}

fn printable(byte: &u8) -> &bstr::BStr {
    core::slice::from_ref(byte).as_bstr()
}

/// Why a string literal was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringError {
    #[error("unterminated string")]
    Unterminated,
    #[error("invalid escape '\\{}'", printable(.0))]
    InvalidEscape(u8),
    #[error("invalid unicode escape sequence")]
    InvalidUnicodeEscape,
    #[error("unpaired surrogate \\u{0:04X}")]
    UnpairedSurrogate(u16),
    #[error("unescaped control character 0x{0:02X}")]
    ControlCharacter(u8),
    #[error("invalid UTF-8")]
    InvalidUtf8,
}
