//! Byte-level JSON tokenizer.
//!
//! The lexer walks a complete input buffer and yields one [`Token`] at a time.
//! Strings that contain no escapes and all numbers are returned as borrowed
//! slices of the input; only strings with escape sequences allocate.
//!
//! Numbers are validated against `-?\d+(\.\d+)?([eE][+-]?\d+)?` but never
//! converted here, so precision decisions stay with the consumer.
//!
//! ```rust
//! use jsonbind::lexer::{Token, next_token};
//!
//! let input = br#"  {"id": 42}"#;
//! let (token, pos) = next_token(input, 0).unwrap();
//! assert_eq!(token, Token::BeginObject);
//! let (token, _) = next_token(input, pos).unwrap();
//! assert_eq!(token, Token::String("id".into()));
//! ```

mod escape_buffer;
mod literal_buffer;

use std::{borrow::Cow, fmt};

use bstr::ByteSlice;
use escape_buffer::{UnicodeEscapeBuffer, combine_surrogates, is_high_surrogate, is_low_surrogate};
use literal_buffer::{ExpectedLiteralBuffer, Step};

use crate::error::{LexError, StringError};

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    /// `{`
    BeginObject,
    /// `}`
    EndObject,
    /// `[`
    BeginArray,
    /// `]`
    EndArray,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// A decoded string literal. Borrowed when the literal had no escapes.
    String(Cow<'src, str>),
    /// The raw lexeme of a number literal.
    Number(&'src str),
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// No input left.
    Eof,
}

impl Token<'_> {
    /// The payload-free category of this token.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::BeginObject => TokenKind::BeginObject,
            Token::EndObject => TokenKind::EndObject,
            Token::BeginArray => TokenKind::BeginArray,
            Token::EndArray => TokenKind::EndArray,
            Token::Colon => TokenKind::Colon,
            Token::Comma => TokenKind::Comma,
            Token::String(_) => TokenKind::String,
            Token::Number(_) => TokenKind::Number,
            Token::True | Token::False => TokenKind::Bool,
            Token::Null => TokenKind::Null,
            Token::Eof => TokenKind::Eof,
        }
    }
}

/// Token categories, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `{`
    BeginObject,
    /// `}`
    EndObject,
    /// `[`
    BeginArray,
    /// `]`
    EndArray,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// A string literal.
    String,
    /// A number literal.
    Number,
    /// `true` or `false`.
    Bool,
    /// `null`
    Null,
    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::BeginObject => "'{'",
            TokenKind::EndObject => "'}'",
            TokenKind::BeginArray => "'['",
            TokenKind::EndArray => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Bool => "boolean",
            TokenKind::Null => "null",
            TokenKind::Eof => "end of input",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberState {
    Sign,
    Integer,
    DecimalPoint,
    Fraction,
    Exponent,
    ExponentSign,
    ExponentInteger,
}

/// Scans tokens out of a complete byte buffer.
#[derive(Clone)]
pub struct Lexer<'src> {
    input: &'src [u8],
    pos: usize,
    unicode_escape_buffer: UnicodeEscapeBuffer,
}

impl fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("pos", &self.pos)
            .field("rest", &self.input[self.pos..].as_bstr())
            .finish_non_exhaustive()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a lexer positioned at the start of `input`.
    #[must_use]
    pub fn new(input: &'src [u8]) -> Self {
        Self::at(input, 0)
    }

    /// Creates a lexer positioned at byte `pos` of `input`.
    #[must_use]
    pub fn at(input: &'src [u8], pos: usize) -> Self {
        Self {
            input,
            pos: pos.min(input.len()),
            unicode_escape_buffer: UnicodeEscapeBuffer::new(),
        }
    }

    /// Current byte offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The complete input this lexer scans.
    #[must_use]
    pub fn input(&self) -> &'src [u8] {
        self.input
    }

    /// Advances past insignificant whitespace.
    pub fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Returns `true` once only whitespace remains.
    pub fn is_exhausted(&mut self) -> bool {
        self.skip_whitespace();
        self.pos == self.input.len()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Scans the next token, returning it with the offset it started at.
    ///
    /// # Errors
    ///
    /// Returns a [`LexError`] describing the first malformed byte.
    pub fn next_token(&mut self) -> Result<(Token<'src>, usize), LexError> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(byte) = self.peek() else {
            return Ok((Token::Eof, start));
        };

        let token = match byte {
            b'{' => self.punctuator(Token::BeginObject),
            b'}' => self.punctuator(Token::EndObject),
            b'[' => self.punctuator(Token::BeginArray),
            b']' => self.punctuator(Token::EndArray),
            b':' => self.punctuator(Token::Colon),
            b',' => self.punctuator(Token::Comma),
            b'"' => self.lex_string()?,
            b'-' | b'0'..=b'9' => self.lex_number()?,
            b't' | b'f' | b'n' => self.lex_literal()?,
            _ => {
                return Err(LexError::UnexpectedCharacter {
                    offset: start,
                    byte,
                });
            }
        };
        Ok((token, start))
    }

    #[inline]
    fn punctuator(&mut self, token: Token<'src>) -> Token<'src> {
        self.pos += 1;
        token
    }

    // ---------------------------------------------------------------------
    // Literals
    // ---------------------------------------------------------------------

    fn lex_literal(&mut self) -> Result<Token<'src>, LexError> {
        let first = self.input[self.pos];
        let Some(mut expected) = ExpectedLiteralBuffer::new(first) else {
            return Err(LexError::UnexpectedCharacter {
                offset: self.pos,
                byte: first,
            });
        };
        self.pos += 1;

        loop {
            let Some(byte) = self.peek() else {
                return Err(LexError::UnexpectedEndOfInput { offset: self.pos });
            };
            match expected.step(byte) {
                Step::NeedMore => self.pos += 1,
                Step::Done(token) => {
                    self.pos += 1;
                    return Ok(token);
                }
                Step::Reject => {
                    return Err(LexError::UnexpectedCharacter {
                        offset: self.pos,
                        byte,
                    });
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Numbers
    // ---------------------------------------------------------------------

    fn lex_number(&mut self) -> Result<Token<'src>, LexError> {
        use NumberState::{
            DecimalPoint, Exponent, ExponentInteger, ExponentSign, Fraction, Integer, Sign,
        };

        let start = self.pos;
        let mut state = match self.input[self.pos] {
            b'-' => Sign,
            _ => Integer,
        };
        self.pos += 1;

        loop {
            let next = self.peek();
            state = match (state, next) {
                (Sign | Integer, Some(b'0'..=b'9')) => Integer,
                (Integer, Some(b'.')) => DecimalPoint,
                (Integer | Fraction, Some(b'e' | b'E')) => Exponent,
                (DecimalPoint | Fraction, Some(b'0'..=b'9')) => Fraction,
                (Exponent, Some(b'+' | b'-')) => ExponentSign,
                (Exponent | ExponentSign | ExponentInteger, Some(b'0'..=b'9')) => ExponentInteger,
                (Integer | Fraction | ExponentInteger, _) => break,
                (Sign | DecimalPoint | Exponent | ExponentSign, _) => {
                    return Err(LexError::InvalidNumber { offset: self.pos });
                }
            };
            self.pos += 1;
        }

        let lexeme = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| LexError::InvalidNumber { offset: start })?;
        Ok(Token::Number(lexeme))
    }

    // ---------------------------------------------------------------------
    // Strings
    // ---------------------------------------------------------------------

    fn lex_string(&mut self) -> Result<Token<'src>, LexError> {
        let quote = self.pos;
        self.pos += 1;
        let body = self.pos;

        loop {
            match self.peek() {
                None => return Err(string_error(quote, StringError::Unterminated)),
                Some(b'"') => {
                    let text = utf8_at(self.input, body, self.pos)?;
                    self.pos += 1;
                    return Ok(Token::String(Cow::Borrowed(text)));
                }
                Some(b'\\') => {
                    let mut decoded = String::with_capacity(self.pos - body + 8);
                    decoded.push_str(utf8_at(self.input, body, self.pos)?);
                    return self.lex_escaped_string(quote, decoded);
                }
                Some(byte) if byte < 0x20 => {
                    return Err(string_error(self.pos, StringError::ControlCharacter(byte)));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Continues a string once the first backslash has been seen. `decoded`
    /// holds everything before it.
    fn lex_escaped_string(
        &mut self,
        quote: usize,
        mut decoded: String,
    ) -> Result<Token<'src>, LexError> {
        let mut run = self.pos;
        loop {
            match self.peek() {
                None => return Err(string_error(quote, StringError::Unterminated)),
                Some(b'"') => {
                    decoded.push_str(utf8_at(self.input, run, self.pos)?);
                    self.pos += 1;
                    return Ok(Token::String(Cow::Owned(decoded)));
                }
                Some(b'\\') => {
                    decoded.push_str(utf8_at(self.input, run, self.pos)?);
                    self.pos += 1;
                    let ch = self.lex_escape(quote)?;
                    decoded.push(ch);
                    run = self.pos;
                }
                Some(byte) if byte < 0x20 => {
                    return Err(string_error(self.pos, StringError::ControlCharacter(byte)));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Decodes one escape; `self.pos` is just past the backslash.
    fn lex_escape(&mut self, quote: usize) -> Result<char, LexError> {
        let at = self.pos;
        let Some(byte) = self.peek() else {
            return Err(string_error(quote, StringError::Unterminated));
        };
        self.pos += 1;

        let ch = match byte {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{0008}',
            b'f' => '\u{000C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let unit = self.lex_unicode_unit(quote)?;
                if is_high_surrogate(unit) {
                    if self.input[self.pos..].starts_with(b"\\u") {
                        self.pos += 2;
                        let low = self.lex_unicode_unit(quote)?;
                        if !is_low_surrogate(low) {
                            return Err(string_error(at, StringError::UnpairedSurrogate(unit)));
                        }
                        combine_surrogates(unit, low)
                            .ok_or(string_error(at, StringError::InvalidUnicodeEscape))?
                    } else {
                        return Err(string_error(at, StringError::UnpairedSurrogate(unit)));
                    }
                } else if is_low_surrogate(unit) {
                    return Err(string_error(at, StringError::UnpairedSurrogate(unit)));
                } else {
                    char::from_u32(u32::from(unit))
                        .ok_or(string_error(at, StringError::InvalidUnicodeEscape))?
                }
            }
            other => return Err(string_error(at, StringError::InvalidEscape(other))),
        };
        Ok(ch)
    }

    fn lex_unicode_unit(&mut self, quote: usize) -> Result<u16, LexError> {
        self.unicode_escape_buffer.reset();
        loop {
            let Some(byte) = self.peek() else {
                return Err(string_error(quote, StringError::Unterminated));
            };
            let fed = self
                .unicode_escape_buffer
                .feed(byte)
                .map_err(|reason| string_error(self.pos, reason))?;
            self.pos += 1;
            if let Some(unit) = fed {
                return Ok(unit);
            }
        }
    }
}

fn string_error(offset: usize, reason: StringError) -> LexError {
    LexError::InvalidString { offset, reason }
}

fn utf8_at(input: &[u8], start: usize, end: usize) -> Result<&str, LexError> {
    std::str::from_utf8(&input[start..end])
        .map_err(|e| string_error(start + e.valid_up_to(), StringError::InvalidUtf8))
}

/// Scans one token starting at byte `position` of `buffer`.
///
/// Returns the token together with the position just past it; at end of input
/// the token is [`Token::Eof`] and the position is `buffer.len()`.
///
/// # Errors
///
/// Returns a [`LexError`] if the bytes at `position` do not form a token.
pub fn next_token(buffer: &[u8], position: usize) -> Result<(Token<'_>, usize), LexError> {
    let mut lexer = Lexer::at(buffer, position);
    let (token, _) = lexer.next_token()?;
    Ok((token, lexer.position()))
}

/// Collects every token of `buffer`, stopping after [`Token::Eof`].
///
/// # Errors
///
/// Returns the first [`LexError`] encountered.
pub fn tokenize(buffer: &[u8]) -> Result<Vec<Token<'_>>, LexError> {
    let mut lexer = Lexer::new(buffer);
    let mut tokens = Vec::new();
    loop {
        let (token, _) = lexer.next_token()?;
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests;
