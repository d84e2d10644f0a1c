//! Push parser: drives an [`EventSink`] from a token stream.
//!
//! Nesting is tracked on an explicit stack of frames, one per open
//! container, so document depth is bounded by heap memory rather than by the
//! call stack.

use log::{debug, trace};

use crate::{
    error::{ParseError, ParseErrorKind},
    event::EventSink,
    lexer::{Lexer, Token},
    options::ParserOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectState {
    AwaitingKey { first: bool },
    AwaitingColon,
    AwaitingValue,
    AwaitingCommaOrEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayState {
    AwaitingValue { first: bool },
    AwaitingCommaOrEnd,
}

/// One open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object(ObjectState),
    Array(ArrayState),
}

impl Frame {
    fn closer(self) -> &'static str {
        match self {
            Frame::Object(_) => "'}'",
            Frame::Array(_) => "']'",
        }
    }
}

/// A single-use parser over one complete input buffer.
///
/// ```
/// use jsonbind::{ParseEvent, Parser, ParserOptions};
///
/// let mut events = Vec::new();
/// Parser::new(b"[true, null]")
///     .with_options(ParserOptions::default())
///     .parse(&mut events)
///     .unwrap();
/// assert_eq!(events.len(), 4);
/// assert_eq!(events[1], ParseEvent::Boolean(true));
/// ```
#[derive(Debug)]
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    frames: Vec<Frame>,
    root_complete: bool,
    options: ParserOptions,
}

impl<'src> Parser<'src> {
    /// Creates a parser with default options.
    #[must_use]
    pub fn new(input: &'src [u8]) -> Self {
        Self {
            lexer: Lexer::new(input),
            frames: Vec::new(),
            root_complete: false,
            options: ParserOptions::default(),
        }
    }

    /// Replaces the parser's options.
    #[must_use]
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Parses the whole input, reporting every event to `sink`.
    ///
    /// Exactly one root value is accepted; anything but whitespace after it
    /// is [`ParseErrorKind::TrailingData`].
    ///
    /// # Errors
    ///
    /// Returns the first lexical or structural error. Events already
    /// delivered to `sink` before the error describe an incomplete document.
    pub fn parse<S>(mut self, sink: &mut S) -> Result<(), ParseError>
    where
        S: EventSink<'src> + ?Sized,
    {
        let input = self.lexer.input();
        trace!("parsing {} bytes", input.len());
        match self.run(sink) {
            Ok(()) => {
                trace!("parse complete");
                Ok(())
            }
            Err(err) => {
                debug!("parse failed: {err}");
                Err(err)
            }
        }
    }

    fn run<S>(&mut self, sink: &mut S) -> Result<(), ParseError>
    where
        S: EventSink<'src> + ?Sized,
    {
        loop {
            if self.root_complete && self.frames.is_empty() {
                return if self.lexer.is_exhausted() {
                    Ok(())
                } else {
                    Err(self.error(ParseErrorKind::TrailingData, self.lexer.position()))
                };
            }

            let (token, start) = self
                .lexer
                .next_token()
                .map_err(|err| ParseError::from_lex(err, self.lexer.input()))?;

            let Some(top) = self.frames.last().copied() else {
                self.value(token, start, sink)?;
                continue;
            };

            match (top, token) {
                (_, Token::Eof) => {
                    return Err(self.error(ParseErrorKind::UnexpectedEndOfInput, start));
                }

                (Frame::Object(state), Token::EndObject) => match state {
                    ObjectState::AwaitingKey { first: true } | ObjectState::AwaitingCommaOrEnd => {
                        self.close(sink);
                    }
                    _ => return Err(self.unexpected(&Token::EndObject, start)),
                },
                (Frame::Array(state), Token::EndArray) => match state {
                    ArrayState::AwaitingValue { first: true } | ArrayState::AwaitingCommaOrEnd => {
                        self.close(sink);
                    }
                    ArrayState::AwaitingValue { first: false } => {
                        return Err(self.unexpected(&Token::EndArray, start));
                    }
                },
                (frame, Token::EndObject | Token::EndArray) => {
                    let found = if matches!(frame, Frame::Object(_)) { ']' } else { '}' };
                    return Err(self.error(
                        ParseErrorKind::MismatchedBracket {
                            expected: frame.closer(),
                            found,
                        },
                        start,
                    ));
                }

                (Frame::Object(ObjectState::AwaitingKey { .. }), Token::String(key)) => {
                    sink.object_key(key);
                    self.set_top(Frame::Object(ObjectState::AwaitingColon));
                }
                (Frame::Object(ObjectState::AwaitingColon), Token::Colon) => {
                    self.set_top(Frame::Object(ObjectState::AwaitingValue));
                }
                (Frame::Object(ObjectState::AwaitingCommaOrEnd), Token::Comma) => {
                    self.set_top(Frame::Object(ObjectState::AwaitingKey { first: false }));
                }
                (Frame::Array(ArrayState::AwaitingCommaOrEnd), Token::Comma) => {
                    self.set_top(Frame::Array(ArrayState::AwaitingValue { first: false }));
                }
                (
                    Frame::Object(ObjectState::AwaitingValue)
                    | Frame::Array(ArrayState::AwaitingValue { .. }),
                    token,
                ) => self.value(token, start, sink)?,

                (_, token) => return Err(self.unexpected(&token, start)),
            }
        }
    }

    /// Handles a token in value position.
    fn value<S>(&mut self, token: Token<'src>, start: usize, sink: &mut S) -> Result<(), ParseError>
    where
        S: EventSink<'src> + ?Sized,
    {
        match token {
            Token::BeginObject => {
                self.open(Frame::Object(ObjectState::AwaitingKey { first: true }), start)?;
                sink.object_begin();
                return Ok(());
            }
            Token::BeginArray => {
                self.open(Frame::Array(ArrayState::AwaitingValue { first: true }), start)?;
                sink.array_begin();
                return Ok(());
            }
            Token::Null => sink.null(),
            Token::True => sink.boolean(true),
            Token::False => sink.boolean(false),
            Token::Number(lexeme) => sink.number(lexeme),
            Token::String(value) => sink.string(value),
            Token::Eof => {
                return Err(self.error(ParseErrorKind::UnexpectedEndOfInput, start));
            }
            Token::EndObject | Token::EndArray => {
                // Only reachable at the root; closers inside containers are
                // handled by the caller.
                let found = if token == Token::EndObject { '}' } else { ']' };
                return Err(self.error(
                    ParseErrorKind::MismatchedBracket {
                        expected: "nothing",
                        found,
                    },
                    start,
                ));
            }
            Token::Colon | Token::Comma => return Err(self.unexpected(&token, start)),
        }
        self.value_complete();
        Ok(())
    }

    fn open(&mut self, frame: Frame, start: usize) -> Result<(), ParseError> {
        let depth = self.frames.len();
        if let Some(max) = self.options.max_depth.filter(|&max| depth >= max) {
            return Err(self.error(ParseErrorKind::DepthLimitExceeded(max), start));
        }
        self.frames.push(frame);
        Ok(())
    }

    fn close<S>(&mut self, sink: &mut S)
    where
        S: EventSink<'src> + ?Sized,
    {
        match self.frames.pop() {
            Some(Frame::Object(_)) => sink.object_end(),
            Some(Frame::Array(_)) => sink.array_end(),
            None => {}
        }
        self.value_complete();
    }

    /// Moves the enclosing container past the value that just ended, or marks
    /// the document complete at the root.
    fn value_complete(&mut self) {
        match self.frames.last_mut() {
            Some(Frame::Object(state)) => *state = ObjectState::AwaitingCommaOrEnd,
            Some(Frame::Array(state)) => *state = ArrayState::AwaitingCommaOrEnd,
            None => self.root_complete = true,
        }
    }

    fn set_top(&mut self, frame: Frame) {
        if let Some(top) = self.frames.last_mut() {
            *top = frame;
        }
    }

    fn unexpected(&self, token: &Token<'_>, start: usize) -> ParseError {
        self.error(ParseErrorKind::UnexpectedToken(token.kind()), start)
    }

    fn error(&self, kind: ParseErrorKind, offset: usize) -> ParseError {
        ParseError::at(kind, self.lexer.input(), offset)
    }
}
