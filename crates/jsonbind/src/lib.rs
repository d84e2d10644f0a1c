//! A single-pass JSON parser with a push-event interface, a value tree, and
//! a declarative mapper between JSON and application objects.
//!
//! The pipeline has three stages, each usable on its own:
//!
//! 1. [`lexer`] turns bytes into [`Token`](lexer::Token)s.
//! 2. [`Parser`] validates structure and pushes events to an [`EventSink`];
//!    [`ValueBuilder`] is the sink that produces a [`Value`].
//! 3. [`Mapper`] converts a [`Value`] to and from [`Mappable`] instances
//!    according to their [`ClassDescriptor`](mapper::ClassDescriptor).
//!
//! ```
//! let value = jsonbind::parse(br#"{"name": "Ada", "tags": ["x", "y"]}"#).unwrap();
//! assert_eq!(value.get("tags").and_then(|t| t.get_index(1)), Some(&jsonbind::Value::from("y")));
//! assert_eq!(value.to_string(), r#"{"name":"Ada","tags":["x","y"]}"#);
//! ```

#![allow(missing_docs)]

mod error;
mod event;
pub mod lexer;
pub mod mapper;
mod number;
mod options;
mod parser;
mod value;
mod value_builder;

#[cfg(test)]
mod tests;

pub use error::{LexError, ParseError, ParseErrorKind, StringError};
pub use event::{EventSink, ParseEvent};
pub use mapper::{Mappable, MappableClass, Mapper, MapperError};
pub use number::{InvalidNumber, Number};
pub use options::{MapperOptions, ParserOptions, UnknownKeys};
pub use parser::Parser;
pub use value::{Array, Map, Value};
pub use value_builder::ValueBuilder;

/// Parses a complete JSON document into a [`Value`].
///
/// # Errors
///
/// The first lexical or structural error in `input`.
pub fn parse(input: &[u8]) -> Result<Value, ParseError> {
    parse_with_options(input, ParserOptions::default())
}

/// Parses a complete JSON document into a [`Value`] with explicit options.
///
/// # Errors
///
/// The first lexical or structural error in `input`, or
/// [`ParseErrorKind::DepthLimitExceeded`] when `options.max_depth` is
/// exceeded.
pub fn parse_with_options(input: &[u8], options: ParserOptions) -> Result<Value, ParseError> {
    let mut builder = ValueBuilder::new(options.ignore_nulls);
    Parser::new(input)
        .with_options(options)
        .parse(&mut builder)?;
    builder.into_value().ok_or_else(|| {
        ParseError::at(ParseErrorKind::UnexpectedEndOfInput, input, input.len())
    })
}

/// Parses a complete JSON document, pushing events to `sink` instead of
/// building a tree.
///
/// # Errors
///
/// The first lexical or structural error in `input`. Events delivered before
/// the error describe an incomplete document.
pub fn parse_with_sink<'src, S>(input: &'src [u8], sink: &mut S) -> Result<(), ParseError>
where
    S: EventSink<'src> + ?Sized,
{
    Parser::new(input).parse(sink)
}

/// Maps a value to a `T` with the default [`Mapper`].
///
/// # Errors
///
/// See [`Mapper::map`].
pub fn from_value<T: MappableClass>(value: &Value) -> Result<T, MapperError> {
    Mapper::default().map(value)
}

/// Renders an instance as JSON with the default [`Mapper`].
///
/// # Errors
///
/// See [`Mapper::to_json`].
pub fn to_value(instance: &dyn Mappable) -> Result<Value, MapperError> {
    Mapper::default().to_json(instance)
}
