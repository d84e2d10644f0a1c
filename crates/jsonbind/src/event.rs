//! The push interface between the parser and its consumers.
//!
//! The parser reports each structural element of the document to an
//! [`EventSink`] in document order. It builds nothing itself: a
//! [`ValueBuilder`](crate::ValueBuilder) turns the events into a [`Value`]
//! tree, and `Vec<ParseEvent>` records them verbatim.
//!
//! # Examples
//!
//! ```
//! use jsonbind::{ParseEvent, parse_with_sink};
//!
//! let mut events = Vec::new();
//! parse_with_sink(br#"{"id": [7]}"#, &mut events).unwrap();
//! assert_eq!(
//!     events,
//!     vec![
//!         ParseEvent::ObjectBegin,
//!         ParseEvent::ObjectKey("id".into()),
//!         ParseEvent::ArrayBegin,
//!         ParseEvent::Number("7".into()),
//!         ParseEvent::ArrayEnd,
//!         ParseEvent::ObjectEnd,
//!     ]
//! );
//! ```
//!
//! [`Value`]: crate::Value

use std::{borrow::Cow, fmt};

use crate::value::write_escaped_string;

/// Receives parse events in document order.
///
/// Strings and numbers are handed over borrowed from the input whenever
/// possible. A sink cannot fail; the parser stops at the first syntax error
/// and anything a sink built up to that point should be discarded.
pub trait EventSink<'src> {
    fn null(&mut self);
    fn boolean(&mut self, value: bool);
    /// A number literal, as its raw lexeme.
    fn number(&mut self, lexeme: &'src str);
    fn string(&mut self, value: Cow<'src, str>);
    fn object_begin(&mut self);
    /// The key of the next object member. Always followed by that member's
    /// value.
    fn object_key(&mut self, key: Cow<'src, str>);
    fn object_end(&mut self);
    fn array_begin(&mut self);
    fn array_end(&mut self);
}

impl<'src, S: EventSink<'src> + ?Sized> EventSink<'src> for &mut S {
    fn null(&mut self) {
        (**self).null();
    }

    fn boolean(&mut self, value: bool) {
        (**self).boolean(value);
    }

    fn number(&mut self, lexeme: &'src str) {
        (**self).number(lexeme);
    }

    fn string(&mut self, value: Cow<'src, str>) {
        (**self).string(value);
    }

    fn object_begin(&mut self) {
        (**self).object_begin();
    }

    fn object_key(&mut self, key: Cow<'src, str>) {
        (**self).object_key(key);
    }

    fn object_end(&mut self) {
        (**self).object_end();
    }

    fn array_begin(&mut self) {
        (**self).array_begin();
    }

    fn array_end(&mut self) {
        (**self).array_end();
    }
}

/// One recorded parse event.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize))]
#[cfg_attr(any(test, feature = "serde"), serde(tag = "kind", content = "value"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent<'src> {
    Null,
    Boolean(bool),
    /// The raw lexeme of a number.
    Number(Cow<'src, str>),
    String(Cow<'src, str>),
    ObjectBegin,
    ObjectKey(Cow<'src, str>),
    ObjectEnd,
    ArrayBegin,
    ArrayEnd,
}

impl ParseEvent<'_> {
    /// Detaches the event from the input buffer.
    #[must_use]
    pub fn into_owned(self) -> ParseEvent<'static> {
        match self {
            ParseEvent::Null => ParseEvent::Null,
            ParseEvent::Boolean(b) => ParseEvent::Boolean(b),
            ParseEvent::Number(n) => ParseEvent::Number(Cow::Owned(n.into_owned())),
            ParseEvent::String(s) => ParseEvent::String(Cow::Owned(s.into_owned())),
            ParseEvent::ObjectBegin => ParseEvent::ObjectBegin,
            ParseEvent::ObjectKey(k) => ParseEvent::ObjectKey(Cow::Owned(k.into_owned())),
            ParseEvent::ObjectEnd => ParseEvent::ObjectEnd,
            ParseEvent::ArrayBegin => ParseEvent::ArrayBegin,
            ParseEvent::ArrayEnd => ParseEvent::ArrayEnd,
        }
    }
}

/// One event per line, in a form meant for snapshots and debugging.
impl fmt::Display for ParseEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseEvent::Null => f.write_str("null"),
            ParseEvent::Boolean(b) => write!(f, "boolean {b}"),
            ParseEvent::Number(n) => write!(f, "number {n}"),
            ParseEvent::String(s) => {
                f.write_str("string \"")?;
                write_escaped_string(s, f)?;
                f.write_str("\"")
            }
            ParseEvent::ObjectBegin => f.write_str("object_begin"),
            ParseEvent::ObjectKey(k) => {
                f.write_str("key \"")?;
                write_escaped_string(k, f)?;
                f.write_str("\"")
            }
            ParseEvent::ObjectEnd => f.write_str("object_end"),
            ParseEvent::ArrayBegin => f.write_str("array_begin"),
            ParseEvent::ArrayEnd => f.write_str("array_end"),
        }
    }
}

impl<'src> EventSink<'src> for Vec<ParseEvent<'src>> {
    fn null(&mut self) {
        self.push(ParseEvent::Null);
    }

    fn boolean(&mut self, value: bool) {
        self.push(ParseEvent::Boolean(value));
    }

    fn number(&mut self, lexeme: &'src str) {
        self.push(ParseEvent::Number(Cow::Borrowed(lexeme)));
    }

    fn string(&mut self, value: Cow<'src, str>) {
        self.push(ParseEvent::String(value));
    }

    fn object_begin(&mut self) {
        self.push(ParseEvent::ObjectBegin);
    }

    fn object_key(&mut self, key: Cow<'src, str>) {
        self.push(ParseEvent::ObjectKey(key));
    }

    fn object_end(&mut self) {
        self.push(ParseEvent::ObjectEnd);
    }

    fn array_begin(&mut self) {
        self.push(ParseEvent::ArrayBegin);
    }

    fn array_end(&mut self) {
        self.push(ParseEvent::ArrayEnd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_one_line_per_event() {
        let rendered: Vec<String> = [
            ParseEvent::Null,
            ParseEvent::Boolean(false),
            ParseEvent::Number("-1e5".into()),
            ParseEvent::String("a\"\n".into()),
            ParseEvent::ObjectKey("k".into()),
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(
            rendered,
            ["null", "boolean false", "number -1e5", r#"string "a\"\n""#, r#"key "k""#]
        );
    }

    #[test]
    fn into_owned_detaches_from_the_input() {
        let owned = {
            let input = String::from("borrowed");
            ParseEvent::String(Cow::Borrowed(input.as_str())).into_owned()
        };
        assert_eq!(owned, ParseEvent::String("borrowed".into()));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&vec![
            ParseEvent::ObjectBegin,
            ParseEvent::ObjectKey("a".into()),
            ParseEvent::Number("1.0".into()),
            ParseEvent::ObjectEnd,
        ])
        .unwrap();
        assert_eq!(
            json,
            r#"[{"kind":"ObjectBegin"},{"kind":"ObjectKey","value":"a"},{"kind":"Number","value":"1.0"},{"kind":"ObjectEnd"}]"#
        );
    }
}
