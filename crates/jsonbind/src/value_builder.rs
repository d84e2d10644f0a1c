//! Materializes a [`Value`] tree from parse events.

use std::borrow::Cow;

use crate::{
    Number,
    event::EventSink,
    value::{Array, Map, Value},
};

#[derive(Debug)]
enum OpenContainer {
    Array(Array),
    Object {
        members: Map,
        /// Key of the member whose value comes next.
        pending_key: Option<String>,
    },
}

/// An [`EventSink`] that builds a [`Value`].
///
/// Containers are mutated only while they are on the builder's stack; once
/// closed they are moved into their parent.
///
/// ```
/// use jsonbind::{Parser, Value, ValueBuilder};
///
/// let mut builder = ValueBuilder::new(true);
/// Parser::new(br#"{"a": null, "b": [null]}"#).parse(&mut builder).unwrap();
/// let value = builder.into_value().unwrap();
/// assert_eq!(value.to_string(), r#"{"b":[null]}"#);
/// ```
#[derive(Debug, Default)]
pub struct ValueBuilder {
    stack: Vec<OpenContainer>,
    root: Option<Value>,
    ignore_nulls: bool,
}

impl ValueBuilder {
    /// Creates a builder. With `ignore_nulls`, object members whose value is
    /// `null` are left out; array elements and a `null` root are kept.
    #[must_use]
    pub fn new(ignore_nulls: bool) -> Self {
        Self {
            ignore_nulls,
            ..Self::default()
        }
    }

    /// The finished document, or `None` if no complete root value was seen.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        if self.stack.is_empty() {
            self.root
        } else {
            None
        }
    }

    fn attach(&mut self, value: Value) {
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(OpenContainer::Array(items)) => items.push(value),
            Some(OpenContainer::Object {
                members,
                pending_key,
            }) => {
                // The parser always emits a key before a member value.
                let Some(key) = pending_key.take() else {
                    return;
                };
                if self.ignore_nulls && value.is_null() {
                    // A dropped `null` still overrides an earlier duplicate.
                    members.shift_remove(&key);
                    return;
                }
                members.insert(key, value);
            }
        }
    }
}

impl<'src> EventSink<'src> for ValueBuilder {
    fn null(&mut self) {
        self.attach(Value::Null);
    }

    fn boolean(&mut self, value: bool) {
        self.attach(Value::Bool(value));
    }

    fn number(&mut self, lexeme: &'src str) {
        self.attach(Value::Number(Number::from_lexeme_unchecked(lexeme)));
    }

    fn string(&mut self, value: Cow<'src, str>) {
        self.attach(Value::String(value.into_owned()));
    }

    fn object_begin(&mut self) {
        self.stack.push(OpenContainer::Object {
            members: Map::new(),
            pending_key: None,
        });
    }

    fn object_key(&mut self, key: Cow<'src, str>) {
        if let Some(OpenContainer::Object { pending_key, .. }) = self.stack.last_mut() {
            *pending_key = Some(key.into_owned());
        }
    }

    fn object_end(&mut self) {
        if let Some(OpenContainer::Object { members, .. }) = self.stack.pop() {
            self.attach(Value::Object(members));
        }
    }

    fn array_begin(&mut self) {
        self.stack.push(OpenContainer::Array(Array::new()));
    }

    fn array_end(&mut self) {
        if let Some(OpenContainer::Array(items)) = self.stack.pop() {
            self.attach(Value::Array(items));
        }
    }
}
