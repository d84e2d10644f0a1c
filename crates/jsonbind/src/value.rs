//! JSON value types and utilities.
//!
//! This module defines the [`Value`] enum, which represents any valid JSON
//! value, and the compact renderer used by its `Display` implementation.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;

use crate::{Number, ParseError};

/// Object members in insertion order.
pub type Map = IndexMap<String, Value>;
/// Array elements.
pub type Array = Vec<Value>;

/// A JSON value as defined by [RFC 8259].
///
/// Objects keep their keys in insertion order; when a document repeats a key
/// the last value wins but keeps the slot of the first occurrence.
///
/// # Examples
///
/// ```
/// use jsonbind::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("key".to_string(), Value::from("value"));
/// map.insert("n".to_string(), Value::from(3));
/// let v = Value::Object(map);
/// assert_eq!(v.to_string(), r#"{"key":"value","n":3}"#);
/// ```
///
/// [RFC 8259]: https://datatracker.ietf.org/doc/html/rfc8259
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize), serde(untagged))]
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Array),
    Object(Map),
}

impl Value {
    /// A short name for the kind of value, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Returns `true` if the value is [`Null`](Value::Null).
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is a boolean.
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(..))
    }

    /// Returns `true` if the value is a number.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(..))
    }

    /// Returns `true` if the value is a string.
    ///
    /// ```
    /// use jsonbind::Value;
    ///
    /// assert!(Value::from("foo").is_string());
    /// assert!(!Value::Null.is_string());
    /// ```
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    /// Returns `true` if the value is an array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    /// Returns `true` if the value is an object.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(..))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(Number::as_u64)
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up an object member. Returns `None` for non-objects.
    ///
    /// ```
    /// use jsonbind::Value;
    ///
    /// let v: Value = r#"{"a": {"b": [10, 20]}}"#.parse().unwrap();
    /// let b = v.get("a").and_then(|a| a.get("b")).unwrap();
    /// assert_eq!(b.get_index(1), Some(&Value::from(20)));
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|m| m.get(key))
    }

    /// Looks up an array element. Returns `None` for non-arrays.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|a| a.get(index))
    }

    /// Renders the value as compact JSON.
    #[must_use]
    pub fn to_json_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Number(Number::from(v))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32, u64);

/// Non-finite floats become [`Value::Null`].
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Number::from_f64(v).map_or(Self::Null, Self::Number)
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Self::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl FromStr for Value {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse(s.as_bytes())
    }
}

/// Writes `src` as the body of a JSON string literal.
///
/// Quotes, backslashes, control characters and the U+2028/U+2029 line
/// separators are escaped; everything else is written as is.
pub(crate) fn write_escaped_string<W: fmt::Write>(src: &str, f: &mut W) -> fmt::Result {
    let mut run = 0;
    for (i, c) in src.char_indices() {
        let escaped = match c {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            '\u{2028}' | '\u{2029}' => "",
            c if c.is_control() => "",
            _ => continue,
        };
        f.write_str(&src[run..i])?;
        if escaped.is_empty() {
            write!(f, "\\u{:04X}", c as u32)?;
        } else {
            f.write_str(escaped)?;
        }
        run = i + c.len_utf8();
    }
    f.write_str(&src[run..])
}

/// Open container in [`write_compact`], with whether a member was written.
enum Frame<'a> {
    Array(std::slice::Iter<'a, Value>, bool),
    Object(indexmap::map::Iter<'a, String, Value>, bool),
}

/// Renders `value` as compact JSON using a heap stack, so any tree the
/// parser accepts can be rendered.
fn write_compact<W: fmt::Write>(value: &Value, f: &mut W) -> fmt::Result {
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut next = Some(value);
    loop {
        if let Some(value) = next.take() {
            match value {
                Value::Null => f.write_str("null")?,
                Value::Bool(b) => f.write_str(if *b { "true" } else { "false" })?,
                Value::Number(n) => write!(f, "{n}")?,
                Value::String(s) => {
                    f.write_str("\"")?;
                    write_escaped_string(s, f)?;
                    f.write_str("\"")?;
                }
                Value::Array(items) => {
                    f.write_str("[")?;
                    stack.push(Frame::Array(items.iter(), false));
                }
                Value::Object(members) => {
                    f.write_str("{")?;
                    stack.push(Frame::Object(members.iter(), false));
                }
            }
        }

        let Some(frame) = stack.last_mut() else {
            return Ok(());
        };
        let (member, started, close) = match frame {
            Frame::Array(items, started) => (items.next().map(|v| (None, v)), started, "]"),
            Frame::Object(members, started) => (
                members.next().map(|(k, v)| (Some(k.as_str()), v)),
                started,
                "}",
            ),
        };
        match member {
            Some((key, value)) => {
                if std::mem::replace(started, true) {
                    f.write_str(",")?;
                }
                if let Some(key) = key {
                    f.write_str("\"")?;
                    write_escaped_string(key, f)?;
                    f.write_str("\":")?;
                }
                next = Some(value);
            }
            None => {
                f.write_str(close)?;
                stack.pop();
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_compact(self, f)
    }
}

impl Value {
    fn has_nested_containers(&self) -> bool {
        match self {
            Value::Array(items) => items.iter().any(|v| v.is_array() || v.is_object()),
            Value::Object(members) => members.values().any(|v| v.is_array() || v.is_object()),
            _ => false,
        }
    }
}

/// Containers are torn down from a heap work-list; the derived drop would
/// recurse once per nesting level.
impl Drop for Value {
    fn drop(&mut self) {
        if !self.has_nested_containers() {
            return;
        }
        let mut pending: Vec<Value> = match self {
            Value::Array(items) => std::mem::take(items),
            Value::Object(members) => members.drain(..).map(|(_, v)| v).collect(),
            _ => return,
        };
        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::Array(items) => pending.append(items),
                Value::Object(members) => pending.extend(members.drain(..).map(|(_, v)| v)),
                _ => {}
            }
        }
    }
}
