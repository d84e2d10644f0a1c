/// Configuration options for the JSON parser.
///
/// # Examples
///
/// ```rust
/// use jsonbind::{ParserOptions, parse_with_options};
///
/// let options = ParserOptions {
///     max_depth: Some(2),
///     ..Default::default()
/// };
/// assert!(parse_with_options(b"[[1]]", options).is_ok());
/// assert!(parse_with_options(b"[[[1]]]", options).is_err());
/// ```
///
/// # Default
///
/// No depth limit, and `null` members are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum number of simultaneously open containers.
    ///
    /// The parser keeps its nesting state on the heap, so deep documents
    /// cannot overflow the call stack; this limit exists for callers that
    /// want to bound memory on untrusted input.
    ///
    /// # Default
    ///
    /// `None`
    pub max_depth: Option<usize>,

    /// Whether object members whose value is `null` are dropped while
    /// building a [`Value`](crate::Value).
    ///
    /// Array elements and a `null` root are always kept. Only affects tree
    /// building; custom [`EventSink`](crate::EventSink)s still see every
    /// `null`.
    ///
    /// # Default
    ///
    /// `false`
    pub ignore_nulls: bool,
}

/// What the object mapper does with JSON keys that no property claims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Skip the key.
    #[default]
    Ignore,
    /// Fail with [`MapperError::UnknownKey`](crate::MapperError::UnknownKey).
    Reject,
}

/// Configuration options for the object mapper.
///
/// # Default
///
/// `ignore_nulls` is `true`, unknown keys are ignored and objects nest at
/// most 128 levels deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperOptions {
    /// Whether a JSON `null` leaves the target property untouched.
    ///
    /// When `false`, `null` is assigned explicitly, which only succeeds for
    /// properties that accept it (for example `Option` fields).
    ///
    /// # Default
    ///
    /// `true`
    pub ignore_nulls: bool,

    /// Policy for keys that match no property.
    ///
    /// # Default
    ///
    /// [`UnknownKeys::Ignore`]
    pub unknown_keys: UnknownKeys,

    /// How many levels of nested objects one mapping call may descend.
    ///
    /// Mapping recurses once per nested object, so this bounds stack use
    /// for recursive classes fed deep documents.
    ///
    /// # Default
    ///
    /// `128`
    pub max_depth: usize,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            ignore_nulls: true,
            unknown_keys: UnknownKeys::Ignore,
            max_depth: 128,
        }
    }
}
