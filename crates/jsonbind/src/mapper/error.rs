use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why an object mapping failed.
///
/// A failed mapping never hands back a partially populated instance; the
/// error is all the caller receives.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MapperError {
    #[error("unknown mapping failure")]
    Unknown,
    #[error("source value is null")]
    SourceValueIsNil,
    #[error("target class has no constructor")]
    TargetClassIsNil,
    #[error("root value of kind {found} cannot be mapped to {class}")]
    InvalidRootValue { class: &'static str, found: &'static str },
    #[error("source array is null")]
    SourceArrayIsNil,
    #[error("array property `{property}` has a null element")]
    TargetArrayIsNil { property: String },
    #[error("could not create an instance of {class}")]
    CouldNotCreateInstance { class: &'static str },
    #[error("{target} has no settable property for `{key}`")]
    NotFieldCompliant { target: &'static str, key: String },
    #[error("property `{property}` has a type with no JSON conversion")]
    UnsupportedType { property: String },
    #[error("{0}")]
    GeneralError(#[source] BoxError),
    #[error("source object is null")]
    SourceObjectIsNil,
    #[error("property `{property}` expects {expected}, found {found}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
        found: String,
    },
    #[error("array property `{property}` needs an element type to map non-scalar elements")]
    MissingArrayElementType { property: String },
    #[error("{class} has no property for key `{key}`")]
    UnknownKey { class: &'static str, key: String },
    #[error("objects nest deeper than the limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}

impl MapperError {
    /// Wraps a failure from application code, such as a converter.
    pub fn general<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        MapperError::GeneralError(err.into())
    }
}

/// Failure reported by a [`Mappable`](super::Mappable) setter or by a typed
/// extraction from a [`PropertyValue`](super::PropertyValue).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("no such property `{0}`")]
    UnknownProperty(String),
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl PropertyError {
    /// Attaches the class and JSON key the failed assignment came from.
    pub(crate) fn into_mapper_error(self, class: &'static str, key: &str) -> MapperError {
        match self {
            PropertyError::UnknownProperty(_) => MapperError::NotFieldCompliant {
                target: class,
                key: key.to_owned(),
            },
            PropertyError::TypeMismatch { expected, found } => MapperError::TypeMismatch {
                property: key.to_owned(),
                expected,
                found: found.to_owned(),
            },
        }
    }
}
