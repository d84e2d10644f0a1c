//! The get/set capability application types implement to become mappable.

use std::{any::Any, fmt, sync::Arc};

use super::{ClassDescriptor, PropertyError};
use crate::{Number, Value};

/// Upcasts to [`Any`] so boxed trait objects can be downcast.
///
/// Implemented for every `'static` type; there is no need to implement it by
/// hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Named-property access for the object mapper.
///
/// Implementors expose each mapped field by name. The mapper never touches
/// fields directly; it converts JSON to a [`PropertyValue`] according to the
/// class's [`ClassDescriptor`] and hands it to [`set_property`], and reads
/// values back through [`get_property`] when rendering JSON.
///
/// ```
/// use std::sync::{Arc, LazyLock};
///
/// use jsonbind::mapper::{
///     ClassDescriptor, Mappable, MappableClass, PropertyError, PropertyType, PropertyValue,
/// };
///
/// #[derive(Debug, Default)]
/// struct Tag {
///     name: String,
/// }
///
/// impl Mappable for Tag {
///     fn descriptor(&self) -> Arc<ClassDescriptor> {
///         Self::class()
///     }
///
///     fn get_property(&self, name: &str) -> Option<PropertyValue> {
///         match name {
///             "name" => Some(self.name.clone().into()),
///             _ => None,
///         }
///     }
///
///     fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
///         match name {
///             "name" => self.name = value.extract()?,
///             _ => return Err(PropertyError::UnknownProperty(name.to_owned())),
///         }
///         Ok(())
///     }
/// }
///
/// impl MappableClass for Tag {
///     fn class() -> Arc<ClassDescriptor> {
///         static CLASS: LazyLock<Arc<ClassDescriptor>> = LazyLock::new(|| {
///             ClassDescriptor::builder::<Tag>("Tag")
///                 .property("name", PropertyType::String)
///                 .build()
///         });
///         CLASS.clone()
///     }
/// }
///
/// let tag: Tag = jsonbind::from_value(&r#"{"name": "rust"}"#.parse().unwrap()).unwrap();
/// assert_eq!(tag.name, "rust");
/// ```
///
/// [`set_property`]: Mappable::set_property
/// [`get_property`]: Mappable::get_property
pub trait Mappable: AsAny + fmt::Debug + 'static {
    /// The descriptor of this instance's class.
    fn descriptor(&self) -> Arc<ClassDescriptor>;

    /// Reads a property. Returns `None` if the property does not exist.
    fn get_property(&self, name: &str) -> Option<PropertyValue>;

    /// Assigns a property.
    ///
    /// # Errors
    ///
    /// [`PropertyError::UnknownProperty`] if there is no such settable
    /// property, [`PropertyError::TypeMismatch`] if the value has the wrong
    /// shape.
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError>;
}

/// A [`Mappable`] type with a statically known descriptor.
pub trait MappableClass: Mappable + Sized {
    fn class() -> Arc<ClassDescriptor>;
}

impl dyn Mappable {
    /// Returns `true` if the boxed instance is a `T`.
    #[must_use]
    pub fn is<T: Mappable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[must_use]
    pub fn downcast_ref<T: Mappable>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: Mappable>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Recovers the concrete instance, or `None` if it is not a `T`.
    #[must_use]
    pub fn downcast<T: Mappable>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast().ok()
    }
}

/// A dynamically typed property value passed through
/// [`Mappable::get_property`] and [`Mappable::set_property`].
///
/// Signed integer properties travel as [`Int`](Self::Int), unsigned ones as
/// [`UInt`](Self::UInt), and both float widths as [`Float`](Self::Float).
#[derive(Debug)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    /// A number kept as its lexeme.
    Number(Number),
    /// An untyped JSON subtree.
    Json(Value),
    Array(Vec<PropertyValue>),
    /// A nested mapped instance.
    Object(Box<dyn Mappable>),
    /// A value of an application type that only converters understand.
    Custom(Box<dyn Any>),
}

impl PropertyValue {
    /// Wraps a nested instance.
    pub fn object<T: Mappable>(value: T) -> Self {
        PropertyValue::Object(Box::new(value))
    }

    /// Wraps a sequence of nested instances.
    pub fn objects<T, I>(values: I) -> Self
    where
        T: Mappable,
        I: IntoIterator<Item = T>,
    {
        PropertyValue::Array(values.into_iter().map(PropertyValue::object).collect())
    }

    /// Wraps a value of an application type.
    pub fn custom<T: Any>(value: T) -> Self {
        PropertyValue::Custom(Box::new(value))
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// A short name for the kind of value, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Bool(_) => "boolean",
            PropertyValue::Int(_) | PropertyValue::UInt(_) => "integer",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
            PropertyValue::Number(_) => "number",
            PropertyValue::Json(_) => "json",
            PropertyValue::Array(_) => "array",
            PropertyValue::Object(_) => "object",
            PropertyValue::Custom(_) => "custom value",
        }
    }

    /// Converts into a concrete field type.
    ///
    /// # Errors
    ///
    /// [`PropertyError::TypeMismatch`] if the value does not fit `T`.
    pub fn extract<T: FromPropertyValue>(self) -> Result<T, PropertyError> {
        T::from_property_value(self)
    }

    /// Unwraps a nested instance of type `T`.
    ///
    /// # Errors
    ///
    /// [`PropertyError::TypeMismatch`] if the value is not an object of type
    /// `T`.
    pub fn into_object<T: Mappable>(self) -> Result<T, PropertyError> {
        match self {
            PropertyValue::Object(object) => object
                .downcast::<T>()
                .map(|boxed| *boxed)
                .ok_or(mismatch("object of the declared class", "object")),
            other => Err(mismatch("object", other.kind_name())),
        }
    }

    /// Unwraps an array of nested instances of type `T`.
    ///
    /// # Errors
    ///
    /// [`PropertyError::TypeMismatch`] if the value is not an array or any
    /// element is not an object of type `T`.
    pub fn into_objects<T: Mappable>(self) -> Result<Vec<T>, PropertyError> {
        match self {
            PropertyValue::Array(items) => items.into_iter().map(Self::into_object).collect(),
            other => Err(mismatch("array", other.kind_name())),
        }
    }

    /// Unwraps a custom application value.
    ///
    /// # Errors
    ///
    /// [`PropertyError::TypeMismatch`] if the value is not a `T`.
    pub fn into_custom<T: Any>(self) -> Result<T, PropertyError> {
        match self {
            PropertyValue::Custom(any) => any
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| mismatch("custom value of the declared type", "custom value")),
            other => Err(mismatch("custom value", other.kind_name())),
        }
    }
}

fn mismatch(expected: &'static str, found: &'static str) -> PropertyError {
    PropertyError::TypeMismatch { expected, found }
}

/// Conversion out of a [`PropertyValue`], used by [`PropertyValue::extract`].
pub trait FromPropertyValue: Sized {
    /// # Errors
    ///
    /// [`PropertyError::TypeMismatch`] if the value does not fit.
    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError>;
}

impl FromPropertyValue for bool {
    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Bool(b) => Ok(b),
            other => Err(mismatch("boolean", other.kind_name())),
        }
    }
}

macro_rules! from_property_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromPropertyValue for $ty {
                fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
                    let converted = match value {
                        PropertyValue::Int(i) => <$ty>::try_from(i).ok(),
                        PropertyValue::UInt(u) => <$ty>::try_from(u).ok(),
                        PropertyValue::Number(ref n) => n.as_i128().and_then(|i| <$ty>::try_from(i).ok()),
                        ref other => return Err(mismatch(stringify!($ty), other.kind_name())),
                    };
                    converted.ok_or(mismatch(stringify!($ty), "integer out of range"))
                }
            }
        )*
    };
}

from_property_value_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromPropertyValue for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Float(f) => Ok(f),
            PropertyValue::Int(i) => Ok(i as f64),
            PropertyValue::UInt(u) => Ok(u as f64),
            PropertyValue::Number(n) => n.as_f64().ok_or(mismatch("f64", "number out of range")),
            other => Err(mismatch("f64", other.kind_name())),
        }
    }
}

impl FromPropertyValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        let wide = f64::from_property_value(value)
            .map_err(|_| mismatch("f32", "non-numeric value"))?;
        if wide.abs() > f64::from(f32::MAX) {
            return Err(mismatch("f32", "number out of range"));
        }
        Ok(wide as f32)
    }
}

impl FromPropertyValue for String {
    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::String(s) => Ok(s),
            other => Err(mismatch("string", other.kind_name())),
        }
    }
}

impl FromPropertyValue for Number {
    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Number(n) => Ok(n),
            PropertyValue::Int(i) => Ok(Number::from(i)),
            PropertyValue::UInt(u) => Ok(Number::from(u)),
            PropertyValue::Float(f) => {
                Number::from_f64(f).ok_or(mismatch("number", "non-finite float"))
            }
            other => Err(mismatch("number", other.kind_name())),
        }
    }
}

impl FromPropertyValue for Value {
    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Json(v) => Ok(v),
            PropertyValue::Null => Ok(Value::Null),
            other => Err(mismatch("json", other.kind_name())),
        }
    }
}

impl<T: FromPropertyValue> FromPropertyValue for Vec<T> {
    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Array(items) => items.into_iter().map(T::from_property_value).collect(),
            other => Err(mismatch("array", other.kind_name())),
        }
    }
}

impl<T: FromPropertyValue> FromPropertyValue for Option<T> {
    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Null => Ok(None),
            other => T::from_property_value(other).map(Some),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

macro_rules! property_value_from_int {
    ($variant:ident as $wide:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(v: $ty) -> Self {
                    PropertyValue::$variant(<$wide>::from(v))
                }
            }
        )*
    };
}

property_value_from_int!(Int as i64: i8, i16, i32, i64);
property_value_from_int!(UInt as u64: u8, u16, u32, u64);

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(f64::from(v))
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_owned())
    }
}

impl From<Number> for PropertyValue {
    fn from(v: Number) -> Self {
        PropertyValue::Number(v)
    }
}

impl From<Value> for PropertyValue {
    fn from(v: Value) -> Self {
        PropertyValue::Json(v)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(v: Vec<T>) -> Self {
        PropertyValue::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(PropertyValue::Null, Into::into)
    }
}
