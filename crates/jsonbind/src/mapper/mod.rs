//! Declarative mapping between [`Value`] trees and application objects.
//!
//! Each mappable type implements [`Mappable`] (named get/set access) and
//! describes itself with a [`ClassDescriptor`]: which JSON key feeds which
//! property, the declared property types, array element types, converter
//! hooks, and which properties are written back out.
//!
//! ```text
//! {"name": "Ada"} --map_to_object--> Person { full_name: "Ada" }
//!                 <--map_to_json----
//! ```
//!
//! A [`Mapper`] carries only its [`MapperOptions`], so one instance can be
//! shared freely.

mod descriptor;
mod error;
mod property;

use log::{debug, trace};

pub use descriptor::{
    ClassDescriptor, ClassDescriptorBuilder, ClassRef, CustomMapper, ElementType, FieldMapping,
    FloatKind, IntegerKind, JsonConverter, PropertyType, ValueConverter,
};
pub use error::{MapperError, PropertyError};
pub use property::{AsAny, FromPropertyValue, Mappable, MappableClass, PropertyValue};

use crate::{
    Map, Number, Value,
    options::{MapperOptions, UnknownKeys},
};

/// Converts between JSON values and [`Mappable`] instances.
///
/// ```
/// use jsonbind::{Mapper, UnknownKeys};
///
/// let strict = Mapper::default().with_unknown_keys(UnknownKeys::Reject);
/// assert!(strict.options().ignore_nulls);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Mapper {
    options: MapperOptions,
}

impl Mapper {
    #[must_use]
    pub fn new(options: MapperOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> MapperOptions {
        self.options
    }

    /// A copy of this mapper with a different null policy.
    #[must_use]
    pub fn with_ignore_nulls(self, ignore_nulls: bool) -> Self {
        Self::new(MapperOptions {
            ignore_nulls,
            ..self.options
        })
    }

    /// A copy of this mapper with a different nesting limit.
    #[must_use]
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self::new(MapperOptions {
            max_depth,
            ..self.options
        })
    }

    /// A copy of this mapper with a different unknown-key policy.
    #[must_use]
    pub fn with_unknown_keys(self, unknown_keys: UnknownKeys) -> Self {
        Self::new(MapperOptions {
            unknown_keys,
            ..self.options
        })
    }

    /// Maps a JSON value to a new instance of `class`.
    ///
    /// The root must be an object, unless the class registers a root mapper,
    /// which then receives the root value whatever its kind.
    ///
    /// # Errors
    ///
    /// Any [`MapperError`]; the partially populated instance is dropped.
    pub fn map_to_object(
        &self,
        value: &Value,
        class: &ClassDescriptor,
    ) -> Result<Box<dyn Mappable>, MapperError> {
        trace!("mapping {} to {}", value.kind_name(), class.name());
        let result = self.map_nested(value, class, 0);
        if let Err(err) = &result {
            debug!("mapping to {} failed: {err}", class.name());
        }
        result
    }

    fn check_depth(&self, depth: usize) -> Result<(), MapperError> {
        if depth > self.options.max_depth {
            return Err(MapperError::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }

    /// `depth` counts the objects enclosing `value`.
    fn map_nested(
        &self,
        value: &Value,
        class: &ClassDescriptor,
        depth: usize,
    ) -> Result<Box<dyn Mappable>, MapperError> {
        self.check_depth(depth)?;
        if value.is_null() {
            return Err(MapperError::SourceValueIsNil);
        }
        let mut instance = class.instantiate()?;

        if let Some(root_mapper) = class.root_mapper() {
            root_mapper(instance.as_mut(), value)?;
            return Ok(instance);
        }

        let Value::Object(members) = value else {
            return Err(MapperError::InvalidRootValue {
                class: class.name(),
                found: value.kind_name(),
            });
        };
        self.populate(instance.as_mut(), class, members, depth)?;
        Ok(instance)
    }

    fn populate(
        &self,
        instance: &mut dyn Mappable,
        class: &ClassDescriptor,
        members: &Map,
        depth: usize,
    ) -> Result<(), MapperError> {
        for (key, member) in members {
            let Some(field) = class.field_for_key(key) else {
                match self.options.unknown_keys {
                    UnknownKeys::Ignore => {
                        debug!("{}: ignoring unknown key {key:?}", class.name());
                        continue;
                    }
                    UnknownKeys::Reject => {
                        return Err(MapperError::UnknownKey {
                            class: class.name(),
                            key: key.clone(),
                        });
                    }
                }
            };

            if self.options.ignore_nulls && member.is_null() {
                trace!("{}.{}: null ignored", class.name(), field.property);
                continue;
            }

            if let Some(custom) = field.custom {
                trace!("{}.{}: custom mapper", class.name(), field.property);
                custom(&mut *instance, member)?;
                continue;
            }

            let value = match field.to_object {
                Some(convert) => {
                    trace!("{}.{}: value converter", class.name(), field.property);
                    convert(member)?
                }
                None => {
                    let Some(ty) = field.property_type else {
                        return Err(MapperError::NotFieldCompliant {
                            target: class.name(),
                            key: key.clone(),
                        });
                    };
                    self.coerce(&ty, field.element_type, field.property, member, depth)?
                }
            };

            instance
                .set_property(field.property, value)
                .map_err(|err| err.into_mapper_error(class.name(), key))?;
        }
        Ok(())
    }

    /// Converts a JSON member to the declared property type.
    fn coerce(
        &self,
        ty: &PropertyType,
        element_type: Option<ElementType>,
        property: &str,
        value: &Value,
        depth: usize,
    ) -> Result<PropertyValue, MapperError> {
        let mismatch = |expected: &'static str| MapperError::TypeMismatch {
            property: property.to_owned(),
            expected,
            found: describe(value),
        };

        if value.is_null() {
            return Ok(PropertyValue::Null);
        }

        match ty {
            PropertyType::Bool => value
                .as_bool()
                .map(PropertyValue::Bool)
                .ok_or_else(|| mismatch("boolean")),
            PropertyType::Integer(kind) => {
                let n = value.as_number().ok_or_else(|| mismatch(kind.name()))?;
                coerce_integer(*kind, n).ok_or_else(|| mismatch(kind.name()))
            }
            PropertyType::Float(kind) => {
                let f = value.as_f64().ok_or_else(|| mismatch("float"))?;
                if *kind == FloatKind::F32 && f.abs() > f64::from(f32::MAX) {
                    return Err(mismatch("f32"));
                }
                Ok(PropertyValue::Float(f))
            }
            PropertyType::String => value
                .as_str()
                .map(|s| PropertyValue::String(s.to_owned()))
                .ok_or_else(|| mismatch("string")),
            PropertyType::Number => value
                .as_number()
                .map(|n| PropertyValue::Number(n.clone()))
                .ok_or_else(|| mismatch("number")),
            PropertyType::Json => Ok(PropertyValue::Json(value.clone())),
            PropertyType::Array => {
                let items = value.as_array().ok_or_else(|| mismatch("array"))?;
                items
                    .iter()
                    .map(|item| self.coerce_element(element_type, property, item, depth))
                    .collect::<Result<Vec<_>, _>>()
                    .map(PropertyValue::Array)
            }
            PropertyType::Object(class) => {
                let nested = class.resolve();
                if !value.is_object() && nested.root_mapper().is_none() {
                    return Err(mismatch("object"));
                }
                trace!("{property}: nested {}", nested.name());
                self.map_nested(value, &nested, depth + 1)
                    .map(PropertyValue::Object)
            }
            PropertyType::Custom(_) => Err(MapperError::UnsupportedType {
                property: property.to_owned(),
            }),
        }
    }

    fn coerce_element(
        &self,
        element_type: Option<ElementType>,
        property: &str,
        item: &Value,
        depth: usize,
    ) -> Result<PropertyValue, MapperError> {
        match (element_type, item) {
            (Some(ElementType::Object(_)), Value::Null) => Err(MapperError::TargetArrayIsNil {
                property: property.to_owned(),
            }),
            (Some(element), _) => {
                self.coerce(&element.as_property_type(), None, property, item, depth)
            }
            (None, Value::Null) => Ok(PropertyValue::Null),
            (None, Value::Bool(b)) => Ok(PropertyValue::Bool(*b)),
            (None, Value::Number(n)) => Ok(PropertyValue::Number(n.clone())),
            (None, Value::String(s)) => Ok(PropertyValue::String(s.clone())),
            (None, Value::Array(_) | Value::Object(_)) => {
                Err(MapperError::MissingArrayElementType {
                    property: property.to_owned(),
                })
            }
        }
    }

    /// Maps a JSON value to a `T`.
    ///
    /// # Errors
    ///
    /// Any [`MapperError`]. [`MapperError::Unknown`] if `T`'s descriptor
    /// creates instances of some other type.
    pub fn map<T: MappableClass>(&self, value: &Value) -> Result<T, MapperError> {
        let boxed = self.map_to_object(value, &T::class())?;
        boxed.downcast::<T>().map(|b| *b).ok_or(MapperError::Unknown)
    }

    /// Maps a JSON array of objects to instances of `class`, preserving order.
    ///
    /// # Errors
    ///
    /// [`MapperError::SourceArrayIsNil`] for `null`,
    /// [`MapperError::InvalidRootValue`] for anything but an array, or the
    /// first error from mapping an element.
    pub fn map_array_to_objects(
        &self,
        value: &Value,
        class: &ClassDescriptor,
    ) -> Result<Vec<Box<dyn Mappable>>, MapperError> {
        match value {
            Value::Null => Err(MapperError::SourceArrayIsNil),
            Value::Array(items) => items
                .iter()
                .map(|item| self.map_to_object(item, class))
                .collect(),
            other => Err(MapperError::InvalidRootValue {
                class: class.name(),
                found: other.kind_name(),
            }),
        }
    }

    /// Typed form of [`map_array_to_objects`](Self::map_array_to_objects).
    ///
    /// # Errors
    ///
    /// As [`map_array_to_objects`](Self::map_array_to_objects).
    pub fn map_array<T: MappableClass>(&self, value: &Value) -> Result<Vec<T>, MapperError> {
        self.map_array_to_objects(value, &T::class())?
            .into_iter()
            .map(|boxed| boxed.downcast::<T>().map(|b| *b).ok_or(MapperError::Unknown))
            .collect()
    }

    /// Renders an instance as a JSON object.
    ///
    /// # Errors
    ///
    /// [`MapperError::SourceObjectIsNil`] for `None`, otherwise as
    /// [`to_json`](Self::to_json).
    pub fn map_to_json(&self, instance: Option<&dyn Mappable>) -> Result<Value, MapperError> {
        let instance = instance.ok_or(MapperError::SourceObjectIsNil)?;
        self.to_json(instance)
    }

    /// Renders an instance as a JSON object.
    ///
    /// Properties are written in declaration order under their JSON keys,
    /// restricted by the class's include or exclude set.
    ///
    /// # Errors
    ///
    /// [`MapperError::NotFieldCompliant`] if a declared property cannot be
    /// read, [`MapperError::UnsupportedType`] for custom values without a
    /// converter, [`MapperError::DepthLimitExceeded`] for instances nested
    /// deeper than the configured limit, or any converter error.
    pub fn to_json(&self, instance: &dyn Mappable) -> Result<Value, MapperError> {
        self.render(instance, 0)
    }

    fn render(&self, instance: &dyn Mappable, depth: usize) -> Result<Value, MapperError> {
        self.check_depth(depth)?;
        let class = instance.descriptor();
        trace!("rendering {} as JSON", class.name());
        let mut members = Map::new();
        for (property, key) in class.json_properties() {
            let value = instance.get_property(property).ok_or_else(|| {
                MapperError::NotFieldCompliant {
                    target: class.name(),
                    key: property.to_owned(),
                }
            })?;
            let json = match class.to_json_converter(property) {
                Some(convert) => convert(&value)?,
                None => self.property_to_json(property, value, depth)?,
            };
            members.insert(key.to_owned(), json);
        }
        Ok(Value::Object(members))
    }

    fn property_to_json(
        &self,
        property: &str,
        value: PropertyValue,
        depth: usize,
    ) -> Result<Value, MapperError> {
        let unsupported = || MapperError::UnsupportedType {
            property: property.to_owned(),
        };
        Ok(match value {
            PropertyValue::Null => Value::Null,
            PropertyValue::Bool(b) => Value::Bool(b),
            PropertyValue::Int(i) => Value::from(i),
            PropertyValue::UInt(u) => Value::from(u),
            PropertyValue::Float(f) => Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(unsupported)?,
            PropertyValue::String(s) => Value::String(s),
            PropertyValue::Number(n) => Value::Number(n),
            PropertyValue::Json(v) => v,
            PropertyValue::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.property_to_json(property, item, depth))
                    .collect::<Result<_, _>>()?,
            ),
            PropertyValue::Object(object) => self.render(object.as_ref(), depth + 1)?,
            PropertyValue::Custom(_) => return Err(unsupported()),
        })
    }
}

/// How a mismatching value is shown in errors: numbers and booleans by value,
/// everything else by kind.
fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("number {n}"),
        Value::Bool(b) => format!("boolean {b}"),
        other => other.kind_name().to_owned(),
    }
}

fn coerce_integer(kind: IntegerKind, n: &Number) -> Option<PropertyValue> {
    let wide = match n.as_i128() {
        Some(i) => i,
        None => integral_f64(n.as_f64()?)?,
    };
    let (min, max) = kind.bounds();
    if wide < min || wide > max {
        return None;
    }
    if kind.is_signed() {
        i64::try_from(wide).ok().map(PropertyValue::Int)
    } else {
        u64::try_from(wide).ok().map(PropertyValue::UInt)
    }
}

/// `1.0` and `1e2` are accepted for integer properties.
#[allow(clippy::cast_possible_truncation)]
fn integral_f64(f: f64) -> Option<i128> {
    // Beyond 2^64 the value is outside every integer kind anyway.
    (f.fract() == 0.0 && f.abs() < 1.9e19).then(|| f as i128)
}
