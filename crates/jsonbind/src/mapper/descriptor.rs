//! Per-class mapping metadata.

use std::{
    any::{TypeId, type_name},
    collections::{HashMap, HashSet},
    fmt,
    marker::PhantomData,
    sync::Arc,
};

use indexmap::IndexMap;

use super::{Mappable, MappableClass, MapperError, PropertyValue};
use crate::Value;

/// Converts a raw JSON member into the value assigned to a property.
pub type ValueConverter = Arc<dyn Fn(&Value) -> Result<PropertyValue, MapperError> + Send + Sync>;
/// Converts a property value into JSON.
pub type JsonConverter = Arc<dyn Fn(&PropertyValue) -> Result<Value, MapperError> + Send + Sync>;
/// Takes over the mapping of one JSON member, mutating the instance directly.
pub type CustomMapper =
    Arc<dyn Fn(&mut dyn Mappable, &Value) -> Result<(), MapperError> + Send + Sync>;
type Constructor = Arc<dyn Fn() -> Option<Box<dyn Mappable>> + Send + Sync>;

/// A lazily resolved reference to a class, so that classes can refer to
/// themselves or to each other.
#[derive(Clone, Copy)]
pub struct ClassRef(fn() -> Arc<ClassDescriptor>);

impl ClassRef {
    #[must_use]
    pub fn of<T: MappableClass>() -> Self {
        ClassRef(T::class)
    }

    #[must_use]
    pub fn resolve(&self) -> Arc<ClassDescriptor> {
        (self.0)()
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassRef({})", self.resolve().name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntegerKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            IntegerKind::I8 => "i8",
            IntegerKind::I16 => "i16",
            IntegerKind::I32 => "i32",
            IntegerKind::I64 => "i64",
            IntegerKind::U8 => "u8",
            IntegerKind::U16 => "u16",
            IntegerKind::U32 => "u32",
            IntegerKind::U64 => "u64",
        }
    }

    /// Inclusive value range.
    #[must_use]
    pub fn bounds(self) -> (i128, i128) {
        match self {
            IntegerKind::I8 => (i8::MIN.into(), i8::MAX.into()),
            IntegerKind::I16 => (i16::MIN.into(), i16::MAX.into()),
            IntegerKind::I32 => (i32::MIN.into(), i32::MAX.into()),
            IntegerKind::I64 => (i64::MIN.into(), i64::MAX.into()),
            IntegerKind::U8 => (0, u8::MAX.into()),
            IntegerKind::U16 => (0, u16::MAX.into()),
            IntegerKind::U32 => (0, u32::MAX.into()),
            IntegerKind::U64 => (0, u64::MAX.into()),
        }
    }

    #[must_use]
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            IntegerKind::I8 | IntegerKind::I16 | IntegerKind::I32 | IntegerKind::I64
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatKind {
    F32,
    F64,
}

/// The declared type of a property, which drives JSON coercion.
#[derive(Debug, Clone, Copy)]
pub enum PropertyType {
    Bool,
    Integer(IntegerKind),
    Float(FloatKind),
    String,
    /// A lossless [`Number`](crate::Number).
    Number,
    /// Any JSON, kept as a [`Value`].
    Json,
    /// A sequence; element handling comes from
    /// [`ClassDescriptorBuilder::array_element`].
    Array,
    Object(ClassRef),
    /// An application type with no built-in JSON form. Needs converters.
    Custom(&'static str),
}

impl PropertyType {
    #[must_use]
    pub fn object<T: MappableClass>() -> Self {
        PropertyType::Object(ClassRef::of::<T>())
    }
}

/// The declared type of array elements.
#[derive(Debug, Clone, Copy)]
pub enum ElementType {
    Bool,
    Integer(IntegerKind),
    Float(FloatKind),
    String,
    Number,
    Json,
    Object(ClassRef),
}

impl ElementType {
    #[must_use]
    pub fn object<T: MappableClass>() -> Self {
        ElementType::Object(ClassRef::of::<T>())
    }

    pub(crate) fn as_property_type(self) -> PropertyType {
        match self {
            ElementType::Bool => PropertyType::Bool,
            ElementType::Integer(kind) => PropertyType::Integer(kind),
            ElementType::Float(kind) => PropertyType::Float(kind),
            ElementType::String => PropertyType::String,
            ElementType::Number => PropertyType::Number,
            ElementType::Json => PropertyType::Json,
            ElementType::Object(class) => PropertyType::Object(class),
        }
    }
}

/// The resolved mapping rule for one JSON key.
#[derive(Clone, Copy)]
pub struct FieldMapping<'a> {
    pub json_key: &'a str,
    pub property: &'a str,
    /// `None` when the key resolves to a name the class never declared.
    pub property_type: Option<PropertyType>,
    pub element_type: Option<ElementType>,
    pub to_object: Option<&'a ValueConverter>,
    pub to_json: Option<&'a JsonConverter>,
    pub custom: Option<&'a CustomMapper>,
}

impl fmt::Debug for FieldMapping<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMapping")
            .field("json_key", &self.json_key)
            .field("property", &self.property)
            .field("property_type", &self.property_type)
            .field("element_type", &self.element_type)
            .field("to_object", &self.to_object.is_some())
            .field("to_json", &self.to_json.is_some())
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// Everything the mapper knows about one class.
///
/// Descriptors are immutable once built and are shared behind an [`Arc`].
pub struct ClassDescriptor {
    name: &'static str,
    type_id: TypeId,
    properties: IndexMap<String, PropertyType>,
    key_to_property: HashMap<String, String>,
    property_to_key: HashMap<String, String>,
    element_types: HashMap<String, ElementType>,
    converters: HashMap<String, ValueConverter>,
    json_converters: HashMap<String, JsonConverter>,
    custom_mappers: HashMap<String, CustomMapper>,
    exclude_from_json: Option<HashSet<String>>,
    include_in_json: Option<HashSet<String>>,
    root_mapper: Option<CustomMapper>,
    constructor: Option<Constructor>,
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .field("key_to_property", &self.key_to_property)
            .finish_non_exhaustive()
    }
}

impl ClassDescriptor {
    /// Starts a descriptor for `T`, constructed with `T::default()`.
    pub fn builder<T: Mappable + Default>(name: &'static str) -> ClassDescriptorBuilder<T> {
        let mut builder = Self::builder_without_constructor::<T>(name);
        builder.inner.constructor =
            Some(Arc::new(|| Some(Box::new(T::default()) as Box<dyn Mappable>)));
        builder
    }

    /// Starts a descriptor for `T` with no way to create instances until
    /// [`ClassDescriptorBuilder::constructor`] is called.
    pub fn builder_without_constructor<T: Mappable>(
        name: &'static str,
    ) -> ClassDescriptorBuilder<T> {
        ClassDescriptorBuilder {
            inner: ClassDescriptor {
                name,
                type_id: TypeId::of::<T>(),
                properties: IndexMap::new(),
                key_to_property: HashMap::new(),
                property_to_key: HashMap::new(),
                element_types: HashMap::new(),
                converters: HashMap::new(),
                json_converters: HashMap::new(),
                custom_mappers: HashMap::new(),
                exclude_from_json: None,
                include_in_json: None,
                root_mapper: None,
                constructor: None,
            },
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `true` if instances of this class are `T`s.
    #[must_use]
    pub fn describes<T: Mappable>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Declared properties, in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, PropertyType)> + '_ {
        self.properties.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub(crate) fn instantiate(&self) -> Result<Box<dyn Mappable>, MapperError> {
        let constructor = self.constructor.as_ref().ok_or(MapperError::TargetClassIsNil)?;
        constructor().ok_or(MapperError::CouldNotCreateInstance { class: self.name })
    }

    pub(crate) fn root_mapper(&self) -> Option<&CustomMapper> {
        self.root_mapper.as_ref()
    }

    /// Resolves the mapping rule for a JSON key.
    ///
    /// An explicit key mapping wins; otherwise a property with the same name
    /// as the key is used. Keys with only a hook registered still resolve so
    /// the hook can run. Returns `None` for keys nothing claims.
    #[must_use]
    pub fn field_for_key<'a>(&'a self, key: &'a str) -> Option<FieldMapping<'a>> {
        let property = match self.key_to_property.get(key) {
            Some(property) => property.as_str(),
            None if self.properties.contains_key(key) => key,
            None if self.converters.contains_key(key) || self.custom_mappers.contains_key(key) => {
                key
            }
            None => return None,
        };
        Some(FieldMapping {
            json_key: key,
            property,
            property_type: self.properties.get(property).copied(),
            element_type: self.element_types.get(property).copied(),
            to_object: self.converters.get(key),
            to_json: self.json_converters.get(property),
            custom: self.custom_mappers.get(key),
        })
    }

    /// The JSON key a property is written under.
    #[must_use]
    pub fn json_key_for<'a>(&'a self, property: &'a str) -> &'a str {
        self.property_to_key
            .get(property)
            .map_or(property, String::as_str)
    }

    /// Properties written by object-to-JSON mapping, in declaration order,
    /// with their JSON keys. An include set takes precedence over an exclude
    /// set.
    pub fn json_properties(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.properties
            .keys()
            .map(String::as_str)
            .filter(|name| match (&self.include_in_json, &self.exclude_from_json) {
                (Some(include), _) => include.contains(*name),
                (None, Some(exclude)) => !exclude.contains(*name),
                (None, None) => true,
            })
            .map(|name| (name, self.json_key_for(name)))
    }

    pub(crate) fn to_json_converter(&self, property: &str) -> Option<&JsonConverter> {
        self.json_converters.get(property)
    }
}

/// Builds a [`ClassDescriptor`] for `T`.
///
/// Hooks registered here receive `&mut T` directly; the downcast from the
/// mapper's `dyn Mappable` happens inside the builder.
pub struct ClassDescriptorBuilder<T> {
    inner: ClassDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Mappable> ClassDescriptorBuilder<T> {
    /// Declares a property. The property name doubles as its JSON key unless
    /// [`map`](Self::map) says otherwise. Declaring a property again
    /// replaces its type only.
    #[must_use]
    pub fn property(mut self, name: &str, ty: PropertyType) -> Self {
        self.inner.properties.insert(name.to_owned(), ty);
        self
    }

    /// Pairs a JSON key with a property.
    #[must_use]
    pub fn map(mut self, json_key: &str, property: &str) -> Self {
        self.inner
            .key_to_property
            .insert(json_key.to_owned(), property.to_owned());
        self.inner
            .property_to_key
            .entry(property.to_owned())
            .or_insert_with(|| json_key.to_owned());
        self
    }

    /// Sets the element type of an [`Array`](PropertyType::Array) property.
    /// Required for arrays whose elements are objects or arrays. May come
    /// before or after [`property`](Self::property).
    #[must_use]
    pub fn array_element(mut self, property: &str, element: ElementType) -> Self {
        self.inner
            .element_types
            .insert(property.to_owned(), element);
        self
    }

    /// Registers a converter from the raw JSON member under `json_key` to the
    /// property value.
    #[must_use]
    pub fn convert<F>(mut self, json_key: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<PropertyValue, MapperError> + Send + Sync + 'static,
    {
        self.inner
            .converters
            .insert(json_key.to_owned(), Arc::new(f));
        self
    }

    /// Registers a converter from a property value to JSON.
    #[must_use]
    pub fn convert_to_json<F>(mut self, property: &str, f: F) -> Self
    where
        F: Fn(&PropertyValue) -> Result<Value, MapperError> + Send + Sync + 'static,
    {
        self.inner
            .json_converters
            .insert(property.to_owned(), Arc::new(f));
        self
    }

    /// Registers a hook that maps the member under `json_key` by mutating
    /// the instance itself. Takes precedence over [`convert`](Self::convert)
    /// for the same key.
    #[must_use]
    pub fn custom<F>(mut self, json_key: &str, f: F) -> Self
    where
        F: Fn(&mut T, &Value) -> Result<(), MapperError> + Send + Sync + 'static,
    {
        self.inner
            .custom_mappers
            .insert(json_key.to_owned(), typed_hook(f));
        self
    }

    /// Registers a hook that maps the whole root value, whatever its shape.
    /// Field mappings are not applied when a root mapper is present.
    #[must_use]
    pub fn root_mapper<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut T, &Value) -> Result<(), MapperError> + Send + Sync + 'static,
    {
        self.inner.root_mapper = Some(typed_hook(f));
        self
    }

    /// Leaves these properties out of object-to-JSON mapping.
    #[must_use]
    pub fn exclude_from_json<'a, I>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.inner.exclude_from_json = Some(properties.into_iter().map(str::to_owned).collect());
        self
    }

    /// Writes only these properties in object-to-JSON mapping. Wins over
    /// [`exclude_from_json`](Self::exclude_from_json).
    #[must_use]
    pub fn include_in_json<'a, I>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.inner.include_in_json = Some(properties.into_iter().map(str::to_owned).collect());
        self
    }

    /// Replaces how instances are created. Returning `None` makes mapping
    /// fail with [`MapperError::CouldNotCreateInstance`].
    #[must_use]
    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        self.inner.constructor = Some(Arc::new(move || {
            f().map(|instance| Box::new(instance) as Box<dyn Mappable>)
        }));
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<ClassDescriptor> {
        Arc::new(self.inner)
    }
}

fn typed_hook<T, F>(f: F) -> CustomMapper
where
    T: Mappable,
    F: Fn(&mut T, &Value) -> Result<(), MapperError> + Send + Sync + 'static,
{
    Arc::new(move |instance: &mut dyn Mappable, value: &Value| {
        let instance = instance.downcast_mut::<T>().ok_or_else(|| {
            MapperError::general(format!(
                "hook for {} received an instance of another type",
                type_name::<T>()
            ))
        })?;
        f(instance, value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::PropertyError;

    #[derive(Debug, Default)]
    struct Point {
        x: i32,
    }

    impl Mappable for Point {
        fn descriptor(&self) -> Arc<ClassDescriptor> {
            Self::class()
        }

        fn get_property(&self, name: &str) -> Option<PropertyValue> {
            (name == "x").then(|| self.x.into())
        }

        fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
            match name {
                "x" => self.x = value.extract()?,
                _ => return Err(PropertyError::UnknownProperty(name.to_owned())),
            }
            Ok(())
        }
    }

    impl MappableClass for Point {
        fn class() -> Arc<ClassDescriptor> {
            ClassDescriptor::builder::<Point>("Point")
                .property("x", PropertyType::Integer(IntegerKind::I32))
                .property("y", PropertyType::Integer(IntegerKind::I32))
                .property("label", PropertyType::String)
                .map("X", "x")
                .convert("extra", |_| Ok(PropertyValue::Null))
                .build()
        }
    }

    #[test]
    fn explicit_key_wins_then_same_name() {
        let class = Point::class();
        assert_eq!(class.field_for_key("X").unwrap().property, "x");
        assert_eq!(class.field_for_key("y").unwrap().property, "y");
        assert_eq!(class.field_for_key("x").unwrap().property, "x");
        assert!(class.field_for_key("z").is_none());
    }

    #[test]
    fn hook_only_keys_resolve_without_declared_type() {
        let class = Point::class();
        let field = class.field_for_key("extra").unwrap();
        assert!(field.property_type.is_none());
        assert!(field.to_object.is_some());
    }

    #[test]
    fn json_property_set_honours_include_over_exclude() {
        let class = Point::class();
        let all: Vec<_> = class.json_properties().collect();
        assert_eq!(all, vec![("x", "X"), ("y", "y"), ("label", "label")]);

        let class = ClassDescriptor::builder::<Point>("Point")
            .property("x", PropertyType::Integer(IntegerKind::I32))
            .property("y", PropertyType::Integer(IntegerKind::I32))
            .exclude_from_json(["x"])
            .build();
        assert_eq!(class.json_properties().collect::<Vec<_>>(), vec![("y", "y")]);

        let class = ClassDescriptor::builder::<Point>("Point")
            .property("x", PropertyType::Integer(IntegerKind::I32))
            .property("y", PropertyType::Integer(IntegerKind::I32))
            .exclude_from_json(["x"])
            .include_in_json(["x"])
            .build();
        assert_eq!(class.json_properties().collect::<Vec<_>>(), vec![("x", "x")]);
    }

    #[test]
    fn constructors() {
        let class = Point::class();
        assert!(class.describes::<Point>());
        assert!(class.instantiate().unwrap().is::<Point>());

        let class = ClassDescriptor::builder_without_constructor::<Point>("Point").build();
        assert!(matches!(
            class.instantiate(),
            Err(MapperError::TargetClassIsNil)
        ));

        let class = ClassDescriptor::builder_without_constructor::<Point>("Point")
            .constructor(|| None)
            .build();
        assert!(matches!(
            class.instantiate(),
            Err(MapperError::CouldNotCreateInstance { class: "Point" })
        ));
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let class = ClassDescriptor::builder::<Point>("Point")
            .array_element("xs", ElementType::object::<Point>())
            .convert_to_json("xs", |_| Ok(Value::Null))
            .property("xs", PropertyType::Array)
            .property("xs", PropertyType::Array)
            .build();
        let field = class.field_for_key("xs").unwrap();
        assert!(matches!(field.property_type, Some(PropertyType::Array)));
        assert!(matches!(field.element_type, Some(ElementType::Object(_))));
        assert!(field.to_json.is_some());
        assert!(class.to_json_converter("xs").is_some());
    }

    #[test]
    fn integer_bounds() {
        assert_eq!(IntegerKind::U8.bounds(), (0, 255));
        assert_eq!(IntegerKind::I16.bounds(), (-32768, 32767));
        assert!(!IntegerKind::U64.is_signed());
    }
}
