#![allow(missing_docs, dead_code)]

use std::sync::{Arc, LazyLock};

use jsonbind::mapper::{
    ClassDescriptor, ElementType, IntegerKind, Mappable, MappableClass, PropertyError,
    PropertyType, PropertyValue,
};

pub const CATALOG: &str = r#"
{
    "name": "root",
    "position": 0,
    "children": [
        {"name": "books", "position": 1, "children": [
            {"name": "fiction", "position": 1},
            {"name": "poetry", "position": 2, "children": []}
        ]},
        {"name": "music", "position": 2, "legacy_id": "m-77"}
    ]
}
"#;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub full_name: String,
    pub labels: Vec<String>,
}

impl Mappable for Person {
    fn descriptor(&self) -> Arc<ClassDescriptor> {
        Self::class()
    }

    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "full_name" => Some(self.full_name.clone().into()),
            "labels" => Some(self.labels.clone().into()),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "full_name" => self.full_name = value.extract()?,
            "labels" => self.labels = value.extract()?,
            _ => return Err(PropertyError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }
}

impl MappableClass for Person {
    fn class() -> Arc<ClassDescriptor> {
        static CLASS: LazyLock<Arc<ClassDescriptor>> = LazyLock::new(|| {
            ClassDescriptor::builder::<Person>("Person")
                .property("full_name", PropertyType::String)
                .property("labels", PropertyType::Array)
                .map("name", "full_name")
                .map("tags", "labels")
                .array_element("labels", ElementType::String)
                .build()
        });
        CLASS.clone()
    }
}

/// A self-referential class: categories nest categories.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub position: u32,
    pub children: Vec<Category>,
}

impl Mappable for Category {
    fn descriptor(&self) -> Arc<ClassDescriptor> {
        Self::class()
    }

    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "name" => Some(self.name.clone().into()),
            "position" => Some(self.position.into()),
            "children" => Some(PropertyValue::objects(self.children.clone())),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "name" => self.name = value.extract()?,
            "position" => self.position = value.extract()?,
            "children" => self.children = value.into_objects()?,
            _ => return Err(PropertyError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }
}

impl MappableClass for Category {
    fn class() -> Arc<ClassDescriptor> {
        static CLASS: LazyLock<Arc<ClassDescriptor>> = LazyLock::new(|| {
            ClassDescriptor::builder::<Category>("Category")
                .property("name", PropertyType::String)
                .property("position", PropertyType::Integer(IntegerKind::U32))
                .property("children", PropertyType::Array)
                .array_element("children", ElementType::object::<Category>())
                .build()
        });
        CLASS.clone()
    }
}
