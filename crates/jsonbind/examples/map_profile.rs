//! Parses a user profile, maps it onto application types, edits it, and
//! renders it back to JSON.
//!
//! The `joined` member is a `YYYY-MM-DD` string in JSON and a `Date` in Rust,
//! bridged by a pair of converters. Unknown keys such as `"legacy"` are
//! skipped unless `--strict` is passed.
//!
//! Run with
//!
//! ```bash
//! RUST_LOG=jsonbind=trace cargo run -p jsonbind --example map_profile -- [--strict]
//! ```

use std::sync::{Arc, LazyLock};

use jsonbind::{
    Mapper, MapperError, UnknownKeys, Value,
    mapper::{
        ClassDescriptor, ElementType, IntegerKind, Mappable, MappableClass, PropertyError,
        PropertyType, PropertyValue,
    },
    parse,
};

const PROFILE: &str = r#"{
    "userName": "ada",
    "displayName": "Ada Lovelace",
    "age": 36,
    "joined": "1843-07-10",
    "links": [
        {"rel": "home", "href": "https://example.org/ada"},
        {"rel": "notes", "href": "https://example.org/ada/notes"}
    ],
    "avatar": null,
    "legacy": true
}"#;

#[derive(Debug, Clone, Copy)]
struct Date {
    year: i32,
    month: u8,
    day: u8,
}

#[derive(Debug, Default)]
struct Link {
    rel: String,
    href: String,
}

impl Mappable for Link {
    fn descriptor(&self) -> Arc<ClassDescriptor> {
        Self::class()
    }

    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "rel" => Some(self.rel.clone().into()),
            "href" => Some(self.href.clone().into()),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "rel" => self.rel = value.extract()?,
            "href" => self.href = value.extract()?,
            _ => return Err(PropertyError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }
}

impl MappableClass for Link {
    fn class() -> Arc<ClassDescriptor> {
        static CLASS: LazyLock<Arc<ClassDescriptor>> = LazyLock::new(|| {
            ClassDescriptor::builder::<Link>("Link")
                .property("rel", PropertyType::String)
                .property("href", PropertyType::String)
                .build()
        });
        CLASS.clone()
    }
}

#[derive(Debug, Default)]
struct Profile {
    user_name: String,
    display_name: Option<String>,
    age: Option<u8>,
    joined: Option<Date>,
    links: Vec<Link>,
    avatar: Option<String>,
}

impl Mappable for Profile {
    fn descriptor(&self) -> Arc<ClassDescriptor> {
        Self::class()
    }

    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        Some(match name {
            "user_name" => self.user_name.clone().into(),
            "display_name" => self.display_name.clone().into(),
            "age" => self.age.into(),
            "joined" => self.joined.map_or(PropertyValue::Null, PropertyValue::custom),
            "links" => PropertyValue::Array(
                self.links
                    .iter()
                    .map(|link| {
                        PropertyValue::object(Link {
                            rel: link.rel.clone(),
                            href: link.href.clone(),
                        })
                    })
                    .collect(),
            ),
            "avatar" => self.avatar.clone().into(),
            _ => return None,
        })
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match name {
            "user_name" => self.user_name = value.extract()?,
            "display_name" => self.display_name = value.extract()?,
            "age" => self.age = value.extract()?,
            "joined" => self.joined = Some(value.into_custom()?),
            "links" => self.links = value.into_objects()?,
            "avatar" => self.avatar = value.extract()?,
            _ => return Err(PropertyError::UnknownProperty(name.to_owned())),
        }
        Ok(())
    }
}

fn parse_date(value: &Value) -> Result<PropertyValue, MapperError> {
    let text = value
        .as_str()
        .ok_or_else(|| MapperError::general("`joined` must be a string"))?;
    let mut parts = text.splitn(3, '-');
    let mut next = || {
        parts
            .next()
            .ok_or_else(|| MapperError::general(format!("`{text}` is not YYYY-MM-DD")))
    };
    let year = next()?.parse().map_err(MapperError::general)?;
    let month = next()?.parse().map_err(MapperError::general)?;
    let day = next()?.parse().map_err(MapperError::general)?;
    Ok(PropertyValue::custom(Date { year, month, day }))
}

fn render_date(value: &PropertyValue) -> Result<Value, MapperError> {
    match value {
        PropertyValue::Custom(any) => {
            let date = any
                .downcast_ref::<Date>()
                .ok_or_else(|| MapperError::general("`joined` holds something other than a date"))?;
            Ok(format!("{:04}-{:02}-{:02}", date.year, date.month, date.day).into())
        }
        _ => Ok(Value::Null),
    }
}

impl MappableClass for Profile {
    fn class() -> Arc<ClassDescriptor> {
        static CLASS: LazyLock<Arc<ClassDescriptor>> = LazyLock::new(|| {
            ClassDescriptor::builder::<Profile>("Profile")
                .property("user_name", PropertyType::String)
                .property("display_name", PropertyType::String)
                .property("age", PropertyType::Integer(IntegerKind::U8))
                .property("joined", PropertyType::Custom("Date"))
                .property("links", PropertyType::Array)
                .property("avatar", PropertyType::String)
                .map("userName", "user_name")
                .map("displayName", "display_name")
                .array_element("links", ElementType::object::<Link>())
                .convert("joined", parse_date)
                .convert_to_json("joined", render_date)
                .exclude_from_json(["avatar"])
                .build()
        });
        CLASS.clone()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let strict = std::env::args().any(|arg| arg == "--strict");
    let mapper = if strict {
        Mapper::default().with_unknown_keys(UnknownKeys::Reject)
    } else {
        Mapper::default()
    };

    let value = parse(PROFILE.as_bytes())?;
    let mut profile: Profile = mapper.map(&value)?;
    println!("mapped: {profile:#?}");

    profile.age = profile.age.map(|age| age.saturating_add(1));
    profile.links.retain(|link| link.rel == "home");

    let rendered = mapper.to_json(&profile)?;
    println!("rendered: {rendered}");
    Ok(())
}
