//! Data objects and host types shared by the integration tests.

#![allow(dead_code)]

use datashape_core::prelude::*;
use serde_json::{Value, json};

// ── Host types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DummyDto {
    pub artist: String,
    pub name: String,
    pub year: i64,
}

impl DummyDto {
    pub fn rick() -> Self {
        Self {
            artist: "Rick Astley".into(),
            name: "Never gonna give you up".into(),
            year: 1987,
        }
    }
}

impl Instance for DummyDto {}

/// Base model: a bag of attributes that can present itself as a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    attributes: Mapping,
}

impl Model {
    pub fn new(attributes: Value) -> Self {
        Self {
            attributes: attributes.as_object().cloned().unwrap_or_default(),
        }
    }

    pub fn string(&self) -> String {
        self.attributes
            .get("string")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

impl Instance for Model {
    fn capabilities(&self) -> &[Capability] {
        &[Capability::ARRAYABLE]
    }

    fn to_mapping(&self) -> Option<Mapping> {
        Some(self.attributes.clone())
    }
}

/// Extends [`Model`].
#[derive(Debug, Clone, PartialEq)]
pub struct DummyModel {
    pub model: Model,
}

impl DummyModel {
    pub fn make(attributes: Value) -> Self {
        Self {
            model: Model::new(attributes),
        }
    }
}

impl Instance for DummyModel {
    fn parent(&self) -> Option<&dyn Instance> {
        Some(&self.model)
    }

    fn to_mapping(&self) -> Option<Mapping> {
        self.model.to_mapping()
    }
}

/// Another [`Model`] descendant, without factories of its own anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyModelWithCasts {
    pub model: Model,
}

impl DummyModelWithCasts {
    pub fn make(attributes: Value) -> Self {
        Self {
            model: Model::new(attributes),
        }
    }
}

impl Instance for DummyModelWithCasts {
    fn parent(&self) -> Option<&dyn Instance> {
        Some(&self.model)
    }

    fn to_mapping(&self) -> Option<Mapping> {
        self.model.to_mapping()
    }
}

/// Satisfies the arrayable capability without any class ancestry.
#[derive(Debug)]
pub struct Interfaceable;

impl Instance for Interfaceable {
    fn capabilities(&self) -> &[Capability] {
        &[Capability::ARRAYABLE]
    }

    fn to_mapping(&self) -> Option<Mapping> {
        json!({"string": "Rick Astley"}).as_object().cloned()
    }
}

// ── Data objects ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleData {
    pub string: String,
}

impl SimpleData {
    pub fn new(string: &str) -> Self {
        Self {
            string: string.into(),
        }
    }
}

datashape_core::data_instance!(SimpleData);

impl Data for SimpleData {
    fn shape() -> Shape {
        Shape::builder().property(Property::string("string")).build()
    }

    fn factories() -> Factories<Self> {
        Factories::new().required(Factory::string("fromString", |s| Ok(Self::new(s))))
    }

    fn hydrate(mut properties: Properties) -> DataResult<Self> {
        Ok(Self {
            string: properties.get("string")?,
        })
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        (name == "string").then(|| Field::value(self.string.clone()))
    }
}

/// Class-level snake → camel mapping, nested data and a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DataWithMapper {
    pub cased_property: String,
    pub data_cased_property: SimpleData,
    pub data_collection_cased_property: Vec<SimpleData>,
}

datashape_core::data_instance!(DataWithMapper);

impl Data for DataWithMapper {
    fn shape() -> Shape {
        Shape::builder()
            .map_input(NameMapper::snake_to_camel())
            .property(Property::string("casedProperty"))
            .property(Property::data::<SimpleData>("dataCasedProperty"))
            .property(Property::collection::<SimpleData>("dataCollectionCasedProperty"))
            .build()
    }

    fn hydrate(mut properties: Properties) -> DataResult<Self> {
        Ok(Self {
            cased_property: properties.get("casedProperty")?,
            data_cased_property: properties.data("dataCasedProperty")?,
            data_collection_cased_property: properties.collection("dataCollectionCasedProperty")?,
        })
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        match name {
            "casedProperty" => Some(Field::value(self.cased_property.clone())),
            "dataCasedProperty" => Some(Field::data(&self.data_cased_property)),
            "dataCollectionCasedProperty" => {
                Some(Field::collection(&self.data_collection_cased_property))
            }
            _ => None,
        }
    }
}

/// Construction methods for every kind of parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomMethodData {
    pub string: String,
}

impl CustomMethodData {
    pub fn new(string: &str) -> Self {
        Self {
            string: string.into(),
        }
    }
}

datashape_core::data_instance!(CustomMethodData);

impl Data for CustomMethodData {
    fn shape() -> Shape {
        Shape::builder().property(Property::string("string")).build()
    }

    fn factories() -> Factories<Self> {
        Factories::new()
            .required(Factory::string("fromString", |s| Ok(Self::new(s))))
            .required(Factory::class::<DummyDto>("fromDto", |dto| {
                Ok(Self::new(&dto.artist))
            }))
            .required(Factory::mapping("fromArray", |payload| {
                payload
                    .get("string")
                    .and_then(Value::as_str)
                    .map(Self::new)
                    .ok_or_else(|| DataError::custom("payload has no `string`"))
            }))
            .optional(Factory::string("optionalString", |s| Ok(Self::new(s))))
            .optional(Factory::class::<DummyDto>("optionalDto", |dto| {
                Ok(Self::new(&dto.artist))
            }))
            .optional(Factory::mapping("optionalArray", |payload| {
                payload
                    .get("string")
                    .and_then(Value::as_str)
                    .map(Self::new)
                    .ok_or_else(|| DataError::custom("payload has no `string`"))
            }))
    }

    fn hydrate(mut properties: Properties) -> DataResult<Self> {
        Ok(Self {
            string: properties.get("string")?,
        })
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        (name == "string").then(|| Field::value(self.string.clone()))
    }
}

/// Accepts anything arrayable, models included.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceData {
    pub string: String,
}

datashape_core::data_instance!(InterfaceData);

impl Data for InterfaceData {
    fn shape() -> Shape {
        Shape::builder().property(Property::string("string")).build()
    }

    fn factories() -> Factories<Self> {
        Factories::new().required(Factory::capability(
            "fromInterface",
            Capability::ARRAYABLE,
            |arrayable| {
                let string = arrayable
                    .to_mapping()
                    .and_then(|m| m.get("string").and_then(Value::as_str).map(String::from))
                    .ok_or_else(|| DataError::custom("arrayable has no `string`"))?;
                Ok(Self { string })
            },
        ))
    }

    fn hydrate(mut properties: Properties) -> DataResult<Self> {
        Ok(Self {
            string: properties.get("string")?,
        })
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        (name == "string").then(|| Field::value(self.string.clone()))
    }
}

/// Class factory for the base model plus a nearer one for its descendant.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub string: String,
    pub via: &'static str,
}

datashape_core::data_instance!(ModelData);

impl Data for ModelData {
    fn shape() -> Shape {
        Shape::builder().property(Property::string("string")).build()
    }

    fn factories() -> Factories<Self> {
        Factories::new()
            .required(Factory::class::<Model>("fromModel", |model| {
                Ok(Self {
                    string: model.string(),
                    via: "fromModel",
                })
            }))
            .required(Factory::class::<DummyModel>("fromDummyModel", |dummy| {
                Ok(Self {
                    string: dummy.model.string(),
                    via: "fromDummyModel",
                })
            }))
    }

    fn hydrate(mut properties: Properties) -> DataResult<Self> {
        Ok(Self {
            string: properties.get("string")?,
            via: "hydrate",
        })
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        (name == "string").then(|| Field::value(self.string.clone()))
    }
}

/// Scalars, defaults, optional and nullable properties, dates and unions.
#[derive(Debug, Clone, PartialEq)]
pub struct SongData {
    pub title: String,
    pub year: i64,
    pub rating: f64,
    pub released_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub label: Option<String>,
    pub notes: Option<String>,
    pub code: Value,
    pub tracks: Option<Vec<SimpleData>>,
}

datashape_core::data_instance!(SongData);

impl Data for SongData {
    fn shape() -> Shape {
        Shape::builder()
            .property(Property::string("title").input_name("song_title"))
            .property(Property::integer("year"))
            .property(Property::float("rating").default_value(0.0))
            .property(Property::date_time("releasedAt").nullable())
            .property(Property::string("label").nullable())
            .property(Property::string("notes").optional())
            .property(Property::union(
                "code",
                vec![PropertyType::Integer, PropertyType::String],
            ))
            .property(Property::collection::<SimpleData>("tracks").nullable())
            .build()
    }

    fn hydrate(mut properties: Properties) -> DataResult<Self> {
        Ok(Self {
            title: properties.get("title")?,
            year: properties.get("year")?,
            rating: properties.get("rating")?,
            released_at: properties.get("releasedAt")?,
            label: properties.get("label")?,
            notes: properties.get("notes")?,
            code: properties.get("code")?,
            tracks: properties.optional_collection("tracks")?,
        })
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        match name {
            "title" => Some(Field::value(self.title.clone())),
            "year" => Some(Field::value(self.year)),
            "rating" => Some(Field::value(self.rating)),
            "releasedAt" => Some(Field::of(&self.released_at)),
            "label" => Some(Field::of(&self.label)),
            "notes" => Some(Field::unless_absent(
                self.notes.as_ref().map(|n| Field::value(n.clone())),
            )),
            "code" => Some(Field::value(self.code.clone())),
            "tracks" => Some(Field::optional_collection(self.tracks.as_deref())),
            _ => None,
        }
    }
}
