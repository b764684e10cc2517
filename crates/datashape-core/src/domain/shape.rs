//! Static description of a data object's declared properties.
//!
//! A [`Shape`] is declared once per data type (see [`Data::shape`]) with a
//! builder, and resolved once by the class registry. Per-property and
//! per-class name mapping is explicit builder metadata.
//!
//! ```rust,ignore
//! Shape::builder()
//!     .map_input(NameMapper::snake_to_camel())
//!     .property(Property::string("title").input_name("song_title"))
//!     .property(Property::data::<Artist>("artist"))
//!     .property(Property::collection::<Track>("tracks").nullable())
//!     .build()
//! ```
//!
//! [`Data::shape`]: crate::domain::data::Data::shape

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::domain::data::{Data, DataType};
use crate::domain::mapper::NameMapper;
use crate::domain::payload::TypeKey;
use crate::error::{DataError, DataResult};

// ── Property types ───────────────────────────────────────────────────────────

/// Declared type of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyType {
    /// Anything, passed through untouched.
    Mixed,
    String,
    Integer,
    Float,
    Bool,
    List,
    Mapping,
    /// A date-time string, parsed with the configured `date_format`.
    DateTime,
    /// A nested data object.
    Data(DataType),
    /// A list of nested data objects.
    Collection(DataType),
    /// The first member that accepts the value wins.
    Union(Vec<PropertyType>),
}

impl PropertyType {
    pub fn describe(&self) -> String {
        match self {
            Self::Mixed => "mixed".into(),
            Self::String => "string".into(),
            Self::Integer => "int".into(),
            Self::Float => "float".into(),
            Self::Bool => "bool".into(),
            Self::List => "list".into(),
            Self::Mapping => "mapping".into(),
            Self::DateTime => "date-time string".into(),
            Self::Data(data) => format!("`{}`", data.key().short_name()),
            Self::Collection(data) => format!("list of `{}`", data.key().short_name()),
            Self::Union(members) => members
                .iter()
                .map(Self::describe)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

// ── Property ─────────────────────────────────────────────────────────────────

/// One declared property of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    ty: PropertyType,
    nullable: bool,
    optional: bool,
    default: Option<Value>,
    input_mapper: Option<NameMapper>,
    output_mapper: Option<NameMapper>,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: PropertyType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            optional: false,
            default: None,
            input_mapper: None,
            output_mapper: None,
        }
    }

    pub fn mixed(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Mixed)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Float)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Bool)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::List)
    }

    pub fn mapping(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Mapping)
    }

    pub fn date_time(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::DateTime)
    }

    pub fn data<N: Data>(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Data(DataType::of::<N>()))
    }

    pub fn collection<N: Data>(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Collection(DataType::of::<N>()))
    }

    pub fn union(name: impl Into<String>, members: Vec<PropertyType>) -> Self {
        Self::new(name, PropertyType::Union(members))
    }

    /// Accept `null`, and treat an absent key as `null`.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Allow the key to be absent; the property is then left unset.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Value used when the key is absent.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Read this property from a fixed input key.
    pub fn input_name(self, name: impl Into<String>) -> Self {
        self.map_input_with(NameMapper::fixed(name))
    }

    /// Write this property under a fixed output key.
    pub fn output_name(self, name: impl Into<String>) -> Self {
        self.map_output_with(NameMapper::fixed(name))
    }

    /// Read and write this property under a fixed key.
    pub fn map_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.input_name(name.clone()).output_name(name)
    }

    pub fn map_input_with(mut self, mapper: NameMapper) -> Self {
        self.input_mapper = Some(mapper);
        self
    }

    pub fn map_output_with(mut self, mapper: NameMapper) -> Self {
        self.output_mapper = Some(mapper);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn ty(&self) -> &PropertyType {
        &self.ty
    }

    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether hydration may leave this property unset when its key is absent.
    pub const fn allows_absence(&self) -> bool {
        self.nullable || self.optional
    }

    pub const fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub const fn input_mapper(&self) -> Option<&NameMapper> {
        self.input_mapper.as_ref()
    }

    pub const fn output_mapper(&self) -> Option<&NameMapper> {
        self.output_mapper.as_ref()
    }
}

// ── Shape ────────────────────────────────────────────────────────────────────

/// Ordered declared properties plus class-level name mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    properties: Vec<Property>,
    input_mapper: Option<NameMapper>,
    output_mapper: Option<NameMapper>,
}

impl Shape {
    pub fn builder() -> ShapeBuilder {
        ShapeBuilder::default()
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Class-level input mapper (external name → property name).
    pub const fn input_mapper(&self) -> Option<&NameMapper> {
        self.input_mapper.as_ref()
    }

    /// Class-level output mapper (property name → external name).
    pub const fn output_mapper(&self) -> Option<&NameMapper> {
        self.output_mapper.as_ref()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Check shape invariants for the type `owner`.
    pub fn validate(&self, owner: TypeKey) -> DataResult<()> {
        let mut seen = HashSet::new();
        for property in &self.properties {
            if property.name.is_empty() {
                return Err(DataError::InvalidShape {
                    target: owner.name(),
                    reason: "property names must not be empty".into(),
                });
            }
            if !seen.insert(property.name.as_str()) {
                return Err(DataError::InvalidShape {
                    target: owner.name(),
                    reason: format!("duplicate property `{}`", property.name),
                });
            }
            if let PropertyType::Union(members) = &property.ty {
                if members.is_empty() {
                    return Err(DataError::InvalidShape {
                        target: owner.name(),
                        reason: format!("union property `{}` has no members", property.name),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Builder for [`Shape`].
#[derive(Debug, Default)]
pub struct ShapeBuilder {
    shape: Shape,
}

impl ShapeBuilder {
    pub fn property(mut self, property: Property) -> Self {
        self.shape.properties.push(property);
        self
    }

    /// Class-level input mapper, applied to every property without its own
    /// input override. Declared external → property, e.g. `snake_to_camel`.
    pub fn map_input(mut self, mapper: NameMapper) -> Self {
        self.shape.input_mapper = Some(mapper);
        self
    }

    /// Class-level output mapper (property → external).
    pub fn map_output(mut self, mapper: NameMapper) -> Self {
        self.shape.output_mapper = Some(mapper);
        self
    }

    /// Same convention both ways: `mapper` reads input, its inverse writes output.
    pub fn map_name(mut self, mapper: NameMapper) -> Self {
        self.shape.output_mapper = Some(mapper.inverse());
        self.shape.input_mapper = Some(mapper);
        self
    }

    pub fn build(self) -> Shape {
        self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Owner;

    #[test]
    fn builder_preserves_declaration_order() {
        let shape = Shape::builder()
            .property(Property::string("b"))
            .property(Property::integer("a"))
            .build();

        let names: Vec<_> = shape.properties().iter().map(Property::name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn validate_rejects_duplicates() {
        let shape = Shape::builder()
            .property(Property::string("name"))
            .property(Property::integer("name"))
            .build();

        let err = shape.validate(TypeKey::of::<Owner>()).unwrap_err();
        assert!(matches!(err, DataError::InvalidShape { reason, .. } if reason.contains("duplicate")));
    }

    #[test]
    fn validate_rejects_empty_union() {
        let shape = Shape::builder()
            .property(Property::union("either", vec![]))
            .build();

        assert!(shape.validate(TypeKey::of::<Owner>()).is_err());
    }

    #[test]
    fn map_name_overrides_both_directions() {
        let property = Property::string("title").map_name("song_title");

        assert_eq!(property.input_mapper(), Some(&NameMapper::fixed("song_title")));
        assert_eq!(property.output_mapper(), Some(&NameMapper::fixed("song_title")));
    }

    #[test]
    fn nullable_and_optional_allow_absence() {
        assert!(Property::string("a").nullable().allows_absence());
        assert!(Property::string("a").optional().allows_absence());
        assert!(!Property::string("a").allows_absence());
    }

    #[test]
    fn union_description_joins_members() {
        let ty = PropertyType::Union(vec![PropertyType::Integer, PropertyType::String]);
        assert_eq!(ty.describe(), "int | string");
    }
}
