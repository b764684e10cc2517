//! The data-object contract.
//!
//! A type becomes a data object by implementing [`Data`]: it declares its
//! [`Shape`], optionally its factory tables and validation sources, builds
//! itself from hydrated [`Properties`], and exposes its fields for output.
//!
//! [`DynData`] is the object-safe face of the same contract, used wherever
//! nested data objects are handled without knowing their concrete type.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::application::pipeline::DataPipeline;
use crate::application::services::validation::Source;
use crate::domain::factory::{Factories, Family};
use crate::domain::payload::{Instance, Payload, TypeKey, value_kind};
use crate::domain::shape::Shape;
use crate::domain::validation::{Attributes, Messages, Rules};
use crate::error::{DataError, DataResult};

/// A strongly-shaped data object.
///
/// ```rust,ignore
/// #[derive(Debug)]
/// struct SongData { title: String, artist: String }
///
/// datashape_core::data_instance!(SongData);
///
/// impl Data for SongData {
///     fn shape() -> Shape {
///         Shape::builder()
///             .property(Property::string("title"))
///             .property(Property::string("artist"))
///             .build()
///     }
///
///     fn hydrate(mut p: Properties) -> DataResult<Self> {
///         Ok(Self { title: p.get("title")?, artist: p.get("artist")? })
///     }
///
///     fn field(&self, name: &str) -> Option<Field<'_>> {
///         match name {
///             "title" => Some(Field::value(self.title.clone())),
///             "artist" => Some(Field::value(self.artist.clone())),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Data: Instance + Sized {
    /// Declared properties and name mapping. Resolved once and cached.
    fn shape() -> Shape;

    /// Construction methods. Resolved once and cached.
    fn factories() -> Factories<Self> {
        Factories::new()
    }

    fn rules() -> Source<Rules> {
        Source::none()
    }

    fn messages() -> Source<Messages> {
        Source::none()
    }

    fn attributes() -> Source<Attributes> {
        Source::none()
    }

    /// Build the object from fully hydrated properties.
    fn hydrate(properties: Properties) -> DataResult<Self>;

    /// Expose a declared property for output. `None` for unknown names.
    fn field(&self, name: &str) -> Option<Field<'_>>;
}

/// Object-safe view of a [`Data`] value.
pub trait DynData: Instance {
    fn data_type(&self) -> DataType;

    fn read_field(&self, name: &str) -> Option<Field<'_>>;

    fn as_instance(&self) -> &dyn Instance;
}

impl<T: Data> DynData for T {
    fn data_type(&self) -> DataType {
        DataType::of::<T>()
    }

    fn read_field(&self, name: &str) -> Option<Field<'_>> {
        self.field(name)
    }

    fn as_instance(&self) -> &dyn Instance {
        self
    }
}

// ── Data types ───────────────────────────────────────────────────────────────

type ConstructFn = fn(&DataPipeline, Payload, usize) -> DataResult<Box<dyn DynData>>;

/// Type-erased handle on a [`Data`] implementation.
#[derive(Clone, Copy)]
pub struct DataType {
    key: TypeKey,
    shape: fn() -> Shape,
    construct: ConstructFn,
}

impl DataType {
    pub fn of<T: Data>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            shape: T::shape,
            construct: construct_erased::<T>,
        }
    }

    pub const fn key(&self) -> TypeKey {
        self.key
    }

    pub fn shape(&self) -> Shape {
        (self.shape)()
    }

    /// Run the full construction pipeline for this type.
    pub(crate) fn construct(
        &self,
        pipeline: &DataPipeline,
        payload: Payload,
        depth: usize,
    ) -> DataResult<Box<dyn DynData>> {
        (self.construct)(pipeline, payload, depth)
    }
}

fn construct_erased<T: Data>(
    pipeline: &DataPipeline,
    payload: Payload,
    depth: usize,
) -> DataResult<Box<dyn DynData>> {
    let value: T = pipeline.construct(Family::Required, payload, depth)?;
    Ok(Box::new(value))
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DataType").field(&self.key.name()).finish()
    }
}

// ── Output fields ────────────────────────────────────────────────────────────

/// A property value as exposed for output.
pub enum Field<'a> {
    Value(Value),
    Data(&'a dyn DynData),
    Collection(Vec<&'a dyn DynData>),
    Null,
    /// Left out of the output entirely.
    Absent,
    /// The value could not be represented; output fails naming the property.
    Unserializable(String),
}

impl<'a> Field<'a> {
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// Serialize any value through serde.
    pub fn of<S: Serialize + ?Sized>(value: &S) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::Value(value),
            Err(err) => Self::Unserializable(err.to_string()),
        }
    }

    pub fn data<N: Data>(data: &'a N) -> Self {
        Self::Data(data)
    }

    pub fn optional_data<N: Data>(data: Option<&'a N>) -> Self {
        data.map_or(Self::Null, Self::data)
    }

    pub fn collection<N: Data>(items: &'a [N]) -> Self {
        Self::Collection(items.iter().map(|item| item as &dyn DynData).collect())
    }

    pub fn optional_collection<N: Data>(items: Option<&'a [N]>) -> Self {
        items.map_or(Self::Null, Self::collection)
    }

    /// `Absent` for `None`, used by optional properties left unset.
    pub fn unless_absent(field: Option<Self>) -> Self {
        field.unwrap_or(Self::Absent)
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Data(data) => f.debug_tuple("Data").field(&data.data_type()).finish(),
            Self::Collection(items) => f.debug_tuple("Collection").field(&items.len()).finish(),
            Self::Null => f.write_str("Null"),
            Self::Absent => f.write_str("Absent"),
            Self::Unserializable(reason) => f.debug_tuple("Unserializable").field(reason).finish(),
        }
    }
}

// ── Hydrated properties ──────────────────────────────────────────────────────

/// One hydrated property value.
#[derive(Debug)]
pub enum Hydrated {
    Value(Value),
    Data(Box<dyn DynData>),
    Collection(Vec<Box<dyn DynData>>),
    /// Optional property whose key was absent.
    Absent,
}

impl Hydrated {
    fn kind(&self) -> String {
        match self {
            Self::Value(value) => value_kind(value).to_string(),
            Self::Data(data) => format!("`{}`", data.data_type().key().short_name()),
            Self::Collection(_) => "list of data objects".into(),
            Self::Absent => "nothing".into(),
        }
    }

    const fn is_empty(&self) -> bool {
        matches!(self, Self::Absent | Self::Value(Value::Null))
    }
}

/// Property name → hydrated value, handed to [`Data::hydrate`].
///
/// Accessors move values out; each property can be taken once.
#[derive(Debug)]
pub struct Properties {
    target: &'static str,
    values: HashMap<String, Hydrated>,
}

impl Properties {
    pub(crate) fn new(target: &'static str) -> Self {
        Self {
            target,
            values: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: Hydrated) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Whether an optional property was left unset.
    pub fn is_absent(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(Hydrated::Absent))
    }

    /// Take the raw hydrated value.
    pub fn take(&mut self, name: &str) -> DataResult<Hydrated> {
        self.values
            .remove(name)
            .ok_or_else(|| DataError::MissingRequiredProperty {
                target: self.target,
                property: name.to_string(),
            })
    }

    /// Take a plain value and deserialize it. Absent values read as `null`.
    pub fn get<V: DeserializeOwned>(&mut self, name: &str) -> DataResult<V> {
        let value = match self.take(name)? {
            Hydrated::Value(value) => value,
            Hydrated::Absent => Value::Null,
            other => return Err(mismatch(name, std::any::type_name::<V>(), other.kind())),
        };
        let found = value_kind(&value);
        serde_json::from_value(value)
            .map_err(|_| mismatch(name, std::any::type_name::<V>(), found.to_string()))
    }

    pub fn data<N: Data>(&mut self, name: &str) -> DataResult<N> {
        match self.take(name)? {
            Hydrated::Data(data) => downcast(name, data),
            other => Err(mismatch(name, TypeKey::of::<N>().short_name(), other.kind())),
        }
    }

    pub fn optional_data<N: Data>(&mut self, name: &str) -> DataResult<Option<N>> {
        match self.take(name)? {
            hydrated if hydrated.is_empty() => Ok(None),
            Hydrated::Data(data) => downcast(name, data).map(Some),
            other => Err(mismatch(name, TypeKey::of::<N>().short_name(), other.kind())),
        }
    }

    pub fn collection<N: Data>(&mut self, name: &str) -> DataResult<Vec<N>> {
        match self.take(name)? {
            Hydrated::Collection(items) => items.into_iter().map(|i| downcast(name, i)).collect(),
            other => Err(mismatch(
                name,
                TypeKey::of::<Vec<N>>().short_name(),
                other.kind(),
            )),
        }
    }

    pub fn optional_collection<N: Data>(&mut self, name: &str) -> DataResult<Option<Vec<N>>> {
        match self.take(name)? {
            hydrated if hydrated.is_empty() => Ok(None),
            Hydrated::Collection(items) => items
                .into_iter()
                .map(|i| downcast(name, i))
                .collect::<DataResult<Vec<N>>>()
                .map(Some),
            other => Err(mismatch(
                name,
                TypeKey::of::<Vec<N>>().short_name(),
                other.kind(),
            )),
        }
    }
}

fn downcast<N: Data>(name: &str, data: Box<dyn DynData>) -> DataResult<N> {
    let found = data.data_type().key().short_name();
    data.into_any()
        .downcast::<N>()
        .map(|boxed| *boxed)
        .map_err(|_| mismatch(name, TypeKey::of::<N>().short_name(), format!("`{found}`")))
}

fn mismatch(property: &str, expected: impl Into<String>, found: impl Into<String>) -> DataError {
    DataError::TypeMismatch {
        property: property.to_string(),
        expected: expected.into(),
        found: found.into(),
    }
}
