//! Property hydration.
//!
//! Walks the declared properties of a class in order, pulls each raw value
//! through the read mapping and converts it to the declared type. Nested
//! data objects and collections go back through the full construction
//! pipeline. Nothing is handed to [`Data::hydrate`] unless every property
//! succeeded.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde_json::{Number, Value};
use tracing::trace;

use crate::application::pipeline::DataPipeline;
use crate::application::registry::DataClass;
use crate::domain::data::{Data, Hydrated, Properties};
use crate::domain::payload::{Mapping, Payload, value_kind};
use crate::domain::shape::{Property, PropertyType};
use crate::error::{DataError, DataResult};

pub struct PropertyHydrator<'p> {
    pipeline: &'p DataPipeline,
}

impl<'p> PropertyHydrator<'p> {
    pub fn new(pipeline: &'p DataPipeline) -> Self {
        Self { pipeline }
    }

    /// Hydrate a `T` from `input` at nesting level `depth`.
    pub fn hydrate<T: Data>(
        &self,
        class: &DataClass,
        input: &Mapping,
        depth: usize,
    ) -> DataResult<T> {
        let mut properties = Properties::new(class.key().name());
        for property in class.shape().properties() {
            let key = class.mapping().input_key(property.name());
            // Input already keyed by property name is accepted as is.
            let raw = input.get(key).or_else(|| input.get(property.name()));
            let value = self.hydrate_property(class, property, raw, depth)?;
            trace!(property = property.name(), key, "Hydrated property");
            properties.insert(property.name(), value);
        }
        T::hydrate(properties)
    }

    fn hydrate_property(
        &self,
        class: &DataClass,
        property: &Property,
        raw: Option<&Value>,
        depth: usize,
    ) -> DataResult<Hydrated> {
        match raw {
            None => match property.default() {
                Some(default) => self.convert(property, property.ty(), default.clone(), depth),
                None if property.is_optional() => Ok(Hydrated::Absent),
                None if property.is_nullable() => Ok(Hydrated::Value(Value::Null)),
                None => Err(DataError::MissingRequiredProperty {
                    target: class.key().name(),
                    property: property.name().to_string(),
                }),
            },
            Some(Value::Null) if property.is_nullable() => Ok(Hydrated::Value(Value::Null)),
            Some(Value::Null) => Err(mismatch(property.name(), property.ty(), &Value::Null)),
            Some(value) => self.convert(property, property.ty(), value.clone(), depth),
        }
    }

    fn convert(
        &self,
        property: &Property,
        ty: &PropertyType,
        value: Value,
        depth: usize,
    ) -> DataResult<Hydrated> {
        let coerce = self.pipeline.config().coerce_numeric_strings;
        self.convert_as(property, ty, value, depth, coerce)
    }

    /// Exact matches first, then coercions, in declared member order.
    fn convert_union(
        &self,
        property: &Property,
        union: &PropertyType,
        members: &[PropertyType],
        value: Value,
        depth: usize,
    ) -> DataResult<Hydrated> {
        let passes: &[bool] = if self.pipeline.config().coerce_numeric_strings {
            &[false, true]
        } else {
            &[false]
        };
        for &coerce in passes {
            for member in members {
                if let Ok(hydrated) = self.convert_as(property, member, value.clone(), depth, coerce)
                {
                    return Ok(hydrated);
                }
            }
        }
        Err(mismatch(property.name(), union, &value))
    }

    fn convert_as(
        &self,
        property: &Property,
        ty: &PropertyType,
        value: Value,
        depth: usize,
        coerce: bool,
    ) -> DataResult<Hydrated> {
        let name = property.name();
        let converted = match (ty, value) {
            (PropertyType::Mixed, value) => value,
            (PropertyType::String, value @ Value::String(_))
            | (PropertyType::Bool, value @ Value::Bool(_))
            | (PropertyType::List, value @ Value::Array(_))
            | (PropertyType::Mapping, value @ Value::Object(_)) => value,
            (PropertyType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
                Value::Number(n)
            }
            (PropertyType::Float, Value::Number(n)) => match n.as_f64().and_then(Number::from_f64) {
                Some(n) => Value::Number(n),
                None => return Err(mismatch(name, ty, &Value::Number(n))),
            },
            (PropertyType::Integer, Value::String(s)) if coerce => match s.trim().parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => return Err(mismatch(name, ty, &Value::String(s))),
            },
            (PropertyType::Float, Value::String(s)) if coerce => {
                match s.trim().parse::<f64>().ok().and_then(Number::from_f64) {
                    Some(n) => Value::Number(n),
                    None => return Err(mismatch(name, ty, &Value::String(s))),
                }
            }
            (PropertyType::DateTime, Value::String(s)) => {
                match parse_date_time(&s, &self.pipeline.config().date_format) {
                    Some(parsed) => Value::String(parsed.to_rfc3339()),
                    None => return Err(mismatch(name, ty, &Value::String(s))),
                }
            }
            (PropertyType::Data(data_type), value) => {
                let nested = data_type.construct(self.pipeline, Payload::Value(value), depth + 1)?;
                return Ok(Hydrated::Data(nested));
            }
            (PropertyType::Collection(data_type), Value::Array(items)) => {
                let mut built = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let element = data_type
                        .construct(self.pipeline, Payload::Value(item), depth + 1)
                        .map_err(|source| DataError::InvalidCollectionElement {
                            property: name.to_string(),
                            index,
                            source: Box::new(source),
                        })?;
                    built.push(element);
                }
                return Ok(Hydrated::Collection(built));
            }
            (PropertyType::Union(members), value) => {
                return self.convert_union(property, ty, members, value, depth);
            }
            (_, value) => return Err(mismatch(name, ty, &value)),
        };
        Ok(Hydrated::Value(converted))
    }
}

/// Parse with the configured format, then RFC 3339. Formats without an
/// offset are read as UTC.
fn parse_date_time(input: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(input, format)
        .or_else(|_| DateTime::parse_from_rfc3339(input))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(input, format)
                .ok()
                .map(|naive| naive.and_utc().fixed_offset())
        })
}

fn mismatch(property: &str, expected: &PropertyType, found: &Value) -> DataError {
    DataError::TypeMismatch {
        property: property.to_string(),
        expected: expected.describe(),
        found: value_kind(found).to_string(),
    }
}
