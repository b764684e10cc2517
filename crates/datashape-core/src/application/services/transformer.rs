//! Output transformation: data object → mapping.

use std::fmt::Write as _;

use chrono::DateTime;
use serde_json::Value;

use crate::application::registry::ClassRegistry;
use crate::config::DataConfig;
use crate::domain::data::{DynData, Field};
use crate::domain::payload::Mapping;
use crate::domain::shape::PropertyType;
use crate::error::{DataError, DataResult};

pub struct Transformer<'a> {
    registry: &'a ClassRegistry,
    config: &'a DataConfig,
}

impl<'a> Transformer<'a> {
    pub fn new(registry: &'a ClassRegistry, config: &'a DataConfig) -> Self {
        Self { registry, config }
    }

    /// Walk declared properties in order, writing each under its output key.
    pub fn transform(&self, data: &dyn DynData, depth: usize) -> DataResult<Mapping> {
        if depth > self.config.max_depth {
            return Err(DataError::MaxDepthExceeded {
                max_depth: self.config.max_depth,
            });
        }

        let class = self.registry.class_of(data.data_type())?;
        let mut output = Mapping::new();
        for property in class.shape().properties() {
            let name = property.name();
            let value = match data.read_field(name) {
                None => {
                    return Err(DataError::Serialization {
                        property: name.to_string(),
                        reason: format!("`{}` does not expose this property", class.key()),
                    });
                }
                Some(Field::Absent) => continue,
                Some(Field::Null) => Value::Null,
                Some(Field::Value(value)) => self.output_value(name, property.ty(), value)?,
                Some(Field::Data(nested)) => Value::Object(self.transform(nested, depth + 1)?),
                Some(Field::Collection(items)) => Value::Array(
                    items
                        .into_iter()
                        .map(|item| self.transform(item, depth + 1).map(Value::Object))
                        .collect::<DataResult<_>>()?,
                ),
                Some(Field::Unserializable(reason)) => {
                    return Err(DataError::Serialization {
                        property: name.to_string(),
                        reason,
                    });
                }
            };
            output.insert(class.mapping().output_key(name).to_string(), value);
        }
        Ok(output)
    }

    fn output_value(&self, property: &str, ty: &PropertyType, value: Value) -> DataResult<Value> {
        match (ty, value) {
            (PropertyType::DateTime, Value::String(s)) => {
                self.format_date_time(property, &s).map(Value::String)
            }
            (_, value) => Ok(value),
        }
    }

    /// Re-format an RFC 3339 string with the configured format. Other
    /// strings pass through unchanged.
    fn format_date_time(&self, property: &str, input: &str) -> DataResult<String> {
        let Ok(parsed) = DateTime::parse_from_rfc3339(input) else {
            return Ok(input.to_string());
        };
        let mut out = String::new();
        write!(out, "{}", parsed.format(&self.config.date_format)).map_err(|_| {
            DataError::Serialization {
                property: property.to_string(),
                reason: format!("invalid date format `{}`", self.config.date_format),
            }
        })?;
        Ok(out)
    }
}
