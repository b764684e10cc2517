//! Mapping resolver: derives read and write name mappings for a shape.
//!
//! Read direction is external name → property name, write direction is
//! property name → external name. Precedence per property:
//!
//! | Direction | 1st              | 2nd                    | 3rd          | 4th                | 5th           | 6th              |
//! |-----------|------------------|------------------------|--------------|--------------------|---------------|------------------|
//! | read      | property input   | class input            | global input | identity           |               |                  |
//! | write     | property output  | inverse property input | class output | inverse class input | global output | inverse of read  |

use std::collections::BTreeMap;

use crate::config::DataConfig;
use crate::domain::mapper::NameMapper;
use crate::domain::shape::Shape;

/// Resolved name mapping of one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMapping {
    read: NameMapper,
    write: NameMapper,
    /// (property, input key), declaration order.
    input_keys: Vec<(String, String)>,
    /// (property, output key), declaration order.
    output_keys: Vec<(String, String)>,
}

impl NameMapping {
    /// External → property mapper.
    pub const fn read(&self) -> &NameMapper {
        &self.read
    }

    /// Property → external mapper.
    pub const fn write(&self) -> &NameMapper {
        &self.write
    }

    /// Input key a property is read from. Unknown names map to themselves.
    pub fn input_key<'a>(&'a self, property: &'a str) -> &'a str {
        lookup(&self.input_keys, property).unwrap_or(property)
    }

    /// Output key a property is written under. Unknown names map to themselves.
    pub fn output_key<'a>(&'a self, property: &'a str) -> &'a str {
        lookup(&self.output_keys, property).unwrap_or(property)
    }

    /// Property read from input key `key`, if any.
    pub fn property_for_input(&self, key: &str) -> Option<&str> {
        self.input_keys
            .iter()
            .find(|(_, input)| input == key)
            .map(|(property, _)| property.as_str())
    }

    pub fn input_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.input_keys.iter().map(|(p, k)| (p.as_str(), k.as_str()))
    }

    pub fn output_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.output_keys.iter().map(|(p, k)| (p.as_str(), k.as_str()))
    }

    /// Translate a dotted field path whose first segment is a property name.
    pub fn input_path(&self, path: &str) -> String {
        match path.split_once('.') {
            Some((head, rest)) => format!("{}.{rest}", self.input_key(head)),
            None => self.input_key(path).to_string(),
        }
    }
}

fn lookup<'a>(keys: &'a [(String, String)], property: &str) -> Option<&'a str> {
    keys.iter()
        .find(|(name, _)| name == property)
        .map(|(_, key)| key.as_str())
}

/// Derives [`NameMapping`]s, falling back to the configured global mappers.
#[derive(Debug, Clone, Default)]
pub struct MappingResolver {
    global_input: Option<NameMapper>,
    global_output: Option<NameMapper>,
}

impl MappingResolver {
    pub fn new(config: &DataConfig) -> Self {
        Self {
            global_input: config.input_mapper(),
            global_output: config.output_mapper(),
        }
    }

    pub fn resolve(&self, shape: &Shape) -> NameMapping {
        let class_read = shape
            .input_mapper()
            .or(self.global_input.as_ref())
            .cloned()
            .unwrap_or_default();

        let class_write = match (shape.output_mapper(), shape.input_mapper()) {
            (Some(output), _) => output.clone(),
            (None, Some(input)) => input.inverse(),
            (None, None) => self
                .global_output
                .clone()
                .unwrap_or_else(|| class_read.inverse()),
        };

        let mut read_overrides = BTreeMap::new();
        let mut write_overrides = BTreeMap::new();
        for property in shape.properties() {
            if let Some(input) = property.input_mapper() {
                read_overrides.insert(property.name().to_string(), input.clone());
            }
            let write = property
                .output_mapper()
                .cloned()
                .or_else(|| property.input_mapper().map(NameMapper::inverse));
            if let Some(write) = write {
                write_overrides.insert(property.name().to_string(), write);
            }
        }

        let read = compose(read_overrides, class_read);
        let write = compose(write_overrides, class_write);
        let inverse_read = read.inverse();

        let input_keys = shape
            .properties()
            .iter()
            .map(|p| (p.name().to_string(), inverse_read.map(p.name())))
            .collect();
        let output_keys = shape
            .properties()
            .iter()
            .map(|p| (p.name().to_string(), write.map(p.name())))
            .collect();

        NameMapping {
            read,
            write,
            input_keys,
            output_keys,
        }
    }
}

fn compose(overrides: BTreeMap<String, NameMapper>, default: NameMapper) -> NameMapper {
    if overrides.is_empty() {
        default
    } else {
        NameMapper::composite(overrides, default)
    }
}
