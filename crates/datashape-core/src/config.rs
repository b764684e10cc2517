//! Library configuration.
//!
//! `DataConfig` is a plain serde value object. Loading it from files and the
//! environment is an adapter concern (`datashape_adapters::config_loader`).

use serde::{Deserialize, Serialize};

use crate::domain::mapper::{Case, NameMapper};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub name_mapping: NameMappingConfig,
    /// chrono format string for date-time properties.
    pub date_format: String,
    pub max_depth: usize,
    /// Accept `"42"` for an integer property.
    pub coerce_numeric_strings: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            name_mapping: NameMappingConfig::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            coerce_numeric_strings: true,
        }
    }
}

impl DataConfig {
    pub fn with_input_mapping(mut self, from: Case, to: Case) -> Self {
        self.name_mapping.input = Some(MapperConfig { from, to });
        self
    }

    pub fn with_output_mapping(mut self, from: Case, to: Case) -> Self {
        self.name_mapping.output = Some(MapperConfig { from, to });
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Global input mapper, used when neither property nor class declares one.
    pub fn input_mapper(&self) -> Option<NameMapper> {
        self.name_mapping.input.map(MapperConfig::mapper)
    }

    /// Global output mapper.
    pub fn output_mapper(&self) -> Option<NameMapper> {
        self.name_mapping.output.map(MapperConfig::mapper)
    }
}

/// Global default mappers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameMappingConfig {
    pub input: Option<MapperConfig>,
    pub output: Option<MapperConfig>,
}

/// A case-convention mapper as written in configuration: `{ from = "snake", to = "camel" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperConfig {
    pub from: Case,
    pub to: Case,
}

impl MapperConfig {
    pub const fn mapper(self) -> NameMapper {
        NameMapper::convert(self.from, self.to)
    }
}
