//! datashape core - typed data objects from untyped payloads.
//!
//! Converts mapping-shaped input, scalars, lists and host-type instances
//! into strongly-shaped data objects, and turns those objects back into
//! mappings and JSON.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           DataPipeline (façade)         │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  MappingResolver, ConstructionMethod-   │
//! │  Resolver, PropertyHydrator,            │
//! │  ValidationContextResolver, Transformer │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │     (Validator, ServiceResolver)        │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   datashape-adapters (Infrastructure)   │
//! │ (RuleValidator, ContainerResolver, ...) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use datashape_core::prelude::*;
//! use serde_json::json;
//!
//! let pipeline = DataPipeline::new();
//! let song: SongData = pipeline.from(json!({"title": "Never gonna give you up"}))?;
//! let output = pipeline.to_json(&song)?;
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod error;

pub mod prelude {
    pub use crate::application::{
        ClassRegistry, DataPipeline, DataPipelineBuilder, Service, ServiceResolver, Source,
        Validator,
    };
    pub use crate::config::DataConfig;
    pub use crate::domain::{
        Attributes, Capability, Case, Data, Factories, Factory, Field, FieldErrors, Instance,
        Mapping, Messages, NameMapper, Payload, Properties, Property, PropertyType, Rules, Shape,
        TypeKey, ValidationOutcome,
    };
    pub use crate::error::{DataError, DataResult, ResolveError};
}

/// Implement [`Instance`](crate::domain::Instance) for data objects, exposing
/// their data-object view so other data types can be built from them.
///
/// ```rust,ignore
/// datashape_core::data_instance!(SongData, ArtistData);
/// ```
#[macro_export]
macro_rules! data_instance {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::domain::Instance for $ty {
                fn as_data(&self) -> ::std::option::Option<&dyn $crate::domain::DynData> {
                    ::std::option::Option::Some(self)
                }
            }
        )+
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
