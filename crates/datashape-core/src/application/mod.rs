//! Application layer for datashape.
//!
//! This layer contains:
//! - **Services**: the pipeline stages (mapping, construction, hydration,
//!   validation, transformation)
//! - **Ports**: interface definitions (traits) for validators and service
//!   resolution
//! - **Registry**: the per-type cache of resolved classes and factory tables
//! - **Pipeline**: the façade callers use
//!
//! Mapping rules themselves live in `crate::domain`.

pub mod pipeline;
pub mod ports;
pub mod registry;
pub mod services;

pub use pipeline::{DataPipeline, DataPipelineBuilder};
pub use ports::{Service, ServiceResolver, Validator};
pub use registry::{ClassRegistry, DataClass};
pub use services::{NameMapping, Source};
