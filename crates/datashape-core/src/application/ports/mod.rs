//! Application ports (traits) for external collaborators.
//!
//! Adapters in `datashape-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by the pipeline, implemented by infrastructure
//!   - `Validator`: runs an opaque rule table against an input mapping
//!   - `ServiceResolver`: resolves provider dependencies by type identity
//!
//! - **Driving (Input) Ports**: the `DataPipeline` façade itself

pub mod output;

pub use output::{Service, ServiceResolver, Validator};

#[cfg(test)]
pub use output::{MockServiceResolver, MockValidator};
