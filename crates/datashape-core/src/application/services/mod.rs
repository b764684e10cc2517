//! Application services - the stages of the mapping pipeline.
//!
//! Each service covers one stage: name mapping, construction method
//! resolution, hydration, validation context and output transformation.
//! [`DataPipeline`](crate::application::DataPipeline) strings them together.

pub mod construction;
pub mod hydrator;
pub mod mapping;
pub mod transformer;
pub mod validation;

pub use construction::{ConstructionMethod, ConstructionMethodResolver};
pub use hydrator::PropertyHydrator;
pub use mapping::{MappingResolver, NameMapping};
pub use transformer::Transformer;
pub use validation::{
    Inject, NoServices, Source, ValidationContext, ValidationContextResolver, inject,
};
