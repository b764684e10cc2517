//! Driven (output) ports - implemented by infrastructure.

use std::any::Any;
use std::sync::Arc;

use crate::domain::payload::{Mapping, TypeKey};
use crate::domain::validation::{Attributes, Messages, Rules, ValidationOutcome};
use crate::error::ResolveError;

/// A resolved service, downcast by the caller.
pub type Service = Arc<dyn Any + Send + Sync>;

/// Port for running validation rules.
///
/// Implemented by:
/// - `datashape_adapters::validator::RuleValidator` (rule strings)
///
/// The rule language is opaque to the core. Rule keys arrive already
/// translated to input keys.
#[cfg_attr(test, mockall::automock)]
pub trait Validator: Send + Sync {
    fn validate(
        &self,
        rules: &Rules,
        input: &Mapping,
        messages: &Messages,
        attributes: &Attributes,
    ) -> ValidationOutcome;
}

/// Port for dependency resolution.
///
/// Implemented by:
/// - `datashape_adapters::resolver::ContainerResolver` (in-memory bindings)
///
/// Called afresh for every validation; results are never cached by the core.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceResolver: Send + Sync {
    fn resolve(&self, key: TypeKey) -> Result<Service, ResolveError>;
}
