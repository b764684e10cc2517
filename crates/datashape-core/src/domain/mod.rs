//! Domain layer: pure mapping vocabulary.
//!
//! - [`mapper`]: name mappers and case conventions
//! - [`payload`]: runtime inputs and host-type instances
//! - [`shape`]: declared properties of a data object
//! - [`factory`]: construction-method tables and ranking
//! - [`data`]: the data-object contract
//! - [`validation`]: rules, messages and validation outcomes

pub mod data;
pub mod factory;
pub mod mapper;
pub mod payload;
pub mod shape;
pub mod validation;

pub use data::{Data, DataType, DynData, Field, Hydrated, Properties};
pub use factory::{Factories, Factory, Family, ParamType, Specificity};
pub use mapper::{Case, NameMapper};
pub use payload::{AsAny, Capability, Instance, Mapping, Payload, TypeKey, lineage, satisfies};
pub use shape::{Property, PropertyType, Shape, ShapeBuilder};
pub use validation::{Attributes, FieldErrors, Messages, Rules, ValidationOutcome};
