//! Construction method resolution.
//!
//! Picks exactly one way to build a `T` from a runtime payload:
//! the payload itself (already a `T`), the most specific applicable factory,
//! or property hydration from a mapping-shaped payload or another data
//! object's output.

use std::any::type_name;

use serde_json::Value;

use crate::domain::data::Data;
use crate::domain::factory::{Factories, Factory, Family, Specificity};
use crate::domain::payload::{Mapping, Payload, TypeKey};
use crate::error::{DataError, DataResult};

/// The chosen construction path.
#[derive(Debug)]
pub enum ConstructionMethod<'f, T> {
    /// The payload already is a `T`.
    Identity,
    Factory {
        factory: &'f Factory<T>,
        specificity: Specificity,
    },
    /// Hydrate from a mapping. `view` holds an instance's mapping view;
    /// `None` means the payload itself is a mapping.
    Hydrate { view: Option<Mapping> },
    /// Hydrate from the transformed output of another data object.
    Transform,
}

pub struct ConstructionMethodResolver;

impl ConstructionMethodResolver {
    pub fn resolve<'f, T: Data>(
        factories: &'f Factories<T>,
        family: Family,
        payload: &Payload,
    ) -> DataResult<ConstructionMethod<'f, T>> {
        if let Payload::Instance(instance) = payload {
            if instance.type_key() == TypeKey::of::<T>() {
                return Ok(ConstructionMethod::Identity);
            }
        }

        if let Some((factory, specificity)) = factories.select(family, payload) {
            return Ok(ConstructionMethod::Factory {
                factory,
                specificity,
            });
        }

        match payload {
            Payload::Value(Value::Object(_)) => Ok(ConstructionMethod::Hydrate { view: None }),
            Payload::Instance(instance) => match instance.to_mapping() {
                Some(view) => Ok(ConstructionMethod::Hydrate { view: Some(view) }),
                None if instance.as_data().is_some() => Ok(ConstructionMethod::Transform),
                None => Err(no_method::<T>(payload)),
            },
            Payload::Value(_) => Err(no_method::<T>(payload)),
        }
    }
}

pub(crate) fn no_method<T>(payload: &Payload) -> DataError {
    DataError::NoConstructionMethod {
        target: type_name::<T>(),
        input: payload.kind(),
    }
}
