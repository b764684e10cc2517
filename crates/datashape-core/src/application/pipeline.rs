//! Pipeline façade - the entry point for constructing, validating and
//! transforming data objects.
//!
//! ```text
//! input ──► ConstructionMethodResolver ──► factory ───────────┐
//!                    │                                        ├──► T
//!                    └──────────────► PropertyHydrator ───────┘
//!
//! T ──► Transformer (write mapping) ──► mapping / JSON
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::ports::{ServiceResolver, Validator};
use crate::application::registry::ClassRegistry;
use crate::application::services::construction::{
    ConstructionMethod, ConstructionMethodResolver, no_method,
};
use crate::application::services::hydrator::PropertyHydrator;
use crate::application::services::transformer::Transformer;
use crate::application::services::validation::{NoServices, ValidationContextResolver};
use crate::config::DataConfig;
use crate::domain::data::{Data, DynData};
use crate::domain::factory::Family;
use crate::domain::payload::{Mapping, Payload, TypeKey};
use crate::error::{DataError, DataResult};

/// Constructs, validates and transforms data objects.
///
/// Cheap to clone; clones share the registry and adapters.
#[derive(Clone)]
pub struct DataPipeline {
    config: Arc<DataConfig>,
    registry: Arc<ClassRegistry>,
    validator: Option<Arc<dyn Validator>>,
    services: Arc<dyn ServiceResolver>,
}

impl DataPipeline {
    /// A pipeline with default configuration, the global registry, no
    /// validator and no service resolver.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> DataPipelineBuilder {
        DataPipelineBuilder::default()
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Construct a `T` from any input (the required factory family).
    #[instrument(skip_all, fields(class = type_name::<T>()))]
    pub fn from<T: Data>(&self, input: impl Into<Payload>) -> DataResult<T> {
        self.construct(Family::Required, input.into(), 0)
    }

    /// Construct a `T`, or `None` for a `null` input.
    ///
    /// Optional factories are tried before required ones.
    #[instrument(skip_all, fields(class = type_name::<T>()))]
    pub fn optional<T: Data>(&self, input: impl Into<Payload>) -> DataResult<Option<T>> {
        let payload = input.into();
        if payload.is_null() {
            debug!("Null input, nothing to construct");
            return Ok(None);
        }
        self.construct(Family::Optional, payload, 0).map(Some)
    }

    /// Construct one `T` per item, preserving order.
    #[instrument(skip_all, fields(class = type_name::<T>()))]
    pub fn collect<T, I>(&self, items: I) -> DataResult<Vec<T>>
    where
        T: Data,
        I: IntoIterator,
        I::Item: Into<Payload>,
    {
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                self.construct(Family::Required, item.into(), 0)
                    .map_err(|source| DataError::InvalidCollectionElement {
                        property: TypeKey::of::<T>().short_name().to_string(),
                        index,
                        source: Box::new(source),
                    })
            })
            .collect()
    }

    /// Run the validation rules of `T` against `input`.
    #[instrument(skip_all, fields(class = type_name::<T>()))]
    pub fn validate<T: Data>(&self, input: &Mapping) -> DataResult<()> {
        let class = self.registry.class::<T>()?;
        ValidationContextResolver::new(self.services.as_ref()).validate::<T>(
            self.validator.as_deref(),
            class.mapping(),
            input,
        )
    }

    /// Validate, then construct.
    pub fn validate_and_from<T: Data>(&self, input: Mapping) -> DataResult<T> {
        self.validate::<T>(&input)?;
        self.from(input)
    }

    /// Data object → mapping, keys written through the write mapping.
    #[instrument(skip_all)]
    pub fn transform(&self, data: &dyn DynData) -> DataResult<Mapping> {
        Transformer::new(&self.registry, &self.config).transform(data, 0)
    }

    pub fn transform_collection<T: Data>(&self, items: &[T]) -> DataResult<Vec<Value>> {
        items
            .iter()
            .map(|item| self.transform(item).map(Value::Object))
            .collect()
    }

    pub fn to_json(&self, data: &dyn DynData) -> DataResult<String> {
        let output = Value::Object(self.transform(data)?);
        serde_json::to_string(&output).map_err(|err| DataError::Serialization {
            property: data.data_type().key().short_name().to_string(),
            reason: err.to_string(),
        })
    }

    /// Full construction of `T` at nesting level `depth`.
    pub(crate) fn construct<T: Data>(
        &self,
        family: Family,
        payload: Payload,
        depth: usize,
    ) -> DataResult<T> {
        if depth > self.config.max_depth {
            return Err(DataError::MaxDepthExceeded {
                max_depth: self.config.max_depth,
            });
        }

        let factories = self.registry.factories::<T>();
        match ConstructionMethodResolver::resolve(&factories, family, &payload)? {
            ConstructionMethod::Identity => {
                debug!(class = type_name::<T>(), "Input already constructed");
                match payload {
                    Payload::Instance(instance) => instance
                        .into_any()
                        .downcast::<T>()
                        .map(|boxed| *boxed)
                        .map_err(|_| DataError::NoConstructionMethod {
                            target: type_name::<T>(),
                            input: "a foreign instance".into(),
                        }),
                    Payload::Value(_) => Err(no_method::<T>(&payload)),
                }
            }
            ConstructionMethod::Factory {
                factory,
                specificity,
            } => {
                debug!(
                    class = type_name::<T>(),
                    factory = factory.name(),
                    param = %factory.param(),
                    ?specificity,
                    "Selected factory"
                );
                factory.call(&payload)
            }
            ConstructionMethod::Hydrate { view } => {
                let class = self.registry.class::<T>()?;
                let hydrator = PropertyHydrator::new(self);
                match (view, &payload) {
                    (Some(view), _) => hydrator.hydrate(&class, &view, depth),
                    (None, Payload::Value(Value::Object(input))) => {
                        hydrator.hydrate(&class, input, depth)
                    }
                    (None, _) => Err(no_method::<T>(&payload)),
                }
            }
            ConstructionMethod::Transform => {
                let source = payload
                    .as_instance()
                    .and_then(|instance| instance.as_data())
                    .ok_or_else(|| no_method::<T>(&payload))?;
                debug!(
                    class = type_name::<T>(),
                    source = %source.data_type().key(),
                    "Hydrating from another data object"
                );
                let view = Transformer::new(&self.registry, &self.config)
                    .transform(source, depth + 1)?;
                let class = self.registry.class::<T>()?;
                PropertyHydrator::new(self).hydrate(&class, &view, depth)
            }
        }
    }
}

impl Default for DataPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataPipeline")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`DataPipeline`].
#[derive(Default)]
pub struct DataPipelineBuilder {
    config: Option<DataConfig>,
    registry: Option<Arc<ClassRegistry>>,
    validator: Option<Arc<dyn Validator>>,
    services: Option<Arc<dyn ServiceResolver>>,
}

impl DataPipelineBuilder {
    pub fn config(mut self, config: DataConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share a registry. It must have been created with the same
    /// configuration as the pipeline.
    pub fn registry(mut self, registry: Arc<ClassRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn services(mut self, services: impl ServiceResolver + 'static) -> Self {
        self.services = Some(Arc::new(services));
        self
    }

    /// Default configuration uses the global registry; anything else gets
    /// a registry of its own.
    pub fn build(self) -> DataPipeline {
        let config = self.config.unwrap_or_default();
        let registry = self.registry.unwrap_or_else(|| {
            if config == DataConfig::default() {
                ClassRegistry::global()
            } else {
                Arc::new(ClassRegistry::new(config.clone()))
            }
        });

        DataPipeline {
            config: Arc::new(config),
            registry,
            validator: self.validator,
            services: self.services.unwrap_or_else(|| Arc::new(NoServices)),
        }
    }
}
