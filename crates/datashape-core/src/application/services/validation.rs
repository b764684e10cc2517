//! Validation context resolution.
//!
//! Rules, messages and attributes come from [`Source`]s: a static value or a
//! provider callable whose parameters are services. Provider parameters are
//! resolved through the [`ServiceResolver`] port, in declared order, every
//! time validation runs.
//!
//! ```rust,ignore
//! fn messages() -> Source<Messages> {
//!     Source::provider(|request: &Request| {
//!         Messages::from([("name.required".into(), format!("{} is required", request.label))])
//!     })
//! }
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::application::ports::{Service, ServiceResolver, Validator};
use crate::application::services::mapping::NameMapping;
use crate::domain::data::Data;
use crate::domain::payload::{Mapping, TypeKey};
use crate::domain::validation::{Attributes, Messages, Rules, ValidationOutcome};
use crate::error::{DataError, DataResult, ResolveError};

// ── Sources ──────────────────────────────────────────────────────────────────

type ProviderFn<T> = dyn Fn(&dyn ServiceResolver) -> DataResult<T> + Send + Sync;

/// A static value or a provider with injected dependencies.
pub enum Source<T> {
    Static(T),
    Provider(Arc<ProviderFn<T>>),
}

impl<T: Default> Source<T> {
    /// The empty static value.
    pub fn none() -> Self {
        Self::Static(T::default())
    }
}

impl<T: Clone + 'static> Source<T> {
    pub fn value(value: T) -> Self {
        Self::Static(value)
    }

    /// A provider whose parameters (`&A`, `&B`, ...) are resolved as services.
    pub fn provider<Args, F>(provider: F) -> Self
    where
        F: Inject<Args, T>,
    {
        Self::Provider(Arc::new(move |resolver: &dyn ServiceResolver| {
            provider.invoke(resolver)
        }))
    }

    /// Produce the value, resolving provider dependencies through `resolver`.
    pub fn resolve(&self, resolver: &dyn ServiceResolver) -> DataResult<T> {
        match self {
            Self::Static(value) => Ok(value.clone()),
            Self::Provider(provider) => provider(resolver),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// A callable whose parameters can be resolved from a [`ServiceResolver`].
///
/// Implemented for closures taking zero to three `&Service` parameters.
pub trait Inject<Args, T>: Send + Sync + 'static {
    fn invoke(&self, resolver: &dyn ServiceResolver) -> DataResult<T>;
}

impl<F, T> Inject<(), T> for F
where
    F: Fn() -> T + Send + Sync + 'static,
{
    fn invoke(&self, _: &dyn ServiceResolver) -> DataResult<T> {
        Ok(self())
    }
}

macro_rules! impl_inject {
    ($($dep:ident),+) => {
        impl<F, T, $($dep),+> Inject<($($dep,)+), T> for F
        where
            F: Fn($(&$dep),+) -> T + Send + Sync + 'static,
            $($dep: Send + Sync + 'static),+
        {
            #[allow(non_snake_case)]
            fn invoke(&self, resolver: &dyn ServiceResolver) -> DataResult<T> {
                $(let $dep = inject::<$dep>(resolver)?;)+
                Ok(self($(&*$dep),+))
            }
        }
    };
}

impl_inject!(A);
impl_inject!(A, B);
impl_inject!(A, B, C);

/// Resolve one dependency and downcast it to `S`.
pub fn inject<S: Send + Sync + 'static>(resolver: &dyn ServiceResolver) -> DataResult<Arc<S>> {
    let dependency = type_name::<S>();
    let failed = |source: ResolveError| DataError::DependencyResolutionFailed { dependency, source };

    let service = resolver.resolve(TypeKey::of::<S>()).map_err(failed)?;
    service
        .downcast::<S>()
        .map_err(|_| failed(ResolveError::UnexpectedType { expected: dependency }))
}

/// Stands in when no service resolver is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoServices;

impl ServiceResolver for NoServices {
    fn resolve(&self, _: TypeKey) -> Result<Service, ResolveError> {
        Err(ResolveError::NoResolver)
    }
}

// ── Context ──────────────────────────────────────────────────────────────────

/// Everything the validator needs, keyed by input names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    pub rules: Rules,
    pub messages: Messages,
    pub attributes: Attributes,
}

pub struct ValidationContextResolver<'a> {
    services: &'a dyn ServiceResolver,
}

impl<'a> ValidationContextResolver<'a> {
    pub fn new(services: &'a dyn ServiceResolver) -> Self {
        Self { services }
    }

    /// Resolve the sources of `T`, translating property keys to input keys.
    pub fn resolve<T: Data>(&self, mapping: &NameMapping) -> DataResult<ValidationContext> {
        let rules = T::rules().resolve(self.services)?;
        let messages = T::messages().resolve(self.services)?;
        let attributes = T::attributes().resolve(self.services)?;

        Ok(ValidationContext {
            rules: rules.rename_fields(|field| mapping.input_path(field)),
            messages: messages
                .into_iter()
                .map(|(key, message)| (message_key(mapping, &key), message))
                .collect(),
            attributes: attributes
                .into_iter()
                .map(|(field, label)| (mapping.input_path(&field), label))
                .collect(),
        })
    }

    /// Resolve the context of `T` and run `validator` against `input`.
    ///
    /// The validator is not invoked when any source fails to resolve.
    pub fn validate<T: Data>(
        &self,
        validator: Option<&dyn Validator>,
        mapping: &NameMapping,
        input: &Mapping,
    ) -> DataResult<()> {
        let context = self.resolve::<T>(mapping)?;
        if context.rules.is_empty() {
            return Ok(());
        }
        let validator = validator.ok_or(DataError::ValidatorNotConfigured)?;

        debug!(
            class = type_name::<T>(),
            fields = context.rules.len(),
            "Running validator"
        );
        match validator.validate(
            &context.rules,
            input,
            &context.messages,
            &context.attributes,
        ) {
            ValidationOutcome::Passed => Ok(()),
            ValidationOutcome::Failed(errors) => Err(DataError::ValidationFailed { errors }),
        }
    }
}

/// Message keys are `field.rule` or a bare `rule`. Only the former is renamed.
fn message_key(mapping: &NameMapping, key: &str) -> String {
    match key.rsplit_once('.') {
        Some((field, rule)) => format!("{}.{rule}", mapping.input_path(field)),
        None => key.to_string(),
    }
}
