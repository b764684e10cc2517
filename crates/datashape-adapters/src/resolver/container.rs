//! In-memory service container.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard},
};

use datashape_core::{
    application::ports::{Service, ServiceResolver},
    domain::TypeKey,
    error::ResolveError,
};
use tracing::debug;

type BindingFactory = Arc<dyn Fn() -> Result<Service, String> + Send + Sync>;

#[derive(Clone)]
enum Binding {
    /// Built on every resolution.
    Factory(BindingFactory),
    /// Shared instance.
    Instance(Service),
}

/// Thread-safe container mapping service types to bindings.
///
/// Cloning is cheap and clones share bindings.
#[derive(Clone, Default)]
pub struct ContainerResolver {
    bindings: Arc<RwLock<HashMap<TypeKey, Binding>>>,
}

impl ContainerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `S` to a factory run on every resolution.
    pub fn bind<S, F>(&self, factory: F) -> &Self
    where
        S: Send + Sync + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.try_bind(move || Ok::<_, String>(factory()))
    }

    /// Bind `S` to a fallible factory. A factory error surfaces as
    /// [`ResolveError::Failed`].
    pub fn try_bind<S, E, F>(&self, factory: F) -> &Self
    where
        S: Send + Sync + 'static,
        E: fmt::Display,
        F: Fn() -> Result<S, E> + Send + Sync + 'static,
    {
        let factory: BindingFactory = Arc::new(move || {
            factory()
                .map(|service| Arc::new(service) as Service)
                .map_err(|e| e.to_string())
        });
        self.insert(TypeKey::of::<S>(), Binding::Factory(factory))
    }

    /// Bind `S` to a single shared instance.
    pub fn instance<S>(&self, service: S) -> &Self
    where
        S: Send + Sync + 'static,
    {
        self.insert(TypeKey::of::<S>(), Binding::Instance(Arc::new(service)))
    }

    pub fn contains<S: 'static>(&self) -> bool {
        self.read().contains_key(&TypeKey::of::<S>())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, key: TypeKey, binding: Binding) -> &Self {
        debug!(service = key.name(), "Binding service");
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, binding);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeKey, Binding>> {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ServiceResolver for ContainerResolver {
    fn resolve(&self, key: TypeKey) -> Result<Service, ResolveError> {
        // Factories may resolve other services, so the lock is released first.
        let binding = self.read().get(&key).cloned();

        match binding {
            Some(Binding::Instance(service)) => Ok(service),
            Some(Binding::Factory(factory)) => factory().map_err(|reason| {
                debug!(service = key.name(), %reason, "Service factory failed");
                ResolveError::Failed {
                    service: key.name(),
                    reason,
                }
            }),
            None => {
                debug!(service = key.name(), "No binding for service");
                Err(ResolveError::NotBound {
                    service: key.name(),
                })
            }
        }
    }
}

impl fmt::Debug for ContainerResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.read();
        let mut names: Vec<_> = bindings.keys().map(TypeKey::name).collect();
        names.sort_unstable();
        f.debug_struct("ContainerResolver")
            .field("bindings", &names)
            .finish()
    }
}
