//! Class registry: per-type cache of resolved shapes, name mappings and
//! factory tables.
//!
//! Entries are filled lazily on first use of a type. Computation happens
//! outside the lock and is published with an insert-if-absent write, so two
//! threads racing on the same type may both compute, but readers only ever
//! see complete entries.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::application::services::mapping::{MappingResolver, NameMapping};
use crate::config::DataConfig;
use crate::domain::data::{Data, DataType};
use crate::domain::factory::Factories;
use crate::domain::payload::TypeKey;
use crate::domain::shape::Shape;
use crate::error::DataResult;

static GLOBAL: Lazy<Arc<ClassRegistry>> =
    Lazy::new(|| Arc::new(ClassRegistry::new(DataConfig::default())));

type ErasedFactories = Arc<dyn Any + Send + Sync>;

/// A resolved data type: its shape and name mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct DataClass {
    key: TypeKey,
    shape: Shape,
    mapping: NameMapping,
}

impl DataClass {
    pub const fn key(&self) -> TypeKey {
        self.key
    }

    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    pub const fn mapping(&self) -> &NameMapping {
        &self.mapping
    }
}

/// Thread-safe cache of [`DataClass`]es and factory tables keyed by type.
pub struct ClassRegistry {
    resolver: MappingResolver,
    classes: RwLock<HashMap<TypeKey, Arc<DataClass>>>,
    factories: RwLock<HashMap<TypeKey, ErasedFactories>>,
}

impl ClassRegistry {
    /// A registry whose mappings fall back to `config`'s global mappers.
    pub fn new(config: DataConfig) -> Self {
        Self {
            resolver: MappingResolver::new(&config),
            classes: RwLock::new(HashMap::new()),
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry, using the default configuration.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    pub fn class<T: Data>(&self) -> DataResult<Arc<DataClass>> {
        self.class_of(DataType::of::<T>())
    }

    /// Resolved class for `data_type`, computing it on first use.
    pub fn class_of(&self, data_type: DataType) -> DataResult<Arc<DataClass>> {
        let key = data_type.key();
        if let Some(class) = self.read_classes().get(&key) {
            return Ok(Arc::clone(class));
        }

        let shape = data_type.shape();
        shape.validate(key)?;
        let mapping = self.resolver.resolve(&shape);
        let class = Arc::new(DataClass {
            key,
            shape,
            mapping,
        });

        debug!(class = %key, properties = class.shape.len(), "Resolved data class");
        let mut classes = self.write_classes();
        Ok(Arc::clone(classes.entry(key).or_insert(class)))
    }

    /// Factory tables of `T`, built on first use.
    pub fn factories<T: Data>(&self) -> Arc<Factories<T>> {
        let key = TypeKey::of::<T>();
        let cached = self.read_factories().get(&key).cloned();
        if let Some(factories) = cached.and_then(|f| f.downcast::<Factories<T>>().ok()) {
            return factories;
        }

        let built: Arc<Factories<T>> = Arc::new(T::factories());
        debug!(
            class = %key,
            required = built.required_factories().len(),
            optional = built.optional_factories().len(),
            "Registered factory tables"
        );
        let erased: ErasedFactories = built.clone();
        let published = Arc::clone(self.write_factories().entry(key).or_insert(erased));
        published.downcast::<Factories<T>>().unwrap_or(built)
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.read_classes().contains_key(&key)
    }

    /// Number of resolved classes.
    pub fn len(&self) -> usize {
        self.read_classes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Entries are immutable once published, so a poisoned lock still guards
    // a consistent map.
    fn read_classes(&self) -> RwLockReadGuard<'_, HashMap<TypeKey, Arc<DataClass>>> {
        self.classes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_classes(&self) -> RwLockWriteGuard<'_, HashMap<TypeKey, Arc<DataClass>>> {
        self.classes.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_factories(&self) -> RwLockReadGuard<'_, HashMap<TypeKey, ErasedFactories>> {
        self.factories.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_factories(&self) -> RwLockWriteGuard<'_, HashMap<TypeKey, ErasedFactories>> {
        self.factories.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new(DataConfig::default())
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.len())
            .finish_non_exhaustive()
    }
}
