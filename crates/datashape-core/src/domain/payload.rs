//! Runtime input values.
//!
//! A [`Payload`] is either untyped data (a `serde_json::Value`: mapping, list
//! or scalar) or an instance of some host type implementing [`Instance`].
//! Instances describe their own identity, their parent (ancestry is modelled
//! by composition: a type embeds its parent and hands it out), and the
//! capabilities (interfaces) they satisfy. Construction resolution ranks
//! factories against exactly this information.

use std::any::{Any, TypeId};
use std::fmt;

use serde_json::{Map, Value};

use crate::domain::data::DynData;

/// A mapping-shaped value: string keys, insertion ordered.
pub type Mapping = Map<String, Value>;

// ── Type identity ────────────────────────────────────────────────────────────

/// Fully-qualified identity of a Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub const fn id(&self) -> TypeId {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A named interface an instance can satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability(&'static str);

impl Capability {
    /// Instances that can present themselves as a mapping.
    pub const ARRAYABLE: Self = Self::new("arrayable");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// ── Instances ────────────────────────────────────────────────────────────────

/// Downcasting support for trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A host-language value that can be passed to construction.
///
/// Every method has a default, so plain types only need `impl Instance for T {}`.
pub trait Instance: AsAny + Send + Sync + fmt::Debug {
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    /// The embedded parent value, if this type extends another.
    fn parent(&self) -> Option<&dyn Instance> {
        None
    }

    /// Capabilities this type satisfies directly (not through its parent).
    fn capabilities(&self) -> &[Capability] {
        &[]
    }

    /// A mapping view of this value.
    ///
    /// Types returning `Some` are treated as mapping-shaped when no factory
    /// accepts them and construction falls back to hydration.
    fn to_mapping(&self) -> Option<Mapping> {
        None
    }

    /// The data-object view of this value.
    ///
    /// Data objects return `Some(self)` (see [`data_instance!`]) so another
    /// data type can be hydrated from their transformed output.
    ///
    /// [`data_instance!`]: crate::data_instance
    fn as_data(&self) -> Option<&dyn DynData> {
        None
    }
}

/// The instance itself followed by its ancestors, nearest first.
pub fn lineage<'a>(instance: &'a dyn Instance) -> impl Iterator<Item = &'a dyn Instance> + 'a {
    std::iter::successors(Some(instance), |current| current.parent())
}

/// Whether `instance` or any ancestor satisfies `capability`.
pub fn satisfies(instance: &dyn Instance, capability: Capability) -> bool {
    lineage(instance).any(|ancestor| ancestor.capabilities().contains(&capability))
}

// ── Payload ──────────────────────────────────────────────────────────────────

/// A runtime input handed to construction.
#[derive(Debug)]
pub enum Payload {
    Value(Value),
    Instance(Box<dyn Instance>),
}

impl Payload {
    pub fn instance(instance: impl Instance) -> Self {
        Self::Instance(Box::new(instance))
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    pub const fn is_mapping(&self) -> bool {
        matches!(self, Self::Value(Value::Object(_)))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Instance(_) => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Value(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&dyn Instance> {
        match self {
            Self::Instance(instance) => Some(instance.as_ref()),
            Self::Value(_) => None,
        }
    }

    /// Human-readable runtime type, used in error messages.
    pub fn kind(&self) -> String {
        match self {
            Self::Value(value) => value_kind(value).to_string(),
            Self::Instance(instance) => format!("an instance of `{}`", instance.type_key()),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Mapping> for Payload {
    fn from(map: Mapping) -> Self {
        Self::Value(Value::Object(map))
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

/// Structural category of a JSON value.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
