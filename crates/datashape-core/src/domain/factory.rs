//! Factory tables and specificity ranking.
//!
//! A data type declares its construction methods as two explicit tables
//! ([`Factories::required`] and [`Factories::optional`]). Each factory takes
//! exactly one declared parameter type. Given a runtime payload, the most
//! specific applicable factory wins:
//!
//! 1. class match, nearest ancestor first (`distance` 0 is the exact type)
//! 2. capability match on the instance or any ancestor
//! 3. structural match (mapping, string, integer, float, bool, list)
//!
//! Ties go to the factory declared first.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::payload::{Capability, Instance, Mapping, Payload, TypeKey, lineage, satisfies};
use crate::error::{DataError, DataResult};

/// Declared parameter type of a factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Class(TypeKey),
    Capability(Capability),
    Mapping,
    String,
    Integer,
    /// Accepts integers too.
    Float,
    Bool,
    List,
}

impl ParamType {
    /// How specifically this parameter type accepts `payload`, if at all.
    pub fn specificity(&self, payload: &Payload) -> Option<Specificity> {
        match (self, payload) {
            (Self::Class(key), Payload::Instance(instance)) => lineage(instance.as_ref())
                .position(|ancestor| ancestor.type_key() == *key)
                .map(|distance| Specificity::Class { distance }),
            (Self::Capability(capability), Payload::Instance(instance)) => {
                satisfies(instance.as_ref(), *capability).then_some(Specificity::Capability)
            }
            (Self::Mapping, Payload::Value(Value::Object(_)))
            | (Self::String, Payload::Value(Value::String(_)))
            | (Self::Bool, Payload::Value(Value::Bool(_)))
            | (Self::List, Payload::Value(Value::Array(_)))
            | (Self::Float, Payload::Value(Value::Number(_))) => Some(Specificity::Structural),
            // Must agree with the `as_i64` conversion in `Factory::integer`.
            (Self::Integer, Payload::Value(Value::Number(n))) if n.is_i64() => {
                Some(Specificity::Structural)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(key) => write!(f, "{}", key.short_name()),
            Self::Capability(capability) => write!(f, "impl {capability}"),
            Self::Mapping => f.write_str("mapping"),
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::List => f.write_str("list"),
        }
    }
}

/// Rank of an applicable factory. Lower is more specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    Class { distance: usize },
    Capability,
    Structural,
}

/// Which factory table a construction draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Required,
    /// Optional table first, then required.
    Optional,
}

type FactoryFn<T> = dyn Fn(&Payload) -> DataResult<T> + Send + Sync;

/// A named construction method with one declared parameter.
pub struct Factory<T> {
    name: &'static str,
    param: ParamType,
    call: Arc<FactoryFn<T>>,
}

impl<T: 'static> Factory<T> {
    fn new(
        name: &'static str,
        param: ParamType,
        call: impl Fn(&Payload) -> DataResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            param,
            call: Arc::new(call),
        }
    }

    /// Accepts `P` or any type that embeds `P` as an ancestor.
    pub fn class<P: Instance>(
        name: &'static str,
        f: impl Fn(&P) -> DataResult<T> + Send + Sync + 'static,
    ) -> Self {
        let key = TypeKey::of::<P>();
        Self::new(name, ParamType::Class(key), move |payload| {
            payload
                .as_instance()
                .and_then(|instance| lineage(instance).find(|a| a.type_key() == key))
                .and_then(|ancestor| ancestor.as_any().downcast_ref::<P>())
                .map_or_else(|| Err(rejected::<T>(payload)), &f)
        })
    }

    /// Accepts any instance satisfying `capability`.
    pub fn capability(
        name: &'static str,
        capability: Capability,
        f: impl Fn(&dyn Instance) -> DataResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, ParamType::Capability(capability), move |payload| {
            match payload.as_instance() {
                Some(instance) => f(instance),
                None => Err(rejected::<T>(payload)),
            }
        })
    }

    pub fn mapping(
        name: &'static str,
        f: impl Fn(&Mapping) -> DataResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, ParamType::Mapping, move |payload| {
            payload
                .as_mapping()
                .map_or_else(|| Err(rejected::<T>(payload)), &f)
        })
    }

    pub fn string(
        name: &'static str,
        f: impl Fn(&str) -> DataResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, ParamType::String, move |payload| {
            match payload.as_value().and_then(Value::as_str) {
                Some(s) => f(s),
                None => Err(rejected::<T>(payload)),
            }
        })
    }

    pub fn integer(
        name: &'static str,
        f: impl Fn(i64) -> DataResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, ParamType::Integer, move |payload| {
            match payload.as_value().and_then(Value::as_i64) {
                Some(n) => f(n),
                None => Err(rejected::<T>(payload)),
            }
        })
    }

    pub fn float(
        name: &'static str,
        f: impl Fn(f64) -> DataResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, ParamType::Float, move |payload| {
            match payload.as_value().and_then(Value::as_f64) {
                Some(n) => f(n),
                None => Err(rejected::<T>(payload)),
            }
        })
    }

    pub fn bool(
        name: &'static str,
        f: impl Fn(bool) -> DataResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, ParamType::Bool, move |payload| {
            match payload.as_value().and_then(Value::as_bool) {
                Some(b) => f(b),
                None => Err(rejected::<T>(payload)),
            }
        })
    }

    pub fn list(
        name: &'static str,
        f: impl Fn(&[Value]) -> DataResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, ParamType::List, move |payload| {
            match payload.as_value().and_then(Value::as_array) {
                Some(items) => f(items),
                None => Err(rejected::<T>(payload)),
            }
        })
    }
}

impl<T> Factory<T> {
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn param(&self) -> ParamType {
        self.param
    }

    pub fn call(&self, payload: &Payload) -> DataResult<T> {
        (self.call)(payload)
    }
}

impl<T> Clone for Factory<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            param: self.param,
            call: Arc::clone(&self.call),
        }
    }
}

impl<T> fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("name", &self.name)
            .field("param", &self.param)
            .finish_non_exhaustive()
    }
}

fn rejected<T>(payload: &Payload) -> DataError {
    DataError::NoConstructionMethod {
        target: type_name::<T>(),
        input: payload.kind(),
    }
}

// ── Tables ───────────────────────────────────────────────────────────────────

/// The required and optional factory tables of one data type.
pub struct Factories<T> {
    required: Vec<Factory<T>>,
    optional: Vec<Factory<T>>,
}

impl<T> Factories<T> {
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
            optional: Vec::new(),
        }
    }

    /// Register a factory in the required (`from`) table.
    pub fn required(mut self, factory: Factory<T>) -> Self {
        self.required.push(factory);
        self
    }

    /// Register a factory in the optional table.
    pub fn optional(mut self, factory: Factory<T>) -> Self {
        self.optional.push(factory);
        self
    }

    pub fn required_factories(&self) -> &[Factory<T>] {
        &self.required
    }

    pub fn optional_factories(&self) -> &[Factory<T>] {
        &self.optional
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }

    /// The most specific factory of `family` accepting `payload`.
    pub fn select(&self, family: Family, payload: &Payload) -> Option<(&Factory<T>, Specificity)> {
        match family {
            Family::Required => best(&self.required, payload),
            Family::Optional => {
                best(&self.optional, payload).or_else(|| best(&self.required, payload))
            }
        }
    }
}

impl<T> Default for Factories<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Factories<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factories")
            .field("required", &self.required)
            .field("optional", &self.optional)
            .finish()
    }
}

fn best<'a, T>(table: &'a [Factory<T>], payload: &Payload) -> Option<(&'a Factory<T>, Specificity)> {
    table
        .iter()
        .enumerate()
        .filter_map(|(index, factory)| {
            factory
                .param
                .specificity(payload)
                .map(|specificity| (index, factory, specificity))
        })
        .min_by_key(|(index, _, specificity)| (*specificity, *index))
        .map(|(_, factory, specificity)| (factory, specificity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Model;
    impl Instance for Model {}

    #[derive(Debug)]
    struct DummyModel {
        model: Model,
    }

    impl Instance for DummyModel {
        fn parent(&self) -> Option<&dyn Instance> {
            Some(&self.model)
        }

        fn capabilities(&self) -> &[Capability] {
            &[Capability::ARRAYABLE]
        }
    }

    fn table() -> Factories<&'static str> {
        Factories::new()
            .required(Factory::mapping("fromArray", |_| Ok("array")))
            .required(Factory::capability("fromArrayable", Capability::ARRAYABLE, |_| {
                Ok("arrayable")
            }))
            .required(Factory::class::<Model>("fromModel", |_| Ok("model")))
            .required(Factory::class::<DummyModel>("fromDummyModel", |_| Ok("dummy")))
            .required(Factory::string("fromString", |_| Ok("string")))
    }

    fn chosen(factories: &Factories<&'static str>, payload: Payload) -> Option<&'static str> {
        factories
            .select(Family::Required, &payload)
            .map(|(factory, _)| factory.name())
    }

    #[test]
    fn specificity_orders_class_before_capability_before_structural() {
        assert!(Specificity::Class { distance: 0 } < Specificity::Class { distance: 1 });
        assert!(Specificity::Class { distance: 9 } < Specificity::Capability);
        assert!(Specificity::Capability < Specificity::Structural);
    }

    #[test]
    fn nearest_class_wins() {
        let factories = table();
        let payload = Payload::instance(DummyModel { model: Model });

        assert_eq!(chosen(&factories, payload), Some("fromDummyModel"));
    }

    #[test]
    fn ancestor_class_accepts_descendant() {
        let factories = Factories::new()
            .required(Factory::class::<Model>("fromModel", |_| Ok("model")))
            .required(Factory::capability("fromArrayable", Capability::ARRAYABLE, |_| {
                Ok("arrayable")
            }));
        let payload = Payload::instance(DummyModel { model: Model });

        let (factory, specificity) = factories.select(Family::Required, &payload).unwrap();
        assert_eq!(factory.name(), "fromModel");
        assert_eq!(specificity, Specificity::Class { distance: 1 });
        assert_eq!(factory.call(&payload), Ok("model"));
    }

    #[test]
    fn structural_matches_only_values() {
        let factories = table();

        assert_eq!(chosen(&factories, json!({"a": 1}).into()), Some("fromArray"));
        assert_eq!(chosen(&factories, "Hello".into()), Some("fromString"));
        assert_eq!(chosen(&factories, 42_i64.into()), None);
    }

    #[test]
    fn ties_go_to_first_declared() {
        let factories = Factories::new()
            .required(Factory::mapping("first", |_| Ok(1)))
            .required(Factory::mapping("second", |_| Ok(2)));

        let (factory, _) = factories
            .select(Family::Required, &json!({}).into())
            .unwrap();
        assert_eq!(factory.name(), "first");
    }

    #[test]
    fn float_parameter_accepts_integers() {
        assert_eq!(
            ParamType::Float.specificity(&3_i64.into()),
            Some(Specificity::Structural)
        );
        assert_eq!(ParamType::Integer.specificity(&3.5.into()), None);
    }

    #[test]
    fn integers_beyond_i64_go_to_the_float_factory() {
        let payload: Payload = json!(u64::MAX).into();
        assert_eq!(ParamType::Integer.specificity(&payload), None);

        let factories = Factories::new()
            .required(Factory::integer("fromInt", |_| Ok("int")))
            .required(Factory::float("fromFloat", |_| Ok("float")));

        let (factory, _) = factories.select(Family::Required, &payload).unwrap();
        assert_eq!(factory.name(), "fromFloat");
        assert_eq!(factory.call(&payload), Ok("float"));
    }

    #[test]
    fn optional_family_prefers_optional_table() {
        let factories = Factories::new()
            .required(Factory::string("fromString", |_| Ok("required")))
            .optional(Factory::string("optionalString", |_| Ok("optional")))
            .optional(Factory::integer("optionalInt", |_| Ok("optional-int")));

        let pick = |payload: Payload| {
            factories
                .select(Family::Optional, &payload)
                .map(|(f, _)| f.name())
        };

        assert_eq!(pick("x".into()), Some("optionalString"));
        assert_eq!(pick(true.into()), None);
        assert_eq!(
            factories
                .select(Family::Required, &"x".into())
                .map(|(f, _)| f.name()),
            Some("fromString")
        );
    }
}
