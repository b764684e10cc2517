//! Validation value objects.
//!
//! The rule DSL itself is opaque to the core: rules are plain strings
//! (`"required"`, `"max:20"`) handed to a [`Validator`] port, which answers
//! with a [`ValidationOutcome`].
//!
//! [`Validator`]: crate::application::ports::Validator

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered field → rule list table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rules {
    entries: Vec<(String, Vec<String>)>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rules for `field`, appending to any already declared.
    pub fn field<I, S>(mut self, field: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(field, rules);
        self
    }

    pub fn insert<I, S>(&mut self, field: impl Into<String>, rules: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let field = field.into();
        let rules = rules.into_iter().map(Into::into);
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => existing.extend(rules),
            None => self.entries.push((field, rules.collect())),
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rules)| rules.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(field, rules)| (field.as_str(), rules.as_slice()))
    }

    /// Rewrite every field key with `rename`.
    pub fn rename_fields(self, mut rename: impl FnMut(&str) -> String) -> Self {
        Self {
            entries: self
                .entries
                .into_iter()
                .map(|(field, rules)| (rename(&field), rules))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Custom messages keyed `field.rule` or `rule`.
pub type Messages = HashMap<String, String>;

/// Human-readable labels substituted for `:attribute`, keyed by field.
pub type Attributes = HashMap<String, String>;

/// Ordered field path → messages table.
///
/// Paths use dot notation; list elements appear as numeric segments
/// (`tracks.2.title`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field, vec![message])),
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(field, _)| field.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, messages) in &self.entries {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

/// Result of running a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Passed,
    Failed(FieldErrors),
}

impl ValidationOutcome {
    /// `Passed` when `errors` is empty.
    pub fn from_errors(errors: FieldErrors) -> Self {
        if errors.is_empty() {
            Self::Passed
        } else {
            Self::Failed(errors)
        }
    }

    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}
