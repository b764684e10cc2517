//! Name mappers: the leaf of the mapping engine.
//!
//! A [`NameMapper`] turns one name into another and can produce its own
//! inverse. Mappers are plain values, so a shape can carry them as builder
//! metadata and the registry can derive read/write mappings mechanically.
//!
//! | Variant     | `map(n)`                    | `inverse()`                    |
//! |-------------|-----------------------------|--------------------------------|
//! | `Identity`  | `n`                         | itself                         |
//! | `Fixed(t)`  | `t`                         | itself                         |
//! | `Convert`   | `n` rewritten into `to`     | `Convert { from: to, to: from }` |
//! | `Composite` | override for `n`, else default | each part inverted          |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Case conventions ─────────────────────────────────────────────────────────

/// A naming convention a [`NameMapper::Convert`] can rewrite names into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    /// `snake_case`
    Snake,
    /// `camelCase`
    Camel,
    /// `StudlyCase`
    Studly,
    /// `kebab-case`
    Kebab,
}

impl Case {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Snake => "snake",
            Self::Camel => "camel",
            Self::Studly => "studly",
            Self::Kebab => "kebab",
        }
    }

    /// Rewrite `name` into this convention.
    ///
    /// Names already in this convention come back unchanged.
    pub fn apply(self, name: &str) -> String {
        let words = split_words(name);
        match self {
            Self::Snake => words.join("_"),
            Self::Kebab => words.join("-"),
            Self::Camel => {
                let mut words = words.into_iter();
                let mut out = words.next().unwrap_or_default();
                out.extend(words.map(|w| capitalize(&w)));
                out
            }
            Self::Studly => words.iter().map(|w| capitalize(w)).collect(),
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Case {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "snake" | "snake_case" => Ok(Self::Snake),
            "camel" | "camelcase" => Ok(Self::Camel),
            "studly" | "pascal" | "studlycase" => Ok(Self::Studly),
            "kebab" | "kebab-case" => Ok(Self::Kebab),
            other => Err(format!("unknown case convention: {other}")),
        }
    }
}

/// Split a name into lowercase words.
///
/// Boundaries: `_`, `-`, whitespace, and before every uppercase letter.
/// Digits never start a word, so `line1` stays one word. Every uppercase
/// letter opens a word (`HTTPCode` → `h t t p code`), which keeps
/// single-letter segments round-trippable.
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for ch in input.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if ch.is_uppercase() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.extend(ch.to_lowercase());
        } else {
            current.push(ch);
        }
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

// ── Mappers ──────────────────────────────────────────────────────────────────

/// Maps a name to another name and knows its own inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMapper {
    Identity,
    /// Constant rename, used for a single property's override.
    Fixed(String),
    Convert {
        from: Case,
        to: Case,
    },
    Composite {
        overrides: BTreeMap<String, NameMapper>,
        default: Box<NameMapper>,
    },
}

impl NameMapper {
    pub fn fixed(name: impl Into<String>) -> Self {
        Self::Fixed(name.into())
    }

    pub const fn convert(from: Case, to: Case) -> Self {
        Self::Convert { from, to }
    }

    /// External `snake_case` names onto `camelCase` properties.
    pub const fn snake_to_camel() -> Self {
        Self::convert(Case::Snake, Case::Camel)
    }

    /// External `camelCase` names onto `snake_case` properties.
    pub const fn camel_to_snake() -> Self {
        Self::convert(Case::Camel, Case::Snake)
    }

    pub fn composite(overrides: BTreeMap<String, NameMapper>, default: NameMapper) -> Self {
        Self::Composite {
            overrides,
            default: Box::new(default),
        }
    }

    pub fn map(&self, name: &str) -> String {
        match self {
            Self::Identity => name.to_string(),
            Self::Fixed(target) => target.clone(),
            Self::Convert { to, .. } => to.apply(name),
            Self::Composite { overrides, default } => match overrides.get(name) {
                Some(mapper) => mapper.map(name),
                None => default.map(name),
            },
        }
    }

    pub fn inverse(&self) -> Self {
        match self {
            Self::Identity | Self::Fixed(_) => self.clone(),
            Self::Convert { from, to } => Self::Convert {
                from: *to,
                to: *from,
            },
            Self::Composite { overrides, default } => Self::Composite {
                overrides: overrides
                    .iter()
                    .map(|(name, mapper)| (name.clone(), mapper.inverse()))
                    .collect(),
                default: Box::new(default.inverse()),
            },
        }
    }

    pub const fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }
}

impl Default for NameMapper {
    fn default() -> Self {
        Self::Identity
    }
}
