//! Validator adapters.

mod rules;

pub use rules::RuleValidator;
