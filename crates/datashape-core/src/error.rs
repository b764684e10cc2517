//! Unified error handling for datashape.
//!
//! Every failure the mapping engine can raise is a [`DataError`]. Errors are
//! raised at the point of detection and propagate to the immediate caller;
//! nothing is retried or swallowed internally.

use thiserror::Error;

use crate::domain::validation::FieldErrors;

/// Root error type for construction, validation and transformation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    // ========================================================================
    // Construction
    // ========================================================================
    #[error("no construction method on `{target}` accepts {input}")]
    NoConstructionMethod { target: &'static str, input: String },

    #[error("`{target}` is missing required property `{property}`")]
    MissingRequiredProperty {
        target: &'static str,
        property: String,
    },

    #[error("property `{property}` expects {expected}, got {found}")]
    TypeMismatch {
        property: String,
        expected: String,
        found: String,
    },

    #[error("element {index} of `{property}` could not be constructed: {source}")]
    InvalidCollectionElement {
        property: String,
        index: usize,
        #[source]
        source: Box<DataError>,
    },

    #[error("nesting exceeds the maximum depth of {max_depth}")]
    MaxDepthExceeded { max_depth: usize },

    #[error("shape of `{target}` is invalid: {reason}")]
    InvalidShape {
        target: &'static str,
        reason: String,
    },

    /// Raised by user factories and hydrate implementations.
    #[error("{0}")]
    Custom(String),

    // ========================================================================
    // Validation
    // ========================================================================
    #[error("could not resolve dependency `{dependency}`: {source}")]
    DependencyResolutionFailed {
        dependency: &'static str,
        #[source]
        source: ResolveError,
    },

    #[error("validation failed for {} field(s)", errors.len())]
    ValidationFailed { errors: FieldErrors },

    #[error("no validator is configured")]
    ValidatorNotConfigured,

    // ========================================================================
    // Output
    // ========================================================================
    #[error("property `{property}` could not be serialized: {reason}")]
    Serialization { property: String, reason: String },
}

impl DataError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Error category, for callers that group or render failures.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoConstructionMethod { .. }
            | Self::MissingRequiredProperty { .. }
            | Self::TypeMismatch { .. }
            | Self::InvalidCollectionElement { .. }
            | Self::MaxDepthExceeded { .. }
            | Self::Custom(_) => ErrorCategory::Construction,
            Self::ValidationFailed { .. } => ErrorCategory::Validation,
            Self::DependencyResolutionFailed { .. } => ErrorCategory::Dependency,
            Self::InvalidShape { .. } | Self::ValidatorNotConfigured => {
                ErrorCategory::Configuration
            }
            Self::Serialization { .. } => ErrorCategory::Output,
        }
    }

    /// Field errors carried by a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::ValidationFailed { errors } => Some(errors),
            _ => None,
        }
    }
}

/// Error categories for display and grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Construction,
    Validation,
    Dependency,
    Configuration,
    Output,
}

/// Failures reported by a [`ServiceResolver`](crate::application::ports::ServiceResolver).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("no binding registered for `{service}`")]
    NotBound { service: &'static str },

    #[error("binding for `{service}` failed: {reason}")]
    Failed {
        service: &'static str,
        reason: String,
    },

    #[error("resolved service is not a `{expected}`")]
    UnexpectedType { expected: &'static str },

    #[error("no service resolver is configured")]
    NoResolver,
}

/// Convenient result type alias.
pub type DataResult<T> = Result<T, DataError>;
