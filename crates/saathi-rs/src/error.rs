//! Error taxonomy for the flow layer.
//!
//! - [`ValidationError`]: a caller input or a model reply failed schema
//!   conformance. Always returned as a value.
//! - [`TransportError`]: the generation service was unreachable or answered
//!   with a transport-level failure.
//! - [`DefinitionError`]: a [`PromptSpec`](crate::prompt::PromptSpec) or
//!   schema is malformed. Raised while declaring flows at startup, never
//!   during a call.
//! - [`FlowError`]: what an entry point returns; wraps the first two with the
//!   name of the flow that failed.

use std::fmt;
use thiserror::Error;

/// Name used for the whole value when a failure is not tied to one field.
pub const ROOT_FIELD: &str = "$";

/// A schema conformance failure naming the offending field.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("field `{field}`: {constraint}")]
pub struct ValidationError {
    pub field: String,
    pub constraint: Constraint,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            field: field.into(),
            constraint,
        }
    }

    /// A failure that concerns the value as a whole (not an object, not JSON).
    pub fn root(constraint: Constraint) -> Self {
        Self::new(ROOT_FIELD, constraint)
    }

    pub fn is_missing_field(&self) -> bool {
        self.constraint == Constraint::Required
    }
}

/// The constraint a value violated.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// A required field is absent (or `null`).
    Required,
    /// The JSON type does not match the declared kind.
    Type {
        expected: &'static str,
        found: &'static str,
    },
    /// A number lies outside the inclusive `[min, max]` range.
    Range {
        min: Option<f64>,
        max: Option<f64>,
        value: f64,
    },
    /// A string is not one of the declared choices.
    OneOf { allowed: Vec<String>, value: String },
    /// A string is empty or whitespace-only.
    NonEmpty,
    /// The reply could not be read as a JSON object at all.
    Malformed(String),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Required => write!(f, "required field is missing"),
            Constraint::Type { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Constraint::Range { min, max, value } => {
                let lo = min.map_or("-inf".to_string(), |m| m.to_string());
                let hi = max.map_or("+inf".to_string(), |m| m.to_string());
                write!(f, "{value} is outside [{lo}, {hi}]")
            }
            Constraint::OneOf { allowed, value } => {
                write!(f, "`{value}` is not one of {}", allowed.join(", "))
            }
            Constraint::NonEmpty => write!(f, "must not be empty"),
            Constraint::Malformed(detail) => write!(f, "malformed value: {detail}"),
        }
    }
}

/// A malformed flow declaration. Fatal at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("prompt `{prompt}`: template slot `{slot}` is not declared in the input schema")]
    UnknownSlot { prompt: String, slot: String },

    #[error("template error at byte {offset}: {reason}")]
    MalformedTemplate { offset: usize, reason: &'static str },

    #[error("schema field `{field}`: {reason}")]
    MalformedSchema { field: String, reason: String },

    #[error("prompt `{prompt}` is missing its {part}")]
    Incomplete { prompt: String, part: &'static str },
}

/// A failure talking to the generation service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Network-level failure (connect, timeout, reading the body).
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service envelope could not be decoded.
    #[error("failed to parse response: {0}")]
    Decode(String),

    /// The service answered with an error object.
    #[error("service error: {0}")]
    Service(String),

    /// The service answered without any content.
    #[error("empty reply from generation service")]
    EmptyReply,
}

/// Failure of a single flow invocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("{flow}: invalid input: {source}")]
    InvalidInput {
        flow: String,
        #[source]
        source: ValidationError,
    },

    #[error("{flow}: invalid reply: {source}")]
    InvalidReply {
        flow: String,
        #[source]
        source: ValidationError,
    },

    #[error("{flow}: {source}")]
    Transport {
        flow: String,
        #[source]
        source: TransportError,
    },
}

impl FlowError {
    /// Name of the flow that failed.
    pub fn flow(&self) -> &str {
        match self {
            FlowError::InvalidInput { flow, .. }
            | FlowError::InvalidReply { flow, .. }
            | FlowError::Transport { flow, .. } => flow,
        }
    }

    /// The schema failure, for input and reply validation errors.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            FlowError::InvalidInput { source, .. } | FlowError::InvalidReply { source, .. } => {
                Some(source)
            }
            FlowError::Transport { .. } => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FlowError::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_field_and_constraint() {
        let err = ValidationError::new(
            "valence",
            Constraint::Range {
                min: Some(-1.0),
                max: Some(1.0),
                value: 1.2,
            },
        );
        assert_eq!(err.to_string(), "field `valence`: 1.2 is outside [-1, 1]");
    }

    #[test]
    fn open_range_renders_infinity() {
        let c = Constraint::Range {
            min: Some(0.0),
            max: None,
            value: -3.0,
        };
        assert_eq!(c.to_string(), "-3 is outside [0, +inf]");
    }

    #[test]
    fn flow_error_accessors() {
        let err = FlowError::InvalidReply {
            flow: "moodAnalysis".into(),
            source: ValidationError::new("energy", Constraint::Required),
        };
        assert_eq!(err.flow(), "moodAnalysis");
        assert!(err.validation().unwrap().is_missing_field());
        assert!(!err.is_transport());

        let err = FlowError::Transport {
            flow: "empatheticChat".into(),
            source: TransportError::EmptyReply,
        };
        assert!(err.is_transport());
        assert!(err.validation().is_none());
        assert_eq!(err.to_string(), "empatheticChat: empty reply from generation service");
    }
}
