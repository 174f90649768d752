//! Error types for the prediction service.

use std::path::PathBuf;
use std::time::Duration;

use crate::schema::Field;

/// Per-request error type: everything a single prediction can fail with.
///
/// Startup failures (`ConfigError`, `ArtifactError`) never reach a request;
/// the binaries report them directly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Input(#[from] InputError),

    #[error("{0}")]
    Inference(#[from] InferenceError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Which of the two artifacts an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Preprocessor,
    Classifier,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preprocessor => write!(f, "Preprocessor"),
            Self::Classifier => write!(f, "Model"),
        }
    }
}

/// Startup errors while loading the preprocessor or classifier.
///
/// All of these are fatal: the process cannot serve a prediction without
/// both artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("{kind} file is missing: {}", .path.display())]
    Missing { kind: ArtifactKind, path: PathBuf },

    #[error("Failed to read {kind} file {}: {source}", .path.display())]
    Io {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to deserialize {kind}: {source}")]
    Parse {
        kind: ArtifactKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} artifact version {found} is not supported (expected {expected})")]
    UnsupportedVersion {
        kind: ArtifactKind,
        found: u32,
        expected: u32,
    },

    #[error("Invalid {kind} artifact: {reason}")]
    Invalid { kind: ArtifactKind, reason: String },
}

impl ArtifactError {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Missing { kind, .. }
            | Self::Io { kind, .. }
            | Self::Parse { kind, .. }
            | Self::UnsupportedVersion { kind, .. }
            | Self::Invalid { kind, .. } => *kind,
        }
    }
}

/// A raw field value that could not become part of a `CustomerRecord`.
///
/// Every variant names the offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("{field} is missing")]
    Missing { field: Field },

    #[error("{field} must be a whole number, got {value:?}")]
    NotInteger { field: Field, value: String },

    #[error("{field} must be a number, got {value:?}")]
    NotNumber { field: Field, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: Field,
        value: String,
        min: String,
        max: String,
    },

    #[error("{field} must be one of [{allowed}], got {value:?}")]
    NotAllowed {
        field: Field,
        value: String,
        allowed: String,
    },
}

impl InputError {
    /// The field that failed validation.
    pub fn field(&self) -> Field {
        match self {
            Self::Missing { field }
            | Self::NotInteger { field, .. }
            | Self::NotNumber { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::NotAllowed { field, .. } => *field,
        }
    }
}

/// Failures raised while transforming a record or classifying it.
///
/// These are per-request: the service keeps serving after reporting one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("Column {column:?} is not numeric and cannot be scaled")]
    NotNumeric { column: String },

    #[error("Found unknown category {value:?} in column {column:?} during transform")]
    UnknownCategory { column: String, value: String },

    #[error("Feature vector has {actual} features, but the classifier expects {expected}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("Feature {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("Classifier produced invalid label {0}")]
    InvalidLabel(i64),

    #[error("Inference timed out after {0:?}")]
    Timeout(Duration),

    #[error("Inference task failed: {0}")]
    TaskFailed(String),
}
