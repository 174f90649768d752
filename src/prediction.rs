//! Prediction labels and the messages shown for them.

use serde::Serialize;

use crate::error::{Error, InferenceError};

pub const LIKELY_MESSAGE: &str = "Customer is LIKELY to purchase the travel package.";
pub const NOT_LIKELY_MESSAGE: &str = "Customer is NOT likely to purchase the travel package.";

pub const SUCCESS_MARKER: &str = "✔";
pub const FAILURE_MARKER: &str = "✘";

/// Binary purchase-likelihood label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    NotLikely,
    Likely,
}

impl TryFrom<i64> for Label {
    type Error = InferenceError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::NotLikely),
            1 => Ok(Self::Likely),
            other => Err(InferenceError::InvalidLabel(other)),
        }
    }
}

impl Label {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::NotLikely => 0,
            Self::Likely => 1,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NotLikely => NOT_LIKELY_MESSAGE,
            Self::Likely => LIKELY_MESSAGE,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::NotLikely => FAILURE_MARKER,
            Self::Likely => SUCCESS_MARKER,
        }
    }
}

/// The immutable result of one successful inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictionResult {
    label: Label,
}

impl PredictionResult {
    pub fn new(label: Label) -> Self {
        Self { label }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn message(&self) -> &'static str {
        self.label.message()
    }

    /// Message prefixed with its marker, e.g. `✔ Customer is LIKELY ...`.
    pub fn display_text(&self) -> String {
        format!("{} {}", self.label.marker(), self.label.message())
    }
}

/// What a front-end shows in its outcome area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing submitted yet.
    Empty,
    Predicted(PredictionResult),
    /// A caught per-request error, already rendered to text.
    Failed(String),
}

impl Outcome {
    pub fn text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Predicted(result) => result.display_text(),
            Self::Failed(reason) => format!("Error: {reason}"),
        }
    }

    /// Short tag used by the pages and the dashboard protocol.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Predicted(r) if r.label() == Label::Likely => "likely",
            Self::Predicted(_) => "not_likely",
            Self::Failed(_) => "error",
        }
    }
}

impl From<Result<PredictionResult, Error>> for Outcome {
    fn from(result: Result<PredictionResult, Error>) -> Self {
        match result {
            Ok(prediction) => Self::Predicted(prediction),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}
