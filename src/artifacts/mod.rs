//! Pre-trained artifacts: the preprocessor and classifier pair.
//!
//! Both are opaque to the rest of the service and reached only through the
//! two-call contract below:
//! - [`Preprocessor::transform`]: record → fixed-width feature vector
//! - [`Classifier::predict`]: feature vector → class label
//!
//! The production implementations read an exported JSON format; tests plug in
//! their own implementations.

mod bundle;
pub mod classifier;
pub mod preprocessor;

pub use bundle::{ArtifactBundle, ArtifactPaths};
pub use classifier::JsonClassifier;
pub use preprocessor::JsonPreprocessor;

use crate::error::InferenceError;
use crate::record::CustomerRecord;

/// Turns a validated record into the classifier's feature vector.
///
/// Implementations must be free of side effects: the service calls them
/// concurrently from several requests.
pub trait Preprocessor: Send + Sync {
    fn transform(&self, record: &CustomerRecord) -> Result<Vec<f64>, InferenceError>;

    /// Width of every vector `transform` produces, when known up front.
    fn output_width(&self) -> Option<usize> {
        None
    }
}

/// Maps a feature vector to a raw class label.
///
/// The label is returned unchecked; the inference service rejects anything
/// other than 0 or 1.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError>;

    /// Number of features the classifier was fitted on, when known.
    fn n_features(&self) -> Option<usize> {
        None
    }
}

/// Format version understood by the JSON artifact loaders.
pub const ARTIFACT_VERSION: u32 = 1;
