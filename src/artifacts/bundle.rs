//! Loading the preprocessor + classifier pair at startup.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{Classifier, JsonClassifier, JsonPreprocessor, Preprocessor};
use crate::error::{ArtifactError, ArtifactKind};

/// Where the two artifact files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub preprocessor: PathBuf,
    pub classifier: PathBuf,
}

/// The loaded preprocessor and classifier.
///
/// Created once at process start and never mutated afterwards; share it
/// behind an `Arc`.
pub struct ArtifactBundle {
    preprocessor: Box<dyn Preprocessor>,
    classifier: Box<dyn Classifier>,
}

impl std::fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("output_width", &self.preprocessor.output_width())
            .field("n_features", &self.classifier.n_features())
            .finish()
    }
}

impl ArtifactBundle {
    /// Pair a preprocessor with a classifier.
    ///
    /// Fails when both declare their widths and the widths disagree.
    pub fn new(
        preprocessor: impl Preprocessor + 'static,
        classifier: impl Classifier + 'static,
    ) -> Result<Self, ArtifactError> {
        if let (Some(width), Some(n_features)) =
            (preprocessor.output_width(), classifier.n_features())
        {
            if width != n_features {
                return Err(ArtifactError::Invalid {
                    kind: ArtifactKind::Classifier,
                    reason: format!(
                        "classifier expects {n_features} features but the preprocessor produces {width}"
                    ),
                });
            }
        }
        Ok(Self {
            preprocessor: Box::new(preprocessor),
            classifier: Box::new(classifier),
        })
    }

    /// Load both JSON artifacts from disk.
    ///
    /// Both files are checked for existence before either is read, so a
    /// missing file is always reported as such.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        ensure_exists(ArtifactKind::Preprocessor, &paths.preprocessor)?;
        ensure_exists(ArtifactKind::Classifier, &paths.classifier)?;

        let preprocessor = JsonPreprocessor::from_json(&read(
            ArtifactKind::Preprocessor,
            &paths.preprocessor,
        )?)?;
        let classifier =
            JsonClassifier::from_json(&read(ArtifactKind::Classifier, &paths.classifier)?)?;

        info!(
            preprocessor = %paths.preprocessor.display(),
            model = %paths.classifier.display(),
            features = ?classifier.n_features(),
            "Artifacts loaded"
        );

        Self::new(preprocessor, classifier)
    }

    pub fn preprocessor(&self) -> &dyn Preprocessor {
        self.preprocessor.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

fn ensure_exists(kind: ArtifactKind, path: &Path) -> Result<(), ArtifactError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ArtifactError::Missing {
            kind,
            path: path.to_path_buf(),
        })
    }
}

fn read(kind: ArtifactKind, path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    })
}
