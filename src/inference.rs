//! Inference service: record → preprocessor → classifier → label.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::artifacts::ArtifactBundle;
use crate::error::{Error, InferenceError};
use crate::prediction::{Label, PredictionResult};
use crate::record::{CustomerRecord, RawInput};

/// Default bound on a single transform + predict call.
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(2);

/// Stateless prediction service over a shared, read-only artifact bundle.
///
/// Cloning is cheap; every clone uses the same bundle.
#[derive(Debug, Clone)]
pub struct InferenceService {
    bundle: Arc<ArtifactBundle>,
    timeout: Duration,
}

impl InferenceService {
    pub fn new(bundle: Arc<ArtifactBundle>, timeout: Duration) -> Self {
        Self { bundle, timeout }
    }

    /// Run the preprocessor, then the classifier, on one record.
    pub fn predict(&self, record: &CustomerRecord) -> Result<PredictionResult, InferenceError> {
        let features = self.bundle.preprocessor().transform(record)?;
        let raw = self.bundle.classifier().predict(&features)?;
        Ok(PredictionResult::new(Label::try_from(raw)?))
    }

    /// [`predict`](Self::predict) on the blocking pool, bounded by the
    /// configured timeout.
    pub async fn predict_async(
        &self,
        record: CustomerRecord,
    ) -> Result<PredictionResult, InferenceError> {
        let service = self.clone();
        let task = tokio::task::spawn_blocking(move || service.predict(&record));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(InferenceError::TaskFailed(join_err.to_string())),
            Err(_) => Err(InferenceError::Timeout(self.timeout)),
        }
    }

    /// Full request path: validate raw input, then infer.
    ///
    /// Input and inference failures come back as distinct `Error` variants;
    /// callers turn them into user-visible text.
    pub async fn handle(
        &self,
        request_id: Uuid,
        raw: &RawInput,
    ) -> Result<PredictionResult, Error> {
        let record = match CustomerRecord::from_raw(raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(request_id = %request_id, field = %e.field(), error = %e, "Rejected input");
                return Err(e.into());
            }
        };

        let started = Instant::now();
        match self.predict_async(record).await {
            Ok(result) => {
                info!(
                    request_id = %request_id,
                    label = result.label().as_i64(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Prediction complete"
                );
                Ok(result)
            }
            Err(e) => {
                error!(request_id = %request_id, error = %e, "Inference failed");
                Err(e.into())
            }
        }
    }
}
