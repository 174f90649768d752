//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use travel_predict::artifacts::{ArtifactBundle, ArtifactPaths};
use travel_predict::inference::InferenceService;

/// Maximum time any test is allowed to run before we consider it hung.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Three features: Passport, then a one-hot of Occupation that was never
/// fitted on "Free Lancer".
pub const PREPROCESSOR: &str = r#"{
    "version": 1,
    "transformers": [
        {"kind": "passthrough", "columns": ["Passport"]},
        {"kind": "one_hot", "columns": ["Occupation"], "categories": [["Salaried", "Small Business"]]}
    ]
}"#;

/// Passport holders are likely buyers, everyone else is not.
pub const MODEL: &str = r#"{
    "version": 1,
    "n_features": 3,
    "model": {"kind": "logistic_regression", "coef": [10.0, 0.0, 0.0], "intercept": -5.0}
}"#;

pub fn write_artifacts(dir: &Path) -> ArtifactPaths {
    let paths = ArtifactPaths {
        preprocessor: dir.join("preprocessor.json"),
        classifier: dir.join("model.json"),
    };
    std::fs::write(&paths.preprocessor, PREPROCESSOR).unwrap();
    std::fs::write(&paths.classifier, MODEL).unwrap();
    paths
}

pub fn service_from(paths: &ArtifactPaths) -> InferenceService {
    let bundle = ArtifactBundle::load(paths).expect("test artifacts should load");
    InferenceService::new(Arc::new(bundle), Duration::from_secs(2))
}

/// A service over the test artifacts, which live in a temp dir that is
/// removed once loaded.
pub fn test_service() -> InferenceService {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifacts(dir.path());
    service_from(&paths)
}

/// Start an Axum server on a random port, return the port.
pub async fn start_server(app: Router) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;
    port
}

/// The reference customer: every field inside its domain.
pub fn valid_form() -> Vec<(String, String)> {
    [
        ("Age", "30"),
        ("Gender", "Male"),
        ("MaritalStatus", "Married"),
        ("ProductPitched", "Basic"),
        ("PreferredPropertyStar", "3"),
        ("NumberOfTrips", "2"),
        ("TypeofContact", "Self Enquiry"),
        ("DurationOfPitch", "10"),
        ("NumberOfFollowups", "3"),
        ("PitchSatisfactionScore", "4"),
        ("Designation", "Manager"),
        ("CityTier", "1"),
        ("Occupation", "Salaried"),
        ("Passport", "1"),
        ("OwnCar", "1"),
        ("MonthlyIncome", "35000"),
        ("TotalVisiting", "2"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// `valid_form` with one field replaced.
pub fn form_with(field: &str, value: &str) -> Vec<(String, String)> {
    valid_form()
        .into_iter()
        .map(|(k, v)| if k == field { (k, value.to_string()) } else { (k, v) })
        .collect()
}

/// `valid_form` with one field removed.
pub fn form_without(field: &str) -> Vec<(String, String)> {
    valid_form().into_iter().filter(|(k, _)| k != field).collect()
}

/// The reference customer as typed JSON, as the dashboard sends it.
pub fn valid_json() -> serde_json::Value {
    serde_json::json!({
        "Age": 30,
        "Gender": "Male",
        "MaritalStatus": "Married",
        "ProductPitched": "Basic",
        "PreferredPropertyStar": 3,
        "NumberOfTrips": 2,
        "TypeofContact": "Self Enquiry",
        "DurationOfPitch": 10,
        "NumberOfFollowups": 3,
        "PitchSatisfactionScore": 4,
        "Designation": "Manager",
        "CityTier": 1,
        "Occupation": "Salaried",
        "Passport": 1,
        "OwnCar": 1,
        "MonthlyIncome": 35000.0,
        "TotalVisiting": 2
    })
}
