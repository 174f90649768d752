//! Binary classifier loaded from JSON.
//!
//! Two model families are supported:
//! - `logistic_regression`: label 1 iff `sigmoid(coef · x + intercept) >= threshold`
//! - `tree_ensemble`: flat-array decision trees whose leaves hold P(label = 1),
//!   combined by majority vote or by mean probability

use serde::Deserialize;

use super::{ARTIFACT_VERSION, Classifier};
use crate::error::{ArtifactError, ArtifactKind, InferenceError};

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Majority of per-tree labels; ties resolve to 0.
    #[default]
    Vote,
    MeanProbability,
}

/// One tree node. Splits send `x[feature] <= threshold` left.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Probability of label 1. Children always point forward (checked at
    /// load), so the walk terminates.
    fn probability(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if x[*feature] <= *threshold { *left } else { *right },
                Node::Leaf { value } => return *value,
            }
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {i} splits on feature {feature} of {n_features}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child {child}"));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !(0.0..=1.0).contains(value) {
                        return Err(format!("leaf {i} probability {value} is outside [0, 1]"));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Model {
    LogisticRegression {
        coef: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    TreeEnsemble {
        trees: Vec<Tree>,
        #[serde(default)]
        aggregation: Aggregation,
    },
}

#[derive(Debug, Deserialize)]
struct ClassifierFile {
    version: u32,
    n_features: usize,
    model: Model,
}

/// Classifier backed by a JSON model export.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonClassifier {
    n_features: usize,
    model: Model,
}

impl JsonClassifier {
    /// Parse and validate a model export.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let file: ClassifierFile =
            serde_json::from_str(json).map_err(|source| ArtifactError::Parse {
                kind: ArtifactKind::Classifier,
                source,
            })?;

        if file.version != ARTIFACT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                kind: ArtifactKind::Classifier,
                found: file.version,
                expected: ARTIFACT_VERSION,
            });
        }
        if file.n_features == 0 {
            return Err(invalid("n_features must be positive"));
        }

        match &file.model {
            Model::LogisticRegression {
                coef,
                intercept,
                threshold,
            } => {
                if coef.len() != file.n_features {
                    return Err(invalid(format!(
                        "{} coefficients for {} features",
                        coef.len(),
                        file.n_features
                    )));
                }
                if !intercept.is_finite() || coef.iter().any(|c| !c.is_finite()) {
                    return Err(invalid("non-finite coefficients"));
                }
                if !(*threshold > 0.0 && *threshold < 1.0) {
                    return Err(invalid(format!("threshold {threshold} must be in (0, 1)")));
                }
            }
            Model::TreeEnsemble { trees, .. } => {
                if trees.is_empty() {
                    return Err(invalid("tree ensemble has no trees"));
                }
                for (t, tree) in trees.iter().enumerate() {
                    tree.validate(file.n_features)
                        .map_err(|reason| invalid(format!("tree {t}: {reason}")))?;
                }
            }
        }

        Ok(Self {
            n_features: file.n_features,
            model: file.model,
        })
    }

    /// Probability of label 1 for an already checked feature vector.
    fn probability(&self, x: &[f64]) -> f64 {
        match &self.model {
            Model::LogisticRegression {
                coef, intercept, ..
            } => {
                let z: f64 = coef.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + intercept;
                1.0 / (1.0 + (-z).exp())
            }
            Model::TreeEnsemble { trees, aggregation } => {
                let probs = trees.iter().map(|t| t.probability(x));
                match aggregation {
                    Aggregation::Vote => {
                        let votes = probs.filter(|p| *p >= 0.5).count();
                        if votes * 2 > trees.len() { 1.0 } else { 0.0 }
                    }
                    Aggregation::MeanProbability => probs.sum::<f64>() / trees.len() as f64,
                }
            }
        }
    }

    fn threshold(&self) -> f64 {
        match &self.model {
            Model::LogisticRegression { threshold, .. } => *threshold,
            Model::TreeEnsemble { .. } => 0.5,
        }
    }
}

impl Classifier for JsonClassifier {
    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        if features.len() != self.n_features {
            return Err(InferenceError::FeatureMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        if let Some(index) = features.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::NonFinite { index });
        }

        let p = self.probability(features);
        Ok(if p >= self.threshold() { 1 } else { 0 })
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }
}

fn invalid(reason: impl Into<String>) -> ArtifactError {
    ArtifactError::Invalid {
        kind: ArtifactKind::Classifier,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGREG: &str = r#"{
        "version": 1,
        "n_features": 2,
        "model": {"kind": "logistic_regression", "coef": [2.0, -1.0], "intercept": 0.0}
    }"#;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> String {
        format!(
            r#"[{{"feature": {feature}, "threshold": {threshold}, "left": 1, "right": 2}},
                {{"value": {left}}}, {{"value": {right}}}]"#
        )
    }

    fn ensemble(aggregation: &str, trees: &[String]) -> String {
        format!(
            r#"{{"version": 1, "n_features": 2,
                 "model": {{"kind": "tree_ensemble", "aggregation": "{aggregation}", "trees": [{}]}}}}"#,
            trees.join(",")
        )
    }

    #[test]
    fn logistic_regression_thresholds_at_half() {
        let clf = JsonClassifier::from_json(LOGREG).unwrap();
        assert_eq!(clf.predict(&[1.0, 0.0]).unwrap(), 1);
        assert_eq!(clf.predict(&[0.0, 1.0]).unwrap(), 0);
        // z = 0 sits exactly on the threshold and counts as positive.
        assert_eq!(clf.predict(&[0.5, 1.0]).unwrap(), 1);
    }

    #[test]
    fn custom_threshold_is_respected() {
        let json = r#"{"version": 1, "n_features": 1,
            "model": {"kind": "logistic_regression", "coef": [1.0], "intercept": 0.0, "threshold": 0.9}}"#;
        let clf = JsonClassifier::from_json(json).unwrap();
        assert_eq!(clf.predict(&[1.0]).unwrap(), 0);
        assert_eq!(clf.predict(&[3.0]).unwrap(), 1);
    }

    #[test]
    fn wrong_width_is_feature_mismatch() {
        let clf = JsonClassifier::from_json(LOGREG).unwrap();
        assert_eq!(
            clf.predict(&[1.0, 2.0, 3.0]).unwrap_err(),
            InferenceError::FeatureMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn non_finite_feature_is_rejected() {
        let clf = JsonClassifier::from_json(LOGREG).unwrap();
        assert_eq!(
            clf.predict(&[1.0, f64::NAN]).unwrap_err(),
            InferenceError::NonFinite { index: 1 }
        );
    }

    #[test]
    fn majority_vote_across_trees() {
        let json = ensemble(
            "vote",
            &[
                stump(0, 0.0, 0.1, 0.9),
                stump(1, 0.0, 0.2, 0.8),
                stump(0, 5.0, 0.3, 0.7),
            ],
        );
        let clf = JsonClassifier::from_json(&json).unwrap();
        // Trees vote yes, yes, no.
        assert_eq!(clf.predict(&[1.0, 1.0]).unwrap(), 1);
        // Trees vote yes, no, no.
        assert_eq!(clf.predict(&[1.0, -1.0]).unwrap(), 0);
    }

    #[test]
    fn tied_vote_is_negative() {
        let json = ensemble("vote", &[stump(0, 0.0, 0.0, 1.0), stump(1, 0.0, 0.0, 1.0)]);
        let clf = JsonClassifier::from_json(&json).unwrap();
        assert_eq!(clf.predict(&[1.0, -1.0]).unwrap(), 0);
        assert_eq!(clf.predict(&[1.0, 1.0]).unwrap(), 1);
    }

    #[test]
    fn mean_probability_aggregation() {
        let json = ensemble(
            "mean_probability",
            &[stump(0, 0.0, 0.1, 0.9), stump(1, 0.0, 0.2, 0.4)],
        );
        let clf = JsonClassifier::from_json(&json).unwrap();
        // (0.9 + 0.4) / 2 = 0.65
        assert_eq!(clf.predict(&[1.0, 1.0]).unwrap(), 1);
        // (0.9 + 0.2) / 2 = 0.55
        assert_eq!(clf.predict(&[1.0, -1.0]).unwrap(), 1);
        // (0.1 + 0.2) / 2 = 0.15
        assert_eq!(clf.predict(&[-1.0, -1.0]).unwrap(), 0);
    }

    #[test]
    fn backward_child_pointer_is_rejected() {
        let json = r#"{"version": 1, "n_features": 1, "model": {"kind": "tree_ensemble", "trees": [
            [{"feature": 0, "threshold": 0.0, "left": 0, "right": 1}, {"value": 1.0}]
        ]}}"#;
        let err = JsonClassifier::from_json(json).unwrap_err();
        assert!(err.to_string().contains("invalid child 0"));
    }

    #[test]
    fn split_on_missing_feature_is_rejected() {
        let json = ensemble("vote", &[stump(7, 0.0, 0.0, 1.0)]);
        assert!(matches!(
            JsonClassifier::from_json(&json),
            Err(ArtifactError::Invalid { .. })
        ));
    }

    #[test]
    fn coefficient_count_must_match_width() {
        let json = r#"{"version": 1, "n_features": 3,
            "model": {"kind": "logistic_regression", "coef": [1.0], "intercept": 0.0}}"#;
        assert!(matches!(
            JsonClassifier::from_json(json),
            Err(ArtifactError::Invalid { .. })
        ));
    }

    #[test]
    fn unknown_model_kind_is_a_parse_error() {
        let json = r#"{"version": 1, "n_features": 1, "model": {"kind": "svm"}}"#;
        assert!(matches!(
            JsonClassifier::from_json(json),
            Err(ArtifactError::Parse { .. })
        ));
    }
}
