//! Interaction classification and confidence normalisation.

use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::ClassifierError,
    nlp::features::{FeatureVector, FEATURE_COUNT},
};

/// Raw probability at which a candidate is considered interacting.
pub const DECISION_THRESHOLD: f64 = 0.55;

/// Capability that scores a feature vector with the probability of the
/// interacting class.
pub trait InteractionClassifier: Send + Sync {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ClassifierError>;
}

/// Final decision for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: bool,
    /// Probability rescaled so the threshold sits at 0 and 1.0 stays 1.0.
    /// Negative for rejected candidates.
    pub confidence: f64,
}

/// Rescale a raw probability around [`DECISION_THRESHOLD`] and label it.
///
/// The label is read from the rounded confidence, so a probability a hair
/// below the threshold that rounds to 0.0 is still labelled positive.
pub fn normalize(probability: f64) -> Result<Prediction, ClassifierError> {
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(ClassifierError::OutOfRange(probability));
    }
    let rescaled = (probability - DECISION_THRESHOLD) / (1.0 - DECISION_THRESHOLD);
    // collapse -0.0 produced by rounding tiny negatives
    let confidence = (rescaled * 1000.0).round() / 1000.0 + 0.0;
    Ok(Prediction {
        label: confidence >= 0.0,
        confidence,
    })
}

/// Logistic model over the dense feature vector.
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    weights: Array1<f64>,
    intercept: f64,
}

#[derive(Debug, Deserialize)]
struct LogisticModelFile {
    intercept: f64,
    weights: Vec<f64>,
}

impl LogisticClassifier {
    pub fn new(weights: Vec<f64>, intercept: f64) -> Result<Self, ClassifierError> {
        if weights.len() != FEATURE_COUNT {
            return Err(ClassifierError::Schema {
                expected: FEATURE_COUNT,
                found: weights.len(),
            });
        }
        Ok(Self {
            weights: Array1::from(weights),
            intercept,
        })
    }

    /// Load `{"intercept": f64, "weights": [f64; 178]}` from disk.
    pub fn from_path(path: &Path) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| ClassifierError::Load(format!("{}: {err}", path.display())))?;
        let model: LogisticModelFile = serde_json::from_str(&raw)
            .map_err(|err| ClassifierError::Load(format!("{}: {err}", path.display())))?;
        let classifier = Self::new(model.weights, model.intercept)?;
        info!(path = %path.display(), "loaded logistic interaction model");
        Ok(classifier)
    }
}

impl InteractionClassifier for LogisticClassifier {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        let logit = self.weights.dot(&features.to_dense()) + self.intercept;
        let probability = 1.0 / (1.0 + (-logit).exp());
        debug!(logit, probability, "scored candidate");
        Ok(probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_maps_to_zero() {
        let prediction = normalize(0.55).unwrap();
        assert_eq!(prediction.confidence, 0.0);
        assert!(prediction.label);
    }

    #[test]
    fn certainty_maps_to_one() {
        let prediction = normalize(1.0).unwrap();
        assert_eq!(prediction.confidence, 1.0);
        assert!(prediction.label);
    }

    #[test]
    fn below_threshold_is_negative() {
        let prediction = normalize(0.549).unwrap();
        assert!(prediction.confidence < 0.0);
        assert!(!prediction.label);

        let prediction = normalize(0.1).unwrap();
        assert_eq!(prediction.confidence, -1.0);
    }

    #[test]
    fn label_follows_rounded_confidence() {
        let prediction = normalize(0.5498).unwrap();
        assert_eq!(prediction.confidence, 0.0);
        assert!(prediction.confidence.is_sign_positive());
        assert!(prediction.label);

        let prediction = normalize(0.5497).unwrap();
        assert_eq!(prediction.confidence, -0.001);
        assert!(!prediction.label);
    }

    #[test]
    fn rounding_to_three_decimals() {
        let prediction = normalize(0.8).unwrap();
        assert_eq!(prediction.confidence, 0.556);
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(matches!(
            normalize(1.2),
            Err(ClassifierError::OutOfRange(_))
        ));
        assert!(normalize(f64::NAN).is_err());
    }

    #[test]
    fn weight_width_must_match_schema() {
        let err = LogisticClassifier::new(vec![0.0; 3], 0.0).unwrap_err();
        assert!(matches!(err, ClassifierError::Schema { found: 3, .. }));
    }
}
