use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};

/// Additive decomposition of a model's raw score: `intercept + Σ coefficient_i * x_i`.
#[derive(Debug, Clone, Copy)]
pub struct LinearTerms<'a> {
    pub intercept: f64,
    pub coefficients: &'a [f64],
}

/// Capabilities the explanation pipeline needs from a fitted classifier.
///
/// Implementations must be read-only after construction; one instance is
/// shared by every request.
pub trait RiskModel: Send + Sync {
    fn model_id(&self) -> &str;

    /// Number of features the model was fitted on.
    fn n_features(&self) -> usize;

    /// Raw (pre-link) score, i.e. log-odds for a logistic model.
    fn raw_score_for(&self, features: &FeatureVector) -> f64;

    /// Probability of the positive (default) class, in [0, 1].
    fn predict_probability(&self, features: &FeatureVector) -> f64;

    /// Stable per-feature linear decomposition, if the model has one.
    fn linear_terms(&self) -> Option<LinearTerms<'_>> {
        None
    }

    /// Probability cut-off above which an applicant is flagged as a likely default.
    fn decision_threshold(&self) -> f64 {
        0.5
    }
}

/// Weights of a fitted logistic regression, as stored in the model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticWeights {
    pub model_id: String,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

/// Logistic regression default-risk model
#[derive(Debug, Clone)]
pub struct LogisticModel {
    weights: LogisticWeights,
}

impl LogisticModel {
    pub fn new(weights: LogisticWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &LogisticWeights {
        &self.weights
    }

    /// Whether a probability crosses the model's decision threshold
    pub fn predicts_default(&self, probability: f64) -> bool {
        probability >= self.weights.threshold
    }
}

impl RiskModel for LogisticModel {
    fn model_id(&self) -> &str {
        &self.weights.model_id
    }

    fn n_features(&self) -> usize {
        self.weights.coefficients.len()
    }

    fn raw_score_for(&self, features: &FeatureVector) -> f64 {
        // bias + sum(weight_i * feature_i)
        self.weights.intercept
            + features
                .values()
                .iter()
                .zip(self.weights.coefficients.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>()
    }

    fn predict_probability(&self, features: &FeatureVector) -> f64 {
        sigmoid(self.raw_score_for(features))
    }

    fn linear_terms(&self) -> Option<LinearTerms<'_>> {
        Some(LinearTerms {
            intercept: self.weights.intercept,
            coefficients: &self.weights.coefficients,
        })
    }

    fn decision_threshold(&self) -> f64 {
        self.weights.threshold
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
