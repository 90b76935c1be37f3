//! Attribution extraction: split a model's raw score into a base value plus
//! one signed contribution per feature.
//!
//! Every [`Attributor`] must satisfy the additive-exactness law: for any input
//! `x`, `base_value + Σ contribution_i` reproduces the model's raw score for `x`.

use crate::errors::{RiskError, RiskResult};
use crate::features::{FeatureSchema, FeatureVector};
use crate::risk_linear::RiskModel;
use serde::{Deserialize, Serialize};

/// Reference point the base value is measured from.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    values: Vec<f64>,
}

impl Baseline {
    /// All-zero reference vector.
    pub fn zeros(n_features: usize) -> Self {
        Self {
            values: vec![0.0; n_features],
        }
    }

    /// Explicit reference values (e.g. population means) in schema order.
    pub fn from_values(schema: &FeatureSchema, values: Vec<f64>) -> RiskResult<Self> {
        if values.len() != schema.len() {
            return Err(RiskError::dimension_mismatch(schema.len(), values.len()));
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// One feature's share of a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub value: f64,
    #[serde(rename = "shap_contribution")]
    pub contribution: f64,
}

/// Base value plus per-feature contributions, position-aligned with the input vector.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionResult {
    pub base_value: f64,
    pub feature_contributions: Vec<FeatureContribution>,
}

impl AttributionResult {
    /// `base_value + Σ contributions`; equals the model's raw score.
    pub fn reconstructed_score(&self) -> f64 {
        self.base_value
            + self
                .feature_contributions
                .iter()
                .map(|c| c.contribution)
                .sum::<f64>()
    }
}

/// Pluggable attribution technique. Alternative explainers (tree, kernel, ...)
/// slot in here as long as they keep the additive-exactness law.
pub trait Attributor: Send + Sync {
    /// Technique name, for logs.
    fn method(&self) -> &'static str;

    fn n_features(&self) -> usize;

    fn base_value(&self) -> f64;

    fn attribute(&self, features: &FeatureVector) -> RiskResult<AttributionResult>;
}

/// Exact attribution for linear models: `contribution_i = w_i * (x_i - b_i)`.
#[derive(Debug, Clone)]
pub struct LinearExplainer {
    coefficients: Vec<f64>,
    baseline: Vec<f64>,
    base_value: f64,
}

impl LinearExplainer {
    /// Fails with `ModelIncompatible` when the model exposes no linear
    /// decomposition; intended to run once at startup.
    pub fn new(model: &dyn RiskModel, baseline: &Baseline) -> RiskResult<Self> {
        let terms = model.linear_terms().ok_or_else(|| {
            RiskError::model_incompatible(format!(
                "model '{}' does not expose a linear per-feature decomposition",
                model.model_id()
            ))
        })?;

        if terms.coefficients.len() != model.n_features() {
            return Err(RiskError::model_incompatible(format!(
                "model '{}' reports {} features but carries {} coefficients",
                model.model_id(),
                model.n_features(),
                terms.coefficients.len()
            )));
        }
        if baseline.len() != terms.coefficients.len() {
            return Err(RiskError::dimension_mismatch(
                terms.coefficients.len(),
                baseline.len(),
            ));
        }

        let base_value = terms.intercept
            + terms
                .coefficients
                .iter()
                .zip(baseline.values())
                .map(|(w, b)| w * b)
                .sum::<f64>();

        Ok(Self {
            coefficients: terms.coefficients.to_vec(),
            baseline: baseline.values().to_vec(),
            base_value,
        })
    }
}

impl Attributor for LinearExplainer {
    fn method(&self) -> &'static str {
        "linear"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn base_value(&self) -> f64 {
        self.base_value
    }

    fn attribute(&self, features: &FeatureVector) -> RiskResult<AttributionResult> {
        if features.len() != self.coefficients.len() {
            return Err(RiskError::dimension_mismatch(
                self.coefficients.len(),
                features.len(),
            ));
        }

        let feature_contributions = features
            .iter()
            .zip(self.coefficients.iter().zip(self.baseline.iter()))
            .map(|((name, x), (w, b))| FeatureContribution {
                feature: name.to_string(),
                value: x,
                contribution: w * (x - b),
            })
            .collect();

        Ok(AttributionResult {
            base_value: self.base_value,
            feature_contributions,
        })
    }
}

/// Attribute one feature vector against `model` relative to `baseline`.
///
/// The vector length is checked before the model is consulted.
pub fn explain(
    model: &dyn RiskModel,
    baseline: &Baseline,
    features: &FeatureVector,
) -> RiskResult<AttributionResult> {
    if features.len() != model.n_features() {
        return Err(RiskError::dimension_mismatch(
            model.n_features(),
            features.len(),
        ));
    }
    LinearExplainer::new(model, baseline)?.attribute(features)
}

/// Dataset-level importance of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub mean_abs_contribution: f64,
}

/// Mean absolute contribution per feature over a batch, most important first.
/// Ties keep schema order.
pub fn global_importance(
    attributor: &dyn Attributor,
    batch: &[FeatureVector],
) -> RiskResult<Vec<FeatureImportance>> {
    let first = batch
        .first()
        .ok_or_else(|| RiskError::validation("batch", "at least one feature vector is required"))?;

    let mut totals = vec![0.0; attributor.n_features()];
    for features in batch {
        let attribution = attributor.attribute(features)?;
        for (total, c) in totals.iter_mut().zip(&attribution.feature_contributions) {
            *total += c.contribution.abs();
        }
    }

    let n = batch.len() as f64;
    let mut ranked: Vec<FeatureImportance> = first
        .names()
        .iter()
        .zip(totals)
        .map(|(name, total)| FeatureImportance {
            feature: name.clone(),
            mean_abs_contribution: total / n,
        })
        .collect();
    ranked.sort_by(|a, b| b.mean_abs_contribution.total_cmp(&a.mean_abs_contribution));

    tracing::debug!(
        "Computed {} global importances over {} samples with {} attribution",
        ranked.len(),
        batch.len(),
        attributor.method()
    );
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk_linear::{LogisticModel, LogisticWeights};

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            "CREDIT_TO_INCOME".into(),
            "AGE_YEARS".into(),
            "EXT_SOURCE_3".into(),
        ])
        .unwrap()
    }

    fn model() -> LogisticModel {
        LogisticModel::new(LogisticWeights {
            model_id: "logreg_v1".into(),
            intercept: -2.0,
            coefficients: vec![0.8, -0.02, -1.5],
            threshold: 0.5,
        })
    }

    struct OpaqueModel;

    impl RiskModel for OpaqueModel {
        fn model_id(&self) -> &str {
            "opaque"
        }
        fn n_features(&self) -> usize {
            3
        }
        fn raw_score_for(&self, features: &FeatureVector) -> f64 {
            features.values().iter().map(|v| v * v).sum()
        }
        fn predict_probability(&self, features: &FeatureVector) -> f64 {
            crate::risk_linear::sigmoid(self.raw_score_for(features))
        }
    }

    #[test]
    fn zero_baseline_base_value_is_intercept() {
        let explainer = LinearExplainer::new(&model(), &Baseline::zeros(3)).unwrap();
        assert_eq!(explainer.base_value(), -2.0);
    }

    #[test]
    fn contributions_reconstruct_raw_score() {
        let s = schema();
        let m = model();
        let baseline = Baseline::from_values(&s, vec![1.2, 40.0, 0.5]).unwrap();
        let fv = FeatureVector::from_values(&s, vec![3.1, 29.0, 0.2]).unwrap();

        let result = explain(&m, &baseline, &fv).unwrap();

        assert!((result.reconstructed_score() - m.raw_score_for(&fv)).abs() < 1e-9);
        assert_eq!(result.feature_contributions.len(), 3);
        assert_eq!(result.feature_contributions[0].feature, "CREDIT_TO_INCOME");
        assert_eq!(result.feature_contributions[0].value, 3.1);
        assert!((result.feature_contributions[0].contribution - 0.8 * (3.1 - 1.2)).abs() < 1e-12);
    }

    #[test]
    fn model_without_decomposition_is_incompatible() {
        let err = LinearExplainer::new(&OpaqueModel, &Baseline::zeros(3)).unwrap_err();
        assert!(matches!(err, RiskError::ModelIncompatible { .. }));
    }

    #[test]
    fn wrong_length_vector_is_rejected() {
        let short = FeatureSchema::new(vec!["CREDIT_TO_INCOME".into()]).unwrap();
        let fv = FeatureVector::from_values(&short, vec![1.0]).unwrap();
        let err = explain(&model(), &Baseline::zeros(3), &fv).unwrap_err();
        assert!(matches!(
            err,
            RiskError::DimensionMismatch {
                expected: 3,
                actual: 1
            }
        ));
    }

    #[test]
    fn baseline_length_must_match_model() {
        let err = LinearExplainer::new(&model(), &Baseline::zeros(2)).unwrap_err();
        assert!(matches!(err, RiskError::DimensionMismatch { .. }));
    }

    #[test]
    fn global_importance_ranks_by_mean_abs_contribution() {
        let s = schema();
        let explainer = LinearExplainer::new(&model(), &Baseline::zeros(3)).unwrap();
        let batch = vec![
            FeatureVector::from_values(&s, vec![1.0, 30.0, 0.0]).unwrap(),
            FeatureVector::from_values(&s, vec![-1.0, 60.0, 0.0]).unwrap(),
        ];

        let ranked = global_importance(&explainer, &batch).unwrap();

        assert_eq!(ranked[0].feature, "AGE_YEARS");
        assert!((ranked[0].mean_abs_contribution - 0.9).abs() < 1e-9);
        assert_eq!(ranked[1].feature, "CREDIT_TO_INCOME");
        assert!((ranked[1].mean_abs_contribution - 0.8).abs() < 1e-9);
        assert_eq!(ranked[2].mean_abs_contribution, 0.0);
    }

    #[test]
    fn global_importance_needs_samples() {
        let explainer = LinearExplainer::new(&model(), &Baseline::zeros(3)).unwrap();
        assert!(global_importance(&explainer, &[]).is_err());
    }
}
