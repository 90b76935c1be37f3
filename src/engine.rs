//! engine.rs
//! Serving-layer entry point: one immutable engine per process, built from the
//! startup configuration and shared by reference across requests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::artifact::{load_artifacts, LoadedArtifacts};
use crate::attribution::{global_importance, Attributor, Baseline, FeatureImportance, LinearExplainer};
use crate::config_loader::RiskConfig;
use crate::errors::{RiskError, RiskResult};
use crate::features::{ApplicantData, FeatureSchema, FeatureVector};
use crate::narrative::{
    coarse_risk_band, to_structured, to_text, CoarseRiskBand, StructuredExplanation,
    TextExplanation,
};
use crate::risk_linear::RiskModel;

/// Probability-only answer for one applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub risk_category: CoarseRiskBand,
    pub predicted_default: bool,
}

/// Serialized explanation payload handed to the serving layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationResponse {
    #[serde(flatten)]
    pub structured: StructuredExplanation,
    pub text_explanation: TextExplanation,
    pub risk_category: CoarseRiskBand,
}

pub struct ExplanationEngine {
    schema: FeatureSchema,
    model: Arc<dyn RiskModel>,
    attributor: Box<dyn Attributor>,
}

impl ExplanationEngine {
    /// Fails with `ModelIncompatible` if the model or attributor disagree with the schema.
    pub fn new(
        schema: FeatureSchema,
        model: Arc<dyn RiskModel>,
        attributor: Box<dyn Attributor>,
    ) -> RiskResult<Self> {
        if model.n_features() != schema.len() {
            return Err(RiskError::model_incompatible(format!(
                "model '{}' expects {} features, schema has {}",
                model.model_id(),
                model.n_features(),
                schema.len()
            )));
        }
        if attributor.n_features() != schema.len() {
            return Err(RiskError::model_incompatible(format!(
                "{} attributor covers {} features, schema has {}",
                attributor.method(),
                attributor.n_features(),
                schema.len()
            )));
        }

        info!(
            "ExplanationEngine initialized with model '{}', {} features, {} attribution",
            model.model_id(),
            schema.len(),
            attributor.method()
        );

        Ok(Self {
            schema,
            model,
            attributor,
        })
    }

    pub fn with_linear_explainer(
        schema: FeatureSchema,
        model: Arc<dyn RiskModel>,
        baseline: &Baseline,
    ) -> RiskResult<Self> {
        let explainer = LinearExplainer::new(model.as_ref(), baseline)?;
        Self::new(schema, model, Box::new(explainer))
    }

    pub fn from_artifacts(artifacts: LoadedArtifacts) -> RiskResult<Self> {
        let LoadedArtifacts {
            schema,
            model,
            baseline,
        } = artifacts;
        Self::with_linear_explainer(schema, Arc::new(model), &baseline)
    }

    pub fn from_config(config: &RiskConfig) -> RiskResult<Self> {
        Self::from_artifacts(load_artifacts(config)?)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Runs before any model call.
    fn check_vector(&self, features: &FeatureVector) -> RiskResult<()> {
        if features.len() != self.schema.len() {
            return Err(RiskError::dimension_mismatch(
                self.schema.len(),
                features.len(),
            ));
        }
        if features.names() != self.schema.names() {
            return Err(RiskError::validation(
                "features",
                "feature order does not match the model schema",
            ));
        }
        Ok(())
    }

    pub fn predict(&self, features: &FeatureVector) -> RiskResult<Prediction> {
        self.check_vector(features)?;

        let probability = self.model.predict_probability(features);
        let prediction = Prediction {
            probability,
            risk_category: coarse_risk_band(probability),
            predicted_default: probability >= self.model.decision_threshold(),
        };

        debug!(
            "Prediction {:.4} ({}) with model '{}'",
            probability,
            prediction.risk_category,
            self.model.model_id()
        );
        Ok(prediction)
    }

    /// Attribution, ranking and narrative for one feature vector.
    pub fn compute_explanation(
        &self,
        features: &FeatureVector,
    ) -> RiskResult<(StructuredExplanation, TextExplanation)> {
        self.check_vector(features)?;

        let probability = self.model.predict_probability(features);
        let attribution = self.attributor.attribute(features)?;
        let structured = to_structured(&attribution, probability);
        let text = to_text(&structured);

        debug!(
            "Explained prediction {:.4}: {} risk-increasing, {} risk-reducing drivers",
            probability,
            structured.top_risk_increasing.len(),
            structured.top_risk_reducing.len()
        );
        Ok((structured, text))
    }

    pub fn predict_applicant(&self, applicant: &ApplicantData) -> RiskResult<Prediction> {
        let features = applicant.to_feature_vector(&self.schema)?;
        self.predict(&features)
    }

    pub fn explain_applicant(&self, applicant: &ApplicantData) -> RiskResult<ExplanationResponse> {
        let features = applicant.to_feature_vector(&self.schema)?;
        let (structured, text_explanation) = self.compute_explanation(&features)?;
        let risk_category = coarse_risk_band(structured.prediction_probability);
        Ok(ExplanationResponse {
            structured,
            text_explanation,
            risk_category,
        })
    }

    /// Dataset-level feature importance over a batch of vectors.
    pub fn importance(&self, batch: &[FeatureVector]) -> RiskResult<Vec<FeatureImportance>> {
        for features in batch {
            self.check_vector(features)?;
        }
        global_importance(self.attributor.as_ref(), batch)
    }

    /// Get engine status
    pub fn status(&self) -> serde_json::Value {
        serde_json::json!({
            "status": "ready",
            "model_id": self.model.model_id(),
            "n_features": self.schema.len(),
            "attribution": self.attributor.method(),
            "base_value": self.attributor.base_value(),
            "decision_threshold": self.model.decision_threshold(),
        })
    }
}
