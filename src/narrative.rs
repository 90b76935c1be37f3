//! Narrative generation: rank attribution output into a structured explanation
//! and render it as a fixed, template-based paragraph.
//!
//! Both stages are pure functions. The same input always produces the same
//! structured object and byte-identical text.

use crate::attribution::{AttributionResult, FeatureContribution};
use crate::errors::{RiskError, RiskResult};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Drivers kept per direction in the structured explanation.
pub const MAX_STRUCTURED_DRIVERS: usize = 5;
/// Drivers named per direction in the narrative text.
pub const MAX_NARRATIVE_DRIVERS: usize = 3;

/// JSON keys a structured explanation must carry.
pub const REQUIRED_FIELDS: [&str; 4] = [
    "base_value",
    "prediction_probability",
    "top_risk_increasing_features",
    "top_risk_reducing_features",
];

lazy_static! {
    static ref FEATURE_LABELS: HashMap<&'static str, &'static str> = {
        let mut labels = HashMap::new();
        labels.insert("CREDIT_TO_INCOME", "credit-to-income ratio");
        labels.insert("ANNUITY_TO_INCOME", "annuity burden");
        labels.insert("AGE_YEARS", "applicant age");
        labels.insert("EMPLOYMENT_YEARS", "employment duration");
        labels
    };
}

/// Human-readable label for an internal feature name; unmapped names are
/// returned verbatim.
pub fn map_feature_name(feature: &str) -> &str {
    FEATURE_LABELS.get(feature).copied().unwrap_or(feature)
}

/// Four-tier band used in narrative text (thresholds 0.25 / 0.50 / 0.75,
/// inclusive lower bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrativeRiskBand {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Very High Risk")]
    VeryHigh,
}

impl NarrativeRiskBand {
    pub fn label(&self) -> &'static str {
        match self {
            NarrativeRiskBand::Low => "Low Risk",
            NarrativeRiskBand::Moderate => "Moderate Risk",
            NarrativeRiskBand::High => "High Risk",
            NarrativeRiskBand::VeryHigh => "Very High Risk",
        }
    }
}

impl fmt::Display for NarrativeRiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn narrative_risk_band(probability: f64) -> NarrativeRiskBand {
    if probability >= 0.75 {
        NarrativeRiskBand::VeryHigh
    } else if probability >= 0.50 {
        NarrativeRiskBand::High
    } else if probability >= 0.25 {
        NarrativeRiskBand::Moderate
    } else {
        NarrativeRiskBand::Low
    }
}

/// Three-tier band reported next to raw predictions (thresholds 0.30 / 0.60).
/// Deliberately separate from [`NarrativeRiskBand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoarseRiskBand {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl CoarseRiskBand {
    pub fn label(&self) -> &'static str {
        match self {
            CoarseRiskBand::Low => "Low Risk",
            CoarseRiskBand::Medium => "Medium Risk",
            CoarseRiskBand::High => "High Risk",
        }
    }
}

impl fmt::Display for CoarseRiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn coarse_risk_band(probability: f64) -> CoarseRiskBand {
    if probability >= 0.60 {
        CoarseRiskBand::High
    } else if probability >= 0.30 {
        CoarseRiskBand::Medium
    } else {
        CoarseRiskBand::Low
    }
}

/// Ranked, truncated summary of an attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredExplanation {
    pub base_value: f64,
    pub prediction_probability: f64,
    #[serde(rename = "top_risk_increasing_features")]
    pub top_risk_increasing: Vec<FeatureContribution>,
    #[serde(rename = "top_risk_reducing_features")]
    pub top_risk_reducing: Vec<FeatureContribution>,
}

/// Rendered narrative paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextExplanation(String);

impl TextExplanation {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TextExplanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split contributions by sign, rank each side by magnitude and keep the top
/// [`MAX_STRUCTURED_DRIVERS`]. Zero contributions are dropped; ties keep
/// feature order.
pub fn to_structured(
    attribution: &AttributionResult,
    predicted_probability: f64,
) -> StructuredExplanation {
    let (mut increasing, mut reducing): (Vec<_>, Vec<_>) = attribution
        .feature_contributions
        .iter()
        .filter(|c| c.contribution > 0.0 || c.contribution < 0.0)
        .cloned()
        .partition(|c| c.contribution > 0.0);

    // sort_by is stable
    increasing.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
    reducing.sort_by(|a, b| a.contribution.total_cmp(&b.contribution));

    increasing.truncate(MAX_STRUCTURED_DRIVERS);
    reducing.truncate(MAX_STRUCTURED_DRIVERS);

    StructuredExplanation {
        base_value: attribution.base_value,
        prediction_probability: predicted_probability,
        top_risk_increasing: increasing,
        top_risk_reducing: reducing,
    }
}

fn driver_labels(drivers: &[FeatureContribution]) -> Vec<&str> {
    drivers
        .iter()
        .take(MAX_NARRATIVE_DRIVERS)
        .map(|c| map_feature_name(&c.feature))
        .collect()
}

/// Render the fixed narrative template.
pub fn to_text(structured: &StructuredExplanation) -> TextExplanation {
    let band = narrative_risk_band(structured.prediction_probability);

    let increasing = driver_labels(&structured.top_risk_increasing);
    let reducing = driver_labels(&structured.top_risk_reducing);

    let increase_sentence = if increasing.is_empty() {
        "No significant risk-increasing factors were identified.".to_string()
    } else {
        format!(
            "The default risk is primarily driven by {}.",
            increasing.join(", ")
        )
    };

    let reduce_sentence = if reducing.is_empty() {
        "No significant risk-reducing factors were identified.".to_string()
    } else {
        format!(
            "The risk is partially mitigated by {}.",
            reducing.join(", ")
        )
    };

    TextExplanation(format!(
        "\nThe applicant is categorized as {band}.\n\
         The predicted probability of default is {probability:.2}.\n\
         \n\
         {increase_sentence}\n\
         \n\
         {reduce_sentence}\n\
         \n\
         Overall, the decision is based on additive contributions of financial capacity \
         indicators, credit exposure metrics, and stability-related factors.\n",
        probability = structured.prediction_probability,
    ))
}

/// Render text from an untyped structured explanation (e.g. one received as
/// JSON). Fails with `MissingField` if any required key is absent.
pub fn text_from_json(structured: &serde_json::Value) -> RiskResult<TextExplanation> {
    let object = structured.as_object().ok_or_else(|| {
        RiskError::validation("structured_explanation", "expected a JSON object")
    })?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|key| !object.contains_key(**key)) {
        return Err(RiskError::missing_field(*missing));
    }

    let parsed: StructuredExplanation = serde_json::from_value(structured.clone())
        .map_err(|e| RiskError::serialization("structured_explanation", e))?;
    Ok(to_text(&parsed))
}
