//! Library root for the `loan-risk-explainer` crate
//!
//! Pipeline: feature vector → attribution (base value + per-feature
//! contributions) → structured, ranked explanation → narrative text.

// Core error handling
pub mod errors;

// Features, model and attribution
pub mod features;
pub mod risk_linear;
pub mod attribution;

// Ranking and narrative text
pub mod narrative;

// Configuration & artifact loading
pub mod config_loader;
pub mod artifact;

// Serving entry point
pub mod engine;

// CLI
pub mod cli;


pub use attribution::{explain, AttributionResult, Attributor, Baseline, FeatureContribution, LinearExplainer};
pub use engine::{ExplanationEngine, ExplanationResponse, Prediction};
pub use errors::{RiskError, RiskResult};
pub use features::{ApplicantData, FeatureSchema, FeatureVector};
pub use narrative::{
    coarse_risk_band, narrative_risk_band, to_structured, to_text, StructuredExplanation,
    TextExplanation,
};
pub use risk_linear::{LogisticModel, LogisticWeights, RiskModel};
