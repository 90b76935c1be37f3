use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::attribution::Baseline;
use crate::config_loader::RiskConfig;
use crate::errors::{RiskError, RiskResult};
use crate::features::FeatureSchema;
use crate::risk_linear::{LogisticModel, LogisticWeights, RiskModel};

/// Everything loaded from disk at startup.
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub schema: FeatureSchema,
    pub model: LogisticModel,
    pub baseline: Baseline,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> RiskResult<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| RiskError::io(format!("reading {what} {}", path.display()), e))?;
    serde_json::from_str(&content)
        .map_err(|e| RiskError::serialization(format!("parsing {what} {}", path.display()), e))
}

pub fn load_schema(path: &Path) -> RiskResult<FeatureSchema> {
    let names: Vec<String> = read_json(path, "feature schema")?;
    FeatureSchema::new(names)
}

/// Load a logistic model and check it was fitted on `schema`.
pub fn load_model(path: &Path, schema: &FeatureSchema) -> RiskResult<LogisticModel> {
    let weights: LogisticWeights = read_json(path, "model artifact")?;
    let model = LogisticModel::new(weights);

    if model.n_features() != schema.len() {
        return Err(RiskError::model_incompatible(format!(
            "model '{}' has {} coefficients but the feature schema has {} entries",
            model.model_id(),
            model.n_features(),
            schema.len()
        )));
    }
    if !(0.0..=1.0).contains(&model.decision_threshold()) {
        return Err(RiskError::validation(
            "threshold",
            format!("{} is outside [0, 1]", model.decision_threshold()),
        ));
    }

    Ok(model)
}

pub fn load_baseline(path: Option<&Path>, schema: &FeatureSchema) -> RiskResult<Baseline> {
    match path {
        Some(path) => {
            let values: Vec<f64> = read_json(path, "baseline")?;
            Baseline::from_values(schema, values)
        }
        None => Ok(Baseline::zeros(schema.len())),
    }
}

pub fn load_artifacts(config: &RiskConfig) -> RiskResult<LoadedArtifacts> {
    let schema = load_schema(Path::new(&config.feature_names_path))?;
    let model = load_model(Path::new(&config.model_path), &schema)?;
    let baseline = load_baseline(config.baseline_path.as_deref().map(Path::new), &schema)?;

    info!(
        "Loaded model '{}' with {} features (baseline: {})",
        model.model_id(),
        schema.len(),
        config.baseline_path.as_deref().unwrap_or("zeros")
    );

    Ok(LoadedArtifacts {
        schema,
        model,
        baseline,
    })
}
