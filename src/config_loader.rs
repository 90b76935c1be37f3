use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{RiskError, RiskResult};

pub const DEFAULT_CONFIG_FILE: &str = "loanrisk.toml";
pub const ENV_PREFIX: &str = "LOANRISK_";

/// Startup configuration. Loaded once and never mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RiskConfig {
    /// JSON model artifact (intercept, coefficients, threshold)
    pub model_path: String,
    /// JSON array of feature names in training order
    pub feature_names_path: String,
    /// Optional JSON array of reference values; all-zero when unset
    #[serde(default)]
    pub baseline_path: Option<String>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "loan_risk_explainer=info".to_string()
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            model_path: "models/final_model.json".to_string(),
            feature_names_path: "models/feature_names.json".to_string(),
            baseline_path: None,
            log_filter: default_log_filter(),
        }
    }
}

impl RiskConfig {
    fn validate(&self) -> RiskResult<()> {
        if self.model_path.trim().is_empty() {
            return Err(RiskError::config("model_path cannot be empty"));
        }
        if self.feature_names_path.trim().is_empty() {
            return Err(RiskError::config("feature_names_path cannot be empty"));
        }
        if let Some(path) = &self.baseline_path {
            if path.trim().is_empty() {
                return Err(RiskError::config("baseline_path cannot be empty when set"));
            }
        }
        Ok(())
    }
}

/// Defaults, then `loanrisk.toml`, then `LOANRISK_*` environment variables.
pub fn load_config() -> RiskResult<RiskConfig> {
    load_config_from(DEFAULT_CONFIG_FILE)
}

pub fn load_config_from<P: AsRef<Path>>(path: P) -> RiskResult<RiskConfig> {
    let figment = Figment::from(Serialized::defaults(RiskConfig::default()))
        .merge(Toml::file(path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX));

    let config: RiskConfig = figment.extract()?;
    config.validate()?;

    Ok(config)
}
