//! Feature schema and per-request feature vectors.

use crate::errors::{RiskError, RiskResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered, immutable list of feature names shared with the model's
/// training-time column order.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> RiskResult<Self> {
        if names.is_empty() {
            return Err(RiskError::config("feature schema is empty"));
        }

        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(RiskError::config(format!(
                    "duplicate feature name in schema: {name}"
                )));
            }
        }

        Ok(Self { names, index })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// Feature values in schema order, one per request.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build from raw values already in schema order.
    pub fn from_values(schema: &FeatureSchema, values: Vec<f64>) -> RiskResult<Self> {
        if values.len() != schema.len() {
            return Err(RiskError::dimension_mismatch(schema.len(), values.len()));
        }
        Ok(Self {
            names: schema.names().to_vec(),
            values,
        })
    }

    /// Build from named values; every schema feature not supplied stays 0.
    pub fn from_named<'a, I>(schema: &FeatureSchema, named: I) -> RiskResult<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut values = vec![0.0; schema.len()];
        for (name, value) in named {
            let pos = schema
                .position(name)
                .ok_or_else(|| RiskError::unknown_feature(name))?;
            values[pos] = value;
        }
        Ok(Self {
            names: schema.names().to_vec(),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Applicant record accepted by the serving layer. Only these four engineered
/// ratios are supplied by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantData {
    #[serde(rename = "CREDIT_TO_INCOME")]
    pub credit_to_income: f64,
    #[serde(rename = "ANNUITY_TO_INCOME")]
    pub annuity_to_income: f64,
    #[serde(rename = "AGE_YEARS")]
    pub age_years: f64,
    #[serde(rename = "EMPLOYMENT_YEARS")]
    pub employment_years: f64,
}

impl ApplicantData {
    pub fn named_values(&self) -> [(&'static str, f64); 4] {
        [
            ("CREDIT_TO_INCOME", self.credit_to_income),
            ("ANNUITY_TO_INCOME", self.annuity_to_income),
            ("AGE_YEARS", self.age_years),
            ("EMPLOYMENT_YEARS", self.employment_years),
        ]
    }

    /// Expand into the full schema-length vector. Supplied fields missing from
    /// the schema are skipped, matching how the deployed model ignores them.
    pub fn to_feature_vector(&self, schema: &FeatureSchema) -> RiskResult<FeatureVector> {
        let known = self
            .named_values()
            .into_iter()
            .filter(|(name, _)| {
                let present = schema.position(name).is_some();
                if !present {
                    tracing::warn!("Applicant field {} not in feature schema; ignored", name);
                }
                present
            });
        FeatureVector::from_named(schema, known)
    }
}
