// tests/end_to_end.rs
// Artifacts on disk → config → engine → CLI command output.

use std::fs;
use std::path::Path;

use loan_risk_explainer::cli::{run_command, Commands};
use loan_risk_explainer::config_loader::load_config_from;
use loan_risk_explainer::ExplanationEngine;
use serde_json::Value;
use tempfile::TempDir;

const SCHEMA: &str = r#"["CREDIT_TO_INCOME", "ANNUITY_TO_INCOME", "AGE_YEARS", "EMPLOYMENT_YEARS", "EXT_SOURCE_2"]"#;
const MODEL: &str = r#"{
    "model_id": "logreg_locked",
    "intercept": -1.0,
    "coefficients": [0.6, 2.0, -0.02, -0.05, -1.2],
    "threshold": 0.42
}"#;
const APPLICANT: &str = r#"{
    "CREDIT_TO_INCOME": 3.0,
    "ANNUITY_TO_INCOME": 0.25,
    "AGE_YEARS": 28.0,
    "EMPLOYMENT_YEARS": 1.5
}"#;

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path.to_string_lossy().into_owned()
}

fn setup() -> (TempDir, ExplanationEngine, String) {
    let dir = TempDir::new().expect("temp dir");
    let schema_path = write(dir.path(), "feature_names.json", SCHEMA);
    let model_path = write(dir.path(), "model.json", MODEL);
    let applicant_path = write(dir.path(), "applicant.json", APPLICANT);
    let config_path = write(
        dir.path(),
        "loanrisk.toml",
        &format!("model_path = {model_path:?}\nfeature_names_path = {schema_path:?}\n"),
    );

    let config = load_config_from(&config_path).expect("config loads");
    let engine = ExplanationEngine::from_config(&config).expect("engine builds");
    (dir, engine, applicant_path)
}

#[test]
fn check_reports_loaded_model() {
    let (_dir, engine, _) = setup();
    let out: Value = serde_json::from_str(&run_command(&Commands::Check, &engine).unwrap()).unwrap();

    assert_eq!(out["model_id"], "logreg_locked");
    assert_eq!(out["n_features"], 5);
    assert_eq!(out["base_value"], -1.0);
}

#[test]
fn predict_command_outputs_probability_and_band() {
    let (_dir, engine, applicant) = setup();
    let out: Value = serde_json::from_str(
        &run_command(&Commands::Predict { input: applicant }, &engine).unwrap(),
    )
    .unwrap();

    // raw = -1.0 + 1.8 + 0.5 - 0.56 - 0.075 = 0.665
    let probability = out["probability"].as_f64().unwrap();
    assert!((probability - 1.0 / (1.0 + (-0.665f64).exp())).abs() < 1e-9);
    assert_eq!(out["risk_category"], "High Risk");
    assert_eq!(out["predicted_default"], true);
}

#[test]
fn explain_command_outputs_full_payload() {
    let (_dir, engine, applicant) = setup();
    let out: Value = serde_json::from_str(
        &run_command(
            &Commands::Explain {
                input: applicant,
                text: false,
            },
            &engine,
        )
        .unwrap(),
    )
    .unwrap();

    assert_eq!(out["base_value"], -1.0);
    assert_eq!(out["top_risk_increasing_features"][0]["feature"], "CREDIT_TO_INCOME");
    assert_eq!(out["top_risk_increasing_features"][1]["feature"], "ANNUITY_TO_INCOME");
    assert_eq!(out["top_risk_reducing_features"][0]["feature"], "AGE_YEARS");
    let text = out["text_explanation"].as_str().unwrap();
    assert!(text.contains("categorized as High Risk."));
    assert!(text.contains("The predicted probability of default is 0.66."));
}

#[test]
fn explain_text_only() {
    let (_dir, engine, applicant) = setup();
    let out = run_command(
        &Commands::Explain {
            input: applicant,
            text: true,
        },
        &engine,
    )
    .unwrap();

    assert!(out.starts_with("\nThe applicant is categorized as"));
    assert!(out.contains("credit-to-income ratio, annuity burden"));
}

#[test]
fn importance_command_ranks_batch() {
    let (dir, engine, _) = setup();
    let batch = write(
        dir.path(),
        "batch.json",
        r#"[{"CREDIT_TO_INCOME": 2.0, "EXT_SOURCE_2": 0.5}, {"CREDIT_TO_INCOME": 4.0, "AGE_YEARS": 30.0}]"#,
    );

    let out: Value = serde_json::from_str(
        &run_command(&Commands::Importance { input: batch, top: 2 }, &engine).unwrap(),
    )
    .unwrap();

    let ranked = out.as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["feature"], "CREDIT_TO_INCOME");
}

#[test]
fn importance_rejects_unknown_feature() {
    let (dir, engine, _) = setup();
    let batch = write(dir.path(), "batch.json", r#"[{"NOT_IN_SCHEMA": 1.0}]"#);

    let err = run_command(&Commands::Importance { input: batch, top: 5 }, &engine).unwrap_err();
    assert!(err.to_string().contains("Unknown feature"));
}

#[test]
fn schema_model_mismatch_fails_at_startup() {
    let dir = TempDir::new().unwrap();
    let schema_path = write(dir.path(), "feature_names.json", r#"["A", "B"]"#);
    let model_path = write(dir.path(), "model.json", MODEL);
    let config_path = write(
        dir.path(),
        "loanrisk.toml",
        &format!("model_path = {model_path:?}\nfeature_names_path = {schema_path:?}\n"),
    );

    let config = load_config_from(&config_path).unwrap();
    let err = match ExplanationEngine::from_config(&config) {
        Ok(_) => panic!("engine should not build"),
        Err(e) => e,
    };
    assert!(err.to_string().contains("Model incompatible"));
}
