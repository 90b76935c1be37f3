use std::collections::HashMap;
use std::io::Read;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::engine::ExplanationEngine;
use crate::features::{ApplicantData, FeatureVector};

/// Top-level CLI interface
#[derive(Parser, Debug)]
#[command(
    name = "loanrisk",
    version,
    about = "Loan default risk prediction with per-feature explanations"
)]
pub struct Cli {
    /// Configuration file (defaults to ./loanrisk.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict default probability for an applicant JSON record
    Predict {
        /// Applicant JSON file, or `-` for stdin
        #[arg(short, long)]
        input: String,
    },

    /// Explain a prediction: ranked drivers plus narrative text
    Explain {
        #[arg(short, long)]
        input: String,
        /// Print only the narrative paragraph
        #[arg(long)]
        text: bool,
    },

    /// Rank features by mean absolute contribution over a batch of
    /// `{feature: value}` records
    Importance {
        #[arg(short, long)]
        input: String,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Load artifacts and report model status
    Check,
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
    }
}

fn parse_applicant(raw: &str) -> anyhow::Result<ApplicantData> {
    serde_json::from_str(raw).context("invalid applicant JSON")
}

/// Execute one command and return what should be printed.
pub fn run_command(command: &Commands, engine: &ExplanationEngine) -> anyhow::Result<String> {
    match command {
        Commands::Predict { input } => {
            let applicant = parse_applicant(&read_input(input)?)?;
            let prediction = engine.predict_applicant(&applicant)?;
            Ok(serde_json::to_string_pretty(&prediction)?)
        }
        Commands::Explain { input, text } => {
            let applicant = parse_applicant(&read_input(input)?)?;
            let response = engine.explain_applicant(&applicant)?;
            if *text {
                Ok(response.text_explanation.into_string())
            } else {
                Ok(serde_json::to_string_pretty(&response)?)
            }
        }
        Commands::Importance { input, top } => {
            let records: Vec<HashMap<String, f64>> =
                serde_json::from_str(&read_input(input)?).context("invalid batch JSON")?;
            let batch = records
                .iter()
                .map(|record| {
                    FeatureVector::from_named(
                        engine.schema(),
                        record.iter().map(|(name, value)| (name.as_str(), *value)),
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;

            let mut ranked = engine.importance(&batch)?;
            ranked.truncate(*top);
            Ok(serde_json::to_string_pretty(&ranked)?)
        }
        Commands::Check => Ok(serde_json::to_string_pretty(&engine.status())?),
    }
}
