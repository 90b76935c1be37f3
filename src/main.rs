// loanrisk - main.rs
// Loads configuration and artifacts once, then runs a single CLI command.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use loan_risk_explainer::cli::{run_command, Cli};
use loan_risk_explainer::config_loader::{load_config, load_config_from};
use loan_risk_explainer::engine::ExplanationEngine;

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("failed to load configuration")?;

    init_tracing(&config.log_filter);

    let engine =
        ExplanationEngine::from_config(&config).context("failed to load model artifacts")?;

    let output = run_command(&cli.command, &engine)?;
    println!("{output}");

    Ok(())
}
