//! Command-line driver for the cardiovascular risk questionnaire.
//!
//! Usage:
//!   cargo run -- run --answers demos/answers.json
//!   cargo run -- run --answers demos/answers.json --dry-run
//!   cargo run -- model-info

use anyhow::{Context, Result};
use cardio_intake::config::{Config, RuntimeConfig};
use cardio_intake::{
    FeaturePipeline, FormSession, PredictionClient, Questionnaire,
    StaticFormSource, StepAction, SubmissionOutcome, submit,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cardio-intake")]
#[command(about = "Cardiovascular risk questionnaire client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a questionnaire from an answers file and request a prediction
    Run {
        /// JSON answers file, keyed by step number then field name
        #[arg(long)]
        answers: PathBuf,
        /// Print the feature vector without contacting the backend
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the backend's declared features and compare them with the configured contract
    ModelInfo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let runtime = RuntimeConfig::load_from_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&runtime.log_level))
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Run { answers, dry_run } => run(&config, &answers, dry_run).await,
        Commands::ModelInfo => model_info(&config).await,
    }
}

async fn run(config: &Config, answers: &Path, dry_run: bool) -> Result<()> {
    let source = StaticFormSource::from_path(answers)?;
    let pipeline = FeaturePipeline::from_config(&config.features);
    let mut session = FormSession::new(Arc::new(Questionnaire::cardio()));

    loop {
        let view = session.view();
        println!("[{:>3.0}%] {}", view.progress * 100.0, view.title);
        if view.action == StepAction::FinalSubmit {
            break;
        }
        session.proceed(&source)?;
    }

    if dry_run {
        let features = session.begin_submission(&source, &pipeline)?;
        println!("{}", serde_json::to_string_pretty(&features)?);
        return Ok(());
    }

    let client = PredictionClient::new(&config.backend)?;
    info!(url = client.predict_url(), "submitting assessment");
    match submit(&mut session, &source, &pipeline, &client).await? {
        SubmissionOutcome::Completed(report) => {
            println!("[100%] {}", session.view().title);
            println!("{}", report);
            Ok(())
        }
        SubmissionOutcome::ValidationFailed { step, fields } => anyhow::bail!(
            "Step {} is missing required fields: {}",
            step,
            fields.join(", ")
        ),
        SubmissionOutcome::TransportFailed { message } => {
            anyhow::bail!("Prediction failed: {}", message)
        }
    }
}

async fn model_info(config: &Config) -> Result<()> {
    let client = PredictionClient::new(&config.backend)?;
    let info = client.model_info().await?;
    println!("{}", serde_json::to_string_pretty(&info)?);

    let pipeline = FeaturePipeline::from_config(&config.features);
    let contract = pipeline.contract();
    let gaps = PredictionClient::contract_gaps(contract, &info);
    if gaps.is_empty() {
        println!("Contract {} matches the backend feature list", contract.version);
    } else {
        println!(
            "Contract {} sends features the backend does not list: {}",
            contract.version,
            gaps.join(", ")
        );
    }
    Ok(())
}
