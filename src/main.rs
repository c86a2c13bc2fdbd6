use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use aave_credit_scorer::config::Config;
use aave_credit_scorer::ingest::loader::read_records;
use aave_credit_scorer::pipeline::CreditPipeline;
use aave_credit_scorer::report::export::{write_scores_csv, write_summary_json};
use aave_credit_scorer::report::markdown::write_markdown;
use aave_credit_scorer::report::summary::summarize;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=debug to see skipped records)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration; an absent default config means built-in defaults
    let config_arg = std::env::args().nth(1);
    let config = match config_arg.as_deref() {
        Some(path) => Config::load(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)?,
        None => {
            tracing::info!("No {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
            Config::default()
        }
    };

    tracing::info!(input = %config.input.path, "Loading transaction records");
    let records = read_records(Path::new(&config.input.path))?;

    tracing::info!(records = records.len(), "Calculating credit scores");
    let pipeline = CreditPipeline::new(&config);
    let run = pipeline.run(records);

    tracing::info!("Generating analysis report");
    let output_dir = PathBuf::from(&config.report.output_dir);
    std::fs::create_dir_all(&output_dir).map_err(|e| {
        eyre::eyre!(
            "Failed to create output directory '{}': {}",
            output_dir.display(),
            e
        )
    })?;

    let summary = summarize(&run);
    let markdown_path = output_dir.join(&config.report.markdown_file);
    write_markdown(&markdown_path, &summary, pipeline.scorer.config())?;

    let csv_path = output_dir.join(&config.report.scores_csv);
    write_scores_csv(&csv_path, &run)?;

    if let Some(ref json_file) = config.report.summary_json {
        write_summary_json(&output_dir.join(json_file), &summary)?;
    }

    tracing::info!(
        wallets = run.scores.len(),
        transactions = run.transactions,
        skipped = run.skipped.len(),
        report = %markdown_path.display(),
        scores = %csv_path.display(),
        "Analysis complete"
    );
    Ok(())
}
