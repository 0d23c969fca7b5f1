mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use tokio::sync::broadcast::error::RecvError;

use docflow::config::load_config_or_default;
use docflow::pipeline::stage::UnknownStage;
use docflow::{Pipeline, PipelineConfig, PipelineEventKind, Stage};

/// Extensions the upload control accepts.
const ACCEPTED_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "docflow-demo", version, about = "Animated document pipeline demo")]
struct Cli {
    /// Path to a config file (defaults to <config dir>/docflow/config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Name of the document to "upload"; the file is never read
    #[arg(long, default_value = "document.pdf", value_parser = parse_file_name)]
    file: String,

    /// Divide every stage duration by this factor
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Stage to display once the run has completed
    #[arg(long, value_name = "STAGE", value_parser = parse_stage)]
    show: Option<Stage>,

    /// Print the final pipeline snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn parse_file_name(value: &str) -> Result<String, String> {
    let extension = Path::new(value)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(value.to_string()),
        _ => Err(format!(
            "unsupported file type, expected one of: .{}",
            ACCEPTED_EXTENSIONS.join(", .")
        )),
    }
}

fn parse_stage(value: &str) -> Result<Stage, UnknownStage> {
    value.parse()
}

fn init_logging(format: LogFormat) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::{fmt, EnvFilter, Registry};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Text => {
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().with_target(false));
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = Registry::default().with(filter).with(fmt::layer().json());
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    // Library code logs through the `log` facade.
    tracing_log::LogTracer::init()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    if !(cli.speed.is_finite() && cli.speed > 0.0) {
        bail!("--speed must be a positive number, got {}", cli.speed);
    }

    let mut config =
        load_config_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.speed != 1.0 {
        config.timing = config.timing.scaled(cli.speed);
        config
            .timing
            .validate()
            .with_context(|| format!("Timings scaled by {} are not usable", cli.speed))?;
    }

    let pipeline_config = Arc::new(PipelineConfig::from_config(&config));
    let (pipeline, broadcaster) = Pipeline::with_broadcaster(pipeline_config);
    let mut events = broadcaster.subscribe();

    info!("Starting docflow demo v{}", env!("CARGO_PKG_VERSION"));
    pipeline.start(&cli.file)?;

    loop {
        let event = tokio::select! {
            received = events.recv() => received,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, resetting pipeline");
                pipeline.reset();
                return Ok(());
            }
        };

        let event = match event {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!("Missed {} pipeline events", skipped);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        let snapshot = pipeline.snapshot();
        match event.kind {
            PipelineEventKind::StageStarted => {
                println!(
                    "{}\n  {}",
                    render::render_badges(event.stage, &snapshot.run.completed_stages),
                    event.message
                );
            }
            PipelineEventKind::RunCompleted => {
                println!(
                    "{}",
                    render::render_badges(Stage::Complete, &event.completed_stages)
                );
                if event.results_visible {
                    if let Some(extraction) = snapshot.results.extraction.as_ref() {
                        println!("\n{}", render::render_extraction(extraction)?);
                    }
                }
                if let Some(stage) = cli.show {
                    pipeline.select_stage(stage)?;
                    let shown = pipeline.snapshot();
                    println!(
                        "\nShowing {}\n{}",
                        shown.run.current_stage.label(),
                        render::render_badges(shown.run.current_stage, &shown.run.completed_stages)
                    );
                }
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&pipeline.snapshot())?);
                }
                break;
            }
            PipelineEventKind::RunFailed => {
                let error = event.error.unwrap_or_else(|| "unknown error".to_string());
                pipeline.reset();
                bail!("Pipeline failed at stage '{}': {}", event.stage, error);
            }
            PipelineEventKind::RunReset => break,
            PipelineEventKind::RunStarted | PipelineEventKind::StageCompleted => {}
        }
    }

    pipeline.wait().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_upload_extensions() {
        for name in ["report.pdf", "notes.TXT", "letter.doc", "a/b/form.Docx"] {
            assert_eq!(parse_file_name(name).unwrap(), name);
        }
    }

    #[test]
    fn test_rejects_other_extensions() {
        assert!(parse_file_name("photo.png").is_err());
        assert!(parse_file_name("README").is_err());
        assert!(parse_file_name("archive.pdf.zip").is_err());
    }

    #[test]
    fn test_cli_rejects_unsupported_file() {
        let err = Cli::try_parse_from(["docflow-demo", "--file", "image.jpg"]).unwrap_err();
        assert!(err.to_string().contains("unsupported file type"));
    }

    #[test]
    fn test_cli_parses_show_stage() {
        let cli = Cli::try_parse_from(["docflow-demo", "--show", "Classify"]).unwrap();
        assert_eq!(cli.show, Some(Stage::Classify));
        assert_eq!(cli.file, "document.pdf");

        let err = Cli::try_parse_from(["docflow-demo", "--show", "archive"]).unwrap_err();
        assert!(err.to_string().contains("unknown stage 'archive'"));
    }

    #[tokio::test]
    async fn test_show_stage_after_completed_run() {
        let mut config = docflow::Config::default();
        config.timing = config.timing.scaled(1000.0);
        config.timing.validate().unwrap();

        let pipeline_config = Arc::new(PipelineConfig::from_config(&config));
        let (pipeline, _broadcaster) = Pipeline::with_broadcaster(pipeline_config);
        pipeline.start("report.pdf").unwrap();
        pipeline.wait().await;

        pipeline.select_stage(Stage::Classify).unwrap();
        let snapshot = pipeline.snapshot();
        assert_eq!(snapshot.run.current_stage, Stage::Classify);
        assert_eq!(snapshot.run.completed_stages.len(), 5);
    }
}
