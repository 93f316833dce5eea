//! farsisub - SRT translation into Persian with right-to-left repair
//!
//! Reads subtitles from an input directory, translates them chunk by chunk
//! through a text-generation API and writes bidi-safe SRT files.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use farsisub::cli::{Args, Commands};
use farsisub::config::{resolve_api_key, Config, Overrides};
use farsisub::translate::TranslatorFactory;
use farsisub::workflow::{fix_rtl_file, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    let _guard = setup_logging(args.verbose)?;

    info!("Starting farsisub");

    // Pick up GEMINI_API_KEY and friends from .env
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    let mut config = Config::load(args.config.as_deref())?;
    let command = args.command.unwrap_or(Commands::Translate {
        input_dir: None,
        output_dir: None,
        chunk_size: None,
    });

    match command {
        Commands::Translate { input_dir, output_dir, chunk_size } => {
            config.apply_overrides(Overrides {
                model: args.model,
                input_dir,
                output_dir,
                chunk_size,
            });
            let api_key = resolve_api_key(args.api_key.as_deref())?;
            let translator = TranslatorFactory::create_translator(config.translate.clone(), api_key)?;
            let workflow = Workflow::new(config, translator).await?;

            let summary = workflow.process_directory().await?;
            if !summary.failed.is_empty() {
                info!("Files that could not be translated: {:?}", summary.failed);
            }
        }

        Commands::File { input, output, chunk_size } => {
            config.apply_overrides(Overrides {
                model: args.model,
                chunk_size,
                ..Default::default()
            });
            let output = match output {
                Some(path) => path,
                None => {
                    let file_name = input
                        .file_name()
                        .ok_or_else(|| anyhow::anyhow!("Invalid input filename: {}", input.display()))?;
                    config.paths.output_dir.join(file_name)
                }
            };

            let api_key = resolve_api_key(args.api_key.as_deref())?;
            let translator = TranslatorFactory::create_translator(config.translate.clone(), api_key)?;
            let workflow = Workflow::new(config, translator).await?;

            let report = workflow.process_file(&input, &output).await?;
            info!(
                "Done: {}/{} chunks translated, {} failed",
                report.translated_chunks, report.chunks, report.failed_chunks
            );
        }

        Commands::FixRtl { input, output } => {
            let output = output.unwrap_or_else(|| input.clone());
            fix_rtl_file(&input, &output, config.output.write_bom).await?;
        }

        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            info!("Default configuration written to {}", output.display());
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".farsisub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "farsisub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(guard)
}
