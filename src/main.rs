use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubescribe::batch::{self, BatchOptions};
use tubescribe::cli::{Cli, Commands, LogFormat};
use tubescribe::config::Config;
use tubescribe::transcribe::TranscriptionPipeline;
use tubescribe::{output, server, utils};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet, cli.log_format);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            if let Some(err) = e.downcast_ref::<tubescribe::TranscriptorError>() {
                eprintln!("  {}", err.hint());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool, format: LogFormat) {
    let default_filter = if verbose {
        "tubescribe=debug"
    } else if quiet {
        "warn"
    } else {
        "tubescribe=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with((format == LogFormat::Json).then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((format == LogFormat::Text).then(|| {
            tracing_subscriber::fmt::layer().with_writer(std::io::stderr)
        }))
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Transcribe {
            url,
            output,
            format,
            no_metadata,
        } => {
            let include_metadata = config.metadata.enabled && !no_metadata;
            if include_metadata {
                warn_missing_dependencies(&config).await;
            }

            let pipeline = TranscriptionPipeline::new(&config)?;

            let progress = (!cli.quiet).then(|| spinner("Fetching transcript..."));
            let result = pipeline.transcribe(&url, include_metadata).await;
            if let Some(progress) = &progress {
                progress.finish_and_clear();
            }
            let result = result?;

            match output {
                Some(path) => {
                    let path = if path == Path::new("auto") {
                        output::auto_output_path(Path::new("."), &result, format)
                    } else {
                        path
                    };
                    output::save_to_file(&result, &path, format).await?;
                    if !cli.quiet {
                        eprintln!("Transcript saved to: {}", path.display());
                    }
                }
                None => {
                    output::print_to_console(&result, format)?;
                }
            }

            Ok(ExitCode::SUCCESS)
        }
        Commands::Batch {
            file,
            output_dir,
            format,
            no_metadata,
        } => {
            let inputs = batch::read_batch_file(&file)?;

            let include_metadata = config.metadata.enabled && !no_metadata;
            if include_metadata {
                warn_missing_dependencies(&config).await;
            }

            let pipeline = TranscriptionPipeline::new(&config)?;
            let options = BatchOptions {
                output_dir,
                format,
                include_metadata,
                quiet: cli.quiet,
            };

            tracing::info!("Processing {} input(s) from {}", inputs.len(), file.display());
            let report = batch::run_batch(&pipeline, &inputs, &options).await?;
            report.print_summary();

            Ok(if report.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Serve { host, port } => {
            let mut settings = config.server.clone();
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }

            if config.metadata.enabled {
                warn_missing_dependencies(&config).await;
            }

            let pipeline = TranscriptionPipeline::new(&config)?;
            server::serve(&settings, pipeline).await?;

            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { show } => {
            match &cli.config {
                Some(path) => println!("Config file: {}", path.display()),
                None => println!("Config file: {}", Config::config_path()?.display()),
            }
            if show {
                config.display();
            } else {
                println!("Edit the file above to change settings, or run with --show to print them.");
            }

            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Metadata lookups need yt-dlp; warn early but keep going without it
async fn warn_missing_dependencies(config: &Config) {
    let missing = utils::check_dependencies(&config.metadata.yt_dlp_path).await;
    if !missing.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing without metadata)");
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
