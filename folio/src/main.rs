mod config;
mod logging;
mod telemetry;

use clap::{Args, Parser};
use config::{Config, ConfigError};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(version, about = "Portfolio backend")]
enum CliCommand {
    /// Serve the pinned project listing.
    Showcase(CliArgs),
}

#[derive(Args)]
struct CliArgs {
    #[arg(long)]
    config_file_path: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Metrics(#[from] telemetry::MetricsError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Showcase(#[from] showcase::ShowcaseError),
}

fn main() {
    let cli = CliCommand::parse();

    let result = match cli {
        CliCommand::Showcase(args) => run_showcase(args),
    };

    if let Err(err) = result {
        tracing::error!(error = %err, "exiting");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run_showcase(args: CliArgs) -> Result<(), CliError> {
    let config = Config::load(args.config_file_path.as_deref())?;

    let logging_config = config.common.logging.clone().unwrap_or_default();
    let _sentry = logging::init(&logging_config);

    if let Some(metrics_config) = &config.common.metrics {
        telemetry::init(metrics_config)?;
    }

    let showcase_config = config.showcase_with_env(|key| std::env::var(key).ok())?;

    tracing::info!("starting showcase");
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(showcase::run(showcase_config))?;
    Ok(())
}
