//! indexbench - ingestion scaling benchmark for a Meilisearch-compatible service.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use indexbench::commands;
use indexbench::config::{BenchConfig, CliArgs, Command};
use indexbench::BenchError;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "indexbench=info,indexbench_harness=info,indexbench_search_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    info!("Starting indexbench v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = dispatch(&args).await {
        error!("{:#}", err);
        let code = err
            .downcast_ref::<BenchError>()
            .map_or(1, BenchError::exit_code);
        std::process::exit(code);
    }
}

async fn dispatch(args: &CliArgs) -> Result<()> {
    match &args.command {
        Command::Run(run) => {
            let config = BenchConfig::load(args.config.as_deref(), run)?;
            commands::run(&config).await?;
        }
        Command::Split(split) => {
            commands::split(split)?;
        }
    }
    Ok(())
}
