//! `stageload` -- bulk-load the Olist CSV exports into PostgreSQL.
//!
//! Recreates each dataset's namespace (unless `--skip-schema`), then lands
//! every file through COPY and resolves declared data-quality defects while
//! promoting rows into the destination tables. Datasets run one after the
//! other because the marketing funnel references e-commerce sellers.
//!
//! See [`stageload_cli::config::Args`] for flags and environment variables.

use anyhow::Context;
use clap::Parser;
use stageload_cli::config::Args;
use stageload_cli::report;
use stageload_db::{run_dataset, run_with_schema};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stageload=info,stageload_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args).await {
        tracing::error!("Error during data loading: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let params = args.connection_params();

    tracing::info!(
        server = %params,
        data_dir = %args.data_dir.display(),
        skip_schema = args.skip_schema,
        "Starting stageload",
    );

    let mut reports = Vec::new();
    for choice in args.selected() {
        let descriptor = choice
            .descriptor()
            .with_context(|| format!("Invalid descriptor for {choice:?}"))?;

        let report = if args.skip_schema {
            run_dataset(&descriptor, &args.data_dir, &params).await
        } else {
            run_with_schema(&descriptor, choice.schema_script(), &args.data_dir, &params).await
        }
        .context("Data loading failed")?;

        reports.push(report);
    }

    if args.json {
        println!("{}", report::to_json(&reports)?);
    } else {
        for r in &reports {
            print!("{}", report::render_text(r));
        }
    }
    tracing::info!("Data loading completed successfully!");

    Ok(())
}
