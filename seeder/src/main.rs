use anyhow::Context;
use clap::{Parser, ValueEnum};
use common::config::AppConfig;
use common::logger::init_logging;
use seeder::config::SeedConfig;
use seeder::fixture::DynamoTableWriter;
use seeder::runner;
use seeder::transport::{ApiClient, ReqwestTransport};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Seeds the tasmai API or DynamoDB tables with synthetic data")]
struct Cli {
    /// Extra .env file loaded before the process environment is read.
    #[arg(long)]
    env_file: Option<PathBuf>,

    #[arg(value_enum)]
    mode: Mode,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Mode {
    /// Sign up teachers and students and create everything through the API.
    Api,
    /// Log existing teachers in and continue with batches and enrolments.
    Resume,
    /// Write the fixture JSON files without touching the network.
    Generate,
    /// Bulk-load fixture JSON files into DynamoDB.
    Load,
}

fn api_client(app: &AppConfig, cfg: &SeedConfig) -> anyhow::Result<ApiClient<ReqwestTransport>> {
    let transport = ReqwestTransport::new(&app.api_base, Duration::from_secs(app.request_timeout_secs))
        .context("building HTTP client")?;
    Ok(ApiClient::new(transport, cfg.retry.clone()).with_login_path(cfg.paths.teacher_login.clone()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.env_file {
        dotenvy::from_path(path).with_context(|| format!("loading {}", path.display()))?;
    }

    let app = AppConfig::global();
    let _log_guard = init_logging(&app.log_file, &app.log_level, app.log_to_stdout);
    let cfg = SeedConfig::from_env();

    info!("Starting {} ({}) in {:?} mode", app.project_name, app.env, cli.mode);

    match cli.mode {
        Mode::Api => {
            runner::run_api(&api_client(&app, &cfg)?, &cfg).await;
        }
        Mode::Resume => {
            runner::run_resume(&api_client(&app, &cfg)?, &cfg).await;
        }
        Mode::Generate => {
            let dir = Path::new(&app.output_dir);
            runner::run_generate(&cfg, dir)
                .await
                .with_context(|| format!("writing fixtures to {}", dir.display()))?;
        }
        Mode::Load => {
            let writer = DynamoTableWriter::connect(&app.aws_region, app.dynamodb_endpoint.as_deref()).await;
            runner::run_load(&cfg, Path::new(&app.output_dir), &writer).await;
        }
    }

    info!("Done");
    Ok(())
}
