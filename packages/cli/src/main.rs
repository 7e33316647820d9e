#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Sentinel occurrence dashboard.

mod config;
mod render;

use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use sentinel_dashboard::compute_snapshot;
use sentinel_dashboard::sample::sample_occurrences;
use sentinel_dashboard::view_model::{DashboardViewModel, LoadState, ViewModelOptions};
use sentinel_dashboard_models::DashboardSnapshot;
use sentinel_source::config::SourceConfig;
use sentinel_source::http::HttpOccurrenceSource;

use crate::config::{CliConfig, Settings, ViewArgs};

#[derive(Parser)]
#[command(name = "sentinel", about = "Occurrence dashboard for the Sentinel backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch occurrences from the backend and print the dashboard
    Show {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Print the dashboard for the built-in sample dataset
    Sample {
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { view } => {
            let settings = load_settings(&view)?;
            let snapshot = show(&settings).await?;
            print_snapshot(&snapshot, view.json)?;
        }
        Commands::Sample { view } => {
            let settings = load_settings(&view)?;
            let now = Utc::now();
            let snapshot = compute_snapshot(
                &sample_occurrences(now),
                &settings.filter,
                now,
                &settings.labels,
            );
            print_snapshot(&snapshot, view.json)?;
        }
    }

    Ok(())
}

fn load_settings(view: &ViewArgs) -> Result<Settings, config::ConfigError> {
    let file = match &view.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let env_api_url = std::env::var("SENTINEL_API_URL")
        .or_else(|_| std::env::var("API_URL"))
        .ok();
    config::resolve(view, env_api_url, &file)
}

async fn show(settings: &Settings) -> Result<DashboardSnapshot, Box<dyn std::error::Error>> {
    let Some(api_url) = settings.api_url.as_deref() else {
        return Err("No API URL configured: pass --api-url, set SENTINEL_API_URL, \
                    or add api_url to the config file"
            .into());
    };
    let source_config = SourceConfig::with_env_overrides(api_url);
    log::info!("Using backend at {}", source_config.api_url);

    let source = Arc::new(HttpOccurrenceSource::new(source_config)?);
    let mut view_model = DashboardViewModel::new(
        source,
        ViewModelOptions {
            initial_filter: settings.filter,
            fetch_window: settings.fetch_window,
            labels: settings.labels,
            fallback_to_sample: true,
        },
    );

    let now = Utc::now();
    view_model.refresh(now).await?;
    view_model.apply_filter(settings.filter, now).await?;

    if let LoadState::Error { message, fallback } = view_model.state() {
        log::warn!("Backend unavailable ({message})");
        if *fallback {
            eprintln!("warning: backend unavailable, showing sample data");
        }
    }
    if let Some(notice) = view_model.notice() {
        eprintln!("note: {notice}");
    }

    view_model
        .snapshot()
        .cloned()
        .ok_or_else(|| "No dashboard data available".into())
}

fn print_snapshot(
    snapshot: &DashboardSnapshot,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        print!("{}", render::render_tables(snapshot)?);
    }
    Ok(())
}
