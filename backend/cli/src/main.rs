mod app;
mod auth_cmd;
mod config_cmd;
mod history_cmd;
mod i18n;
mod plants_cmd;
mod profile_cmd;
mod render;
mod report;
mod scan_cmd;
mod terminal;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use plantdoc_config::{config_dir, config_file_path, load_and_prepare, PlantDocConfig};
use plantdoc_core::{Language, Theme};

use app::App;

#[derive(Parser)]
#[command(name = "plantdoc")]
#[command(about = "Plant identification and disease detection from the terminal")]
#[command(version)]
struct Cli {
    /// Directory holding config.yaml and the local database
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Message language, en or ne (persisted)
    #[arg(long, global = true, value_name = "LANG")]
    lang: Option<Language>,

    /// Theme preference, light or dark (persisted)
    #[arg(long, global = true, value_name = "THEME")]
    theme: Option<Theme>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a plant photo for diseases and care guidance
    Analyze(scan_cmd::AnalyzeArgs),
    /// Identify the species in a photo
    Identify(scan_cmd::IdentifyArgs),
    /// Care guide for a plant by name
    Care(scan_cmd::CareArgs),
    /// Ask a question about a plant photo
    Ask(scan_cmd::AskArgs),
    /// Re-display the most recent analysis
    Results(scan_cmd::ResultsArgs),
    /// Browse and manage your scans
    #[command(subcommand)]
    History(history_cmd::HistoryCommands),
    /// Sign up, sign in, and session management
    #[command(subcommand)]
    Auth(auth_cmd::AuthCommands),
    /// Your saved plant collection
    #[command(subcommand)]
    Plants(plants_cmd::PlantsCommands),
    /// Show or update your profile
    #[command(subcommand)]
    Profile(profile_cmd::ProfileCommands),
    /// Inspect or edit configuration
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(dir) = &cli.config_dir {
        std::env::set_var("PLANTDOC_CONFIG_DIR", dir);
    }

    // Config commands operate on the raw file and must stay usable when the
    // active config fails to prepare (an unset ${VAR} reference, say).
    if let Commands::Config(cmd) = cli.command {
        return config_cmd::run(cmd).await;
    }

    let config = load_and_prepare(&config_file_path(&config_dir())).await?;
    init_tracing(&config);

    let app = App::from_config(config, cli.lang, cli.theme).await?;

    match cli.command {
        Commands::Analyze(args) => scan_cmd::analyze(&app, args).await,
        Commands::Identify(args) => scan_cmd::identify(&app, args).await,
        Commands::Care(args) => scan_cmd::care(&app, args).await,
        Commands::Ask(args) => scan_cmd::ask(&app, args).await,
        Commands::Results(args) => scan_cmd::results(&app, args).await,
        Commands::History(cmd) => history_cmd::run(&app, cmd).await,
        Commands::Auth(cmd) => auth_cmd::run(&app, cmd).await,
        Commands::Plants(cmd) => plants_cmd::run(&app, cmd).await,
        Commands::Profile(cmd) => profile_cmd::run(&app, cmd).await,
        Commands::Config(cmd) => config_cmd::run(cmd).await,
    }
}

// Logs go to stderr so rendered output stays clean on stdout.
fn init_tracing(config: &PlantDocConfig) {
    let level = config
        .logging
        .as_ref()
        .and_then(|l| l.level.clone())
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
