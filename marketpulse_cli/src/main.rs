mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use marketpulse_lib::DashboardConfig;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "marketpulse")]
#[command(about = "Filter and chart sentiment-labelled social media posts")]
struct Cli {
    /// Output format: table, json, csv, or md
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Config file (default: marketpulse.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the config file and MARKETPULSE_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the stored posts with an exported CSV or JSON file
    Import(commands::import::ImportArgs),
    /// Show what is currently loaded
    Status,
    /// List posts matching the filters
    Posts(commands::posts::PostsArgs),
    /// Aggregate matching posts into chart views
    Charts(commands::charts::ChartsArgs),
    /// List the sectors and keywords available in a date window
    Options(commands::options::OptionsArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("marketpulse=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    let mut config = DashboardConfig::discover(cli.config.as_deref())?.with_env_overrides();
    if let Some(db) = cli.db {
        config.database = db;
    }

    match &cli.command {
        Commands::Import(args) => commands::import::run(args, &config, &format)?,
        Commands::Status => commands::status::run(&config, &format)?,
        Commands::Posts(args) => commands::posts::run(args, &config, &format)?,
        Commands::Charts(args) => commands::charts::run(args, &config, &format)?,
        Commands::Options(args) => commands::options::run(args, &config, &format)?,
    }

    Ok(())
}
