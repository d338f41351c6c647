//! Race weekend feature pipeline CLI
//!
//! Builds and prints the feature table a race-outcome model trains on.

use clap::{Parser, Subcommand};
use gridpred::{Config, Result};

#[derive(Parser)]
#[command(name = "gridpred")]
#[command(about = "F1 race-weekend feature engineering", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the feature table and print the projection
    Features {
        /// Estimates file (toml); defaults to the built-in weekend tables
        #[arg(long)]
        estimates: Option<String>,
        /// Use only the local cache (no network requests)
        #[arg(long)]
        offline: bool,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Fetch and show the forecast for the configured slot
    Weather,
    /// Session data management
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Prefetch the configured session into the cache
    Fetch,
    /// Show cache status for the configured session
    Status,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Features {
            estimates,
            offline,
            format,
        } => commands::features(&config, estimates, offline, format),
        Commands::Weather => commands::weather(&config),
        Commands::Data { action } => match action {
            DataCommands::Fetch => commands::data_fetch(&config),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use gridpred::data::{SessionLoader, WeatherClient, WeatherLookup};
    use gridpred::features::{RaceEstimates, SectorAggregator};
    use gridpred::pipeline::{self, report};

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all(&config.data.cache_dir)?;
        println!("Created {}/ cache directory", config.data.cache_dir);

        println!("\nNext steps:");
        println!("  1. Edit {} and set your weather API key", config_path);
        println!("  2. Run 'gridpred data fetch' to cache the reference session");
        println!("  3. Run 'gridpred features' to build the feature table");

        Ok(())
    }

    pub fn features(
        config: &Config,
        estimates_path: Option<String>,
        offline: bool,
        format: OutputFormat,
    ) -> Result<()> {
        let estimates = match estimates_path {
            Some(path) => RaceEstimates::load(&path)?,
            None => RaceEstimates::default(),
        };

        let run = pipeline::run(config, &estimates, offline)?;

        if !run.weather.is_observed() {
            log::info!("Forecast unavailable, feature table uses dry defaults");
        }

        match format {
            OutputFormat::Table => print!("{}", report::format_table(&run.table)),
            OutputFormat::Json => println!("{}", report::format_json(&run.table)),
            OutputFormat::Csv => print!("{}", report::format_csv(&run.table)),
        }

        Ok(())
    }

    pub fn weather(config: &Config) -> Result<()> {
        let lookup = WeatherClient::new(config.weather.clone()).fetch_forecast();

        println!("Forecast slot: {}", config.weather.forecast_slot);
        match &lookup {
            WeatherLookup::Observed(w) => {
                println!("  Rain probability: {:.0}%", w.rain_probability * 100.0);
                println!("  Temperature:      {:.1} C", w.temperature_c);
            }
            WeatherLookup::SlotMissing => {
                println!("  No forecast entry for this slot yet");
            }
            WeatherLookup::Unavailable(reason) => {
                println!("  Forecast unavailable: {}", reason);
            }
        }

        let conditions = lookup.conditions();
        println!(
            "Pipeline will use: rain {:.0}%, {:.1} C",
            conditions.rain_probability * 100.0,
            conditions.temperature_c
        );

        Ok(())
    }

    pub fn data_fetch(config: &Config) -> Result<()> {
        let loader =
            SessionLoader::new(&config.data.timing_endpoint).with_cache(&config.data.cache_dir);

        println!(
            "Fetching {} {} {}...",
            config.session.season, config.session.event, config.session.session_type
        );
        let laps = loader.load(&config.session)?;
        let sectors = SectorAggregator::from_laps(&laps);

        println!(
            "Cached {} complete laps across {} drivers",
            sectors.lap_count(),
            sectors.driver_count()
        );

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let loader = SessionLoader::new(&config.data.timing_endpoint)
            .with_cache(&config.data.cache_dir)
            .offline_only(true);

        println!("Session Cache Status");
        println!("───────────────────────────────");
        println!("  Cache dir: {}", config.data.cache_dir);
        println!(
            "  Session:   {} {} {}",
            config.session.season, config.session.event, config.session.session_type
        );

        if !loader.is_cached(&config.session) {
            println!("  Cached:    no");
            return Ok(());
        }

        let laps = loader.load(&config.session)?;
        let sectors = SectorAggregator::from_laps(&laps);
        println!("  Cached:    yes");
        println!("  Laps:      {}", sectors.lap_count());
        println!("  Drivers:   {}", sectors.driver_count());

        Ok(())
    }
}
