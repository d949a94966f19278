#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for estimating a parametric hail trigger's annual probability and
//! expected payout.
//!
//! Reads `hail_{year}.geojson` footprint files from a directory, runs the
//! analysis, and prints either a text report or the full JSON result.

mod report;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hail_trigger_analysis::{AnalysisConfig, DirectorySource};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser)]
#[command(name = "hail_trigger", about = "Hail trigger probability estimator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the analysis over a directory of yearly footprint files
    Analyze {
        /// Directory containing `hail_{year}.geojson` files
        #[arg(long, default_value = "data/hail_maps")]
        data_dir: PathBuf,
        /// Analysis profile (TOML). Defaults to the embedded Dallas profile
        #[arg(long)]
        config: Option<PathBuf>,
        /// Seed for bootstrap resampling
        #[arg(long)]
        seed: Option<u64>,
        /// Print the full result as JSON instead of a report
        #[arg(long)]
        json: bool,
    },
    /// Print the effective analysis profile as TOML
    ShowConfig {
        /// Analysis profile (TOML) to validate and print
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            data_dir,
            config,
            seed,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            let source = DirectorySource::new(data_dir);
            let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

            log::info!(
                "Analyzing {} from {}",
                config.target.name,
                source.dir().display()
            );
            let analysis = hail_trigger_analysis::analyze(&source, &config, &mut rng)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                let mut text = String::new();
                report::render(&mut text, &analysis)?;
                print!("{text}");
            }
        }
        Commands::ShowConfig { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", toml::to_string(&config)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default_profile());
    };

    log::info!("Loading analysis profile from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    Ok(AnalysisConfig::from_toml_str(&contents)?)
}
