//! Main entry point for the League Skill replay tool
//!
//! Replays a JSON-lines match history against an in-memory store and prints
//! the resulting ratings. Settlement is deterministic, so replaying the same
//! history always reproduces the same ratings.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use league_skill::config::{AppConfig, RatingConfig};
use league_skill::rating::{InMemoryRatingStore, RatingUpdateAlgorithm};
use league_skill::{GameId, MatchRecord, SettlementService, SkillRating};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// League Skill - Bayesian skill ratings for game clubs
#[derive(Parser)]
#[command(
    name = "league-skill",
    version,
    about = "Replay a match history and compute Bayesian skill ratings",
    long_about = "League Skill keeps a Gaussian belief (mean and deviation) about each participant's \
                 skill per game and updates it from match outcomes, including team and multi-side \
                 matches. This tool replays a JSON-lines match history and reports the final ratings."
)]
struct Args {
    /// Match history, one JSON object per line
    #[arg(value_name = "HISTORY", required_unless_present = "dry_run")]
    history: Option<PathBuf>,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Update speed preset; replaces the configured performance variance and floor
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Print ratings as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Print Prometheus metrics after the replay
    #[arg(long)]
    metrics: bool,

    /// Stop at the first match that fails to settle
    #[arg(long)]
    fail_fast: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without replaying")]
    dry_run: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    Default,
    Conservative,
    Aggressive,
}

impl Preset {
    fn rating_config(self) -> RatingConfig {
        match self {
            Preset::Default => RatingConfig::default(),
            Preset::Conservative => RatingConfig::conservative(),
            Preset::Aggressive => RatingConfig::aggressive(),
        }
    }
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with the active configuration
fn display_startup_banner(config: &AppConfig) {
    info!("League Skill {}", league_skill::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Prior: {:.2} ± {:.2}",
        config.rating.start_mean, config.rating.start_deviation
    );
    info!(
        "   Performance variance: {:.3}",
        config.rating.performance_variance
    );
    info!("   Deviation floor: {:.3}", config.rating.deviation_floor);
    info!(
        "   Max retry attempts: {}",
        config.settlement.max_retry_attempts
    );
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(preset) = args.preset {
        let speed = preset.rating_config();
        config.rating.performance_variance = speed.performance_variance;
        config.rating.deviation_floor = speed.deviation_floor;
    }

    league_skill::config::validate_config(&config)?;
    Ok(config)
}

/// Parse a history file, skipping blank lines
async fn read_history(path: &Path) -> Result<Vec<MatchRecord>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read history file {}", path.display()))?;

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid match on line {}", index + 1))
        })
        .collect()
}

/// Settle every match in order; returns the games touched and the failure count
async fn replay(
    service: &SettlementService,
    records: &[MatchRecord],
    fail_fast: bool,
) -> Result<(BTreeSet<GameId>, usize)> {
    let mut games = BTreeSet::new();
    let mut failures = 0;

    for (index, record) in records.iter().enumerate() {
        match service.settle_match(record.game_id, &record.request).await {
            Ok(_) => {
                games.insert(record.game_id);
            }
            Err(e) if fail_fast => {
                return Err(e).with_context(|| format!("Match {} failed to settle", index + 1));
            }
            Err(e) => {
                warn!("Skipping match {}: {}", index + 1, e);
                failures += 1;
            }
        }
    }

    Ok((games, failures))
}

fn print_table(ratings: &[SkillRating]) {
    println!(
        "{:<36}  {:<24}  {:>9}  {:>9}",
        "GAME", "PARTICIPANT", "MEAN", "DEVIATION"
    );
    for rating in ratings {
        println!(
            "{:<36}  {:<24}  {:>9.3}  {:>9.3}",
            rating.game_id, rating.participant_id, rating.mean, rating.deviation
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful");
        info!("Dry run completed - exiting without replaying");
        return Ok(());
    }

    let Some(history) = args.history.as_deref() else {
        anyhow::bail!("No history file given");
    };

    let records = read_history(history).await?;
    info!(
        "Replaying {} matches from {}",
        records.len(),
        history.display()
    );

    let store = Arc::new(InMemoryRatingStore::new(&config.rating));
    let calculator = Arc::new(RatingUpdateAlgorithm::new(config.rating)?);
    let service = SettlementService::new(
        store.clone(),
        calculator,
        config.settlement.max_retry_attempts,
    )?;

    let (games, failures) = match replay(&service, &records, args.fail_fast).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Replay aborted: {:#}", e);
            std::process::exit(1);
        }
    };

    let mut ratings = Vec::new();
    for game_id in &games {
        let mut game_ratings = store.ratings_for_game(*game_id)?;
        game_ratings.sort_by(|a, b| {
            b.mean
                .total_cmp(&a.mean)
                .then_with(|| a.participant_id.cmp(&b.participant_id))
        });
        ratings.extend(game_ratings);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ratings)?);
    } else {
        print_table(&ratings);
    }

    if args.metrics {
        print!("{}", service.metrics().gather_text()?);
    }

    info!(
        "Replay finished - {} settled, {} skipped, {} ratings across {} games",
        records.len() - failures,
        failures,
        ratings.len(),
        games.len()
    );

    Ok(())
}
