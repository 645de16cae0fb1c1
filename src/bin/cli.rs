//! confwatch CLI
//!
//! Local entry point for refreshing, inspecting and watching conference
//! deadline data.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use confwatch::{
    config,
    error::Result,
    models::{CalendarConference, ConferenceData},
    pipeline::{
        self, LayoutParams, format_countdown, pick_calendar_entries, place_markers,
        search_deadlines, upcoming_deadlines,
    },
    services::{DataService, OcrClient, RankingClient},
    storage::{DataKind, RecognitionEntry, SettingsStore},
    utils::now_reference,
};
use chrono::DateTime;
use tokio::sync::watch;

/// confwatch - Conference Deadline Tracker
#[derive(Parser, Debug)]
#[command(name = "confwatch", version, about = "Academic conference deadline tracker")]
struct Cli {
    /// Path to the data directory containing config and caches
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config.toml into the data directory
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Fetch both feeds and update the content-hashed store
    Refresh {
        /// Rewrite stored files even when content hashes are unchanged
        #[arg(long)]
        force: bool,
    },

    /// Run the daily refresh scheduler until Ctrl-C
    Daemon,

    /// List upcoming deadlines
    Upcoming {
        /// Maximum entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Re-render countdowns every second until Ctrl-C
        #[arg(long)]
        watch: bool,
    },

    /// Find all deadlines of a conference by exact title
    Search {
        /// Series title (e.g. "AAAI"), case-insensitive
        query: String,
    },

    /// Show the deduplicated calendar view
    Calendar {
        /// Emit marker placements per month as JSON
        #[arg(long)]
        layout: bool,
    },

    /// Recognize LaTeX from a handwriting/formula image
    Recognize {
        /// Path to the image file
        image: PathBuf,
    },

    /// Look up publication ranks by name
    Rank {
        /// Free-text publication name
        name: String,
    },

    /// Show cache and feed store status
    Info,

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config(&cli.data_dir);
    let settings = SettingsStore::new(cli.data_dir.join("settings"));

    match cli.command {
        Command::Init { force } => {
            let path = config::config_path(&cli.data_dir);
            if path.exists() && !force {
                log::warn!(
                    "Config already exists at {}. Use --force to overwrite.",
                    path.display()
                );
                return Ok(());
            }

            confwatch::models::Config::default().save(&path)?;
            log::info!("Default config written to {}", path.display());
        }

        Command::Refresh { force } => {
            let service = DataService::new(&config, &cli.data_dir)?;
            let outcome = service.trigger_refresh(force).await;
            if outcome.success {
                log::info!("Refresh: {}", outcome.message);
                if let Some(metadata) = outcome.metadata {
                    log::info!("Last update: {}", metadata.last_update);
                }
            } else {
                log::error!("{}", outcome.message);
            }
        }

        Command::Daemon => {
            let mut service = DataService::new(&config, &cli.data_dir)?;
            let (tx, rx) = watch::channel(false);

            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Received Ctrl-C, shutting down");
                    let _ = tx.send(true);
                }
            });

            log::info!(
                "Refresh scheduler running every {} h",
                config.refresh.interval_hours
            );
            service.run_scheduler(rx).await?;
        }

        Command::Upcoming { limit, watch } => {
            let service = DataService::new(&config, &cli.data_dir)?;
            let data = service.get_conference_data().await;
            warn_on_error(&data);

            if watch {
                watch_upcoming(&data, limit).await;
            } else {
                print_upcoming(&data, limit);
            }
        }

        Command::Search { query } => {
            let service = DataService::new(&config, &cli.data_dir)?;
            let data = service.get_conference_data().await;
            warn_on_error(&data);

            if let Err(e) = settings.push_search(&query).await {
                log::warn!("Failed to record search history: {e}");
            }

            let found = search_deadlines(&data.conferences, &query, now_reference());
            if found.is_empty() {
                println!("No deadlines found for '{query}'");
            }
            for entry in found {
                let rate = confwatch::models::lookup_rate(&data.acceptances, &entry.title, entry.year)
                    .map(|r| format!("  acceptance {}", r.rate))
                    .unwrap_or_default();
                println!(
                    "{} {}  {}  {}  {}{}",
                    entry.title,
                    entry.year,
                    entry.deadline.format("%Y-%m-%d %H:%M:%S %:z"),
                    format_countdown(entry.remaining_ms),
                    entry.comment,
                    rate,
                );
            }
        }

        Command::Calendar { layout } => {
            let service = DataService::new(&config, &cli.data_dir)?;
            let data = service.get_conference_data().await;
            warn_on_error(&data);

            let view = settings.load_view_settings().await?;
            let mut entries = pick_calendar_entries(&data.conferences);
            if !view.show_expired {
                let now = now_reference();
                entries.retain(|e| {
                    DateTime::parse_from_rfc3339(&e.deadline)
                        .map(|d| d >= now)
                        .unwrap_or(true)
                });
            }

            if layout {
                print_layout(&entries)?;
            } else {
                for entry in &entries {
                    println!(
                        "{:>3}  {:<12} {}  {}  {}",
                        entry
                            .month
                            .map(|m| format!("{:02}", m + 1))
                            .unwrap_or_else(|| "??".to_string()),
                        entry.abbr,
                        entry.year,
                        entry.deadline,
                        entry.location,
                    );
                }
            }
        }

        Command::Recognize { image } => {
            let token = config.vendors.ocr_token.clone().ok_or_else(|| {
                confwatch::error::AppError::config("vendors.ocr_token is not configured")
            })?;

            let client = confwatch::utils::http::create_async_client(&config.feeds)?;
            let ocr = OcrClient::new(client, &config.vendors.ocr_endpoint, token);

            let bytes = tokio::fs::read(&image).await?;
            let filename = image
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("formula.png")
                .to_string();

            match ocr.recognize(bytes, &filename).await {
                Ok(recognition) => {
                    println!("{}", recognition.latex);
                    println!("confidence: {:.1}%", recognition.confidence_percent());

                    if let Err(e) = settings
                        .push_recognition(RecognitionEntry {
                            latex: recognition.latex.clone(),
                            confidence: recognition.confidence,
                            timestamp: chrono::Utc::now(),
                        })
                        .await
                    {
                        log::warn!("Failed to record recognition history: {e}");
                    }
                }
                Err(e) => log::error!("{e}"),
            }
        }

        Command::Rank { name } => {
            let key = config.vendors.ranking_key.clone().ok_or_else(|| {
                confwatch::error::AppError::config("vendors.ranking_key is not configured")
            })?;

            let client = confwatch::utils::http::create_async_client(&config.feeds)?;
            let ranking = RankingClient::new(client, &config.vendors.ranking_endpoint, key);

            match ranking.lookup(&name).await {
                Ok(lookup) => {
                    if lookup.ranks.is_empty() {
                        println!("No ranks found for '{name}'");
                    }
                    let mut systems: Vec<_> = lookup.ranks.iter().collect();
                    systems.sort();
                    for (system, rank) in systems {
                        println!("{system}: {rank}");
                    }
                }
                Err(e) => log::error!("{e}"),
            }
        }

        Command::Info => {
            let service = DataService::new(&config, &cli.data_dir)?;

            for kind in [DataKind::Conferences, DataKind::Acceptances] {
                match service.snapshot_info(kind).await {
                    Some((timestamp, size)) => {
                        log::info!("Snapshot {}: {} ({} bytes)", kind.as_str(), timestamp, size)
                    }
                    None => log::info!("Snapshot {}: not found", kind.as_str()),
                }
            }

            match service.refresh_metadata().await {
                Some(metadata) => {
                    log::info!("Feed store last update: {}", metadata.last_update);
                    log::info!("Conference hash: {}", metadata.conference_hash);
                    log::info!("Acceptance hash: {}", metadata.acceptance_hash);
                }
                None => log::info!("Feed store: no refresh recorded yet"),
            }

            let history = settings.search_history().await?;
            log::info!("Search history: {} terms", history.len());
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            log::info!("  Conference feed: {}", config.feeds.conference_url);
            log::info!("  Acceptance feed: {}", config.feeds.acceptance_url);
            log::info!("  Refresh interval: {} h", config.refresh.interval_hours);
        }
    }

    Ok(())
}

fn warn_on_error(data: &ConferenceData) {
    if let Some(error) = &data.error {
        log::error!("{error}");
    }
}

fn print_upcoming(data: &ConferenceData, limit: usize) {
    let now = now_reference();
    let entries = upcoming_deadlines(&data.conferences, now);

    for entry in entries.iter().take(limit) {
        let remaining = entry.deadline.signed_duration_since(now).num_milliseconds();
        println!(
            "{}  {:<12} {}  [{}]  {}  {}",
            format_countdown(remaining),
            entry.title,
            entry.year,
            entry.ccf_rank.as_deref().unwrap_or("-"),
            entry.deadline.format("%Y-%m-%d %H:%M:%S %:z"),
            entry.comment,
        );
    }
}

/// Re-render countdowns once per second without refetching.
async fn watch_upcoming(data: &ConferenceData, limit: usize) {
    log::info!("Watching upcoming deadlines, Ctrl-C to stop");
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                println!("--- {}", now_reference().format("%Y-%m-%d %H:%M:%S"));
                print_upcoming(data, limit);
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Stopped");
                break;
            }
        }
    }
}

/// Emit marker placements per month bucket as JSON.
fn print_layout(entries: &[CalendarConference]) -> Result<()> {
    let params = LayoutParams::default();

    for month in 0..12u32 {
        let bucket: Vec<CalendarConference> = entries
            .iter()
            .filter(|e| e.month == Some(month))
            .cloned()
            .collect();
        if bucket.is_empty() {
            continue;
        }

        let placements = place_markers(&bucket, &params);
        let anchor = pipeline::layout::Point::new(720.0 / 12.0 * (month as f64 + 0.5), 40.0);
        let connectors: Vec<String> = placements
            .iter()
            .map(|p| {
                let marker = pipeline::layout::Point::new(anchor.x + p.dx, anchor.y + p.dy);
                pipeline::connector_path(anchor, marker)
            })
            .collect();

        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "month": month,
                "markers": placements,
                "connectors": connectors,
                "wave": pipeline::wave_path(720.0, 80.0, 6),
            }))?
        );
    }

    Ok(())
}
