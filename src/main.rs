//! NIWA marine-forecast bot.
//!
//! CLI front end over the forecast facade: fetches tide and UV-index data
//! from the NIWA API, caches responses per requesting device, and pages
//! long UV forecasts across successive requests.

mod config;

use clap::{Parser, Subcommand};
use forecast::ForecastService;
use tracing::{error, info};

/// What end users see when the upstream fetch fails; the cause is logged.
const FETCH_FAILURE_MESSAGE: &str = "Error fetching NIWA data, please try again later.";

#[derive(Parser)]
#[command(name = "niwa-bot", about = "NIWA tide and UV forecast bot")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print tide predictions for a location.
    Tide {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        long: f64,
        /// Requesting device identity (cache and session key).
        #[arg(long, default_value = "cli")]
        device: String,
    },
    /// Print UV forecast pages for a location.
    Uv {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        long: f64,
        /// Requesting device identity (cache and session key).
        #[arg(long, default_value = "cli")]
        device: String,
        /// Successive pages to request; each walks the device's cursor.
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "niwa_bot=info,niwa_client=info,forecast=info".into()),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    // Load configuration.
    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if !cfg.niwa_enabled {
        error!("NIWA integration is disabled (niwa_enabled = false)");
        std::process::exit(1);
    }

    info!(
        "NIWA bot: cache ttl={}h max={} page_size={} tz={}",
        cfg.cache.ttl_hours, cfg.cache.max_records, cfg.paging.page_size, cfg.timezone
    );

    let service = match ForecastService::from_config(&cfg) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to build forecast service: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Tide { lat, long, device } => {
            match service.get_tide_data(lat, long, &device).await {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    error!("Tide request failed: {}", e);
                    eprintln!("{}", FETCH_FAILURE_MESSAGE);
                    std::process::exit(1);
                }
            }
        }
        Command::Uv {
            lat,
            long,
            device,
            pages,
        } => {
            for page in 1..=pages.max(1) {
                info!("UV request {}/{} for {}", page, pages.max(1), device);
                match service.get_uv_data(lat, long, &device).await {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        error!("UV request failed: {}", e);
                        eprintln!("{}", FETCH_FAILURE_MESSAGE);
                        std::process::exit(1);
                    }
                }
            }
        }
    }
}
