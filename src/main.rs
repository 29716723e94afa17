//! RegionTally - running totals over numbers captured from a shared screen
//!
//! Capture rectangles over a live screen share, recognize the amounts inside
//! each one and keep signed totals per region, per page, across pages and
//! across an ad-hoc selection.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use region_tally::app::RegionTallyApp;
use region_tally::capture::{Bounds, CapturedFrame, Point};
use region_tally::config::{self, AppConfig};
use region_tally::format::{format_amount, format_delta};
use region_tally::storage;
use region_tally::vision::MockRecognizer;

/// Source resolution of the synthetic frame used by the demo session
const DEMO_FRAME: (u32, u32) = (1920, 1080);

/// RegionTally - capture regions and total the numbers inside them
#[derive(Parser, Debug)]
#[command(name = "region-tally")]
#[command(about = "Capture screen regions, recognize their amounts and keep running totals")]
struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of pages to capture in the demo session
    #[arg(long, default_value = "2")]
    pages: usize,

    /// Number of regions drawn on each page
    #[arg(long, default_value = "3")]
    regions: usize,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_or_create_config(args.config.as_deref());

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.print_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    info!("RegionTally starting...");
    run_demo_session(&config, args.pages.max(1), args.regions).await?;
    info!("RegionTally shutdown complete");

    Ok(())
}

/// Load configuration from file or fall back to defaults
fn load_or_create_config(explicit: Option<&Path>) -> AppConfig {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => storage::default_config_path().ok(),
    };

    if let Some(path) = path {
        if path.exists() {
            match config::load_config(&path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", path);
                    return config;
                }
                Err(e) => warn!("Ignoring unreadable configuration {:?}: {}", path, e),
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Drive a scripted capture session against the mock recognizer
async fn run_demo_session(config: &AppConfig, pages: usize, regions: usize) -> Result<()> {
    let delay = config.recognition.mock_min_delay_ms..config.recognition.mock_max_delay_ms;
    let mut app = RegionTallyApp::new(config, Arc::new(MockRecognizer::new(delay)))?;
    app.start();

    // Half-resolution viewport, as if the stream were shown in a smaller window
    let viewport = Bounds::new(0.0, 0.0, DEMO_FRAME.0 as f64 / 2.0, DEMO_FRAME.1 as f64 / 2.0);
    app.frames()
        .publish(CapturedFrame::solid(DEMO_FRAME.0, DEMO_FRAME.1, [255, 255, 255, 255]));

    app.begin_capture();
    for page in 0..pages {
        if page > 0 {
            app.add_page(None);
        }
        for row in 0..regions {
            let top = 40.0 + row as f64 * 60.0;
            app.pointer_down(Point::new(80.0, top), viewport);
            app.pointer_move(Point::new(400.0, top + 40.0), viewport);
            app.pointer_up()?;
        }
    }
    app.finish_capture();

    info!("Waiting for recognition...");
    app.wait_for_recognition().await;

    let state = app.state();
    {
        let mut state = state.write();
        let first_regions: Vec<_> = state
            .document
            .pages()
            .filter_map(|page| page.region_ids.first().cloned())
            .collect();
        for region_id in &first_regions {
            state.document.toggle_region_selection(region_id);
        }
    }

    let state = state.read();
    let document = &state.document;
    for page in document.pages() {
        println!("{} ({} regions)", page.label, page.region_ids.len());
        for (i, region) in document.page_regions(&page.id).iter().enumerate() {
            let texts: Vec<&str> = region.tokens.iter().map(|t| t.text.as_str()).collect();
            println!(
                "  Area {:<3} {:>12}  [{}]",
                i + 1,
                format_amount(region.sum),
                texts.join(" ")
            );
        }
        println!("  Page total {:>12}", format_amount(document.page_total(&page.id)));
    }
    println!("Grand total     {:>12}", format_amount(document.grand_total()));
    println!(
        "Selection ({})   {:>12}",
        document.selection().region_ids.len(),
        format_delta(document.selection_total())
    );
    drop(state);

    app.shutdown();
    Ok(())
}
