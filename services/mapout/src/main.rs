//! mapout: render classified map features into PNG images.
//!
//! Renders a single map around a center point, or a batch of named maps in
//! parallel.

mod batch;
mod config;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use renderer::{
    png, BoxShaper, DirectoryIconSource, FontShaper, MemoryFeatureSource, TextShaper,
};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::batch::{load_jobs, render_batch};
use crate::config::MapoutConfig;

#[derive(Parser, Debug)]
#[command(name = "mapout")]
#[command(about = "Render classified map features into PNG images")]
struct Args {
    /// Center latitude in degrees
    #[arg(long, env = "MAPOUT_LAT", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Center longitude in degrees
    #[arg(long, env = "MAPOUT_LON", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Image width in pixels
    #[arg(long, default_value = "1024", env = "MAPOUT_WIDTH")]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "512", env = "MAPOUT_HEIGHT")]
    height: u32,

    /// Ground width of the map in meters
    #[arg(short, long, default_value = "1234.5", env = "MAPOUT_METERS")]
    meters: f64,

    /// Output PNG file, or output directory in batch mode
    #[arg(short, long, default_value = "map.png", env = "MAPOUT_OUTPUT")]
    output: PathBuf,

    /// Configuration file (catalog and render settings)
    #[arg(short, long, default_value = "config/mapout.yaml", env = "MAPOUT_CONFIG")]
    config: PathBuf,

    /// JSON file with the feature pool
    #[arg(short, long, env = "MAPOUT_FEATURES")]
    features: PathBuf,

    /// Directory with <name>.png / <name>.svg icons
    #[arg(short, long, default_value = "icons", env = "MAPOUT_ICONS")]
    icons: PathBuf,

    /// TrueType font for labels; box glyphs when absent
    #[arg(long, env = "MAPOUT_FONT")]
    font: Option<PathBuf>,

    /// YAML list of jobs to render in parallel
    #[arg(short, long, env = "MAPOUT_BATCH")]
    batch: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "MAPOUT_LOG_LEVEL")]
    log_level: String,

    /// Log as JSON lines
    #[arg(long, env = "MAPOUT_LOG_JSON")]
    log_json: bool,
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);
    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn load_shaper(font: Option<&PathBuf>) -> Result<Box<dyn TextShaper>> {
    match font {
        Some(path) => {
            let shaper = FontShaper::from_file(path)
                .with_context(|| format!("Failed to load font {}", path.display()))?;
            Ok(Box::new(shaper))
        }
        None => {
            warn!("No font given, labels are drawn with box glyphs");
            Ok(Box::new(BoxShaper))
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    info!(config = %args.config.display(), "Starting mapout");

    let renderer = MapoutConfig::load(&args.config)?.into_renderer()?;
    let source = MemoryFeatureSource::from_file(&args.features)
        .with_context(|| format!("Failed to load features from {}", args.features.display()))?;
    info!(features = source.len(), "Feature pool loaded");

    let icons = DirectoryIconSource::new(&args.icons);
    let shaper = load_shaper(args.font.as_ref())?;

    if let Some(batch_file) = &args.batch {
        let jobs = load_jobs(batch_file)?;
        std::fs::create_dir_all(&args.output)
            .with_context(|| format!("Failed to create {}", args.output.display()))?;

        let outcomes = render_batch(&renderer, &jobs, &source, &icons, &*shaper, &args.output);
        let failed: Vec<&str> = outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.name.as_str())
            .collect();
        if !failed.is_empty() {
            bail!("{} of {} maps failed: {}", failed.len(), jobs.len(), failed.join(", "));
        }
        return Ok(());
    }

    let (Some(lat), Some(lon)) = (args.lat, args.lon) else {
        bail!("--lat and --lon are required unless --batch is given");
    };

    let request = renderer.request(lat, lon, args.width, args.height, args.meters)?;
    let map = renderer.render(&request, &source, &icons, &*shaper)?;
    png::save_png(&map.pixmap, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        path = %args.output.display(),
        drawables = map.stats.drawables,
        icons = map.stats.icons.placed,
        labels = map.stats.labels.placed + map.stats.water_labels.placed,
        streets = map.stats.streets.placed,
        "Map written"
    );
    Ok(())
}
