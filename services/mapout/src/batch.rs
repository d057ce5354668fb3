//! Batch mode: several named maps rendered in parallel.
//!
//! Every job gets its own canvas and placement state; the renderer, feature
//! source, icons and font are shared read-only.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;
use renderer::{png, FeatureSource, IconSource, MapRenderer, RenderStats, TextShaper};
use serde::Deserialize;
use tracing::{error, info};

/// One map of a batch file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchJob {
    /// Output file stem.
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Ground width in meters.
    pub meters: f64,
}

fn default_width() -> u32 {
    1024
}

fn default_height() -> u32 {
    512
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub name: String,
    pub path: PathBuf,
    pub result: Result<RenderStats>,
}

/// Parse a YAML list of jobs. Names must be unique.
pub fn parse_jobs(content: &str) -> Result<Vec<BatchJob>> {
    let jobs: Vec<BatchJob> = serde_yaml::from_str(content).context("Failed to parse batch file")?;
    check_names(&jobs)?;
    Ok(jobs)
}

fn check_names(jobs: &[BatchJob]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for job in jobs {
        if job.name.is_empty() || job.name.contains(['/', '\\']) {
            anyhow::bail!("Invalid job name '{}'", job.name);
        }
        if !seen.insert(job.name.as_str()) {
            anyhow::bail!("Duplicate job name '{}'", job.name);
        }
    }
    Ok(())
}

/// Load a batch file; `.json` files are read as JSON, anything else as YAML.
pub fn load_jobs(path: &Path) -> Result<Vec<BatchJob>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        let jobs: Vec<BatchJob> =
            serde_json::from_str(&content).context("Failed to parse batch file")?;
        check_names(&jobs)?;
        return Ok(jobs);
    }
    parse_jobs(&content)
}

/// Render one job and write `<out_dir>/<name>.png`.
pub fn render_job(
    renderer: &MapRenderer,
    job: &BatchJob,
    source: &dyn FeatureSource,
    icons: &dyn IconSource,
    shaper: &dyn TextShaper,
    path: &Path,
) -> Result<RenderStats> {
    let request = renderer.request(job.lat, job.lon, job.width, job.height, job.meters)?;
    let map = renderer.render(&request, source, icons, shaper)?;
    png::save_png(&map.pixmap, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(map.stats)
}

/// Render all jobs in parallel. A failing job does not stop the others.
pub fn render_batch(
    renderer: &MapRenderer,
    jobs: &[BatchJob],
    source: &dyn FeatureSource,
    icons: &dyn IconSource,
    shaper: &dyn TextShaper,
    out_dir: &Path,
) -> Vec<BatchOutcome> {
    let start = Instant::now();
    let outcomes: Vec<BatchOutcome> = jobs
        .par_iter()
        .map(|job| {
            let path = out_dir.join(format!("{}.png", job.name));
            let result = render_job(renderer, job, source, icons, shaper, &path);
            match &result {
                Ok(stats) => info!(
                    name = %job.name,
                    path = %path.display(),
                    drawables = stats.drawables,
                    "Map written"
                ),
                Err(e) => error!(name = %job.name, error = %e, "Map failed"),
            }
            BatchOutcome {
                name: job.name.clone(),
                path,
                result,
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(
        jobs = jobs.len(),
        failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Batch finished"
    );
    outcomes
}
