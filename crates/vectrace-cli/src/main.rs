//! vectrace: trace raster images into SVG from the command line.
//!
//! Two subcommands drive the vectorization engine on files:
//!
//! - `trace` runs one live-preview trace and writes the SVG.
//! - `sweep` renders the 5x5 threshold x turd size grid, writes one SVG
//!   per cell, and can promote a cell to the final export.
//!
//! # Usage
//!
//! ```text
//! vectrace trace [OPTIONS] <IMAGE>
//! vectrace sweep --out-dir <DIR> [OPTIONS] <IMAGE>
//! ```
//!
//! Logging goes to stderr through `env_logger`; set `RUST_LOG` to change
//! the default `info` filter.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod blocking;

use std::fmt::Write as _;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use vectrace_export::{ExportArtifact, SVG_EXTENSION, suggested_file_name};
use vectrace_pipeline::{Color, SourceImage, VectorizeSettings};
use vectrace_session::{
    CellState, GRID_SIZE, Orchestrator, Session, SessionConfig, SweepGrid, TraceOutcome,
    threshold_axis, turd_size_axis,
};

use crate::blocking::BlockingVectorizer;

/// Trace raster images into SVG.
#[derive(Parser)]
#[command(name = "vectrace", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trace one image and write the SVG.
    Trace {
        /// Path to the input image (PNG, JPEG, BMP, GIF, WebP).
        image: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Output path. Defaults to the image path with an `.svg`
        /// extension.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Trace a 5x5 grid of threshold and turd size variants.
    Sweep {
        /// Path to the input image (PNG, JPEG, BMP, GIF, WebP).
        image: PathBuf,

        /// Directory receiving one SVG per cell.
        #[arg(long)]
        out_dir: PathBuf,

        /// Number of cells traced at once.
        #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        concurrency: usize,

        /// Promote cell `ROW,COL` to the live preview and export it.
        #[arg(long, value_name = "ROW,COL", value_parser = parse_cell)]
        select: Option<(usize, usize)>,

        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Tracing parameters.
#[derive(Args)]
struct SettingsArgs {
    /// Binarization cut point (1-255). Darker pixels are traced.
    #[arg(long, default_value_t = VectorizeSettings::DEFAULT_THRESHOLD)]
    threshold: u32,

    /// Regions of at most this many pixels are dropped (0-10).
    #[arg(long, default_value_t = VectorizeSettings::DEFAULT_TURD_SIZE)]
    turd_size: f64,

    /// Corner threshold (0-1.5). Lower keeps more sharp corners.
    #[arg(long, default_value_t = VectorizeSettings::DEFAULT_ALPHA_MAX)]
    alpha_max: f64,

    /// Curve optimization tolerance (0-1).
    #[arg(long, default_value_t = VectorizeSettings::DEFAULT_OPT_TOLERANCE)]
    opt_tolerance: f64,

    /// Disable curve optimization.
    #[arg(long)]
    no_opt_curve: bool,

    /// Fill color (`#rgb` or `#rrggbb`).
    #[arg(long, default_value_t = Color::BLACK)]
    color: Color,

    /// Background color (`#rgb` or `#rrggbb`).
    #[arg(long, default_value_t = Color::WHITE)]
    background: Color,

    /// Full settings as a JSON string.
    ///
    /// When provided, all other settings flags are ignored. Missing
    /// fields take their defaults.
    #[arg(long)]
    settings_json: Option<String>,
}

/// Build [`VectorizeSettings`] from CLI arguments.
///
/// If `--settings-json` is provided, the JSON is parsed directly and all
/// individual flags are ignored. The result is not validated here.
fn settings_from_args(args: &SettingsArgs) -> Result<VectorizeSettings, String> {
    if let Some(ref json) = args.settings_json {
        return serde_json::from_str(json)
            .map_err(|e| format!("Error parsing --settings-json: {e}"));
    }

    Ok(VectorizeSettings {
        turd_size: args.turd_size,
        alpha_max: args.alpha_max,
        threshold: args.threshold,
        opt_curve: !args.no_opt_curve,
        opt_tolerance: args.opt_tolerance,
        color: args.color,
        background: args.background,
    })
}

/// Parse a `ROW,COL` cell index.
fn parse_cell(s: &str) -> Result<(usize, usize), String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {s:?}"))?;
    let index = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid cell index {v:?}: {e}"))
    };
    Ok((index(row)?, index(col)?))
}

/// Read and decode the image at `path`, named after its file name.
fn load_image(path: &Path) -> Result<SourceImage, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    eprintln!("Image: {} ({} bytes)", path.display(), bytes.len());
    SourceImage::decode(&name, &bytes).map_err(|e| format!("Error decoding {}: {e}", path.display()))
}

fn write_artifact(path: &Path, artifact: &ExportArtifact) -> Result<(), String> {
    std::fs::write(path, artifact.as_bytes())
        .map_err(|e| format!("Error writing SVG to {}: {e}", path.display()))?;
    eprintln!(
        "SVG written to {} ({} bytes)",
        path.display(),
        artifact.markup.len()
    );
    Ok(())
}

async fn run_trace(
    image_path: &Path,
    settings: &SettingsArgs,
    output: Option<PathBuf>,
) -> Result<(), String> {
    let settings = settings_from_args(settings)?;
    let orchestrator = Orchestrator::new(BlockingVectorizer);
    orchestrator
        .update_settings(settings)
        .map_err(|e| format!("Error: {e}"))?;

    let image = load_image(image_path)?;
    let request = orchestrator
        .set_image(Some(image.clone()))
        .ok_or("Error: no image loaded")?;
    let outcome = orchestrator
        .execute(request)
        .await
        .map_err(|e| format!("Error: {e}"))?;
    let TraceOutcome::Published(result) = outcome else {
        return Err("Error: trace was superseded".to_owned());
    };

    let artifact = ExportArtifact::new(image.name(), result.markup);
    let path = output.unwrap_or_else(|| image_path.with_file_name(&artifact.file_name));
    write_artifact(&path, &artifact)
}

async fn run_sweep(
    image_path: &Path,
    out_dir: &Path,
    concurrency: usize,
    select: Option<(usize, usize)>,
    settings: &SettingsArgs,
) -> Result<(), String> {
    let settings = settings_from_args(settings)?;
    let config = SessionConfig {
        sweep_concurrency: NonZeroUsize::new(concurrency).unwrap_or(NonZeroUsize::MIN),
        ..SessionConfig::default()
    };
    let session = Session::with_config(BlockingVectorizer, config);
    session
        .edit_settings(settings)
        .await
        .map_err(|e| format!("Error: {e}"))?;

    let image = load_image(image_path)?;
    std::fs::create_dir_all(out_dir)
        .map_err(|e| format!("Error creating {}: {e}", out_dir.display()))?;

    let opened = session.open_image(image.clone()).await;
    if let Err(e) = &opened.preview {
        warn!("initial trace failed: {e}");
    }

    let grid = session
        .sweep()
        .grid()
        .ok_or("Error: sweep produced no grid")?;
    let file_name = suggested_file_name(image.name());
    let stem = file_name
        .strip_suffix(&format!(".{SVG_EXTENSION}"))
        .unwrap_or(&file_name);
    for cell in grid.cells() {
        if let CellState::Ready(result) = &cell.state {
            let path = out_dir.join(format!(
                "{stem}-r{}c{}.{SVG_EXTENSION}",
                cell.row, cell.col
            ));
            std::fs::write(&path, result.markup.as_bytes())
                .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
        }
    }
    info!(
        "wrote {} of {} sweep cells to {}",
        opened.sweep.ready,
        grid.cells().len(),
        out_dir.display()
    );
    println!("{}", grid_report(&grid));

    if let Some((row, col)) = select {
        session
            .select(row, col)
            .await
            .map_err(|e| format!("Error: {e}"))?;
        let artifact = session.export().map_err(|e| format!("Error: {e}"))?;
        write_artifact(&out_dir.join(&artifact.file_name), &artifact)?;
    }

    Ok(())
}

/// Text table of markup sizes: rows are turd sizes, columns thresholds.
fn grid_report(grid: &SweepGrid) -> String {
    let mut out = String::from("turd \\ threshold");
    for threshold in threshold_axis() {
        let _ = write!(out, "{threshold:>10}");
    }
    for (row, turd_size) in turd_size_axis().into_iter().enumerate() {
        let _ = write!(out, "\n{turd_size:>16.1}");
        for col in 0..GRID_SIZE {
            let entry = match grid.cell(row, col).map(|c| &c.state) {
                Some(CellState::Ready(result)) => result.markup.len().to_string(),
                Some(CellState::Absent { .. }) => "failed".to_owned(),
                Some(CellState::Pending) | None => "-".to_owned(),
            };
            let _ = write!(out, "{entry:>10}");
        }
    }
    out
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Trace {
            image,
            settings,
            output,
        } => run_trace(image, settings, output.clone()).await,
        Command::Sweep {
            image,
            out_dir,
            concurrency,
            select,
            settings,
        } => run_sweep(image, out_dir, *concurrency, *select, settings).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}
