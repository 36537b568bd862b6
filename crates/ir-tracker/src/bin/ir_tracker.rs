//! ir-tracker CLI: inspect tool configurations and replay recorded frames.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ir_tracker::blobs::BlobDetectionMethod;
use ir_tracker::core::PinholeUnmap;
use ir_tracker::frames::load_raw_frame;
use ir_tracker::{FrameInput, ToolTracker, TrackerConfig};
#[cfg(not(feature = "tracing"))]
use log::LevelFilter;
use nalgebra::Matrix4;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "ir-tracker")]
#[command(about = "Track infrared marker tools in depth-camera frames")]
#[command(version)]
struct Cli {
    /// Log at debug level.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a tool configuration and list the tools it defines.
    CheckConfig {
        /// Path to the JSON tool configuration.
        config: PathBuf,
    },
    /// Track tools in one recorded frame pair and print a JSON report.
    Track {
        /// Path to the JSON tool configuration.
        #[arg(long)]
        config: PathBuf,

        /// 16-bit infrared (active brightness) PNG.
        #[arg(long)]
        ab: PathBuf,

        /// 16-bit depth PNG, same resolution as the infrared image.
        #[arg(long)]
        depth: PathBuf,

        /// Pinhole focal length x (pixels).
        #[arg(long)]
        fx: f64,
        /// Pinhole focal length y (pixels).
        #[arg(long)]
        fy: f64,
        /// Principal point x (pixels).
        #[arg(long)]
        cx: f64,
        /// Principal point y (pixels).
        #[arg(long)]
        cy: f64,

        /// Depth-camera-to-world transform, 16 numbers row by row.
        #[arg(long, num_args = 16, allow_negative_numbers = true, value_name = "M")]
        depth_to_world: Vec<f64>,

        /// Use the slower sub-pixel blob refinement.
        #[arg(long)]
        refined: bool,

        /// Write labelled `ab_display.png` and `depth_display.png` here.
        #[arg(long)]
        display_dir: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::CheckConfig { config } => run_check_config(&config),
        Commands::Track {
            config,
            ab,
            depth,
            fx,
            fy,
            cx,
            cy,
            depth_to_world,
            refined,
            display_dir,
        } => run_track(TrackArgs {
            config,
            ab,
            depth,
            intrinsics: [fx, fy, cx, cy],
            depth_to_world,
            refined,
            display_dir,
        }),
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = ir_tracker::core::init_with_level(level);
}

// Verbosity comes from `RUST_LOG` here.
#[cfg(feature = "tracing")]
fn init_logging(_verbose: bool) {
    ir_tracker::core::init_tracing(false);
}

fn run_check_config(path: &Path) -> CliResult<()> {
    let config = TrackerConfig::load_json(path)
        .map_err(|e| -> CliError { format!("{}: {e}", path.display()).into() })?;
    let tools = config.build_dictionary();

    for tool in tools.iter() {
        println!("{}\t{}\t{} markers", tool.id, tool.name, tool.geometry.len());
    }
    println!(
        "{} tools loaded ({} entries skipped)",
        tools.len(),
        config.skipped_entries + config.tools.len() - tools.len()
    );
    Ok(())
}

struct TrackArgs {
    config: PathBuf,
    ab: PathBuf,
    depth: PathBuf,
    intrinsics: [f64; 4],
    depth_to_world: Vec<f64>,
    refined: bool,
    display_dir: Option<PathBuf>,
}

fn run_track(args: TrackArgs) -> CliResult<()> {
    let config = TrackerConfig::load_json(&args.config)
        .map_err(|e| -> CliError { format!("{}: {e}", args.config.display()).into() })?;

    let depth_to_world = match args.depth_to_world.len() {
        0 => Matrix4::identity(),
        16 => Matrix4::from_row_slice(&args.depth_to_world),
        n => return Err(format!("--depth-to-world needs 16 values, got {n}").into()),
    };

    let ab = load_raw_frame(&args.ab)?;
    let depth = load_raw_frame(&args.depth)?;
    if (ab.width, ab.height) != (depth.width, depth.height) {
        return Err(format!(
            "infrared is {}x{} but depth is {}x{}",
            ab.width, ab.height, depth.width, depth.height
        )
        .into());
    }
    log::info!("frame {}x{}", ab.width, ab.height);

    let mut params = config.tracker;
    params.width = ab.width;
    params.height = ab.height;
    if args.refined {
        params.method = BlobDetectionMethod::RefineByScaling;
    }

    let [fx, fy, cx, cy] = args.intrinsics;
    let mut tracker = ToolTracker::new(params, config.build_dictionary());
    tracker.set_unmap(PinholeUnmap::new(fx, fy, cx, cy, ab.width, ab.height));
    tracker.set_display_enabled(args.display_dir.is_some());

    let summary = tracker.process_frame(&FrameInput {
        ab: &ab.data,
        depth: &depth.data,
        depth_to_world,
    })?;

    let tools: Vec<serde_json::Value> = tracker
        .tools()
        .iter()
        .map(|t| {
            serde_json::json!({
                "id": t.id,
                "name": t.name,
                "visible": t.visible,
                "pose_world": t.pose_world.to_column_major(),
                "pose_sensor": t.pose_sensor.to_column_major(),
                "observed_pixels": t.observed_pixels.iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
            })
        })
        .collect();
    let report = serde_json::json!({
        "width": ab.width,
        "height": ab.height,
        "blobs_2d": summary.blobs_2d,
        "blobs_3d": summary.blobs_3d,
        "tracked_tools": summary.tracked_tools,
        "tools": tools,
        "serialized": tracker.serialized(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let (Some(dir), Some((ab_img, depth_img))) = (&args.display_dir, tracker.display_images()) {
        std::fs::create_dir_all(dir)?;
        ab_img.save(dir.join("ab_display.png"))?;
        depth_img.save(dir.join("depth_display.png"))?;
        log::info!("display images written to {}", dir.display());
    }

    Ok(())
}
