use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use log::info;
use viewcal_core::{
    AngleConvention, AngleVerification, Config, MeshSampling, RectBounds, ReferenceAxes, Real,
    ScreenBoundsMode,
};
use viewcal_pipeline::{calibrate_screens, document::DisplayDocument};

mod input;

use input::load_measurements;

/// Builds a display configuration from view-angle measurements.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fit screen geometry and distortion meshes from view-angle measurements"
)]
struct Args {
    /// Measurement tables, one per screen (eye), in output order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Screen normalization rectangle instead of the measured extents.
    #[arg(
        long,
        num_args = 4,
        value_names = ["LEFT", "RIGHT", "TOP", "BOTTOM"],
        allow_negative_numbers = true
    )]
    screen_bounds: Option<Vec<Real>>,

    /// Mirror the supplied bounds about x = 0, e.g. to reuse one eye's
    /// bounds for the other.
    #[arg(long, requires = "screen_bounds")]
    mirror_bounds: bool,

    /// Read angles as longitude/latitude instead of field angles.
    #[arg(long)]
    lat_long: bool,

    /// Scale from measurement units to meters.
    #[arg(long)]
    to_meters: Option<Real>,

    /// Distance from the eye at which view rays are placed.
    #[arg(long)]
    depth: Option<Real>,

    /// Check fitted angles against the inputs.
    #[arg(
        long,
        num_args = 5,
        value_names = ["XX", "XY", "YX", "YY", "MAX_DIFF_DEG"],
        allow_negative_numbers = true
    )]
    verify_angles: Option<Vec<Real>>,

    /// Resample the mesh on a regular grid instead of the measured points.
    #[arg(long, num_args = 2, value_names = ["COLS", "ROWS"])]
    grid: Option<Vec<usize>>,

    /// How far grid points may lie outside the measured area.
    #[arg(long, default_value_t = 0.05)]
    grid_margin: Real,

    /// Overlap between the two eyes' screens, in percent.
    #[arg(long)]
    overlap: Option<Real>,

    /// Output file; stdout if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(b) = &args.screen_bounds {
        let bounds = RectBounds {
            left: b[0],
            right: b[1],
            top: b[2],
            bottom: b[3],
        };
        config.screen_bounds = ScreenBoundsMode::Supplied(if args.mirror_bounds {
            bounds.reflected_horizontally()
        } else {
            bounds
        });
    }
    if args.lat_long {
        config.angle_convention = AngleConvention::LongitudeLatitude;
    }
    if let Some(to_meters) = args.to_meters {
        config.to_meters = to_meters;
    }
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if let Some(v) = &args.verify_angles {
        config.verify_angles = Some(AngleVerification {
            axes: ReferenceAxes {
                xx: v[0],
                xy: v[1],
                yx: v[2],
                yy: v[3],
            },
            max_angle_diff_deg: v[4],
        });
    }
    if let Some(g) = &args.grid {
        config.mesh = MeshSampling::Grid {
            cols: g[0],
            rows: g[1],
            margin: args.grid_margin,
        };
    }
    if let Some(overlap) = args.overlap {
        config.overlap_percent = overlap;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<String> {
    let config = load_config(args)?;
    let inputs = args
        .inputs
        .iter()
        .map(PathBuf::as_path)
        .map(load_measurements)
        .collect::<Result<Vec<_>>>()?;

    let mut screens = Vec::with_capacity(inputs.len());
    let mut failures = Vec::new();
    for (input, result) in inputs.iter().zip(calibrate_screens(&inputs, &config)) {
        match result {
            Ok(screen) => screens.push(screen),
            Err(err) => failures.push(format!("{}: {err}", input.source)),
        }
    }
    if !failures.is_empty() {
        bail!("calibration failed:\n  {}", failures.join("\n  "));
    }

    let document = DisplayDocument::from_screens(&screens)
        .context("no screens to write a configuration for")?;
    Ok(document.to_json_pretty()?)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let json = run(&args)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
