//! hsiview command-line front end.
//!
//! Inspect a cube, extract spectral signatures to CSV, or write a synthetic
//! demo cube.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ndarray_npy::WriteNpyExt;
use thiserror::Error;

use hsiview::constants::{DEFAULT_TEST_BANDS, DEFAULT_TEST_HEIGHT, DEFAULT_TEST_WIDTH};
use hsiview::data::destandardize;
use hsiview::{AxisOrder, EngineConfig, EngineError, LoaderRegistry, Session};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write array: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),
}

/// Hyperspectral cube inspection and spectral signature export.
#[derive(Parser)]
#[command(name = "hsiview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dimensions and value range of a cube
    Info {
        /// Cube file or directory
        path: PathBuf,

        /// Format tag (npy, mat, hdr, tif, png...); detected when omitted
        #[arg(short, long)]
        format: Option<String>,

        /// On-disk axis order (chw, cwh, hwc, whc)
        #[arg(short, long, value_parser = parse_axis_order)]
        order: Option<AxisOrder>,
    },

    /// Extract spectra at pixel coordinates and write them as CSV
    Export {
        /// Cube file or directory
        path: PathBuf,

        /// Pixel coordinate as `x,y`; may be repeated
        #[arg(short, long = "point", value_parser = parse_point, required = true)]
        points: Vec<(usize, usize)>,

        /// Format tag; detected when omitted
        #[arg(short, long)]
        format: Option<String>,

        /// On-disk axis order (chw, cwh, hwc, whc)
        #[arg(long, value_parser = parse_axis_order)]
        order: Option<AxisOrder>,

        /// Wavelength of the first channel (nm)
        #[arg(long)]
        start: Option<f64>,

        /// Wavelength of the last channel (nm)
        #[arg(long)]
        end: Option<f64>,

        /// Flip rows before sampling
        #[arg(long)]
        flip_vertical: bool,

        /// Flip columns before sampling
        #[arg(long)]
        flip_horizontal: bool,

        /// Rotate 90° counter-clockwise this many times before sampling
        #[arg(long, default_value = "0")]
        rotate: u8,

        /// Output CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a synthetic cube as a channel-first .npy file
    Demo {
        /// Output .npy file
        output: PathBuf,

        /// Image height
        #[arg(long, default_value_t = DEFAULT_TEST_HEIGHT)]
        height: usize,

        /// Image width
        #[arg(long, default_value_t = DEFAULT_TEST_WIDTH)]
        width: usize,

        /// Number of bands
        #[arg(long, default_value_t = DEFAULT_TEST_BANDS)]
        bands: usize,
    },
}

fn parse_axis_order(value: &str) -> std::result::Result<AxisOrder, String> {
    value.parse().map_err(|e: EngineError| e.to_string())
}

fn parse_point(value: &str) -> std::result::Result<(usize, usize), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {:?}", value))?;
    let x = x.trim().parse::<usize>().map_err(|e| format!("invalid x: {}", e))?;
    let y = y.trim().parse::<usize>().map_err(|e| format!("invalid y: {}", e))?;
    Ok((x, y))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = EngineConfig::load_from_default_path().unwrap_or_default();

    let level = config.preferences.log_level.more_verbose(cli.verbose);
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &EngineConfig) -> Result<()> {
    match command {
        Commands::Info {
            path,
            format,
            order,
        } => {
            let session = open(&path, format, order, config)?;
            print_info(&session);
            Ok(())
        }

        Commands::Export {
            path,
            points,
            format,
            order,
            start,
            end,
            flip_vertical,
            flip_horizontal,
            rotate,
            output,
        } => {
            let mut session = open(&path, format, order, config)?;

            if flip_vertical {
                session.flip_vertical()?;
            }
            if flip_horizontal {
                session.flip_horizontal()?;
            }
            for _ in 0..rotate % 4 {
                session.rotate90()?;
            }

            if start.is_some() || end.is_some() {
                session.set_wavelength_range(start, end)?;
            } else {
                let prefs = &config.preferences;
                session.set_wavelength_range(prefs.wavelength_start, prefs.wavelength_end)?;
            }

            for (x, y) in points {
                session.add_point(x, y)?;
            }

            let output =
                output.unwrap_or_else(|| PathBuf::from(&config.preferences.export_filename));
            session.export_to_path(&output)?;
            println!(
                "Wrote {} point(s) to {}",
                session.points().len(),
                output.display()
            );
            Ok(())
        }

        Commands::Demo {
            output,
            height,
            width,
            bands,
        } => {
            let cube = hsiview::synthetic::generate_cube(height, width, bands)?;
            let raw = destandardize(&cube, AxisOrder::Chw);
            raw.write_npy(BufWriter::new(File::create(&output)?))?;
            println!(
                "Wrote {}x{}x{} cube (chw) to {}",
                bands,
                height,
                width,
                output.display()
            );
            Ok(())
        }
    }
}

/// Load `path` into a fresh session, filling unset options from the config.
fn open(
    path: &Path,
    format: Option<String>,
    order: Option<AxisOrder>,
    config: &EngineConfig,
) -> Result<Session> {
    let tag = match format {
        Some(tag) => tag,
        None if path.is_file() => LoaderRegistry::new().detect(path)?.tag().to_string(),
        None => config.preferences.default_format.clone(),
    };
    let order = order.unwrap_or(config.preferences.default_axis_order);

    let mut session = Session::new();
    session.load_cube(path, &tag, order)?;
    Ok(session)
}

fn print_info(session: &Session) {
    let Some(loaded) = session.loaded() else {
        return;
    };
    let cube = &loaded.cube;
    let (min, max) = cube
        .data()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    println!("Source:   {}", loaded.source.display());
    println!("Format:   {}", loaded.kind);
    println!("{}", loaded.dimension_info());
    println!(
        "Height: {}  Width: {}  Channels: {}",
        cube.height(),
        cube.width(),
        cube.channels()
    );
    println!("Values:   [{}, {}]", min, max);
}
