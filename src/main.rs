use clap::{Args, Parser, Subcommand};
use pixfit::batch::{self, BatchError};
use pixfit::config::{self, ConfigError, EngineConfig};
use pixfit::engine::{
    BackendKind, EngineError, ErrorKind, Filter, FlipAxis, ImageEngine, ImageSource, Operation,
    OutputFormat, Quality, TransformOptions,
};
use pixfit::output;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "pixfit")]
#[command(about = "Resize, thumbnail, rotate, flip and fit images")]
#[command(long_about = "\
Resize, thumbnail, rotate, flip and fit images

The input codec is chosen from the file extension; content is never sniffed.
Output keeps the input format unless --format is given.

A width or height of 0 takes that axis from the source image.

Exit codes:
  0  success
  1  usage, config or IO error
  2  batch finished with failed jobs
  3  operation not implemented by the backend
  4  source could not be decoded
  5  source header could not be read
  6  transform or encode failed

Run 'pixfit gen-config' to generate a documented pixfit.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./pixfit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured backend (rust, extended)
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Input/output flags shared by every transform.
#[derive(Args, Clone)]
struct IoArgs {
    /// Source image
    input: PathBuf,

    /// Destination (default: <stem>-<operation>.<ext> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format override (jpeg, png, tiff, webp, gif, bmp, avif)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// JPEG/AVIF quality 1-100 (default from config)
    #[arg(long)]
    quality: Option<u32>,
}

/// Geometry flags for resize, thumbnail and fit.
#[derive(Args, Clone)]
struct GeometryArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Target width (0 = source width)
    #[arg(long, default_value_t = 0)]
    width: u32,

    /// Target height (0 = source height)
    #[arg(long, default_value_t = 0)]
    height: u32,

    /// Resampling filter (nearest, triangle, catmull-rom, gaussian, lanczos3)
    #[arg(long)]
    filter: Option<Filter>,
}

#[derive(Subcommand)]
enum Command {
    /// Resize to exactly width x height
    Resize(GeometryArgs),
    /// Scale to cover width x height, then center-crop
    Thumbnail(GeometryArgs),
    /// Scale to fit inside width x height
    Fit(GeometryArgs),
    /// Rotate clockwise by 90, 180 or 270 degrees
    Rotate {
        #[command(flatten)]
        io: IoArgs,
        /// Clockwise angle in degrees
        #[arg(long)]
        degrees: u32,
    },
    /// Mirror horizontally or vertically
    Flip {
        #[command(flatten)]
        io: IoArgs,
        /// Axis: horizontal (h) or vertical (v)
        #[arg(long)]
        axis: FlipAxis,
    },
    /// Print the dimensions of an image
    Identify {
        /// Source image
        input: PathBuf,
    },
    /// Run a JSON list of jobs in parallel
    Batch {
        /// JSON file: [{"input": ..., "output": ..., "options": {...}}]
        manifest: PathBuf,
    },
    /// Print a stock pixfit.toml with all options documented
    GenConfig,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Engine(e) => match e.kind() {
                ErrorKind::NotImplemented => ExitCode::from(3),
                ErrorKind::Decode => ExitCode::from(4),
                ErrorKind::Header => ExitCode::from(5),
                ErrorKind::Transform => ExitCode::from(6),
            },
            _ => ExitCode::from(1),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    // gen-config must work even when ./pixfit.toml is broken, so the engine
    // is only built for commands that use it.
    let setup = || -> Result<(EngineConfig, Box<dyn ImageEngine>), CliError> {
        let mut engine_config = load_engine_config(cli.config.as_deref())?;
        if let Some(backend) = cli.backend {
            engine_config.backend = backend;
        }
        let engine = engine_config.build_engine();
        Ok((engine_config, engine))
    };

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(ExitCode::SUCCESS)
        }
        Command::Resize(ref args) => {
            let (_, engine) = setup()?;
            transform_file(&*engine, Operation::Resize, args, cli.json)
        }
        Command::Thumbnail(ref args) => {
            let (_, engine) = setup()?;
            transform_file(&*engine, Operation::Thumbnail, args, cli.json)
        }
        Command::Fit(ref args) => {
            let (_, engine) = setup()?;
            transform_file(&*engine, Operation::Fit, args, cli.json)
        }
        Command::Rotate { ref io, degrees } => {
            let (_, engine) = setup()?;
            let options = TransformOptions {
                rotation: Some(degrees),
                ..base_options(Operation::Rotate, io)
            };
            write_transform(&*engine, io, options, cli.json)
        }
        Command::Flip { ref io, axis } => {
            let (_, engine) = setup()?;
            let options = TransformOptions {
                flip: Some(axis),
                ..base_options(Operation::Flip, io)
            };
            write_transform(&*engine, io, options, cli.json)
        }
        Command::Identify { ref input } => {
            let (_, engine) = setup()?;
            let source = ImageSource::from_path(input)?;
            let dims = engine.identify(&source)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&dims)?);
            } else {
                output::print_identify_output(input, dims);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Batch { ref manifest } => {
            let (cfg, engine) = setup()?;
            let jobs = batch::parse_jobs(&std::fs::read_to_string(manifest)?)?;
            let threads = config::effective_threads(&cfg.concurrency);
            let reports = batch::run_jobs(&*engine, &jobs, threads)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                output::print_batch_output(&reports);
            }
            if reports.iter().all(|r| r.is_ok()) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(2))
            }
        }
    }
}

/// Explicit `--config` must exist; otherwise `./pixfit.toml` is optional.
fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    match path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

fn base_options(operation: Operation, io: &IoArgs) -> TransformOptions {
    TransformOptions {
        operation,
        format: io.format,
        quality: io.quality.map(Quality::new),
        ..TransformOptions::default()
    }
}

fn transform_file(
    engine: &dyn ImageEngine,
    operation: Operation,
    args: &GeometryArgs,
    json: bool,
) -> Result<ExitCode, CliError> {
    let options = TransformOptions {
        width: args.width,
        height: args.height,
        filter: args.filter,
        ..base_options(operation, &args.io)
    };
    write_transform(engine, &args.io, options, json)
}

fn write_transform(
    engine: &dyn ImageEngine,
    io: &IoArgs,
    options: TransformOptions,
    json: bool,
) -> Result<ExitCode, CliError> {
    let source = ImageSource::from_path(&io.input)?;
    let result = engine.transform(&source, &options)?;
    let output_path = io
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&io.input, options.operation, result.format));
    std::fs::write(&output_path, &result.bytes)?;

    if json {
        let report = serde_json::json!({
            "input": io.input,
            "output": output_path,
            "operation": options.operation,
            "format": result.format,
            "mime_type": result.mime_type(),
            "width": result.dimensions.width,
            "height": result.dimensions.height,
            "bytes": result.len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_transform_output(&io.input, &output_path, options.operation, &result);
    }
    Ok(ExitCode::SUCCESS)
}

/// `photos/cat.png` + thumbnail + webp → `photos/cat-thumbnail.webp`
fn default_output_path(input: &Path, operation: Operation, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{stem}-{operation}.{}", format.extension()))
}
