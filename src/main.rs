use clap::{Parser, Subcommand, ValueEnum};
use simple_resize::config::{self, Overrides};
use simple_resize::imaging::RustBackend;
use simple_resize::naming::OutputTarget;
use simple_resize::process::{self, BatchReport, ResizeRequest};
use simple_resize::types::{InterpolationMode, OutputFormat, PixelOffsetMode, SmoothingMode};
use simple_resize::{output, scan};
use std::path::PathBuf;
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-resize")]
#[command(about = "Batch image resizer with format conversion and EXIF carry-over")]
#[command(long_about = "\
Batch image resizer with format conversion and EXIF carry-over

Inputs may be image files, directories (their immediate files), or `-` to read
newline-separated paths from stdin. Supported inputs: jpg, jpeg, png, gif, bmp,
tiff. Anything else is skipped with a warning.

Sizing:
  --max-width 800               fit within 800px wide, height follows the ratio
  --max-width 800 --max-height 600
                                fit within 800x600, ratio preserved
  --max-width 800 --max-height 600 --disable-ratio
                                stretch to exactly 800x600
  (no bounds)                   keep the size, just re-encode

Output:
  -o existing-dir/              each output keeps its input file name
  -o file.jpg                   write to that path
  The extension always follows --format (-o out.jpg -f png writes out.png).

The source EXIF block is copied into jpg/jpeg/png outputs unless
--disable-exif is given. Modification times are always carried over.

Exit status: 0 if every file was written or skipped, 1 if any file failed,
2 on a fatal environment or configuration error.

Run 'simple-resize gen-config' to generate a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Log verbosity (defaults to RUST_LOG, else warn)
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize, convert, and re-encode images
    Resize(ResizeArgs),
    /// Print a stock config file with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ResizeArgs {
    /// Image files or directories; `-` reads paths from stdin
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file, or an existing directory
    #[arg(short, long)]
    output: PathBuf,

    /// Output format [default: jpg]
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Bounding width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_width: Option<u32>,

    /// Bounding height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_height: Option<u32>,

    /// Stretch to the exact bounds instead of fitting within them
    #[arg(long)]
    disable_ratio: bool,

    /// Do not copy the source EXIF block
    #[arg(long)]
    disable_exif: bool,

    /// Smoothing mode [default: high-quality]
    #[arg(long, value_enum)]
    smoothing: Option<SmoothingMode>,

    /// Interpolation mode [default: high-quality-bicubic]
    #[arg(long, value_enum)]
    interpolation: Option<InterpolationMode>,

    /// Pixel offset mode [default: high-quality]
    #[arg(long, value_enum)]
    pixel_offset: Option<PixelOffsetMode>,

    /// JPEG quality, 1-100 [default: 90]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Descend into sub-directories of directory inputs
    #[arg(short, long)]
    recursive: bool,

    /// Maximum parallel workers [default: CPU cores]
    #[arg(short, long)]
    jobs: Option<usize>,

    /// TOML config file; command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON report of every file's outcome
    #[arg(long)]
    report: Option<PathBuf>,
}

impl ResizeArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            format: self.format,
            quality: self.quality,
            max_width: self.max_width,
            max_height: self.max_height,
            disable_ratio: self.disable_ratio,
            disable_exif: self.disable_exif,
            smoothing: self.smoothing,
            interpolation: self.interpolation,
            pixel_offset: self.pixel_offset,
            max_processes: self.jobs,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn setup_logging(level: Option<LogLevel>) {
    match level {
        Some(level) => env_logger::Builder::new()
            .filter_level(level.into())
            .format_timestamp(None)
            .init(),
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .format_timestamp(None)
            .init(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.log_level);

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            ExitCode::SUCCESS
        }
        Command::Resize(args) => match run_resize(args) {
            Ok(report) if report.has_failures() => ExitCode::FAILURE,
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{e}");
                ExitCode::from(2)
            }
        },
    }
}

fn run_resize(args: ResizeArgs) -> Result<BatchReport, Box<dyn std::error::Error>> {
    // Nothing is touched until the codecs are known to work
    let backend = RustBackend::initialize()?;
    let config = config::load_config(args.config.as_deref(), &args.overrides())?;
    init_thread_pool(&config.processing);

    let inputs = scan::expand_stdin_inputs(args.inputs, std::io::stdin().lock())?;
    let worklist = scan::build_worklist(&inputs, args.recursive);
    let target = OutputTarget::prepare(&args.output, worklist.multi_file).map_err(|e| {
        format!(
            "failed to create output directory {}: {e}",
            args.output.display()
        )
    })?;

    let request = ResizeRequest {
        target,
        settings: config.render_settings(),
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_process_event(&event);
        }
    });
    let report = process::process_batch(&backend, &worklist.entries, &request, Some(tx));
    if printer.join().is_err() {
        log::error!("output thread panicked");
    }
    output::print_batch_summary(&report);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)?;
        log::info!("report written to {}", path.display());
    }

    Ok(report)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
