use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use scenestill::{
    Candidate, DetectionOptions, FfmpegLogLevel, ImageFormat, MediaFile, OperationType,
    OutputOptions, Pipeline, PipelineConfig, ProgressCallback, ProgressInfo, SavedImage,
    ScenePass, TargetedExtractor,
};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  scenestill extract input.mp4 --out stills\n  scenestill extract input.mp4 --out stills --threshold 6 --min-interval 2 --format png\n  scenestill detect input.mp4 --save candidates.json\n  scenestill decode input.mp4 --candidates candidates.json --out stills\n  scenestill completions zsh > _scenestill";

#[derive(Debug, Parser)]
#[command(
    name = "scenestill",
    version,
    about = "Detect scene cuts from packet sizes and save a still at each cut",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress spinner.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow writing into an existing output directory or file.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Args, Clone)]
struct DetectionArgs {
    /// Size multiple over the rolling baseline that marks a cut.
    #[arg(long, default_value_t = scenestill::configuration::DEFAULT_RATIO_THRESHOLD)]
    threshold: f64,
    /// Minimum seconds between two cuts.
    #[arg(long, default_value_t = scenestill::configuration::DEFAULT_MIN_INTERVAL_SECONDS)]
    min_interval: f64,
    /// Number of prior packets averaged into the baseline.
    #[arg(long, default_value_t = scenestill::configuration::DEFAULT_ROLLING_WINDOW_SIZE)]
    window: usize,
    /// Packets to observe before detection starts.
    #[arg(long, default_value_t = scenestill::configuration::DEFAULT_MINIMUM_WARMUP_PACKETS)]
    warmup: usize,
}

impl DetectionArgs {
    fn to_options(&self) -> DetectionOptions {
        DetectionOptions::new()
            .ratio_threshold(self.threshold)
            .min_interval_seconds(self.min_interval)
            .rolling_window_size(self.window)
            .minimum_warmup_packets(self.warmup)
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Detect cuts and save one still per cut.
    #[command(
        about = "Detect scene cuts and extract stills",
        after_help = "Examples:\n  scenestill extract input.mp4 --out stills\n  scenestill extract input.mp4 --out stills --threshold 6 --json"
    )]
    Extract {
        /// Input video path.
        input: PathBuf,
        /// Output directory for stills.
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        detection: DetectionArgs,
        /// Image format (jpg, png, bmp, tiff).
        #[arg(long, default_value = "jpg")]
        format: String,
        /// Print the run summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run only the packet scan and list candidates.
    #[command(
        about = "List scene-cut candidates without decoding",
        after_help = "Examples:\n  scenestill detect input.mp4\n  scenestill detect input.mp4 --threshold 5 --save candidates.json"
    )]
    Detect {
        /// Input video path.
        input: PathBuf,
        #[command(flatten)]
        detection: DetectionArgs,
        /// Print candidates as JSON.
        #[arg(long)]
        json: bool,
        /// Store candidates as JSON for `decode`.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Decode stills for a stored candidate list.
    #[command(
        about = "Extract stills for saved candidates",
        after_help = "Examples:\n  scenestill decode input.mp4 --candidates candidates.json --out stills"
    )]
    Decode {
        /// Input video path.
        input: PathBuf,
        /// JSON candidate list written by `detect --save`.
        #[arg(long)]
        candidates: PathBuf,
        /// Output directory for stills.
        #[arg(long)]
        out: PathBuf,
        /// Image format (jpg, png, bmp, tiff).
        #[arg(long, default_value = "jpg")]
        format: String,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let message = match info.operation {
            OperationType::PacketScan => match info.current_timestamp {
                Some(seconds) => format!("scanning packets: {} ({seconds:.1}s)", info.current),
                None => format!("scanning packets: {}", info.current),
            },
            OperationType::TargetedDecode => format!(
                "decoding candidates: {}/{}",
                info.current,
                info.total.unwrap_or(info.current)
            ),
            _ => return,
        };
        self.bar.set_message(message);
        self.bar.tick();
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "scenestill=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(global.verbose);
    if let Some(level) = &global.log_level {
        let parsed: FfmpegLogLevel = level.parse()?;
        scenestill::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

fn ensure_output_dir(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    let occupied = path.is_dir() && fs::read_dir(path)?.next().is_some();
    if occupied {
        if !overwrite {
            return Err(format!(
                "output directory is not empty: {} (use --overwrite)",
                path.display()
            )
            .into());
        }
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("writing into existing directory {}", path.display()).yellow()
        );
    }
    Ok(())
}

fn ensure_writable_file(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !overwrite {
        return Err(format!(
            "output already exists: {} (use --overwrite to replace)",
            path.display()
        )
        .into());
    }
    Ok(())
}

fn print_saved(image: &SavedImage) {
    let file_name = image
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| image.path.display().to_string());
    println!(
        "  [{} frame {:.1}x]  {}",
        image.frame_type, image.ratio, file_name
    );
}

fn print_candidates(candidates: &[Candidate]) {
    for candidate in candidates {
        println!(
            "cut at {:.3}s ({} frame, {} bytes, {:.1}x over {:.0})",
            candidate.timestamp,
            candidate.frame_type,
            candidate.size,
            candidate.ratio,
            candidate.baseline,
        );
    }
}

fn suggest_lower_threshold(threshold: f64) {
    eprintln!(
        "{} {}",
        "warning:".yellow().bold(),
        format!("no scene changes detected; try a --threshold below {threshold}").yellow()
    );
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    let progress = cli.global.progress.then(|| Arc::new(TerminalProgress::new()));

    match cli.command {
        Commands::Extract {
            input,
            out,
            detection,
            format,
            json,
        } => {
            let image_format: ImageFormat = format.parse()?;
            ensure_output_dir(&out, cli.global.overwrite)?;

            let mut config = PipelineConfig::new()
                .with_detection(detection.to_options())
                .with_output(OutputOptions::new().format(image_format));
            if let Some(progress) = &progress {
                config = config.with_progress(progress.clone()).with_batch_size(250);
            }

            let report = Pipeline::new(config).run(&input, &out)?;
            if let Some(progress) = &progress {
                progress.finish();
            }

            if json {
                let payload = json!({
                    "candidates": report.candidates,
                    "packets_read": report.scan_statistics.packets_read,
                    "images": report.images.iter().map(|image| json!({
                        "timestamp_seconds": image.timestamp,
                        "path": image.path.display().to_string(),
                        "frame_type": image.frame_type,
                        "ratio": image.ratio,
                    })).collect::<Vec<_>>(),
                    "decode_failures": report.decode_failures,
                    "write_failures": report.write_failures,
                    "unmatched": report.unmatched,
                    "output_dir": report.output_dir.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            println!(
                "pass 1: {} candidate(s) in {} packet(s)",
                report.candidates.len(),
                report.scan_statistics.packets_read
            );
            if report.candidates.is_empty() {
                suggest_lower_threshold(detection.threshold);
            } else {
                println!("pass 2: decoding {} candidate(s)", report.candidates.len());
                for image in &report.images {
                    print_saved(image);
                }
                let skipped = report.decode_failures + report.write_failures + report.unmatched;
                if skipped > 0 {
                    eprintln!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        format!(
                            "skipped {skipped} candidate(s): {} decode, {} write, {} not found",
                            report.decode_failures, report.write_failures, report.unmatched
                        )
                        .yellow()
                    );
                }
            }

            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "Saved {} still(s) to {}",
                    report.images_written(),
                    report.output_dir.display()
                )
                .green()
            );
        }
        Commands::Detect {
            input,
            detection,
            json,
            save,
        } => {
            if let Some(path) = &save {
                ensure_writable_file(path, cli.global.overwrite)?;
            }

            let media = MediaFile::new(&input)?;
            let mut pass = ScenePass::new(detection.to_options());
            if let Some(progress) = &progress {
                pass = pass.with_progress(progress.clone(), 250);
            }
            let candidates = pass.run(&media)?;
            if let Some(progress) = &progress {
                progress.finish();
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&candidates)?);
            } else {
                print_candidates(&candidates);
                println!("{} candidate(s)", candidates.len());
                if candidates.is_empty() {
                    suggest_lower_threshold(detection.threshold);
                }
            }

            if let Some(path) = save {
                fs::write(&path, serde_json::to_string_pretty(&candidates)?)?;
                println!("{} {}", "saved".green().bold(), path.display());
            }
        }
        Commands::Decode {
            input,
            candidates,
            out,
            format,
        } => {
            let image_format: ImageFormat = format.parse()?;
            let candidates: Vec<Candidate> =
                serde_json::from_str(&fs::read_to_string(&candidates)?)?;

            ensure_output_dir(&out, cli.global.overwrite)?;
            fs::create_dir_all(&out)?;

            let media = MediaFile::new(&input)?;
            let mut extractor = TargetedExtractor::new(OutputOptions::new().format(image_format));
            if let Some(progress) = &progress {
                extractor = extractor.with_progress(progress.clone(), 1);
            }

            println!("decoding {} candidate(s)", candidates.len());
            let report = extractor.run(&media, candidates, &out)?;
            if let Some(progress) = &progress {
                progress.finish();
            }

            for image in &report.images {
                print_saved(image);
            }
            println!(
                "{} {}",
                "success:".green().bold(),
                format!("Saved {} still(s) to {}", report.images.len(), out.display()).green()
            );
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "scenestill", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
