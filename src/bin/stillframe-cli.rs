use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use stillframe::{
    FfmpegExtractor, RenderOptions, RenderRequest, RenderResult, Renderer, StillframeError,
    clock_seeded_rng,
};

const CLI_AFTER_HELP: &str = "Examples:\n  stillframe --video movie.mkv --subtitle movie.en.vtt\n  stillframe --video movie.mkv --subtitle movie.en.srt --output still.png --overwrite\n  stillframe --video movie.mkv --subtitle movie.en.vtt --seed 42 --json\n  stillframe --completions zsh > _stillframe";

#[derive(Debug, Parser)]
#[command(
    name = "stillframe",
    version,
    about = "Burn a random subtitle line onto the matching video frame",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Path to the video file.
    #[arg(long)]
    video: Option<PathBuf>,

    /// Path to the subtitle track (.vtt or .srt).
    #[arg(long)]
    subtitle: Option<PathBuf>,

    /// Path for the output PNG. Defaults to a new file in the temp directory.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Allow overwriting an existing output file.
    #[arg(long)]
    overwrite: bool,

    /// ffmpeg executable to run.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Seconds to wait for ffmpeg before giving up.
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Seed for the cue picker (defaults to the current time).
    #[arg(long)]
    seed: Option<u64>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a spinner while rendering.
    #[arg(long)]
    progress: bool,

    /// Print shell completions and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), StillframeError> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(StillframeError::InvalidInput(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )));
        }
    }
    Ok(())
}

fn spinner() -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    bar.set_message("rendering");
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

fn print_result(result: &RenderResult, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let payload = json!({
            "path": result.path.display().to_string(),
            "text": result.text,
            "timestamp": result.timestamp,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "{} {}",
            "success:".green().bold(),
            format!("Rendered frame to {}", result.path.display()).green()
        );
        log::info!("[{}] {}", result.timestamp, result.text);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(video), Some(subtitle)) = (cli.video, cli.subtitle) else {
        eprintln!("{} all flags must be provided", "error:".red().bold());
        eprintln!("{}", Cli::command().render_usage());
        std::process::exit(1);
    };

    let mut request = RenderRequest::new(video, subtitle);
    if let Some(output) = cli.output {
        ensure_writable_path(&output, cli.overwrite)?;
        request = request.with_output(output);
    }

    let extractor = FfmpegExtractor::new()
        .with_binary(cli.ffmpeg)
        .with_timeout(Duration::from_secs(cli.timeout.max(1)));
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => clock_seeded_rng(),
    };
    let mut renderer = Renderer::with_parts(extractor, rng, RenderOptions::default())?;

    let progress_bar = if cli.progress { Some(spinner()?) } else { None };
    let outcome = renderer.render(&request);
    if let Some(bar) = progress_bar {
        bar.finish_and_clear();
    }

    print_result(&outcome?, cli.json)
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "stillframe", &mut std::io::stdout());
        return;
    }

    init_logging(cli.verbose);

    if let Err(error) = run(cli) {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
