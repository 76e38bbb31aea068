use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use facetrack_core::sequence::infrastructure::binary_store::SequenceStore;
use facetrack_core::shared::constants::{DEFAULT_LOOKBACK_FRAMES, IMAGE_EXTENSIONS};
use facetrack_core::shared::gray_frame::GrayFrame;
use facetrack_core::stats::sequence_stats::{main_face_from_stats, FaceStats};
use facetrack_core::tracking::infrastructure::parallel_runner::{run_strategies, StrategyRun};
use facetrack_core::tracking::infrastructure::tracker_factory::TrackerStrategy;

/// Assigns stable face identities to a landmark sequence.
#[derive(Parser)]
#[command(name = "facetrack")]
struct Cli {
    /// Sequence file with per-frame face landmarks.
    input: PathBuf,

    /// Directory of frame images, in frame order when sorted by name.
    #[arg(long)]
    frames: PathBuf,

    /// Output sequence file (defaults to overwriting the input).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Tracking strategies to run (comma-separated): descriptor, appearance.
    #[arg(long, default_value = "descriptor", value_delimiter = ',')]
    strategy: Vec<String>,

    /// Frames an identity may go unseen before it is considered lost.
    #[arg(long, default_value_t = DEFAULT_LOOKBACK_FRAMES)]
    lookback: u32,

    /// Print per-identity statistics and the main face after tracking.
    #[arg(long)]
    stats: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let strategies = parse_strategies(&cli.strategy)?;
    let sequence = SequenceStore::load(&cli.input)?;
    log::info!(
        "Loaded {} frames from {}",
        sequence.len(),
        cli.input.display()
    );

    let images = load_frame_images(&cli.frames, sequence.len())?;
    let runs = run_strategies(&sequence, &images, &strategies, cli.lookback)?;

    let output = cli.output.unwrap_or_else(|| cli.input.clone());
    for run in &runs {
        let path = output_path_for(&output, run, runs.len());
        SequenceStore::save(&run.sequence, &path)?;
        log::info!(
            "Wrote {} frames ({} identities) to {}",
            run.sequence.len(),
            run.stats.len(),
            path.display()
        );
    }

    if cli.stats {
        for run in &runs {
            print_stats(run);
        }
    }

    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !cli.frames.is_dir() {
        return Err(format!("Frames directory not found: {}", cli.frames.display()).into());
    }
    if cli.strategy.is_empty() {
        return Err("At least one tracking strategy is required".into());
    }
    Ok(())
}

fn parse_strategies(names: &[String]) -> Result<Vec<TrackerStrategy>, Box<dyn std::error::Error>> {
    names
        .iter()
        .map(|name| match name.as_str() {
            "descriptor" => Ok(TrackerStrategy::Descriptor),
            "appearance" => Ok(TrackerStrategy::Appearance),
            other => {
                Err(format!("Strategy must be 'descriptor' or 'appearance', got '{other}'").into())
            }
        })
        .collect()
}

/// Loads the frame images sorted by file name, converted to grayscale.
fn load_frame_images(
    dir: &Path,
    required: usize,
) -> Result<Vec<GrayFrame>, Box<dyn std::error::Error>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_image(path))
        .collect();
    paths.sort();

    if paths.len() < required {
        return Err(format!(
            "Sequence has {} frames but {} contains only {} images",
            required,
            dir.display(),
            paths.len()
        )
        .into());
    }

    let mut images = Vec::with_capacity(paths.len());
    for path in &paths {
        images.push(GrayFrame::from(image::open(path)?.to_luma8()));
    }
    log::info!("Loaded {} frame images from {}", images.len(), dir.display());
    Ok(images)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// With a single strategy the output path is used as given; with
/// several, each run gets the strategy name injected before the
/// extension so runs never overwrite each other.
fn output_path_for(output: &Path, run: &StrategyRun, total_runs: usize) -> PathBuf {
    if total_runs == 1 {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sequence");
    let name = match output.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{}.{ext}", run.strategy),
        None => format!("{stem}.{}", run.strategy),
    };
    output.with_file_name(name)
}

fn print_stats(run: &StrategyRun) {
    println!("Strategy: {}", run.strategy);
    if run.stats.is_empty() {
        println!("  no faces tracked");
        return;
    }
    for face in &run.stats {
        print_face(face);
    }
    if let Some(id) = main_face_from_stats(&run.stats) {
        println!("  main face: {id}");
    }
}

fn print_face(face: &FaceStats) {
    println!(
        "  face {:>3}: frames {:>5}  central {:.3}  frame {:.3}  size {:.3}",
        face.id, face.frame_count, face.central_ratio, face.frame_ratio, face.size_ratio
    );
}
