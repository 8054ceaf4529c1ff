use anyhow::Context;
use clap::Parser;
use crossbeam_channel::unbounded;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use nfcdetect::audio::WavFileSource;
use nfcdetect::config::{CallType, DetectorKind, DetectorSettings};
use nfcdetect::detection::Detector;
use nfcdetect::output::{
    ClipRecord, OutputFormat, RecordingListener, create_formatter, summarize_clip_lengths,
};

#[derive(Parser, Debug)]
#[command(name = "nfcdetect")]
#[command(about = "Detect nocturnal flight calls in WAV recordings", long_about = None)]
struct Args {
    /// WAV files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Detector family: redux, pnf, baseline
    #[arg(short = 'd', long, value_enum, default_value = "redux")]
    detector: DetectorKind,

    /// Call type: tseep, thrush
    #[arg(short = 'c', long, value_enum, default_value = "tseep")]
    call_type: CallType,

    /// Detection thresholds, comma-separated (e.g. "2,2.7,5")
    #[arg(short = 't', long, value_delimiter = ',')]
    thresholds: Vec<f64>,

    /// TOML file with complete detector settings (replaces the preset)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Samples per detect call
    #[arg(long, default_value_t = 16384)]
    chunk_size: usize,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Number of files processed in parallel (default: available cores)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Print per-threshold clip length statistics to stderr
    #[arg(long)]
    summary: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct FileResult {
    path: PathBuf,
    outcome: anyhow::Result<Vec<ClipRecord>>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let settings = Arc::new(resolve_settings(&args)?);
    log::info!(
        "{} with thresholds {:?}",
        settings.name(),
        settings.thresholds()
    );

    let jobs = args
        .jobs
        .unwrap_or_else(|| thread::available_parallelism().map_or(1, |n| n.get()))
        .clamp(1, args.files.len());

    let (job_tx, job_rx) = unbounded::<(usize, PathBuf)>();
    let (result_tx, result_rx) = unbounded::<(usize, FileResult)>();

    for (index, path) in args.files.iter().cloned().enumerate() {
        job_tx.send((index, path))?;
    }
    drop(job_tx);

    let workers: Vec<_> = (0..jobs)
        .map(|_| {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let settings = Arc::clone(&settings);
            let chunk_size = args.chunk_size;
            thread::spawn(move || {
                for (index, path) in job_rx.iter() {
                    let outcome = detect_file(&path, &settings, chunk_size);
                    if result_tx.send((index, FileResult { path, outcome })).is_err() {
                        break;
                    }
                }
            })
        })
        .collect();
    drop(result_tx);

    let scored = matches!(*settings, DetectorSettings::Pnf(_));
    let formatter = create_formatter(args.format, scored, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    // Print in input order as results arrive.
    let mut pending = BTreeMap::new();
    let mut next_index = 0;
    let mut all_records = Vec::new();
    let mut failures = 0;

    for (index, result) in result_rx.iter() {
        pending.insert(index, result);
        while let Some(result) = pending.remove(&next_index) {
            next_index += 1;
            match result.outcome {
                Ok(records) => {
                    for record in &records {
                        println!("{}", formatter.format(record));
                    }
                    all_records.extend(records);
                }
                Err(e) => {
                    failures += 1;
                    log::warn!("{}: {:#}", result.path.display(), e);
                }
            }
        }
    }

    for worker in workers {
        if worker.join().is_err() {
            anyhow::bail!("detection worker panicked");
        }
    }

    if args.summary {
        print_summary(&all_records);
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files could not be processed", failures, args.files.len());
    }

    Ok(())
}

fn resolve_settings(args: &Args) -> anyhow::Result<DetectorSettings> {
    let mut settings = match &args.settings {
        Some(path) => DetectorSettings::from_toml_file(args.detector, path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => DetectorSettings::preset(args.detector, args.call_type),
    };
    if !args.thresholds.is_empty() {
        settings = settings.with_thresholds(args.thresholds.clone());
    }
    settings.validate().context("Invalid detector settings")?;
    Ok(settings)
}

fn detect_file(
    path: &Path,
    settings: &DetectorSettings,
    chunk_size: usize,
) -> anyhow::Result<Vec<ClipRecord>> {
    let mut source = WavFileSource::new(path, chunk_size)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let sample_rate = source.sample_rate() as f64;

    let unit = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let listener = RecordingListener::new(settings.name(), unit, sample_rate);

    let mut detector = Detector::new(settings.clone(), sample_rate, listener)
        .with_context(|| format!("Cannot run {} at {} Hz", settings.name(), sample_rate))?;
    log::debug!(
        "{}: {} samples at {} Hz, detector latency {} samples",
        path.display(),
        source.num_samples(),
        sample_rate,
        detector.latency()
    );

    while let Some(buffer) = source.next_buffer()? {
        detector.detect(buffer)?;
    }
    detector.complete_detection()?;

    Ok(detector.into_listener().into_records())
}

fn print_summary(records: &[ClipRecord]) {
    eprintln!("\n=== Clip Summary ===");
    eprintln!("Total clips: {}", records.len());
    for summary in summarize_clip_lengths(records) {
        eprintln!(
            "threshold {:>5}: {:>6} clips, length {:.3} ± {:.3} s (min {:.3}, max {:.3})",
            summary.threshold,
            summary.count,
            summary.mean,
            summary.std_dev,
            summary.min,
            summary.max
        );
    }
}
