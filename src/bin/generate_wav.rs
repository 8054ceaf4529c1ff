use anyhow::{Context, Result};
use clap::Parser;
use nfcdetect::config::CallType;
use nfcdetect::save_wav;
use nfcdetect::simulation::{
    AdditiveNoiseConfig, CallSpec, ImpulseNoiseConfig, RecordingConfig, generate_recording,
    random_calls,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "generate_wav")]
#[command(about = "Generate synthetic night recordings with flight-call-like chirps")]
struct Args {
    /// TOML recording configuration (sample rate, duration, calls, noise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Number of recordings to generate
    #[arg(short = 'n', long, default_value_t = 10)]
    count: u32,

    /// Random calls per recording (ignored when the config lists calls)
    #[arg(long, default_value_t = 5)]
    calls: usize,

    /// Call type whose band the random calls occupy
    #[arg(long, value_enum, default_value = "tseep")]
    call_type: CallType,

    /// Call amplitude relative to full scale
    #[arg(long, default_value_t = 0.3)]
    amplitude: f32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Recording duration in seconds
    #[arg(short, long, default_value_t = 30.0)]
    duration: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 22050)]
    sample_rate: u32,

    /// Output filename prefix
    #[arg(long, default_value = "night")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,

    /// White noise level in dBFS (CLI override)
    #[arg(long, allow_negative_numbers = true)]
    noise_dbfs: Option<f32>,

    /// Impulse noise rate in Hz (CLI override)
    #[arg(long)]
    impulse_rate: Option<f32>,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    seed: u64,
    calls: Vec<ManifestCall>,
}

#[derive(Debug, serde::Serialize)]
struct ManifestCall {
    onset: f32,
    onset_index: usize,
    duration: f32,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    sample_rate: u32,
    duration: f32,
    call_type: CallType,
    files: Vec<ManifestEntry>,
}

fn load_toml_config(path: &Path) -> Result<RecordingConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_recording(template: &RecordingConfig, args: &Args, seed: u64) -> RecordingConfig {
    let mut config = template.clone();
    config.noise.seed = Some(seed);

    if config.calls.is_empty() {
        config.calls = random_calls(
            args.call_type,
            args.calls,
            config.duration,
            args.amplitude,
            Some(seed),
        );
    }

    if let Some(level_dbfs) = args.noise_dbfs {
        config.noise.additive = Some(AdditiveNoiseConfig { level_dbfs });
    }

    if let Some(rate_hz) = args.impulse_rate {
        config.noise.impulse = Some(ImpulseNoiseConfig {
            rate_hz,
            amplitude: 0.5,
            duration_samples: 3,
        });
    }

    config
}

fn manifest_calls(calls: &[CallSpec], sample_rate: u32) -> Vec<ManifestCall> {
    calls
        .iter()
        .map(|call| ManifestCall {
            onset: call.onset,
            onset_index: call.onset_index(sample_rate),
            duration: call.duration,
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let template = match args.config {
        Some(ref config_path) => load_toml_config(config_path)?,
        None => RecordingConfig::new(args.sample_rate, args.duration),
    };

    let base_seed = args.seed.unwrap_or(0);
    let mut manifest_entries = Vec::new();

    for index in 0..args.count {
        let seed = base_seed + index as u64;
        let recording = build_recording(&template, &args, seed);
        let signal = generate_recording(&recording);

        let filename = format!("{}_{:03}.wav", args.prefix, index);
        let filepath = args.output_dir.join(&filename);

        save_wav(&filepath, &signal, recording.sample_rate)
            .with_context(|| format!("Failed to write {}", filepath.display()))?;

        manifest_entries.push(ManifestEntry {
            file: filename,
            seed,
            calls: manifest_calls(&recording.calls, recording.sample_rate),
        });

        eprint!("\rGenerating: {}/{}", index + 1, args.count);
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            sample_rate: template.sample_rate,
            duration: template.duration,
            call_type: args.call_type,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} files in {}",
        args.count,
        args.output_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["generate_wav"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_random_calls_fill_empty_template() {
        let args = args(&["--calls", "3", "--duration", "20"]);
        let template = RecordingConfig::new(args.sample_rate, args.duration);
        let recording = build_recording(&template, &args, 42);
        assert_eq!(recording.calls.len(), 3);
        assert_eq!(recording.noise.seed, Some(42));
    }

    #[test]
    fn test_template_calls_are_kept() {
        let args = args(&["--noise-dbfs", "-60"]);
        let template = RecordingConfig::new(22050, 5.0).with_call(CallSpec::tone(1.0, 0.1, 7000.0, 0.5));
        let recording = build_recording(&template, &args, 1);
        assert_eq!(recording.calls.len(), 1);
        let additive = recording.noise.additive.unwrap();
        assert_eq!(additive.level_dbfs, -60.0);
    }

    #[test]
    fn test_manifest_onset_index() {
        let calls = [CallSpec::tone(1.5, 0.1, 7000.0, 0.5)];
        let entries = manifest_calls(&calls, 22050);
        assert_eq!(entries[0].onset_index, 33075);
    }
}
