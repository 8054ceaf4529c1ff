mod test_signals;

use nfcdetect::audio::WavFileSource;
use nfcdetect::config::{CallType, DetectorKind, DetectorSettings};
use nfcdetect::detection::Detector;
use nfcdetect::output::{OutputFormat, RecordingListener, create_formatter};
use nfcdetect::save_wav;
use test_signals::tone_in_silence;

fn detect_wav(path: &std::path::Path, kind: DetectorKind, chunk_size: usize) -> Vec<String> {
    let mut source = WavFileSource::new(path, chunk_size).unwrap();
    let sample_rate = source.sample_rate() as f64;
    let settings = DetectorSettings::preset(kind, CallType::Tseep);
    let listener = RecordingListener::new(settings.name(), "tone.wav", sample_rate);
    let mut detector = Detector::new(settings, sample_rate, listener).unwrap();

    while let Some(buffer) = source.next_buffer().unwrap() {
        detector.detect(buffer).unwrap();
    }
    detector.complete_detection().unwrap();

    let scored = detector.is_scored();
    let formatter = create_formatter(OutputFormat::Csv, scored, false);
    let mut lines: Vec<String> = formatter.header().map(str::to_string).into_iter().collect();
    lines.extend(
        detector
            .into_listener()
            .records()
            .iter()
            .map(|record| formatter.format(record)),
    );
    lines
}

#[test]
fn test_redux_detects_tone_in_wav_file() {
    let path = std::env::temp_dir().join(format!("nfcdetect_redux_{}.wav", std::process::id()));
    let signal = tone_in_silence(24000, 2.0, 0.75, 0.5, 7000.0);
    save_wav(&path, &signal, 24000).unwrap();

    let lines = detect_wav(&path, DetectorKind::Redux, 10_000);
    std::fs::remove_file(&path).ok();

    assert_eq!(lines[0], "Detector,Unit,Threshold,Start Index,Length");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("Old Bird Redux 1.1 Tseep,tone.wav,2,"));
}

#[test]
fn test_pnf_csv_has_score_column() {
    let path = std::env::temp_dir().join(format!("nfcdetect_pnf_{}.wav", std::process::id()));
    let signal = tone_in_silence(24000, 2.0, 0.75, 0.3, 7000.0);
    save_wav(&path, &signal, 24000).unwrap();

    let lines = detect_wav(&path, DetectorKind::Pnf, 4096);
    std::fs::remove_file(&path).ok();

    assert_eq!(
        lines[0],
        "Detector,Unit,Threshold,Start Index,Length,Detector Score"
    );
    assert!(lines.len() >= 2);
    assert_eq!(lines[1].split(',').count(), 6);
}
