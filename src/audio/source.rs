use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::Result;

/// Mono sample source backed by a WAVE file
///
/// Multi-channel files are reduced to their first channel. Samples are read
/// from disk one chunk at a time, the way a recorder would hand them to a
/// detector, so memory use does not grow with the length of the recording.
pub struct WavFileSource {
    reader: WavReader<BufReader<File>>,
    buffer: Vec<f32>,
    chunk_size: usize,
    channels: usize,
    sample_format: SampleFormat,
    int_scale: f32,
    sample_rate: u32,
    num_samples: usize,
}

impl WavFileSource {
    pub fn new<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        if spec.channels > 1 {
            log::info!(
                "{}: using first of {} channels",
                path.as_ref().display(),
                spec.channels
            );
        }

        let chunk_size = chunk_size.max(1);
        Ok(Self {
            num_samples: reader.duration() as usize,
            reader,
            buffer: Vec::with_capacity(chunk_size),
            chunk_size,
            channels: spec.channels.max(1) as usize,
            sample_format: spec.sample_format,
            int_scale: 2f32.powi(i32::from(spec.bits_per_sample) - 1),
            sample_rate: spec.sample_rate,
        })
    }

    /// Next chunk of samples, or `None` once the file is exhausted
    pub fn next_buffer(&mut self) -> Result<Option<&[f32]>> {
        self.buffer.clear();
        let wanted = self.chunk_size * self.channels;

        match self.sample_format {
            SampleFormat::Float => first_channel(
                &mut self.buffer,
                self.reader.samples::<f32>().take(wanted),
                self.channels,
                |v| v,
            )?,
            SampleFormat::Int => {
                let scale = self.int_scale;
                first_channel(
                    &mut self.buffer,
                    self.reader.samples::<i32>().take(wanted),
                    self.channels,
                    |v| v as f32 / scale,
                )?
            }
        }

        if self.buffer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(&self.buffer))
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames in the file
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }
}

fn first_channel<S>(
    buffer: &mut Vec<f32>,
    samples: impl Iterator<Item = hound::Result<S>>,
    channels: usize,
    convert: impl Fn(S) -> f32,
) -> Result<()> {
    for (i, sample) in samples.enumerate() {
        let sample = sample?;
        if i % channels == 0 {
            buffer.push(convert(sample));
        }
    }
    Ok(())
}
