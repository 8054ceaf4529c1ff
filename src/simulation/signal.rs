use std::f32::consts::PI;

/// Length of the raised-cosine fade at each end of a call, in seconds
pub const CALL_FADE_SECONDS: f32 = 0.005;

/// Shape of a synthetic call
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum CallShape {
    /// Constant-frequency tone with abrupt edges
    Tone { frequency_hz: f32 },
    /// Linear frequency sweep with faded edges, like a flight call
    Chirp { start_hz: f32, end_hz: f32 },
}

/// A synthetic call placed in a recording
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CallSpec {
    /// Call onset (s)
    pub onset: f32,
    /// Call duration (s)
    pub duration: f32,
    /// Peak amplitude (full scale is 1.0)
    pub amplitude: f32,
    #[serde(flatten)]
    pub shape: CallShape,
}

impl CallSpec {
    pub fn tone(onset: f32, duration: f32, frequency_hz: f32, amplitude: f32) -> Self {
        Self {
            onset,
            duration,
            amplitude,
            shape: CallShape::Tone { frequency_hz },
        }
    }

    pub fn chirp(onset: f32, duration: f32, start_hz: f32, end_hz: f32, amplitude: f32) -> Self {
        Self {
            onset,
            duration,
            amplitude,
            shape: CallShape::Chirp { start_hz, end_hz },
        }
    }

    /// Onset in samples
    pub fn onset_index(&self, sample_rate: u32) -> usize {
        (self.onset * sample_rate as f32).round() as usize
    }
}

/// Add a call to `signal`, clipping it at the end of the buffer
pub fn add_call(signal: &mut [f32], sample_rate: u32, call: &CallSpec) {
    let fs = sample_rate as f32;
    let start = call.onset_index(sample_rate);
    let num_samples = (call.duration * fs).round() as usize;
    let end = (start + num_samples).min(signal.len());
    if start >= end {
        return;
    }

    let fade = match call.shape {
        CallShape::Tone { .. } => 0,
        CallShape::Chirp { .. } => ((CALL_FADE_SECONDS * fs) as usize).min(num_samples / 2),
    };

    let mut phase = 0.0f32;
    for (i, sample) in signal[start..end].iter_mut().enumerate() {
        let t = i as f32 / fs;
        let frequency = match call.shape {
            CallShape::Tone { frequency_hz } => frequency_hz,
            CallShape::Chirp { start_hz, end_hz } => {
                start_hz + (end_hz - start_hz) * t / call.duration
            }
        };

        let envelope = if i < fade {
            0.5 - 0.5 * (PI * i as f32 / fade as f32).cos()
        } else if i + fade >= num_samples && fade > 0 {
            0.5 - 0.5 * (PI * (num_samples - i) as f32 / fade as f32).cos()
        } else {
            1.0
        };

        *sample += call.amplitude * envelope * phase.sin();
        phase = (phase + 2.0 * PI * frequency / fs) % (2.0 * PI);
    }
}

/// Silent buffer of the given duration
pub fn silence(duration_secs: f32, sample_rate: u32) -> Vec<f32> {
    vec![0.0; (duration_secs * sample_rate as f32).round() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|x| x * x).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_tone_placement() {
        let mut signal = silence(1.0, 24000);
        add_call(&mut signal, 24000, &CallSpec::tone(0.5, 0.25, 7000.0, 0.5));

        assert!(signal[..12000].iter().all(|&x| x == 0.0));
        assert!(signal[18000..].iter().all(|&x| x == 0.0));
        let level = rms(&signal[12000..18000]);
        assert!((level - 0.5 / 2f32.sqrt()).abs() < 0.01, "rms {}", level);
    }

    #[test]
    fn test_chirp_fades_in() {
        let mut signal = silence(0.2, 24000);
        add_call(&mut signal, 24000, &CallSpec::chirp(0.0, 0.1, 9000.0, 6000.0, 1.0));
        assert!(signal[0].abs() < 1e-6);
        assert!(signal[1].abs() < 0.01);
        assert!(rms(&signal[1000..2000]) > 0.6);
        assert!(signal[2400..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_call_past_end_is_clipped() {
        let mut signal = silence(0.1, 1000);
        add_call(&mut signal, 1000, &CallSpec::tone(0.09, 1.0, 100.0, 1.0));
        add_call(&mut signal, 1000, &CallSpec::tone(5.0, 1.0, 100.0, 1.0));
        assert_eq!(signal.len(), 100);
    }
}
