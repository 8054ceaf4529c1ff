/// Audio sample types accepted by the detectors.
///
/// Integer samples are used at their raw scale: every detector works on power
/// ratios, which do not depend on the input scale.
pub trait Sample: Copy {
    fn to_f64(self) -> f64;
}

impl Sample for i16 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_samples_keep_raw_scale() {
        assert_eq!(i16::MIN.to_f64(), -32768.0);
        assert_eq!(1234i16.to_f64(), 1234.0);
    }

    #[test]
    fn test_float_samples_widen_exactly() {
        assert_eq!(0.25f32.to_f64(), 0.25);
        assert_eq!((-1.5f64).to_f64(), -1.5);
    }
}
