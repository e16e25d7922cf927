/// Pyramid step between detection scales.
pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;

/// Overlapping candidates a detection needs before it is accepted.
pub const DEFAULT_MIN_NEIGHBORS: u32 = 5;

/// Smallest face side, in pixels, that is reported.
pub const DEFAULT_MIN_SIZE: u32 = 30;

/// Tunables handed to a [`FaceDetector`](super::face_detector::FaceDetector) on every call.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionParams {
    pub scale_factor: f64,
    pub min_neighbors: u32,
    pub min_size: (u32, u32),
}

impl DetectionParams {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.scale_factor > 1.0) {
            return Err(format!(
                "Scale factor must be greater than 1.0, got {}",
                self.scale_factor
            ));
        }
        if self.min_size.0 == 0 || self.min_size.1 == 0 {
            return Err(format!(
                "Minimum face size must be positive, got {}x{}",
                self.min_size.0, self.min_size.1
            ));
        }
        Ok(())
    }
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_size: (DEFAULT_MIN_SIZE, DEFAULT_MIN_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let params = DetectionParams::default();
        assert_relative_eq!(params.scale_factor, 1.1);
        assert_eq!(params.min_neighbors, 5);
        assert_eq!(params.min_size, (30, 30));
        assert!(params.validate().is_ok());
    }

    #[rstest]
    #[case::scale_one(1.0, (30, 30))]
    #[case::scale_nan(f64::NAN, (30, 30))]
    #[case::zero_width(1.1, (0, 30))]
    #[case::zero_height(1.1, (30, 0))]
    fn test_validate_rejects(#[case] scale_factor: f64, #[case] min_size: (u32, u32)) {
        let params = DetectionParams {
            scale_factor,
            min_size,
            ..DetectionParams::default()
        };
        assert!(params.validate().is_err());
    }
}
