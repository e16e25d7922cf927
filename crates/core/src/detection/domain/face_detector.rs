use crate::detection::domain::detection_params::DetectionParams;
use crate::shared::face_box::FaceBox;
use crate::shared::gray_frame::GrayFrame;
use crate::BoxError;

/// Domain interface for face detection.
///
/// Input is the grayscale raster of a frame; output is zero or more
/// bounding boxes in that raster's coordinates. Implementations may be
/// stateful, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(
        &mut self,
        frame: &GrayFrame,
        params: &DetectionParams,
    ) -> Result<Vec<FaceBox>, BoxError>;
}
