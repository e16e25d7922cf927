use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::ingest_error::IngestError;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;
use crate::shared::gray_frame::GrayFrame;
use crate::video::domain::frame_decoder::FrameDecoder;

/// A decoded frame with its faces already drawn on it.
#[derive(Clone, Debug)]
pub struct AnnotatedFrame {
    pub frame: Frame,
    pub faces: Vec<FaceBox>,
}

/// Single-payload processing: decode → grayscale → detect → annotate.
///
/// CPU bound and synchronous; callers run it off the async executor.
pub struct IngestFrameUseCase {
    decoder: Box<dyn FrameDecoder>,
    detector: Box<dyn FaceDetector>,
    annotator: Box<dyn FrameAnnotator>,
    params: DetectionParams,
}

impl IngestFrameUseCase {
    pub fn new(
        decoder: Box<dyn FrameDecoder>,
        detector: Box<dyn FaceDetector>,
        annotator: Box<dyn FrameAnnotator>,
        params: DetectionParams,
    ) -> Self {
        Self {
            decoder,
            detector,
            annotator,
            params,
        }
    }

    pub fn execute(&mut self, payload: &[u8]) -> Result<AnnotatedFrame, IngestError> {
        let mut frame = self.decoder.decode(payload).map_err(IngestError::Decode)?;

        let gray = GrayFrame::from_frame(&frame);
        let mut faces = self
            .detector
            .detect(&gray, &self.params)
            .map_err(IngestError::Internal)?;
        FaceBox::sort_reading_order(&mut faces);

        self.annotator
            .annotate(&mut frame, &faces)
            .map_err(IngestError::Internal)?;

        Ok(AnnotatedFrame { frame, faces })
    }
}
