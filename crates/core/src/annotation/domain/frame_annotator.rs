use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;
use crate::BoxError;

/// Domain interface for marking detected faces on a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`) to avoid allocation.
pub trait FrameAnnotator: Send {
    fn annotate(&self, frame: &mut Frame, faces: &[FaceBox]) -> Result<(), BoxError>;
}
