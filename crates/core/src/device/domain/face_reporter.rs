use crate::shared::face_box::FaceBox;

/// Sends detected face geometry back to the originating device.
///
/// Fire and forget: implementations must return immediately and handle
/// their own failures. A report can never fail or delay the caller.
pub trait FaceReporter: Send + Sync {
    fn report(&self, faces: Vec<FaceBox>);
}
