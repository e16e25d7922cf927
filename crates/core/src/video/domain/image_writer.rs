use std::path::Path;

use crate::shared::frame::Frame;
use crate::BoxError;

/// Writes a single frame to an image file.
pub trait ImageWriter: Send + Sync {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), BoxError>;
}
