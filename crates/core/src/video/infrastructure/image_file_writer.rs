use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;
use crate::BoxError;

/// Writes a frame to an image file using the `image` crate.
///
/// The format follows the path's extension. The file is written beside
/// the target and renamed over it, so readers never see a partial image.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), BoxError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;
        let format = image::ImageFormat::from_path(path)?;

        let file_name = path
            .file_name()
            .ok_or("Snapshot path has no file name")?
            .to_string_lossy();
        let temp_path = path.with_file_name(format!(".{file_name}.part"));
        img.save_with_format(&temp_path, format)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }
}
