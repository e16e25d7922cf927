use image::codecs::jpeg::JpegEncoder;

use crate::shared::constants::DEFAULT_JPEG_QUALITY;
use crate::shared::frame::Frame;
use crate::video::domain::frame_decoder::FrameDecoder;
use crate::video::domain::frame_encoder::FrameEncoder;
use crate::BoxError;

/// JPEG encoder and format-sniffing decoder built on the `image` crate.
///
/// Decoding accepts any format `image` recognizes from the payload bytes
/// (JPEG from the camera in practice) and converts to RGB.
pub struct JpegCodec {
    quality: u8,
}

impl JpegCodec {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameDecoder for JpegCodec {
    fn decode(&self, payload: &[u8]) -> Result<Frame, BoxError> {
        if payload.is_empty() {
            return Err("empty image payload".into());
        }
        let rgb = image::load_from_memory(payload)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Frame::new(rgb.into_raw(), width, height))
    }
}

impl FrameEncoder for JpegCodec {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, BoxError> {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality).encode(
            frame.data(),
            frame.width(),
            frame.height(),
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(jpeg)
    }
}
