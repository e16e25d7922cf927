use crate::shared::frame::{Frame, CHANNELS};

/// Single-channel luma raster used as detector input.
///
/// Derived from a color [`Frame`] with BT.601 weights; the color frame
/// itself is left untouched for annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayFrame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl GrayFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize),
            "data length must equal width * height"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn from_frame(frame: &Frame) -> Self {
        let data = frame
            .data()
            .chunks_exact(CHANNELS)
            .map(|px| luma(px[0], px[1], px[2]))
            .collect();
        Self::new(data, frame.width(), frame.height())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[(y as usize) * (self.width as usize) + x as usize]
    }
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::black([0, 0, 0], 0)]
    #[case::white([255, 255, 255], 255)]
    #[case::red([255, 0, 0], 76)]
    #[case::green([0, 255, 0], 150)]
    #[case::blue([0, 0, 255], 29)]
    fn test_luma_weights(#[case] rgb: [u8; 3], #[case] expected: u8) {
        let gray = GrayFrame::from_frame(&Frame::filled(1, 1, rgb));
        assert_eq!(gray.get(0, 0), expected);
    }

    #[test]
    fn test_dimensions_follow_source() {
        let gray = GrayFrame::from_frame(&Frame::filled(7, 3, [9, 9, 9]));
        assert_eq!(gray.width(), 7);
        assert_eq!(gray.height(), 3);
        assert_eq!(gray.data().len(), 21);
    }

    #[test]
    fn test_conversion_does_not_touch_color_frame() {
        let frame = Frame::filled(2, 2, [200, 10, 10]);
        let before = frame.clone();
        let _ = GrayFrame::from_frame(&frame);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_pixel_positions_preserved() {
        let mut frame = Frame::filled(3, 2, [0, 0, 0]);
        frame.set_pixel(2, 1, [255, 255, 255]);
        let gray = GrayFrame::from_frame(&frame);
        assert_eq!(gray.get(2, 1), 255);
        assert_eq!(gray.get(0, 0), 0);
    }
}
