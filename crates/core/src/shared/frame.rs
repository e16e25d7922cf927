/// Number of interleaved channels in a [`Frame`] (R, G, B).
pub const CHANNELS: usize = 3;

/// A single color camera frame: contiguous RGB bytes in row-major order.
///
/// Encoding to and from JPEG happens at the I/O boundary only; the
/// pipeline works on the decoded raster.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// A frame filled with a single color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self::new(data, width, height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGB value at column `x`, row `y`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = self.offset(x, y);
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let offset = self.offset(x, y);
        self.data[offset..offset + CHANNELS].copy_from_slice(&rgb);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        ((y as usize) * (self.width as usize) + x as usize) * CHANNELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_filled_sets_every_pixel() {
        let frame = Frame::filled(3, 2, [10, 20, 30]);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(frame.pixel(x, y), [10, 20, 30]);
            }
        }
    }

    #[test]
    fn test_set_pixel_row_major() {
        let mut frame = Frame::filled(4, 3, [0, 0, 0]);
        frame.set_pixel(1, 2, [255, 1, 2]);
        let offset = (2 * 4 + 1) * 3;
        assert_eq!(&frame.data()[offset..offset + 3], &[255, 1, 2]);
        assert_eq!(frame.pixel(1, 2), [255, 1, 2]);
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::filled(2, 2, [100, 100, 100]);
        let mut cloned = frame.clone();
        cloned.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2);
    }

    #[test]
    #[should_panic(expected = "pixel out of bounds")]
    fn test_pixel_out_of_bounds_panics() {
        Frame::filled(2, 2, [0, 0, 0]).pixel(2, 0);
    }
}
