use serde::{Deserialize, Serialize};

/// A detected face's bounding rectangle in frame pixel coordinates.
///
/// Top-left origin. Serializes as `{"x":..,"y":..,"w":..,"h":..}`, the
/// shape the remote device expects on its face-detection endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl FaceBox {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Clips the box to a `width` × `height` frame.
    ///
    /// Returns `None` when nothing of the box remains inside the frame.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<FaceBox> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.x.saturating_add(self.w).min(width as i32);
        let y2 = self.y.saturating_add(self.h).min(height as i32);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(FaceBox::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Orders boxes top-to-bottom, then left-to-right.
    pub fn sort_reading_order(boxes: &mut [FaceBox]) {
        boxes.sort_by_key(|b| (b.y, b.x, b.w, b.h));
    }
}
