use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::{Frame, CHANNELS};
use crate::BoxError;

pub const DEFAULT_COLOR: [u8; 3] = [0, 255, 0];
pub const DEFAULT_THICKNESS: u32 = 2;

/// Draws a hollow rectangle around each face.
///
/// The outline is drawn inward from the box edges, so a box touching
/// the frame border stays fully visible. Boxes are clipped to the frame.
pub struct RectangleAnnotator {
    color: [u8; 3],
    thickness: u32,
}

impl RectangleAnnotator {
    pub fn new(color: [u8; 3], thickness: u32) -> Self {
        Self {
            color,
            thickness: thickness.max(1),
        }
    }

    fn fill(&self, frame: &mut Frame, x1: u32, y1: u32, x2: u32, y2: u32) {
        let fw = frame.width() as usize;
        let data = frame.data_mut();
        for y in y1..y2 {
            let row = y as usize * fw;
            for x in x1..x2 {
                let offset = (row + x as usize) * CHANNELS;
                data[offset..offset + CHANNELS].copy_from_slice(&self.color);
            }
        }
    }
}

impl Default for RectangleAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR, DEFAULT_THICKNESS)
    }
}

impl FrameAnnotator for RectangleAnnotator {
    fn annotate(&self, frame: &mut Frame, faces: &[FaceBox]) -> Result<(), BoxError> {
        for face in faces {
            let Some(b) = face.clamp_to(frame.width(), frame.height()) else {
                continue;
            };
            let x1 = b.x as u32;
            let y1 = b.y as u32;
            let x2 = x1 + b.w as u32;
            let y2 = y1 + b.h as u32;
            let t = self.thickness;

            // Top, bottom, left, right bands; overlapping corners are harmless.
            self.fill(frame, x1, y1, x2, (y1 + t).min(y2));
            self.fill(frame, x1, y2.saturating_sub(t).max(y1), x2, y2);
            self.fill(frame, x1, y1, (x1 + t).min(x2), y2);
            self.fill(frame, x2.saturating_sub(t).max(x1), y1, x2, y2);
        }
        Ok(())
    }
}
