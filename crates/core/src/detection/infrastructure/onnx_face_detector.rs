//! Face detector backed by a YOLO-face ONNX model run through `ort`.
//!
//! Handles letterbox preprocessing of the grayscale raster, inference,
//! candidate grouping with a neighbor threshold, and mapping back to
//! frame coordinates.

use std::path::Path;

use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::face_box::FaceBox;
use crate::shared::gray_frame::GrayFrame;
use crate::BoxError;

use super::math::bbox_iou;

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default score floor for a raw candidate.
pub const DEFAULT_CONFIDENCE: f64 = 0.25;

/// Candidates overlapping a stronger one above this IoU count as its neighbors.
const GROUP_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

pub struct OnnxFaceDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxFaceDetector {
    /// Load an ONNX face model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting NCHW).
    /// Falls back to 640 if the shape is dynamic or unreadable.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(execution_providers())?
            .commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::info!("Face model loaded: input {input_size}x{input_size}, confidence {confidence}");

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }

    fn run(&mut self, frame: &GrayFrame) -> Result<Vec<Candidate>, Box<dyn std::error::Error>> {
        let (input_tensor, mapping) = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("Face model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("Unexpected face model output shape: {shape:?}").into());
        }

        // Output is [1, features, candidates] (transposed) or [1, candidates, features].
        let transposed = shape[1] < shape[2];
        let (num_cands, num_feats) = if transposed {
            (shape[2], shape[1])
        } else {
            (shape[1], shape[2])
        };
        if num_feats < 5 {
            return Err(format!("Face model output has {num_feats} features, need 5").into());
        }

        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;
        let feature = |cand: usize, feat: usize| -> f64 {
            if transposed {
                data[feat * num_cands + cand] as f64
            } else {
                data[cand * num_feats + feat] as f64
            }
        };

        let mut candidates = Vec::new();
        for i in 0..num_cands {
            // [cx, cy, w, h, conf, keypoints...]
            let conf = feature(i, 4);
            if conf < self.confidence {
                continue;
            }
            let (cx, cy, w, h) = (feature(i, 0), feature(i, 1), feature(i, 2), feature(i, 3));
            candidates.push(Candidate {
                bbox: [
                    mapping.to_source_x(cx - w / 2.0),
                    mapping.to_source_y(cy - h / 2.0),
                    mapping.to_source_x(cx + w / 2.0),
                    mapping.to_source_y(cy + h / 2.0),
                ],
                confidence: conf,
            });
        }
        Ok(candidates)
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(
        &mut self,
        frame: &GrayFrame,
        params: &DetectionParams,
    ) -> Result<Vec<FaceBox>, BoxError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Ok(Vec::new());
        }
        let mut candidates = self
            .run(frame)
            .map_err(|e| -> BoxError { e.to_string().into() })?;

        let groups = group_candidates(&mut candidates, GROUP_IOU_THRESH);
        let boxes = to_face_boxes(&groups, frame.width(), frame.height(), params);
        log::debug!(
            "Face model: {} candidates, {} groups, {} faces",
            candidates.len(),
            groups.len(),
            boxes.len()
        );
        Ok(boxes)
    }
}

#[cfg(target_os = "macos")]
fn execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
}

#[cfg(target_os = "windows")]
fn execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
}

// CPU only; ort falls back to it when the list is empty.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    Vec::new()
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Maps letterbox coordinates back to the source raster.
struct LetterboxMapping {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl LetterboxMapping {
    fn to_source_x(&self, x: f64) -> f64 {
        (x - self.pad_x as f64) / self.scale
    }

    fn to_source_y(&self, y: f64) -> f64 {
        (y - self.pad_y as f64) / self.scale
    }
}

/// Letterbox-resize a grayscale raster to `target_size` × `target_size`.
///
/// The single luma plane is replicated into the three input planes the
/// model expects.
fn letterbox(
    frame: &GrayFrame,
    target_size: u32,
) -> (ndarray::Array4<f32>, LetterboxMapping) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let size = target_size as usize;
    let mut tensor = ndarray::Array4::<f32>::from_elem((1, 3, size, size), PAD_VALUE);

    let src_w = frame.width() as usize;
    let src_h = frame.height() as usize;
    let src = frame.data();

    // Nearest-neighbor resize into the padded region
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let value = src[src_y * src_w + src_x] as f32 / 255.0;
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = value;
            }
        }
    }

    (
        tensor,
        LetterboxMapping {
            scale,
            pad_x,
            pad_y,
        },
    )
}

// ---------------------------------------------------------------------------
// Candidate grouping
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Candidate {
    bbox: [f64; 4],
    confidence: f64,
}

#[derive(Clone, Debug)]
struct Group {
    best: Candidate,
    neighbors: u32,
}

/// Greedy grouping: sort by confidence descending; each unclaimed
/// candidate claims every weaker one overlapping it above `iou_thresh`.
///
/// A group's neighbor count is the number of candidates it claimed.
fn group_candidates(candidates: &mut [Candidate], iou_thresh: f64) -> Vec<Group> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut groups = Vec::new();
    let mut claimed = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        if claimed[i] {
            continue;
        }
        let mut neighbors = 0;
        for j in (i + 1)..candidates.len() {
            if claimed[j] {
                continue;
            }
            if bbox_iou(&candidates[i].bbox, &candidates[j].bbox) > iou_thresh {
                claimed[j] = true;
                neighbors += 1;
            }
        }
        groups.push(Group {
            best: candidates[i].clone(),
            neighbors,
        });
    }
    groups
}

/// Applies the neighbor and size thresholds and clamps to the frame.
fn to_face_boxes(
    groups: &[Group],
    width: u32,
    height: u32,
    params: &DetectionParams,
) -> Vec<FaceBox> {
    let (min_w, min_h) = params.min_size;
    let mut boxes: Vec<FaceBox> = groups
        .iter()
        .filter(|g| g.neighbors >= params.min_neighbors)
        .filter(|g| g.best.bbox.iter().all(|v| v.is_finite()))
        .filter_map(|g| {
            // Clip in float space so wild model outputs cannot saturate the casts.
            let [x1, y1, x2, y2] = g.best.bbox;
            let (fw, fh) = (width as f64, height as f64);
            let x = x1.clamp(0.0, fw).round() as i32;
            let y = y1.clamp(0.0, fh).round() as i32;
            let w = x2.clamp(0.0, fw).round() as i32 - x;
            let h = y2.clamp(0.0, fh).round() as i32 - y;
            FaceBox::new(x, y, w, h).clamp_to(width, height)
        })
        .filter(|b| b.w >= min_w as i32 && b.h >= min_h as i32)
        .collect();
    FaceBox::sort_reading_order(&mut boxes);
    boxes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn candidate(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64) -> Candidate {
        Candidate {
            bbox: [x1, y1, x2, y2],
            confidence,
        }
    }

    fn params_with_neighbors(min_neighbors: u32) -> DetectionParams {
        DetectionParams {
            min_neighbors,
            ..DetectionParams::default()
        }
    }

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 → 640x640: scale 3.2, new 640x320, pad_y 160
        let frame = GrayFrame::new(vec![128u8; 200 * 100], 200, 100);
        let (tensor, boxed) = letterbox(&frame, 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(boxed.scale, 3.2, epsilon = 0.01);
        assert_eq!(boxed.pad_x, 0);
        assert_eq!(boxed.pad_y, 160);
    }

    #[test]
    fn test_letterbox_replicates_luma_into_all_planes() {
        let frame = GrayFrame::new(vec![255u8; 100 * 50], 100, 50);
        let (tensor, boxed) = letterbox(&frame, 640);

        let y = boxed.pad_y as usize + 1;
        for c in 0..3 {
            assert_relative_eq!(tensor[[0, c, y, 1]], 1.0, epsilon = 0.01);
            assert_relative_eq!(tensor[[0, c, 0, 0]], PAD_VALUE, epsilon = 0.01);
        }
    }

    #[test]
    fn test_letterbox_coordinates_map_back() {
        let frame = GrayFrame::new(vec![0u8; 200 * 100], 200, 100);
        let (_, boxed) = letterbox(&frame, 640);
        // Letterbox point (320, 320) is the center of the source frame
        assert_relative_eq!(boxed.to_source_x(320.0), 100.0, epsilon = 0.01);
        assert_relative_eq!(boxed.to_source_y(320.0), 50.0, epsilon = 0.01);
    }

    #[test]
    fn test_grouping_counts_neighbors() {
        let mut cands = vec![
            candidate(0.0, 0.0, 100.0, 100.0, 0.9),
            candidate(5.0, 5.0, 105.0, 105.0, 0.8),
            candidate(2.0, 2.0, 102.0, 102.0, 0.7),
            candidate(300.0, 300.0, 350.0, 350.0, 0.6),
        ];
        let groups = group_candidates(&mut cands, GROUP_IOU_THRESH);
        assert_eq!(groups.len(), 2);
        assert_relative_eq!(groups[0].best.confidence, 0.9);
        assert_eq!(groups[0].neighbors, 2);
        assert_eq!(groups[1].neighbors, 0);
    }

    #[test]
    fn test_grouping_strongest_candidate_wins() {
        let mut cands = vec![
            candidate(0.0, 0.0, 100.0, 100.0, 0.5),
            candidate(2.0, 2.0, 102.0, 102.0, 0.9),
        ];
        let groups = group_candidates(&mut cands, GROUP_IOU_THRESH);
        assert_eq!(groups.len(), 1);
        assert_relative_eq!(groups[0].best.confidence, 0.9);
    }

    #[test]
    fn test_grouping_empty_input() {
        let mut cands: Vec<Candidate> = Vec::new();
        assert!(group_candidates(&mut cands, GROUP_IOU_THRESH).is_empty());
    }

    #[test]
    fn test_face_boxes_require_min_neighbors() {
        let groups = vec![
            Group {
                best: candidate(10.0, 10.0, 60.0, 60.0, 0.9),
                neighbors: 5,
            },
            Group {
                best: candidate(100.0, 10.0, 150.0, 60.0, 0.9),
                neighbors: 4,
            },
        ];
        let boxes = to_face_boxes(&groups, 200, 200, &params_with_neighbors(5));
        assert_eq!(boxes, vec![FaceBox::new(10, 10, 50, 50)]);
    }

    #[test]
    fn test_face_boxes_drop_below_min_size() {
        let groups = vec![Group {
            best: candidate(10.0, 10.0, 35.0, 60.0, 0.9),
            neighbors: 9,
        }];
        assert!(to_face_boxes(&groups, 200, 200, &DetectionParams::default()).is_empty());
    }

    #[test]
    fn test_face_boxes_clamped_and_sorted() {
        let groups = vec![
            Group {
                best: candidate(150.0, 100.0, 230.0, 180.0, 0.9),
                neighbors: 0,
            },
            Group {
                best: candidate(-20.0, 10.0, 50.0, 80.0, 0.8),
                neighbors: 0,
            },
        ];
        let boxes = to_face_boxes(&groups, 200, 200, &params_with_neighbors(0));
        assert_eq!(
            boxes,
            vec![FaceBox::new(0, 10, 50, 70), FaceBox::new(150, 100, 50, 80)]
        );
    }

    #[test]
    fn test_face_boxes_skip_non_finite_coordinates() {
        let groups = vec![
            Group {
                best: candidate(f64::NAN, 10.0, 60.0, 60.0, 0.9),
                neighbors: 0,
            },
            Group {
                best: candidate(10.0, 10.0, f64::INFINITY, 60.0, 0.9),
                neighbors: 0,
            },
            Group {
                best: candidate(100.0, 100.0, 150.0, 150.0, 0.9),
                neighbors: 0,
            },
        ];
        let boxes = to_face_boxes(&groups, 200, 200, &params_with_neighbors(0));
        assert_eq!(boxes, vec![FaceBox::new(100, 100, 50, 50)]);
    }

    #[test]
    fn test_face_boxes_huge_coordinates_do_not_overflow() {
        let groups = vec![Group {
            best: candidate(-1e12, -1e12, 1e12, 1e12, 0.9),
            neighbors: 0,
        }];
        let boxes = to_face_boxes(&groups, 200, 100, &params_with_neighbors(0));
        assert_eq!(boxes, vec![FaceBox::new(0, 0, 200, 100)]);
    }
}
