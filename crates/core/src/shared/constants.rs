pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Remote device path that makes the camera capture and push a new frame.
pub const CAPTURE_PATH: &str = "/capture";

/// Remote device path that accepts detected face geometry.
pub const FACE_DETECTION_PATH: &str = "/face-detection";

/// Fixed multipart boundary marker of the MJPEG stream.
pub const MJPEG_BOUNDARY: &str = "frame";

pub const DEFAULT_CAPTURE_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_STREAM_INTERVAL_MS: u64 = 100;
pub const DEFAULT_JPEG_QUALITY: u8 = 90;
