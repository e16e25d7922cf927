use crate::device::domain::device_error::DeviceError;
use crate::device::domain::face_reporter::FaceReporter;
use crate::shared::constants::{CAPTURE_PATH, FACE_DETECTION_PATH};
use crate::shared::face_box::FaceBox;

/// HTTP client for the remote camera device.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct HttpDeviceClient {
    http: reqwest::Client,
    capture_url: String,
    face_detection_url: String,
}

impl HttpDeviceClient {
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            http: reqwest::Client::new(),
            capture_url: format!("{base}{CAPTURE_PATH}"),
            face_detection_url: format!("{base}{FACE_DETECTION_PATH}"),
        }
    }

    pub fn capture_url(&self) -> &str {
        &self.capture_url
    }

    /// Asks the device to capture a frame and push it to the ingest endpoint.
    pub async fn request_capture(&self) -> Result<(), DeviceError> {
        let response = self.http.get(&self.capture_url).send().await?;
        check_status(response.status())
    }

    /// Posts face geometry as a JSON array.
    pub async fn send_faces(&self, faces: &[FaceBox]) -> Result<(), DeviceError> {
        // `.json()` sets `Content-Type: application/json`
        let response = self
            .http
            .post(&self.face_detection_url)
            .json(faces)
            .send()
            .await?;
        check_status(response.status())
    }
}

fn check_status(status: reqwest::StatusCode) -> Result<(), DeviceError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(DeviceError::Status(status))
    }
}

impl FaceReporter for HttpDeviceClient {
    /// Spawns the POST on the current tokio runtime and returns at once.
    fn report(&self, faces: Vec<FaceBox>) {
        let client = self.clone();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::warn!("Face report dropped: no async runtime to send it on");
            return;
        };
        runtime.spawn(async move {
            match client.send_faces(&faces).await {
                Ok(()) => log::info!("Reported {} face(s) to device", faces.len()),
                Err(e) => log::warn!("Failed to report faces to device: {e}"),
            }
        });
    }
}
