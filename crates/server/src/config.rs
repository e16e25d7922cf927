use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use facerelay_core::detection::domain::detection_params::{
    DetectionParams, DEFAULT_MIN_NEIGHBORS, DEFAULT_MIN_SIZE, DEFAULT_SCALE_FACTOR,
};
use facerelay_core::detection::infrastructure::onnx_face_detector::DEFAULT_CONFIDENCE;
use facerelay_core::shared::constants::{
    DEFAULT_CAPTURE_INTERVAL_MS, DEFAULT_JPEG_QUALITY, DEFAULT_STREAM_INTERVAL_MS,
};

/// Relays frames from a remote camera as an annotated MJPEG stream.
#[derive(Parser, Debug)]
#[command(name = "facerelay")]
pub struct Cli {
    /// Base URL of the camera device, e.g. http://192.168.0.42.
    #[arg(long)]
    pub device_url: String,

    /// Address the HTTP server listens on.
    #[arg(long, default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Milliseconds between capture requests sent to the device.
    #[arg(long, default_value_t = DEFAULT_CAPTURE_INTERVAL_MS)]
    pub capture_interval_ms: u64,

    /// Milliseconds between frames pushed to each stream viewer.
    #[arg(long, default_value_t = DEFAULT_STREAM_INTERVAL_MS)]
    pub stream_interval_ms: u64,

    /// Detection pyramid scale step (must be greater than 1.0).
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    pub scale_factor: f64,

    /// Overlapping candidates required to accept a face.
    #[arg(long, default_value_t = DEFAULT_MIN_NEIGHBORS)]
    pub min_neighbors: u32,

    /// Smallest face side in pixels.
    #[arg(long, default_value_t = DEFAULT_MIN_SIZE)]
    pub min_size: u32,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    pub confidence: f64,

    /// JPEG quality of streamed frames (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    pub jpeg_quality: u8,

    /// ONNX face model to load instead of the cached download.
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Also save the last processed frame to this file.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

impl Cli {
    pub fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            scale_factor: self.scale_factor,
            min_neighbors: self.min_neighbors,
            min_size: (self.min_size, self.min_size),
        }
    }

    pub fn capture_interval(&self) -> Duration {
        Duration::from_millis(self.capture_interval_ms)
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }
}

pub fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !(cli.device_url.starts_with("http://") || cli.device_url.starts_with("https://")) {
        return Err(format!(
            "Device URL must start with http:// or https://, got '{}'",
            cli.device_url
        )
        .into());
    }
    if cli.capture_interval_ms == 0 {
        return Err("Capture interval must be positive".into());
    }
    if cli.stream_interval_ms == 0 {
        return Err("Stream interval must be positive".into());
    }
    cli.detection_params().validate()?;
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if !(1..=100).contains(&cli.jpeg_quality) {
        return Err(format!(
            "JPEG quality must be between 1 and 100, got {}",
            cli.jpeg_quality
        )
        .into());
    }
    if let Some(model) = &cli.model {
        if !model.exists() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    Ok(())
}
