use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use facerelay_core::annotation::infrastructure::rectangle_annotator::RectangleAnnotator;
use facerelay_core::detection::infrastructure::onnx_face_detector::OnnxFaceDetector;
use facerelay_core::device::infrastructure::http_device_client::HttpDeviceClient;
use facerelay_core::pipeline::capture_trigger::CaptureTrigger;
use facerelay_core::pipeline::frame_ingestor::FrameIngestor;
use facerelay_core::pipeline::ingest_frame_use_case::IngestFrameUseCase;
use facerelay_core::relay::frame_store::FrameStore;
use facerelay_core::shared::constants::{FACE_MODEL_NAME, FACE_MODEL_URL};
use facerelay_core::shared::model_resolver;
use facerelay_core::video::infrastructure::image_file_writer::ImageFileWriter;
use facerelay_core::video::infrastructure::jpeg_codec::JpegCodec;
use facerelay_server::config::{validate, Cli};
use facerelay_server::{build_router, AppState};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    // The resolver downloads with a blocking client, so it runs before the runtime exists.
    let model_path = resolve_model(&cli)?;
    let detector = OnnxFaceDetector::new(&model_path, cli.confidence)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(cli, detector))
}

async fn serve(cli: Cli, detector: OnnxFaceDetector) -> Result<(), Box<dyn std::error::Error>> {
    let codec = Arc::new(JpegCodec::new(cli.jpeg_quality));
    let device = HttpDeviceClient::new(&cli.device_url);
    let store = Arc::new(FrameStore::new());

    let use_case = IngestFrameUseCase::new(
        Box::new(JpegCodec::new(cli.jpeg_quality)),
        Box::new(detector),
        Box::new(RectangleAnnotator::default()),
        cli.detection_params(),
    );
    let mut ingestor = FrameIngestor::new(use_case, store, Arc::new(device.clone()));
    if let Some(path) = cli.snapshot.clone() {
        log::info!("Saving processed frames to {}", path.display());
        ingestor = ingestor.with_snapshot(Arc::new(ImageFileWriter::new()), path);
    }

    let state = AppState::new(ingestor, codec, cli.stream_interval());
    let app = build_router(state);

    let _capture = CaptureTrigger::new(device, cli.capture_interval()).spawn();

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn resolve_model(cli: &Cli) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.model {
        log::info!("Using model: {}", path.display());
        return Ok(path.clone());
    }
    log::info!("Resolving model: {FACE_MODEL_NAME}");
    let path = model_resolver::resolve(
        FACE_MODEL_NAME,
        FACE_MODEL_URL,
        None,
        Some(Box::new(download_progress)),
    )?;
    log::info!("Using model: {}", path.display());
    Ok(path)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
