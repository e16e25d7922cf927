use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;

use crate::device::domain::face_reporter::FaceReporter;
use crate::pipeline::ingest_error::IngestError;
use crate::pipeline::ingest_frame_use_case::{AnnotatedFrame, IngestFrameUseCase};
use crate::relay::frame_store::FrameStore;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Producer side of the relay.
///
/// Runs the ingest use case on the blocking pool, hands faces to the
/// reporter, then publishes the annotated frame to the store. Concurrent
/// calls serialize on the detector and race on the store write, so the
/// last write to finish wins.
pub struct FrameIngestor {
    use_case: Arc<Mutex<IngestFrameUseCase>>,
    store: Arc<FrameStore>,
    reporter: Arc<dyn FaceReporter>,
    snapshot: Option<SnapshotSink>,
}

struct SnapshotSink {
    writer: Arc<dyn ImageWriter>,
    path: PathBuf,
}

impl FrameIngestor {
    pub fn new(
        use_case: IngestFrameUseCase,
        store: Arc<FrameStore>,
        reporter: Arc<dyn FaceReporter>,
    ) -> Self {
        Self {
            use_case: Arc::new(Mutex::new(use_case)),
            store,
            reporter,
            snapshot: None,
        }
    }

    /// Also persists every processed frame to `path`, best effort.
    pub fn with_snapshot(mut self, writer: Arc<dyn ImageWriter>, path: PathBuf) -> Self {
        self.snapshot = Some(SnapshotSink { writer, path });
        self
    }

    pub fn store(&self) -> &Arc<FrameStore> {
        &self.store
    }

    /// Processes one raw image payload and returns the number of faces found.
    ///
    /// On error the store is untouched and nothing is reported.
    pub async fn ingest(&self, payload: Bytes) -> Result<usize, IngestError> {
        let use_case = self.use_case.clone();
        let AnnotatedFrame { frame, faces } = tokio::task::spawn_blocking(move || {
            let mut use_case = use_case.lock().unwrap_or_else(|poisoned| {
                log::warn!("Recovering ingest pipeline after a panicked request");
                PoisonError::into_inner(poisoned)
            });
            use_case.execute(&payload)
        })
        .await
        .map_err(|e| IngestError::Internal(format!("ingest worker failed: {e}").into()))??;

        let face_count = faces.len();
        let (width, height) = (frame.width(), frame.height());
        if !faces.is_empty() {
            self.reporter.report(faces);
        }

        let frame = Arc::new(frame);
        self.store.write_shared(frame.clone(), face_count);
        log::debug!("Ingested {width}x{height} frame with {face_count} face(s)");

        if let Some(sink) = &self.snapshot {
            sink.persist(frame).await;
        }
        Ok(face_count)
    }
}

impl SnapshotSink {
    async fn persist(&self, frame: Arc<Frame>) {
        let writer = self.writer.clone();
        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || writer.write(&path, &frame)).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("Failed to save snapshot to {}: {e}", self.path.display()),
            Err(e) => log::warn!("Snapshot worker failed: {e}"),
        }
    }
}
