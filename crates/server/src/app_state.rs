use std::sync::Arc;
use std::time::Duration;

use facerelay_core::pipeline::frame_ingestor::FrameIngestor;
use facerelay_core::relay::frame_store::FrameStore;
use facerelay_core::video::domain::frame_encoder::FrameEncoder;

/// Everything the HTTP handlers share. Cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<FrameIngestor>,
    pub encoder: Arc<dyn FrameEncoder>,
    pub stream_interval: Duration,
}

impl AppState {
    pub fn new(
        ingestor: FrameIngestor,
        encoder: Arc<dyn FrameEncoder>,
        stream_interval: Duration,
    ) -> Self {
        Self {
            ingestor: Arc::new(ingestor),
            encoder,
            stream_interval,
        }
    }

    pub fn store(&self) -> &Arc<FrameStore> {
        self.ingestor.store()
    }
}
