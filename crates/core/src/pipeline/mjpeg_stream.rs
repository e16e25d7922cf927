use std::sync::Arc;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::{self, Stream};
use tokio::time::{Interval, MissedTickBehavior};

use crate::relay::frame_store::FrameStore;
use crate::shared::constants::MJPEG_BOUNDARY;
use crate::video::domain::frame_encoder::FrameEncoder;

/// Content type of the response carrying [`mjpeg_stream`].
pub fn mjpeg_content_type() -> String {
    format!("multipart/x-mixed-replace; boundary={MJPEG_BOUNDARY}")
}

/// Wraps one JPEG as a multipart part.
pub fn mjpeg_chunk(jpeg: &[u8]) -> Bytes {
    let header = format!("--{MJPEG_BOUNDARY}\r\nContent-Type: image/jpeg\r\n\r\n");
    let mut chunk = BytesMut::with_capacity(header.len() + jpeg.len() + 4);
    chunk.put_slice(header.as_bytes());
    chunk.put_slice(jpeg);
    chunk.put_slice(b"\r\n\r\n");
    chunk.freeze()
}

struct StreamState {
    store: Arc<FrameStore>,
    encoder: Arc<dyn FrameEncoder>,
    period: Duration,
    ticker: Option<Interval>,
}

/// Endless multipart stream of the store's current frame.
///
/// Nothing is yielded until the store has been written once. After that a
/// chunk is produced every `period`, re-sending the latest frame whether
/// or not it changed. Ticks that fall behind are delayed rather than
/// bursted. A frame that fails to encode is logged and its tick skipped.
/// The stream only ends when the consumer drops it.
pub fn mjpeg_stream(
    store: Arc<FrameStore>,
    encoder: Arc<dyn FrameEncoder>,
    period: Duration,
) -> impl Stream<Item = Bytes> + Send + 'static {
    let state = StreamState {
        store,
        encoder,
        period,
        ticker: None,
    };
    stream::unfold(state, |mut state| async move {
        if state.ticker.is_none() {
            state.store.wait_ready().await;
        }
        let period = state.period;
        loop {
            let ticker = state.ticker.get_or_insert_with(|| {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker
            });
            ticker.tick().await;
            if let Some(chunk) = next_chunk(&state.store, &state.encoder).await {
                return Some((chunk, state));
            }
        }
    })
}

async fn next_chunk(store: &FrameStore, encoder: &Arc<dyn FrameEncoder>) -> Option<Bytes> {
    let frame = store.snapshot().frame?;
    let encoder = encoder.clone();
    match tokio::task::spawn_blocking(move || encoder.encode(&frame)).await {
        Ok(Ok(jpeg)) => Some(mjpeg_chunk(&jpeg)),
        Ok(Err(e)) => {
            log::warn!("Skipping stream frame, encode failed: {e}");
            None
        }
        Err(e) => {
            log::warn!("Skipping stream frame, encoder worker failed: {e}");
            None
        }
    }
}
