use crate::shared::frame::Frame;
use crate::BoxError;

/// Decodes an encoded image payload (as received over the wire) into a color frame.
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, payload: &[u8]) -> Result<Frame, BoxError>;
}
