use crate::shared::frame::Frame;
use crate::BoxError;

/// Encodes a color frame into the byte form served to viewers.
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, BoxError>;
}
