use thiserror::Error;

use crate::BoxError;

/// Why an ingested payload did not reach the frame store.
///
/// In both cases the store is left exactly as it was.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The payload is not a decodable image. Maps to HTTP 400.
    #[error("failed to decode image: {0}")]
    Decode(#[source] BoxError),
    /// Detection, annotation or the worker itself failed. Maps to HTTP 500.
    #[error("internal error while processing image: {0}")]
    Internal(#[source] BoxError),
}

impl IngestError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, IngestError::Decode(_))
    }
}
