use thiserror::Error;

/// Failure talking to the remote camera device.
///
/// Never surfaces to HTTP callers; the relay logs it and carries on.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("device unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("device answered with status {0}")]
    Status(reqwest::StatusCode),
}
