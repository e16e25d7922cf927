use std::time::Duration;

use tokio::task::JoinHandle;

use crate::device::infrastructure::http_device_client::HttpDeviceClient;

/// Periodically asks the remote device to capture and push a frame.
///
/// One request is made immediately, then one after each `interval` of
/// sleep. Failures are logged and the loop carries on.
pub struct CaptureTrigger {
    client: HttpDeviceClient,
    interval: Duration,
}

impl CaptureTrigger {
    pub fn new(client: HttpDeviceClient, interval: Duration) -> Self {
        Self { client, interval }
    }

    /// Runs forever on the current runtime.
    pub async fn run(self) {
        log::info!(
            "Requesting captures from {} every {:?}",
            self.client.capture_url(),
            self.interval
        );
        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Starts the loop as a background task. It ends with the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn tick(&self) {
        match self.client.request_capture().await {
            Ok(()) => log::info!("Capture requested from device"),
            Err(e) => log::warn!("Capture request failed: {e}"),
        }
    }
}
