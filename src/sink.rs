//! MeasurementSink boundary: the downstream measurement bus, treated as
//! an external collaborator (spec §1). Ships a channel-backed sink for
//! tests and a newline-delimited-JSON sink for the standalone binary.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::model::MappedMeasurement;

#[async_trait]
pub trait MeasurementSink: Send + Sync {
    /// Receives one batch per data frame, exactly once (spec §4.G step 5).
    async fn publish(&self, batch: Vec<MappedMeasurement>);
}

/// Forwards each batch over an `mpsc` channel; what the test suite and
/// the `getShortStatus` renderer observe.
pub struct ChannelMeasurementSink {
    tx: mpsc::UnboundedSender<Vec<MappedMeasurement>>,
}

impl ChannelMeasurementSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Vec<MappedMeasurement>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl MeasurementSink for ChannelMeasurementSink {
    async fn publish(&self, batch: Vec<MappedMeasurement>) {
        if self.tx.send(batch).is_err() {
            log::warn!("measurement sink receiver dropped, discarding batch");
        }
    }
}

/// Writes each batch as one line of JSON to the given async writer.
pub struct JsonlMeasurementSink<W> {
    writer: tokio::sync::Mutex<W>,
}

impl<W: tokio::io::AsyncWrite + Unpin + Send> JsonlMeasurementSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: tokio::sync::Mutex::new(writer),
        }
    }
}

#[async_trait]
impl<W: tokio::io::AsyncWrite + Unpin + Send> MeasurementSink for JsonlMeasurementSink<W> {
    async fn publish(&self, batch: Vec<MappedMeasurement>) {
        use tokio::io::AsyncWriteExt;
        let line = match serde_json::to_string(&batch) {
            Ok(s) => s,
            Err(e) => {
                log::error!("failed to serialize measurement batch: {e}");
                return;
            }
        };
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            log::error!("failed to write measurement batch: {e}");
            return;
        }
        let _ = writer.write_all(b"\n").await;
    }
}
