use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{LogStore, LogStoreError};

/// Periodically compresses each live log stream into a timestamped archive
/// and truncates the live stream afterwards.
pub struct LogArchiver {
    logs: Arc<dyn LogStore>,
    interval: Duration,
}

impl LogArchiver {
    pub fn new(logs: Arc<dyn LogStore>, interval: Duration) -> Self {
        Self { logs, interval }
    }

    /// Run the archive loop forever: once immediately, then on every interval
    /// tick.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(self.interval);
            loop {
                timer.tick().await;
                self.run_cycle().await;
            }
        })
    }

    /// Archive every live stream. Streams are handled independently: a
    /// failure on one is logged and leaves that stream's content intact
    /// without blocking the others.
    pub async fn run_cycle(&self) {
        let streams = match self.logs.list(false).await {
            Ok(streams) => streams,
            Err(err) => {
                warn!(error = %err, "could not list log streams for archiving");
                return;
            }
        };
        if streams.is_empty() {
            debug!("no live log streams to archive");
            return;
        }

        for stream in streams {
            let timestamp = Utc::now().timestamp_millis();
            if let Err(err) = self.archive_stream(&stream, timestamp).await {
                warn!(stream = %stream, error = %err, "log archiving failed, stream left intact");
            }
        }
    }

    /// Compress-then-truncate, in that order. Truncation only happens after
    /// the archive write is confirmed, so a failure at any earlier step
    /// leaves the live stream untouched.
    pub async fn archive_stream(&self, stream: &str, timestamp_ms: i64) -> Result<(), LogStoreError> {
        let content = self.logs.read_all(stream).await?;
        if content.is_empty() {
            debug!(stream = %stream, "stream is empty, nothing to archive");
            return Ok(());
        }

        let compressed = compress(&content)?;
        let archive = format!("{stream}-{timestamp_ms}");
        self.logs.create_archive(&archive, &compressed).await?;
        self.logs.truncate(stream).await?;

        info!(stream = %stream, archive = %archive, "archived log stream");
        Ok(())
    }
}

/// Gzip a byte buffer.
pub fn compress(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

/// Inverse of [`compress`]; used when reading archives back.
pub fn decompress(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
