// ============================================================
// Layer 6: Artifact Downloader
// ============================================================
// Streams a remote artifact into a local file and keeps trying
// until it succeeds or cancellation is requested.
//
//   loop {
//     cancelled?            → Err(Cancelled)
//     fetch (whole file)    → Ok → done
//     transport failure     → cancelled? → Err(Cancelled)
//                             otherwise sleep(retry_delay), repeat
//     any other failure     → Err (not retried)
//   }
//
// Each attempt restarts the download from byte zero and
// truncates the destination file. A body that stops arriving
// for longer than the read timeout fails the attempt like any
// other transport error. Network waits and the backoff sleep
// end early when cancellation fires.
//
// Reference: reqwest documentation (Response::bytes_stream)

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::domain::cancel::CancelToken;
use crate::domain::error::{QaError, QaResult};
use crate::domain::traits::ArtifactSource;

/// Wait between failed download attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Longest silence tolerated between two reads of a response.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Progress is logged every time this many percent complete.
const PROGRESS_STEP_PERCENT: u64 = 5;

// ─── HttpSource ───────────────────────────────────────────────────────────────
/// A plain HTTPS GET endpoint serving the artifact bytes.
pub struct HttpSource {
    url:    String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> QaResult<Self> {
        Self::with_read_timeout(url, DEFAULT_READ_TIMEOUT)
    }

    pub fn with_read_timeout(url: impl Into<String>, read_timeout: Duration) -> QaResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(read_timeout)
            .build()
            .map_err(|e| QaError::Download(e.to_string()))?;
        Ok(Self { url: url.into(), client })
    }
}

#[async_trait]
impl ArtifactSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch_into(&self, dest: &Path, cancel: &CancelToken) -> QaResult<u64> {
        let response = tokio::select! {
            sent = self.client.get(&self.url).send() => {
                sent.map_err(|e| QaError::Download(e.to_string()))?
            }
            _ = cancel.cancelled() => return Err(QaError::Cancelled),
        };

        if !response.status().is_success() {
            return Err(QaError::Download(format!("HTTP {}", response.status())));
        }

        let total = response.content_length();

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(dest).await?;

        let mut stream       = response.bytes_stream();
        let mut bytes_done   = 0u64;
        let mut next_percent = PROGRESS_STEP_PERCENT;

        loop {
            let next = tokio::select! {
                next = stream.next() => next,
                _ = cancel.cancelled() => return Err(QaError::Cancelled),
            };
            let Some(chunk) = next else { break };
            let chunk = chunk.map_err(|e| QaError::Download(e.to_string()))?;
            file.write_all(&chunk).await?;
            bytes_done += chunk.len() as u64;

            if let Some(total) = total.filter(|&t| t > 0) {
                let percent = bytes_done * 100 / total;
                if percent >= next_percent {
                    tracing::debug!("Downloaded {}% ({} / {} bytes)", percent, bytes_done, total);
                    next_percent = (percent / PROGRESS_STEP_PERCENT + 1) * PROGRESS_STEP_PERCENT;
                }
            }
        }

        file.flush().await?;
        Ok(bytes_done)
    }
}

// ─── Retry loop ───────────────────────────────────────────────────────────────
/// Download `source` into `dest`, retrying transport failures
/// every `retry_delay` until success or cancellation.
pub async fn download_with_retry(
    source:      &dyn ArtifactSource,
    dest:        &Path,
    retry_delay: Duration,
    cancel:      &CancelToken,
) -> QaResult<u64> {
    let mut attempt = 0u32;
    loop {
        cancel.check()?;
        attempt += 1;
        tracing::info!(
            "Downloading '{}' → '{}' (attempt {})",
            source.location(),
            dest.display(),
            attempt
        );

        match source.fetch_into(dest, cancel).await {
            Ok(bytes) => {
                tracing::info!("Download complete: {} bytes written to '{}'", bytes, dest.display());
                return Ok(bytes);
            }
            Err(e) if e.is_transient() => {
                cancel.check()?;
                tracing::warn!("Download attempt {} failed: {}; retrying in {:?}", attempt, e, retry_delay);
                tokio::select! {
                    _ = tokio::time::sleep(retry_delay) => {}
                    _ = cancel.cancelled() => return Err(QaError::Cancelled),
                }
            }
            Err(e) => return Err(e),
        }
    }
}
