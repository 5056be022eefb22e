use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use sha2::{Digest, Sha256};

use crate::api::ReleaseApi;
use crate::error::Result;

/// Callback type for reporting download progress.
/// Arguments: asset name, bytes downloaded, total bytes (0 if unknown), MiB/s, is_complete
pub type ProgressFn = Arc<dyn Fn(&str, u64, u64, f64, bool) + Send + Sync>;

/// Streams release assets and computes their SHA-256 checksums.
pub struct Downloader {
    api: ReleaseApi,
    /// Optional progress callback.
    pub progress: Option<ProgressFn>,
}

impl Downloader {
    /// Create a downloader sharing the API client's credentials and proxy.
    pub fn new(api: ReleaseApi) -> Self {
        Self {
            api,
            progress: None,
        }
    }

    /// Override the progress callback (builder).
    pub fn set_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Download `url` and return the hex SHA-256 of its body.
    ///
    /// The body is hashed chunk by chunk and never held in memory whole.
    pub async fn sha256(&self, url: &str) -> Result<String> {
        let name = url.rsplit('/').next().unwrap_or(url);
        tracing::info!(asset = %name, "downloading");

        let client = self.api.build_client()?;
        let resp = self.api.download(&client, url).await?;

        let total = resp.content_length().unwrap_or(0);
        let mut downloaded: u64 = 0;
        let mut hasher = Sha256::new();
        let mut stream = resp.bytes_stream();
        let start = Instant::now();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            downloaded += chunk.len() as u64;
            hasher.update(&chunk);
            self.report(name, downloaded, total, start, false);
        }
        self.report(name, downloaded, total, start, true);

        Ok(hex::encode(hasher.finalize()))
    }

    fn report(&self, name: &str, downloaded: u64, total: u64, start: Instant, complete: bool) {
        if let Some(progress) = &self.progress {
            let elapsed = start.elapsed().as_secs_f64();
            let mib_per_sec = if elapsed > 0.0 {
                (downloaded as f64) / (1024.0 * 1024.0) / elapsed
            } else {
                0.0
            };
            progress(name, downloaded, total, mib_per_sec, complete);
        }
    }
}
