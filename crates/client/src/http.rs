//! reqwest-backed [`ServiceConnection`] implementation.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::stream;
use tokio::sync::mpsc;
use tracing::debug;

use receiptscan_protocol::UploadProgress;

use crate::connection::{ServiceConnection, WireReply};
use crate::error::ClientError;

/// Upload body chunk size.
///
/// Small enough that progress notifications track the wire, large
/// enough to keep per-chunk overhead negligible.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// HTTP connection to the receipt service.
pub struct HttpConnection {
    http: reqwest::Client,
    base_url: String,
}

impl HttpConnection {
    /// Creates a connection with the given HTTP client and base URL.
    ///
    /// Trailing slashes on `base_url` are trimmed.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    async fn read_reply(resp: reqwest::Response) -> Result<WireReply, ClientError> {
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to read reply body: {e}")))?
            .to_vec();
        Ok(WireReply { status, body })
    }
}

impl ServiceConnection for HttpConnection {
    fn upload(
        &self,
        payload: Vec<u8>,
        filename: String,
        progress: mpsc::Sender<UploadProgress>,
    ) -> Pin<Box<dyn Future<Output = Result<WireReply, ClientError>> + Send + '_>> {
        Box::pin(async move {
            let total = payload.len() as u64;
            let mut sent: u64 = 0;

            // Chunk the payload so byte counts go out as reqwest pulls
            // the body, not all at once up front.
            let chunks: Vec<Bytes> = payload
                .chunks(UPLOAD_CHUNK_SIZE)
                .map(Bytes::copy_from_slice)
                .collect();
            let body = stream::iter(chunks.into_iter().map(move |chunk| {
                sent += chunk.len() as u64;
                let _ = progress.try_send(UploadProgress {
                    bytes_sent: sent,
                    bytes_total: Some(total),
                });
                Ok::<Bytes, std::io::Error>(chunk)
            }));

            let content_type =
                detect_content_type(&filename).unwrap_or("application/octet-stream");
            let part = reqwest::multipart::Part::stream_with_length(
                reqwest::Body::wrap_stream(body),
                total,
            )
            .file_name(filename)
            .mime_str(content_type)
            .map_err(|e| ClientError::Transport(format!("invalid content type: {e}")))?;
            let form = reqwest::multipart::Form::new().part("file", part);

            let resp = self
                .http
                .post(format!("{}/receipts", self.base_url))
                .multipart(form)
                .send()
                .await
                .map_err(|e| ClientError::Transport(format!("upload request failed: {e}")))?;

            debug!(status = resp.status().as_u16(), "upload reply");
            Self::read_reply(resp).await
        })
    }

    fn job_status(
        &self,
        job_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<WireReply, ClientError>> + Send + '_>> {
        let url = format!("{}/receipts/{job_id}", self.base_url);
        Box::pin(async move {
            let resp = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| ClientError::Transport(format!("status request failed: {e}")))?;
            Self::read_reply(resp).await
        })
    }
}

/// Detects MIME content type from a filename extension.
fn detect_content_type(path: &str) -> Option<&'static str> {
    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("webp") => Some("image/webp"),
        Some("gif") => Some("image/gif"),
        _ => None,
    }
}
