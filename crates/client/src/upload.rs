//! Receipt upload with progress forwarding and cancellation.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use receiptscan_protocol::UploadAccepted;

use crate::connection::ServiceConnection;
use crate::error::{ClientError, classify_reply};
use crate::types::JobEvent;

/// Capacity of the transport-side progress channel.
const PROGRESS_BUFFER: usize = 32;

/// Uploads a receipt payload and returns the server's acknowledgment.
///
/// Progress is forwarded to `events_tx` while the request is in flight.
/// Cancellation is observed at the await points: the request future is
/// dropped, aborting the underlying HTTP request, and no further
/// progress events fire afterwards.
pub async fn send_upload(
    conn: &dyn ServiceConnection,
    payload: Vec<u8>,
    filename: &str,
    max_payload_bytes: usize,
    events_tx: &mpsc::Sender<JobEvent>,
    cancel: &CancellationToken,
) -> Result<UploadAccepted, ClientError> {
    if payload.is_empty() {
        return Err(ClientError::Validation {
            detail: "empty payload".into(),
        });
    }
    if payload.len() > max_payload_bytes {
        return Err(ClientError::Validation {
            detail: format!(
                "payload of {} bytes exceeds the {max_payload_bytes} byte limit",
                payload.len()
            ),
        });
    }
    if cancel.is_cancelled() {
        return Err(ClientError::Canceled);
    }

    let (progress_tx, mut progress_rx) = mpsc::channel(PROGRESS_BUFFER);
    let mut request = conn.upload(payload, filename.to_string(), progress_tx);

    let reply = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(filename, "upload canceled");
                return Err(ClientError::Canceled);
            }
            Some(progress) = progress_rx.recv() => {
                let _ = events_tx.send(JobEvent::Progress(progress)).await;
            }
            reply = &mut request => break reply?,
        }
    };

    if let Some(err) = classify_reply(&reply) {
        return Err(err);
    }

    let ack: UploadAccepted =
        serde_json::from_slice(&reply.body).map_err(|e| ClientError::Server {
            status: reply.status,
            detail: format!("undecodable accept body: {e}"),
        })?;
    debug!(job_id = %ack.job_id, "upload accepted");
    Ok(ack)
}
