//! Public types for the job client.

use std::time::Duration;

use receiptscan_protocol::UploadProgress;

use crate::backoff::BackoffSchedule;
use crate::error::ErrorKind;

/// Lifecycle state of a [`JobClient`](crate::client::JobClient).
///
/// `Succeeded`, `Failed` and `Canceled` are terminal for the job they
/// describe; the client itself may be reused with a new submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No job submitted yet.
    Idle,
    /// Upload request in flight.
    Uploading,
    /// Waiting for the job to reach a terminal status.
    Polling,
    /// The job completed and its result was delivered.
    Succeeded,
    /// The upload or the job failed.
    Failed,
    /// The caller canceled the active job.
    Canceled,
}

impl ClientState {
    /// Returns `true` while a job is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, ClientState::Uploading | ClientState::Polling)
    }
}

/// Events emitted by the client, delivered in occurrence order.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// Upload progress. Only emitted while [`ClientState::Uploading`].
    Progress(UploadProgress),
    /// The client moved to a new state.
    StateChanged { state: ClientState },
    /// The job reached its result.
    Completed { result: serde_json::Value },
    /// The upload or the job failed.
    Failed { kind: ErrorKind, detail: String },
    /// The active job was canceled.
    Canceled,
}

/// Configuration for a [`JobClient`](crate::client::JobClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the receipt service, without trailing slash.
    pub base_url: String,
    /// Delay schedule between status queries.
    pub backoff: BackoffSchedule,
    /// Overall deadline for a poll sequence. `None` polls until the job
    /// is terminal.
    pub poll_deadline: Option<Duration>,
    /// Consecutive transport failures tolerated while polling before
    /// the failure becomes terminal.
    pub transport_retries: u32,
    /// Maximum accepted payload size. Larger payloads are rejected
    /// before any request is issued.
    pub max_payload_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            backoff: BackoffSchedule::default(),
            poll_deadline: None,
            transport_retries: 2,
            max_payload_bytes: 10 * 1024 * 1024,
        }
    }
}
