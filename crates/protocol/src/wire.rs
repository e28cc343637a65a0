//! JSON bodies of the upload and status endpoints.

use serde::{Deserialize, Serialize};

use crate::job::JobStatus;

/// Body of the `202 Accepted` reply to a receipt upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAccepted {
    pub job_id: String,
}

/// Body of a `202 Accepted` status reply while the job is non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: JobStatus,
}

/// Body of the `200 OK` status reply for a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedBody {
    /// Parsed receipt data. The shape is owned by the parser; the
    /// client treats it as opaque.
    pub parsed: serde_json::Value,
}

/// Error body carried by `400`-class and server-error replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Transient upload progress notification.
///
/// Recomputed per notification, never retained after the upload ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub bytes_sent: u64,
    /// Total payload size, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_total: Option<u64>,
}
