use serde::{Deserialize, Serialize};

/// Server-side processing status of a receipt job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted by the server but not yet picked up by a worker.
    ///
    /// The job store reports freshly created jobs as `"queued"`.
    #[serde(alias = "queued")]
    Pending,
    /// A worker is parsing the receipt.
    Processing,
    /// Parsing finished; the result is available.
    Completed,
    /// Parsing failed on the server side.
    Failed,
}

impl JobStatus {
    /// Returns `true` for statuses after which the job no longer changes.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Client-side record of one submitted job.
///
/// Created when the server accepts an upload, updated only from poll
/// replies (plus transport-level failure recording), and discarded when
/// a new submission begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Opaque server-assigned identifier.
    pub id: String,
    pub status: JobStatus,
    /// Parsed receipt payload, populated on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Failure detail, populated when the job or its transport fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl Job {
    /// Creates the record for a job the server just accepted.
    pub fn accepted(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Pending,
            result: None,
            error_detail: None,
        }
    }
}
