//! Error taxonomy and HTTP reply classification.

use receiptscan_protocol::ErrorBody;

use crate::connection::WireReply;

/// Errors produced by the job client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The payload was rejected. Retrying the same payload will not help.
    #[error("validation failed: {detail}")]
    Validation { detail: String },

    /// The server answered outside its contract.
    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// Network-level failure before a reply was observed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The configured poll deadline elapsed before a terminal status.
    #[error("poll deadline exceeded")]
    PollTimeout,

    /// Caller misuse, e.g. submitting while a job is in flight.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// The active operation was canceled by the caller.
    #[error("canceled")]
    Canceled,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stable machine-readable kind carried by failure events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Server,
    Transport,
    PollTimeout,
    InvalidState,
    Canceled,
}

impl ClientError {
    /// Returns the stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::Server { .. } | ClientError::Json(_) => ErrorKind::Server,
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::PollTimeout => ErrorKind::PollTimeout,
            ClientError::InvalidState(_) => ErrorKind::InvalidState,
            ClientError::Canceled => ErrorKind::Canceled,
        }
    }

    /// Human-readable detail for failure events.
    ///
    /// Server-reported details are surfaced verbatim; everything else
    /// falls back to the display form.
    pub fn detail(&self) -> String {
        match self {
            ClientError::Validation { detail } | ClientError::Server { detail, .. } => {
                detail.clone()
            }
            other => other.to_string(),
        }
    }
}

/// Maps an HTTP reply to the error taxonomy.
///
/// Returns `None` for 2xx replies. 400-class replies are validation
/// rejections; every other non-2xx status is a server error. The body's
/// `detail` field is surfaced verbatim when it parses, with a fallback
/// built from the status code otherwise. Both the uploader and the
/// poller classify through here, so failures look identical to the
/// caller regardless of which request produced them.
pub fn classify_reply(reply: &WireReply) -> Option<ClientError> {
    match reply.status {
        200..=299 => None,
        400..=499 => Some(ClientError::Validation {
            detail: reply_detail(reply),
        }),
        status => Some(ClientError::Server {
            status,
            detail: reply_detail(reply),
        }),
    }
}

fn reply_detail(reply: &WireReply) -> String {
    serde_json::from_slice::<ErrorBody>(&reply.body)
        .map(|body| body.detail)
        .unwrap_or_else(|_| format!("HTTP {}", reply.status))
}
