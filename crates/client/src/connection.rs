//! Transport seam between the job flow and the HTTP service.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use receiptscan_protocol::UploadProgress;

use crate::error::ClientError;

/// Raw outcome of one HTTP exchange: status code plus body bytes.
///
/// Classification into the error taxonomy happens in [`crate::error`],
/// so uploads and status queries surface identical error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl WireReply {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract connection to the receipt service.
///
/// The production implementation is
/// [`HttpConnection`](crate::http::HttpConnection). Using a trait keeps
/// the job flow decoupled from HTTP and testable with mocks.
pub trait ServiceConnection: Send + Sync {
    /// Uploads the payload as a multipart POST and returns the raw reply.
    ///
    /// Byte counts are reported through `progress` while the body
    /// streams out; the receiver may be dropped at any time.
    fn upload(
        &self,
        payload: Vec<u8>,
        filename: String,
        progress: mpsc::Sender<UploadProgress>,
    ) -> Pin<Box<dyn Future<Output = Result<WireReply, ClientError>> + Send + '_>>;

    /// Queries the status of a job and returns the raw reply.
    fn job_status(
        &self,
        job_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<WireReply, ClientError>> + Send + '_>>;
}
