//! Scripted [`ServiceConnection`] double shared by the flow tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::mpsc;

use receiptscan_protocol::UploadProgress;

use crate::connection::{ServiceConnection, WireReply};
use crate::error::ClientError;

/// Scripted outcome for one HTTP exchange.
pub(crate) enum Scripted {
    Reply(WireReply),
    /// Transport-level failure.
    Fail(String),
    /// Never resolves. For cancellation tests.
    Hang,
}

pub(crate) fn reply(status: u16, body: serde_json::Value) -> Scripted {
    Scripted::Reply(WireReply {
        status,
        body: serde_json::to_vec(&body).unwrap(),
    })
}

pub(crate) fn raw_reply(status: u16, body: &str) -> Scripted {
    Scripted::Reply(WireReply {
        status,
        body: body.as_bytes().to_vec(),
    })
}

pub(crate) struct MockConn {
    uploads: Mutex<Vec<Scripted>>,
    statuses: Mutex<Vec<Scripted>>,
    /// Progress notifications pushed while an upload is in flight.
    progress: Vec<UploadProgress>,
    pub(crate) upload_calls: AtomicU32,
    pub(crate) status_calls: AtomicU32,
    /// Paused-clock timestamps of each status query.
    pub(crate) status_times: Mutex<Vec<tokio::time::Instant>>,
}

impl MockConn {
    pub(crate) fn new(uploads: Vec<Scripted>, statuses: Vec<Scripted>) -> Self {
        Self {
            uploads: Mutex::new(uploads),
            statuses: Mutex::new(statuses),
            progress: Vec::new(),
            upload_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            status_times: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_progress(mut self, progress: Vec<UploadProgress>) -> Self {
        self.progress = progress;
        self
    }

    fn next(queue: &Mutex<Vec<Scripted>>) -> Scripted {
        let mut q = queue.lock().unwrap();
        if q.is_empty() {
            Scripted::Fail("no scripted reply".into())
        } else {
            q.remove(0)
        }
    }
}

impl ServiceConnection for MockConn {
    fn upload(
        &self,
        _payload: Vec<u8>,
        _filename: String,
        progress: mpsc::Sender<UploadProgress>,
    ) -> Pin<Box<dyn Future<Output = Result<WireReply, ClientError>> + Send + '_>> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = Self::next(&self.uploads);
        let notifications = self.progress.clone();
        Box::pin(async move {
            for p in notifications {
                let _ = progress.try_send(p);
            }
            match scripted {
                Scripted::Reply(reply) => Ok(reply),
                Scripted::Fail(msg) => Err(ClientError::Transport(msg)),
                Scripted::Hang => std::future::pending().await,
            }
        })
    }

    fn job_status(
        &self,
        _job_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<WireReply, ClientError>> + Send + '_>> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status_times
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());
        let scripted = Self::next(&self.statuses);
        Box::pin(async move {
            match scripted {
                Scripted::Reply(reply) => Ok(reply),
                Scripted::Fail(msg) => Err(ClientError::Transport(msg)),
                Scripted::Hang => std::future::pending().await,
            }
        })
    }
}
