//! Job client facade: one upload-and-poll state machine per instance.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use receiptscan_protocol::{Job, JobStatus};

use crate::connection::ServiceConnection;
use crate::error::ClientError;
use crate::poller::StatusPoller;
use crate::types::{ClientConfig, ClientState, JobEvent};
use crate::upload;

/// Event channel capacity.
const EVENT_BUFFER: usize = 256;

/// Client for one receipt job at a time.
///
/// `submit` uploads the payload and follows the resulting job until it
/// succeeds, fails, or is canceled; the caller watches the event stream
/// from [`take_events`](Self::take_events). One job is active at a
/// time: a new submission is only accepted from `Idle` or a terminal
/// state, and discards the prior job's record. Each submission gets a
/// fresh cancellation token, so a late `cancel` of a finished job can
/// never leak into the next one.
pub struct JobClient {
    conn: Arc<dyn ServiceConnection>,
    config: ClientConfig,
    shared: Arc<Shared>,
    events_tx: mpsc::Sender<JobEvent>,
    events_rx: Option<mpsc::Receiver<JobEvent>>,
}

struct Shared {
    state: Mutex<ClientState>,
    job: Mutex<Option<Job>>,
    /// Cancellation token of the active job, fresh per submission.
    cancel: Mutex<Option<CancellationToken>>,
}

impl JobClient {
    /// Creates a client over the given connection.
    pub fn new(conn: Arc<dyn ServiceConnection>, config: ClientConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            conn,
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(ClientState::Idle),
                job: Mutex::new(None),
                cancel: Mutex::new(None),
            }),
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<JobEvent>> {
        self.events_rx.take()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> ClientState {
        *self.shared.state.lock().unwrap()
    }

    /// Returns a snapshot of the active job, if any.
    pub fn job(&self) -> Option<Job> {
        self.shared.job.lock().unwrap().clone()
    }

    /// Submits a payload for processing.
    ///
    /// Rejected with [`ClientError::InvalidState`] while a job is in
    /// flight. The upload and poll run on a spawned task; outcomes
    /// arrive through the event stream.
    pub fn submit(
        &self,
        payload: Vec<u8>,
        filename: impl Into<String>,
    ) -> Result<(), ClientError> {
        let cancel = CancellationToken::new();
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.is_busy() {
                return Err(ClientError::InvalidState("a job is already in flight"));
            }
            *state = ClientState::Uploading;
            *self.shared.job.lock().unwrap() = None;
            *self.shared.cancel.lock().unwrap() = Some(cancel.clone());
        }
        if let Err(e) = self.events_tx.try_send(JobEvent::StateChanged {
            state: ClientState::Uploading,
        }) {
            warn!("dropping state event: {e}");
        }

        let task = RunTask {
            conn: Arc::clone(&self.conn),
            config: self.config.clone(),
            shared: Arc::clone(&self.shared),
            events_tx: self.events_tx.clone(),
        };
        let filename = filename.into();
        tokio::spawn(async move { task.run(payload, filename, cancel).await });
        Ok(())
    }

    /// Cancels the active job.
    ///
    /// No-op in `Idle` and terminal states. Safe to call repeatedly; a
    /// canceled job emits exactly one `Canceled` event.
    pub fn cancel(&self) {
        if !self.state().is_busy() {
            return;
        }
        if let Some(cancel) = self.shared.cancel.lock().unwrap().as_ref() {
            cancel.cancel();
        }
    }
}

impl Drop for JobClient {
    fn drop(&mut self) {
        // Abandoning the client ends its session; stop the in-flight
        // job instead of leaving the task polling forever.
        if let Some(cancel) = self.shared.cancel.lock().unwrap().as_ref() {
            cancel.cancel();
        }
    }
}

/// The spawned upload-and-poll flow for one submission.
struct RunTask {
    conn: Arc<dyn ServiceConnection>,
    config: ClientConfig,
    shared: Arc<Shared>,
    events_tx: mpsc::Sender<JobEvent>,
}

impl RunTask {
    async fn run(self, payload: Vec<u8>, filename: String, cancel: CancellationToken) {
        let ack = match upload::send_upload(
            self.conn.as_ref(),
            payload,
            &filename,
            self.config.max_payload_bytes,
            &self.events_tx,
            &cancel,
        )
        .await
        {
            Ok(ack) => ack,
            Err(err) => return self.finish_err(err).await,
        };

        *self.shared.job.lock().unwrap() = Some(Job::accepted(&ack.job_id));
        self.transition(ClientState::Polling).await;
        info!(job_id = %ack.job_id, "upload accepted, polling");

        let mut poller = StatusPoller::new(self.config.backoff.clone())
            .with_transport_retries(self.config.transport_retries);
        if let Some(deadline) = self.config.poll_deadline {
            poller = poller.with_deadline(deadline);
        }

        match poller.poll(self.conn.as_ref(), &ack.job_id, &cancel).await {
            Ok(result) => {
                self.update_job(|job| {
                    job.status = JobStatus::Completed;
                    job.result = Some(result.clone());
                });
                self.transition(ClientState::Succeeded).await;
                let _ = self.events_tx.send(JobEvent::Completed { result }).await;
                info!(job_id = %ack.job_id, "job succeeded");
            }
            Err(err) => self.finish_err(err).await,
        }
    }

    async fn finish_err(&self, err: ClientError) {
        if matches!(err, ClientError::Canceled) {
            self.transition(ClientState::Canceled).await;
            let _ = self.events_tx.send(JobEvent::Canceled).await;
            info!("job canceled");
            return;
        }

        let detail = err.detail();
        self.update_job(|job| {
            job.status = JobStatus::Failed;
            job.error_detail = Some(detail.clone());
        });
        self.transition(ClientState::Failed).await;
        error!(error = %detail, "job failed");
        let _ = self
            .events_tx
            .send(JobEvent::Failed {
                kind: err.kind(),
                detail,
            })
            .await;
    }

    async fn transition(&self, state: ClientState) {
        *self.shared.state.lock().unwrap() = state;
        let _ = self.events_tx.send(JobEvent::StateChanged { state }).await;
    }

    fn update_job(&self, f: impl FnOnce(&mut Job)) {
        if let Some(job) = self.shared.job.lock().unwrap().as_mut() {
            f(job);
        }
    }
}
