//! Exponential-backoff status polling.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use receiptscan_protocol::{CompletedBody, StatusBody};

use crate::backoff::BackoffSchedule;
use crate::connection::ServiceConnection;
use crate::error::{ClientError, classify_reply};

/// Polls a job's status until it reaches a terminal outcome.
///
/// Queries are strictly sequential: the next query is issued only after
/// the previous reply has been observed, so statuses can never arrive
/// out of order. The only suspension points are the backoff timer and
/// the in-flight query, and cancellation is observed at both.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    backoff: BackoffSchedule,
    deadline: Option<Duration>,
    transport_retries: u32,
}

impl StatusPoller {
    /// Creates a poller with the given backoff schedule.
    pub fn new(backoff: BackoffSchedule) -> Self {
        Self {
            backoff,
            deadline: None,
            transport_retries: 2,
        }
    }

    /// Sets an overall deadline for the poll sequence.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets how many consecutive transport failures are tolerated
    /// before the failure becomes terminal.
    pub fn with_transport_retries(mut self, retries: u32) -> Self {
        self.transport_retries = retries;
        self
    }

    /// Runs the poll sequence and returns the parsed result.
    ///
    /// Transient transport failures are retried within the same backoff
    /// envelope: the delay keeps growing across retries, and a
    /// successful query resets the consecutive-failure budget.
    pub async fn poll(
        &self,
        conn: &dyn ServiceConnection,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, ClientError> {
        let started = tokio::time::Instant::now();
        let mut attempt: u32 = 0;
        let mut transport_failures: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            let delay = self.backoff.delay_for_attempt(attempt);
            debug!(
                job_id = %job_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "scheduling status query"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(job_id = %job_id, "poll canceled");
                    return Err(ClientError::Canceled);
                }
                _ = tokio::time::sleep(delay) => {}
            }

            if let Some(deadline) = self.deadline
                && started.elapsed() >= deadline
            {
                warn!(job_id = %job_id, attempt, "poll deadline exceeded");
                return Err(ClientError::PollTimeout);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(job_id = %job_id, "poll canceled");
                    return Err(ClientError::Canceled);
                }
                outcome = conn.job_status(job_id) => outcome,
            };

            let reply = match outcome {
                Ok(reply) => {
                    transport_failures = 0;
                    reply
                }
                Err(err @ ClientError::Transport(_)) => {
                    if transport_failures >= self.transport_retries {
                        warn!(job_id = %job_id, attempt, error = %err, "transport retry budget exhausted");
                        return Err(err);
                    }
                    transport_failures += 1;
                    warn!(
                        job_id = %job_id,
                        attempt,
                        transport_failures,
                        error = %err,
                        "transient transport failure, retrying"
                    );
                    continue;
                }
                Err(err) => return Err(err),
            };

            if let Some(err) = classify_reply(&reply) {
                return Err(err);
            }

            if reply.status == 200 {
                let body: CompletedBody = serde_json::from_slice(&reply.body)?;
                debug!(job_id = %job_id, attempt, "job completed");
                return Ok(body.parsed);
            }

            // 202 while the job is still queued or processing.
            let body: StatusBody =
                serde_json::from_slice(&reply.body).map_err(|e| ClientError::Server {
                    status: reply.status,
                    detail: format!("undecodable status body: {e}"),
                })?;
            if body.status.is_terminal() {
                return Err(ClientError::Server {
                    status: reply.status,
                    detail: format!("terminal status {:?} on a non-final reply", body.status),
                });
            }
            debug!(job_id = %job_id, attempt, status = ?body.status, "job not ready");
        }
    }
}
