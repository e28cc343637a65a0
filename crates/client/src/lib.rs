//! Upload-and-poll job client for the receiptscan service.
//!
//! This crate implements the **client-side job state machine**: submit
//! a receipt image as a multipart upload, then follow the server-side
//! parse job with capped exponential backoff until it completes, fails,
//! or is canceled. It is a library crate with no UI dependencies — the
//! capture surface produces the payload, and whatever renders state is
//! an event-stream subscriber, not part of the core.
//!
//! # Flow
//!
//! 1. **Upload** — multipart POST with streamed progress
//! 2. **Poll** — strictly sequential status queries with capped backoff
//! 3. **Events** — progress, state transitions, and the terminal
//!    outcome over an mpsc channel
//!
//! Callers interact with [`JobClient`]: `submit`, `cancel`, and the
//! event stream from `take_events`. The lower layers ([`StatusPoller`],
//! [`send_upload`], [`ServiceConnection`]) are public for direct use.

pub mod backoff;
pub mod client;
pub mod connection;
pub mod error;
pub mod http;
pub mod poller;
pub mod types;
pub mod upload;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export primary types for convenience.
pub use backoff::BackoffSchedule;
pub use client::JobClient;
pub use connection::{ServiceConnection, WireReply};
pub use error::{ClientError, ErrorKind, classify_reply};
pub use http::HttpConnection;
pub use poller::StatusPoller;
pub use types::{ClientConfig, ClientState, JobEvent};
pub use upload::send_upload;
