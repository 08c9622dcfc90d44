//! # cbmirror sync
//!
//! Talking to the central server.
//!
//! This crate provides:
//! - [`RemoteAccess`]: fetch records, post notifications
//! - [`HttpTransport`] over an [`HttpClient`] seam, with a blocking
//!   `reqwest` client
//! - [`MockRemote`] for tests
//! - [`OutboundQueue`]: ordered, at-least-once notification delivery with
//!   front-of-queue retry
//!
//! ## Key Invariants
//!
//! - Notifications are attempted in FIFO order; a retried one goes back to
//!   the front
//! - A notification leaves the queue only when acknowledged, or after a
//!   failed attempt when it is not retry-eligible
//! - The queue itself never sleeps; pacing belongs to the caller

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod queue;
mod transport;

pub use config::{RetryConfig, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use http::{join_url, HttpClient, HttpFailure, HttpResponse, HttpTransport, ReqwestClient};
pub use queue::{DeliveryOutcome, DrainMode, DrainReport, Notification, OutboundQueue};
pub use transport::{is_acknowledged, MockRemote, Payload, RemoteAccess};
