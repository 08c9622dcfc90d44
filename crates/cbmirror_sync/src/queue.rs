//! Outbound notification queue.
//!
//! Notifications are delivered strictly in order. A retry-eligible
//! notification that fails with a retryable error goes back to the *front*
//! of the queue, so it is attempted again before anything newer. One that is
//! not retry-eligible is dropped after its single attempt.
//!
//! [`OutboundQueue::drain`] never sleeps and keeps going until the queue is
//! empty. A retry-eligible notification that fails forever therefore keeps
//! `drain` spinning on it and starves the notifications behind it. Callers
//! that cannot rely on the server recovering should use
//! [`OutboundQueue::drain_paced`], which backs off between attempts and
//! returns after a bounded number of consecutive failures, leaving the
//! notification queued.

use crate::config::RetryConfig;
use crate::transport::{Payload, RemoteAccess};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info_span, warn, Span};
use uuid::Uuid;

/// A pending notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Identifier used in logs.
    pub id: Uuid,
    /// Body of the POST.
    pub payload: Payload,
    /// Destination path, relative to the server base URL.
    pub destination: String,
    /// Whether a failed delivery may be retried.
    pub retry: bool,
}

impl Notification {
    /// Creates a notification with a fresh identifier.
    pub fn new(payload: Payload, destination: impl Into<String>, retry: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            destination: destination.into(),
            retry,
        }
    }
}

/// How far [`OutboundQueue::drain`] goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrainMode {
    /// Keep delivering until the queue is empty.
    #[default]
    All,
    /// Stop after one attempt, whatever its outcome.
    Single,
}

/// What happened to one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The server acknowledged the notification.
    Delivered,
    /// Delivery failed and the notification went back to the front.
    Requeued,
    /// Delivery failed and the notification was discarded.
    Dropped,
}

/// Counts describing one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Delivery attempts made.
    pub attempts: usize,
    /// Notifications acknowledged by the server.
    pub delivered: usize,
    /// Failed attempts whose notification was put back.
    pub requeued: usize,
    /// Notifications discarded after a failed attempt.
    pub dropped: usize,
}

impl DrainReport {
    fn record(&mut self, outcome: DeliveryOutcome) {
        self.attempts += 1;
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::Requeued => self.requeued += 1,
            DeliveryOutcome::Dropped => self.dropped += 1,
        }
    }
}

/// FIFO queue of notifications awaiting delivery.
#[derive(Debug)]
pub struct OutboundQueue {
    pending: VecDeque<Notification>,
    span: Span,
}

impl Default for OutboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboundQueue {
    /// Creates an empty queue logging in an `outbound` span.
    pub fn new() -> Self {
        Self::with_span(info_span!("outbound"))
    }

    /// Creates an empty queue logging in `span`.
    pub fn with_span(span: Span) -> Self {
        Self {
            pending: VecDeque::new(),
            span,
        }
    }

    /// Appends a notification; nothing is sent yet.
    pub fn enqueue(
        &mut self,
        payload: Payload,
        destination: impl Into<String>,
        retry: bool,
    ) -> Uuid {
        let notification = Notification::new(payload, destination, retry);
        let id = notification.id;
        self.push(notification);
        id
    }

    /// Appends an already built notification.
    pub fn push(&mut self, notification: Notification) {
        self.span.in_scope(|| {
            debug!(id = %notification.id, destination = %notification.destination, "queued");
        });
        self.pending.push_back(notification);
    }

    /// Number of pending notifications.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending notifications, front first.
    pub fn pending(&self) -> impl Iterator<Item = &Notification> {
        self.pending.iter()
    }

    /// Attempts to deliver the front notification.
    ///
    /// Returns `None` if the queue is empty.
    pub fn attempt<R: RemoteAccess + ?Sized>(&mut self, remote: &R) -> Option<DeliveryOutcome> {
        let notification = self.pending.pop_front()?;
        let _entered = self.span.enter();

        match remote.deliver(&notification.destination, &notification.payload) {
            Ok(()) => {
                debug!(id = %notification.id, "delivered");
                Some(DeliveryOutcome::Delivered)
            }
            Err(e) if e.is_retryable() && notification.retry => {
                debug!(id = %notification.id, error = %e, "delivery failed, requeued");
                self.pending.push_front(notification);
                Some(DeliveryOutcome::Requeued)
            }
            Err(e) => {
                warn!(
                    id = %notification.id,
                    destination = %notification.destination,
                    error = %e,
                    "delivery failed, dropped"
                );
                Some(DeliveryOutcome::Dropped)
            }
        }
    }

    /// Delivers pending notifications in order.
    ///
    /// With [`DrainMode::All`] this only returns once the queue is empty;
    /// see the module documentation for the consequence of a notification
    /// that keeps failing.
    pub fn drain<R: RemoteAccess + ?Sized>(&mut self, remote: &R, mode: DrainMode) -> DrainReport {
        let mut report = DrainReport::default();
        while let Some(outcome) = self.attempt(remote) {
            report.record(outcome);
            if mode == DrainMode::Single {
                break;
            }
        }
        report
    }

    /// Delivers pending notifications, backing off after failures.
    ///
    /// After the n-th consecutive requeue this calls `sleep` with
    /// `retry.delay_for_attempt(n)`. Once `retry.max_attempts` consecutive
    /// requeues happen it returns, leaving the failing notification at the
    /// front for a later call.
    pub fn drain_paced<R, S>(&mut self, remote: &R, retry: &RetryConfig, mut sleep: S) -> DrainReport
    where
        R: RemoteAccess + ?Sized,
        S: FnMut(Duration),
    {
        let mut report = DrainReport::default();
        let mut failures = 0u32;

        while let Some(outcome) = self.attempt(remote) {
            report.record(outcome);
            match outcome {
                DeliveryOutcome::Delivered => failures = 0,
                DeliveryOutcome::Dropped => {}
                DeliveryOutcome::Requeued => {
                    failures += 1;
                    if failures >= retry.max_attempts {
                        self.span.in_scope(|| {
                            warn!(pending = self.pending.len(), failures, "server unreachable, delivery postponed");
                        });
                        break;
                    }
                    sleep(retry.delay_for_attempt(failures));
                }
            }
        }
        report
    }
}
