//! Notify command implementation.

use cbmirror_localdb::live::{self, GameEnd};
use cbmirror_localdb::MirrorConfig;
use cbmirror_sync::{DrainReport, HttpTransport, OutboundQueue, RemoteAccess, RetryConfig};
use clap::Subcommand;
use serde_json::Value;

/// Live notification to send.
#[derive(Debug, Clone, Subcommand)]
pub enum Notification {
    /// Report an in-game event
    Event {
        /// Event type
        evt_type: String,

        /// Event data as JSON
        #[arg(default_value = "null")]
        data: String,
    },

    /// Report that the game started
    Start {
        /// Start time
        start_time: String,

        /// Usernames in playing order
        #[arg(required = true)]
        players: Vec<String>,
    },

    /// Report that the game ended
    End {
        /// Why the game ended
        reason: String,

        /// Username of the winner
        #[arg(short, long)]
        winner: Option<String>,

        /// Seconds played
        #[arg(long, default_value = "0")]
        running_time: u64,

        /// Seconds left on the clock
        #[arg(long, default_value = "0")]
        remaining_time: u64,
    },
}

/// Queues `notification` for `game`.
pub fn enqueue(
    queue: &mut OutboundQueue,
    game: i64,
    notification: Notification,
) -> Result<(), serde_json::Error> {
    match notification {
        Notification::Event { evt_type, data } => {
            let data: Value = serde_json::from_str(&data)?;
            live::push_event(queue, game, &evt_type, data);
        }
        Notification::Start {
            start_time,
            players,
        } => {
            live::game_start(queue, game, Value::String(start_time), players.as_slice());
        }
        Notification::End {
            reason,
            winner,
            running_time,
            remaining_time,
        } => {
            let end = GameEnd {
                reason,
                winner,
                running_time: running_time.into(),
                remaining_time: remaining_time.into(),
            };
            live::game_end(queue, game, &end);
        }
    }
    Ok(())
}

/// Delivers the queue, sleeping between failed attempts.
pub fn deliver<R: RemoteAccess + ?Sized>(
    queue: &mut OutboundQueue,
    remote: &R,
    retry: &RetryConfig,
) -> DrainReport {
    queue.drain_paced(remote, retry, std::thread::sleep)
}

/// Runs the notify command.
pub fn run(
    config: &MirrorConfig,
    game: i64,
    notification: Notification,
) -> Result<(), Box<dyn std::error::Error>> {
    let remote = HttpTransport::from_config(&config.sync)?;
    let mut queue = OutboundQueue::new();
    enqueue(&mut queue, game, notification)?;

    let report = deliver(&mut queue, &remote, &config.sync.retry);
    if !queue.is_empty() {
        return Err(format!(
            "notification not delivered after {} attempts: {}",
            report.attempts,
            remote.last_error().unwrap_or_default()
        )
        .into());
    }
    if report.dropped > 0 {
        return Err(format!(
            "notification rejected: {}",
            remote.last_error().unwrap_or_default()
        )
        .into());
    }
    println!("delivered");
    Ok(())
}
