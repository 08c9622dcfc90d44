//! Live game notifications.
//!
//! Scoreboards report what happens during a game by queueing notifications
//! for the server. Every notification posts a single form field, `payload`,
//! holding a JSON document, and is retried until the server acknowledges it.

use cbmirror_sync::{OutboundQueue, Payload};
use serde_json::{json, Value};
use std::fmt::Display;
use uuid::Uuid;

/// How a game ended.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEnd {
    /// Why the game stopped (e.g. `"timeout"`, `"forfeit"`).
    pub reason: String,
    /// Username of the winner, if there is one.
    pub winner: Option<String>,
    /// Time played.
    pub running_time: Value,
    /// Time left on the clock.
    pub remaining_time: Value,
}

/// Destination of event notifications for a game.
pub fn event_path(game: impl Display) -> String {
    format!("api/games/{game}/push_event/")
}

/// Destination of start notifications for a game.
pub fn start_path(game: impl Display) -> String {
    format!("api/games/{game}/start_game/")
}

/// Destination of end notifications for a game.
pub fn end_path(game: impl Display) -> String {
    format!("api/games/{game}/stop_game/")
}

fn wrap(document: Value) -> Payload {
    let mut payload = Payload::new();
    payload.insert("payload".into(), Value::String(document.to_string()));
    payload
}

/// Queues an in-game event.
pub fn push_event(
    queue: &mut OutboundQueue,
    game: impl Display,
    evt_type: &str,
    evt_data: Value,
) -> Uuid {
    let document = json!({"evt_type": evt_type, "evt_data": evt_data});
    queue.enqueue(wrap(document), event_path(game), true)
}

/// Queues the start of a game with its player order.
pub fn game_start<S: AsRef<str>>(
    queue: &mut OutboundQueue,
    game: impl Display,
    start_time: Value,
    player_order: &[S],
) -> Uuid {
    let order: Vec<&str> = player_order.iter().map(AsRef::as_ref).collect();
    let document = json!({"start_time": start_time, "player_order": order.join(",")});
    queue.enqueue(wrap(document), start_path(game), true)
}

/// Queues the end of a game.
pub fn game_end(queue: &mut OutboundQueue, game: impl Display, end: &GameEnd) -> Uuid {
    let document = json!({
        "reason": end.reason,
        "winner": end.winner,
        "running_time": end.running_time,
        "remaining_time": end.remaining_time,
    });
    queue.enqueue(wrap(document), end_path(game), true)
}
