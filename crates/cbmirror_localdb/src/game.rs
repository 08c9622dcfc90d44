//! Game registry entries and the next-game announcement hook.

use cbmirror_registry::reference;
use cbmirror_registry::{Entry, HookError, Identity, Record, RegistryHooks, ValueChanged};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Status of a game that has been scheduled but is not up yet.
pub const STATUS_NOT_YET: &str = "NYET";
/// Status of the game that plays next on its court.
pub const STATUS_NEXT: &str = "NEXT";

/// A scheduled or played game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEntry {
    /// Numeric game identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<i64>,
    /// Position in the tournament schedule.
    pub sequence: i64,
    /// Free text description.
    pub description: String,
    /// Owning tournament.
    #[serde(deserialize_with = "reference::de_int")]
    pub tournament: i64,
    /// Event log, carried as received.
    pub events: Value,
    /// Usernames of the participants.
    #[serde(deserialize_with = "reference::de_string_list")]
    pub players: Vec<String>,
    /// Configured duration, as received.
    pub duration: Value,
    /// Start timestamp, as received.
    pub start_time: Value,
    /// Status code such as `NYET` or `NEXT`.
    pub game_status: String,
    /// Court the game is assigned to, if any.
    #[serde(deserialize_with = "reference::de_opt_string")]
    pub court: Option<String>,
    /// Fields this kind does not declare.
    #[serde(flatten)]
    pub extra: Record,
}

impl Entry for GameEntry {
    const KIND: &'static str = "game";
    const FIELDS: &'static [&'static str] = &[
        "identifier",
        "sequence",
        "description",
        "tournament",
        "events",
        "players",
        "duration",
        "start_time",
        "game_status",
        "court",
    ];
    const IDENTITY: Option<&'static str> = Some("identifier");

    fn identity(&self) -> Option<Identity> {
        self.identifier.map(Identity::Int)
    }
}

/// Receives the announcement that a game is up next on a court.
pub trait Announcer {
    /// Announces the players of the next game on `court`.
    fn announce_next_game(&mut self, court: &str, players: &[String]) -> Result<(), HookError>;
}

/// Announcer that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce_next_game(&mut self, court: &str, players: &[String]) -> Result<(), HookError> {
        info!(court, players = %players.join(", "), "next game");
        Ok(())
    }
}

/// Game registry hooks: announce a game when it moves from `NYET` to `NEXT`.
///
/// The court and players are taken from the entry as it was stored before
/// the rebuild. Games that had no court are not announced, even if the same
/// update assigns one.
pub struct GameHooks<A> {
    announcer: A,
}

impl<A: Announcer> GameHooks<A> {
    /// Wraps an announcer.
    pub fn new(announcer: A) -> Self {
        Self { announcer }
    }

    /// Returns the wrapped announcer.
    pub fn into_inner(self) -> A {
        self.announcer
    }
}

fn is_next_transition(change: &ValueChanged<'_, GameEntry>) -> bool {
    change.field == "game_status"
        && change.old.as_str() == Some(STATUS_NOT_YET)
        && change.new.as_str() == Some(STATUS_NEXT)
}

impl<A: Announcer> RegistryHooks<GameEntry> for GameHooks<A> {
    fn value_changed(&mut self, change: ValueChanged<'_, GameEntry>) -> Result<(), HookError> {
        if !is_next_transition(&change) {
            return Ok(());
        }
        let stored = change.previous;
        match &stored.court {
            Some(court) => self.announcer.announce_next_game(court, &stored.players),
            None => Ok(()),
        }
    }
}
