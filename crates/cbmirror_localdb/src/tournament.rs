//! Tournament registry entries.

use cbmirror_registry::reference;
use cbmirror_registry::{Entry, Identity, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tournament and the games scheduled in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentEntry {
    /// Numeric tournament identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Season the tournament belongs to.
    #[serde(deserialize_with = "reference::de_string")]
    pub season: String,
    /// Free text description.
    pub description: String,
    /// Date of the event, as received.
    pub event_date: Value,
    /// Usernames of the registered players.
    #[serde(deserialize_with = "reference::de_string_list")]
    pub players: Vec<String>,
    /// Tournament status code.
    pub status: String,
    /// Identifiers of the tournament's games.
    #[serde(deserialize_with = "reference::de_int_list")]
    pub games: Vec<i64>,
    /// Fields this kind does not declare.
    #[serde(flatten)]
    pub extra: Record,
}

impl Entry for TournamentEntry {
    const KIND: &'static str = "tournament";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "season",
        "description",
        "event_date",
        "players",
        "status",
        "games",
    ];
    const IDENTITY: Option<&'static str> = Some("id");

    fn identity(&self) -> Option<Identity> {
        self.id.map(Identity::Int)
    }
}
