//! Announcement registry entries.

use cbmirror_registry::reference;
use cbmirror_registry::{Entry, Identity, Record};
use serde::{Deserialize, Serialize};

/// A pending court announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementEntry {
    /// Numeric announcement identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<i64>,
    /// Usernames being called.
    #[serde(deserialize_with = "reference::de_string_list")]
    pub players: Vec<String>,
    /// Court the players are called to.
    #[serde(deserialize_with = "reference::de_opt_string")]
    pub court: Option<String>,
    /// Fields this kind does not declare.
    #[serde(flatten)]
    pub extra: Record,
}

impl Entry for AnnouncementEntry {
    const KIND: &'static str = "announcement";
    const FIELDS: &'static [&'static str] = &["identifier", "players", "court"];
    const IDENTITY: Option<&'static str> = Some("identifier");

    fn identity(&self) -> Option<Identity> {
        self.identifier.map(Identity::Int)
    }
}
