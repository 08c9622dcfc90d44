//! Player registry entries.

use cbmirror_registry::{Entry, Identity, Record};
use serde::{Deserialize, Serialize};

/// A registered player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEntry {
    /// Full name.
    pub name: String,
    /// Name shown on scoreboards.
    pub display_name: String,
    /// Unique username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// MD5 of the player's sound effect, if one is set.
    pub sfx_md5: Option<String>,
    /// Fields this kind does not declare.
    #[serde(flatten)]
    pub extra: Record,
}

impl Entry for PlayerEntry {
    const KIND: &'static str = "player";
    const FIELDS: &'static [&'static str] = &["name", "display_name", "username", "sfx_md5"];
    const IDENTITY: Option<&'static str> = Some("username");

    fn identity(&self) -> Option<Identity> {
        self.username.as_deref().map(Identity::from)
    }
}
