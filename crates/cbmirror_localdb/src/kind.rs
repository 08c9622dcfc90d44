//! The mirrored record kinds and where they come from.

use cbmirror_registry::Identity;
use std::fmt;
use std::str::FromStr;

/// One of the four mirrored registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    /// Scheduled and played games.
    Games,
    /// Tournaments.
    Tournaments,
    /// Registered players.
    Players,
    /// Court announcements.
    Announcements,
}

impl RegistryKind {
    /// Every kind, in sync order.
    pub const ALL: [RegistryKind; 4] = [
        RegistryKind::Games,
        RegistryKind::Tournaments,
        RegistryKind::Announcements,
        RegistryKind::Players,
    ];

    /// Backing file stem inside the cache directory.
    #[must_use]
    pub fn registry_name(self) -> &'static str {
        match self {
            RegistryKind::Games => "game_registry",
            RegistryKind::Tournaments => "tournament_registry",
            RegistryKind::Players => "player_registry",
            RegistryKind::Announcements => "announce_registry",
        }
    }

    /// Upstream path the records are fetched from.
    #[must_use]
    pub fn api_path(self) -> &'static str {
        match self {
            RegistryKind::Games => "api/games",
            RegistryKind::Tournaments => "api/tournaments",
            RegistryKind::Players => "api/players",
            RegistryKind::Announcements => "api/announce",
        }
    }

    /// Parses a user-supplied identity for this kind.
    ///
    /// Players are keyed by username; every other kind by an integer.
    pub fn parse_identity(self, text: &str) -> Result<Identity, String> {
        match self {
            RegistryKind::Players => Ok(Identity::from(text)),
            _ => text
                .parse::<i64>()
                .map(Identity::Int)
                .map_err(|_| format!("{self} identities are integers, got {text:?}")),
        }
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RegistryKind::Games => "games",
            RegistryKind::Tournaments => "tournaments",
            RegistryKind::Players => "players",
            RegistryKind::Announcements => "announcements",
        })
    }
}

impl FromStr for RegistryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "games" | "game" => Ok(RegistryKind::Games),
            "tournaments" | "tournament" => Ok(RegistryKind::Tournaments),
            "players" | "player" => Ok(RegistryKind::Players),
            "announcements" | "announcement" | "announce" => Ok(RegistryKind::Announcements),
            other => Err(format!("unknown registry kind: {other}")),
        }
    }
}

/// Path serving the sound effect of one player.
#[must_use]
pub fn sfx_data_path(username: &str) -> String {
    format!("api/players/{username}/get_sfx_data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in RegistryKind::ALL {
            assert_eq!(kind.to_string().parse::<RegistryKind>().unwrap(), kind);
        }
        assert!("courts".parse::<RegistryKind>().is_err());
    }

    #[test]
    fn identities_per_kind() {
        assert_eq!(
            RegistryKind::Games.parse_identity("12").unwrap(),
            Identity::Int(12)
        );
        assert!(RegistryKind::Games.parse_identity("alice").is_err());
        assert_eq!(
            RegistryKind::Players.parse_identity("12").unwrap(),
            Identity::from("12")
        );
    }

    #[test]
    fn paths() {
        assert_eq!(RegistryKind::Announcements.api_path(), "api/announce");
        assert_eq!(sfx_data_path("alice"), "api/players/alice/get_sfx_data");
    }
}
