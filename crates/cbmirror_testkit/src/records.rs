//! Sample upstream records.
//!
//! References are written the way the server sends them, as URLs, so tests
//! also exercise normalization.

use cbmirror_registry::Record;
use serde_json::{json, Value};

/// Base URL used in generated references.
pub const SERVER: &str = "http://central";

fn object(value: Value) -> Record {
    match value {
        Value::Object(record) => record,
        _ => panic!("sample record must be an object"),
    }
}

/// URL reference to a player.
pub fn player_url(username: &str) -> String {
    format!("{SERVER}/api/players/{username}/")
}

/// A game record.
pub fn game_record(id: i64, status: &str, court: Option<&str>, players: &[&str]) -> Record {
    object(json!({
        "identifier": id,
        "sequence": id,
        "description": format!("game {id}"),
        "tournament": format!("{SERVER}/api/tournaments/1/"),
        "events": [],
        "players": players.iter().map(|p| player_url(p)).collect::<Vec<_>>(),
        "duration": 600,
        "start_time": null,
        "game_status": status,
        "court": court.map(|c| format!("{SERVER}/api/courts/{c}/")),
    }))
}

/// A tournament record.
pub fn tournament_record(id: i64, games: &[i64]) -> Record {
    object(json!({
        "id": id,
        "season": format!("{SERVER}/api/seasons/2024/"),
        "description": format!("tournament {id}"),
        "event_date": "2024-04-01",
        "players": [player_url("alice"), player_url("bob")],
        "status": "OPEN",
        "games": games.iter().map(|g| format!("{SERVER}/api/games/{g}/")).collect::<Vec<_>>(),
    }))
}

/// A player record.
pub fn player_record(username: &str, sfx_md5: Option<&str>) -> Record {
    object(json!({
        "name": format!("{username} full name"),
        "display_name": username,
        "username": username,
        "sfx_md5": sfx_md5,
    }))
}

/// An announcement record.
pub fn announcement_record(id: i64, court: &str, players: &[&str]) -> Record {
    object(json!({
        "identifier": id,
        "players": players.iter().map(|p| player_url(p)).collect::<Vec<_>>(),
        "court": court,
    }))
}

/// Wraps records as the JSON list a fetch returns.
pub fn listing(records: impl IntoIterator<Item = Record>) -> Value {
    Value::Array(records.into_iter().map(Value::Object).collect())
}
