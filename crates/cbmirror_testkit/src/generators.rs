//! Property-based test generators using proptest.

use crate::records::{game_record, SERVER};
use cbmirror_registry::Record;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for usernames.
pub fn username_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex")
}

/// Strategy for every shape an integer reference arrives in, paired with
/// the expected normalized value.
pub fn int_reference_strategy() -> impl Strategy<Value = (Value, i64)> {
    (0i64..1_000_000, 0..4u8).prop_map(|(id, shape)| {
        let value = match shape {
            0 => json!(id),
            1 => json!(id.to_string()),
            2 => json!(format!("{SERVER}/api/games/{id}/")),
            _ => json!(format!("{SERVER}/api/games/{id}")),
        };
        (value, id)
    })
}

/// Strategy for every shape a string reference arrives in, paired with the
/// expected normalized value.
pub fn string_reference_strategy() -> impl Strategy<Value = (Value, String)> {
    (username_strategy(), any::<bool>()).prop_map(|(name, as_url)| {
        let value = if as_url {
            json!(format!("{SERVER}/api/players/{name}/"))
        } else {
            json!(name.clone())
        };
        (value, name)
    })
}

/// Strategy for game statuses.
pub fn game_status_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["NYET", "NEXT", "RUNNING", "DONE"])
}

/// Strategy for a list of game records with distinct identifiers.
pub fn game_listing_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::btree_map(
        0i64..50,
        (game_status_strategy(), prop::option::of(0u8..4)),
        0..12,
    )
    .prop_map(|games| {
        games
            .into_iter()
            .map(|(id, (status, court))| {
                let court = court.map(|c| c.to_string());
                game_record(id, status, court.as_deref(), &["alice", "bob"])
            })
            .collect()
    })
}
