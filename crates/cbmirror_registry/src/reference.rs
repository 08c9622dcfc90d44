//! Reference field normalization.
//!
//! Upstream records point at other records either with a bare identifier
//! (`42`, `"42"`, `"alice"`) or with a URL ending in one
//! (`"http://host/api/players/42/"`). Entries store only the identifier.
//!
//! The `de_*` functions plug the normalization into serde with
//! `#[serde(deserialize_with = "...")]`, so a malformed reference fails
//! entry construction.

use crate::error::{EntryError, EntryResult};
use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

/// Returns the last non-empty `/`-separated segment of `s`.
fn trailing_segment(s: &str) -> Option<&str> {
    s.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

/// Normalizes a reference into a string identifier.
///
/// # Errors
///
/// Fails for anything other than an integer or a non-empty string.
pub fn normalize_str(value: &Value) -> EntryResult<String> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        Value::String(s) => trailing_segment(s)
            .map(str::to_string)
            .ok_or_else(|| EntryError::invalid_reference(format!("empty reference {s:?}"))),
        other => Err(EntryError::invalid_reference(format!(
            "expected identifier or URL, got {}",
            type_name(other)
        ))),
    }
}

/// Normalizes a reference into an integer identifier.
///
/// # Errors
///
/// Fails for anything other than an integer, a numeric string, or a URL
/// whose last segment is numeric.
pub fn normalize_int(value: &Value) -> EntryResult<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| EntryError::invalid_reference(format!("{n} is not an integer id"))),
        Value::String(s) => {
            let segment = trailing_segment(s)
                .ok_or_else(|| EntryError::invalid_reference(format!("empty reference {s:?}")))?;
            segment.parse().map_err(|_| {
                EntryError::invalid_reference(format!("{segment:?} is not an integer id"))
            })
        }
        other => Err(EntryError::invalid_reference(format!(
            "expected identifier or URL, got {}",
            type_name(other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "non-integer number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deserializes a string reference.
pub fn de_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    normalize_str(&value).map_err(de::Error::custom)
}

/// Deserializes an integer reference.
pub fn de_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    normalize_int(&value).map_err(de::Error::custom)
}

/// Deserializes a nullable string reference.
pub fn de_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => normalize_str(&value).map(Some).map_err(de::Error::custom),
    }
}

/// Deserializes a list of string references.
pub fn de_string_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .iter()
        .map(normalize_str)
        .collect::<EntryResult<_>>()
        .map_err(de::Error::custom)
}

/// Deserializes a list of integer references.
pub fn de_int_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .iter()
        .map(normalize_int)
        .collect::<EntryResult<_>>()
        .map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn all_shapes_agree() {
        let shapes = [json!("42"), json!(42), json!("http://host/api/players/42/")];
        for shape in &shapes {
            assert_eq!(normalize_str(shape).unwrap(), "42");
            assert_eq!(normalize_int(shape).unwrap(), 42);
        }
    }

    #[test]
    fn url_without_trailing_slash() {
        assert_eq!(
            normalize_str(&json!("https://host/api/players/alice")).unwrap(),
            "alice"
        );
    }

    #[test]
    fn bare_username_is_kept() {
        assert_eq!(normalize_str(&json!("alice")).unwrap(), "alice");
    }

    #[test]
    fn rejects_other_types() {
        for bad in [json!(null), json!(true), json!(1.5), json!([1]), json!({"id": 1})] {
            assert!(matches!(
                normalize_str(&bad),
                Err(EntryError::InvalidReference { .. })
            ));
            assert!(normalize_int(&bad).is_err());
        }
    }

    #[test]
    fn rejects_empty_and_non_numeric() {
        assert!(normalize_str(&json!("")).is_err());
        assert!(normalize_str(&json!("///")).is_err());
        assert!(normalize_int(&json!("http://host/api/games/abc/")).is_err());
    }

    #[test]
    fn serde_helpers() {
        #[derive(serde::Deserialize)]
        struct Refs {
            #[serde(deserialize_with = "de_opt_string")]
            court: Option<String>,
            #[serde(deserialize_with = "de_int_list")]
            games: Vec<i64>,
        }

        let refs: Refs = serde_json::from_value(json!({
            "court": null,
            "games": [1, "2", "http://host/api/games/3/"],
        }))
        .unwrap();
        assert_eq!(refs.court, None);
        assert_eq!(refs.games, vec![1, 2, 3]);

        let bad = serde_json::from_value::<Refs>(json!({"court": false, "games": []}));
        assert!(bad.is_err());
    }

    proptest! {
        #[test]
        fn normalization_is_lossless(id in 0i64..i64::MAX, host in "[a-z]{1,12}") {
            let url = format!("http://{host}/api/players/{id}/");
            let expected = id.to_string();
            prop_assert_eq!(normalize_str(&json!(id)).unwrap(), expected.clone());
            prop_assert_eq!(normalize_str(&json!(expected.clone())).unwrap(), expected.clone());
            prop_assert_eq!(normalize_str(&json!(url.clone())).unwrap(), expected);
            prop_assert_eq!(normalize_int(&json!(url)).unwrap(), id);
        }

        #[test]
        fn normalization_is_idempotent(name in "[a-z0-9_]{1,16}") {
            let once = normalize_str(&json!(name)).unwrap();
            let twice = normalize_str(&json!(once.clone())).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
