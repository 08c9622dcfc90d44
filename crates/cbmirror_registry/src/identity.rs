//! Entry identity values.

use serde_json::Value;
use std::fmt;

/// The value of an entry's identity field.
///
/// Kinds key their entries either by an integer (games, tournaments,
/// announcements) or by a string (player usernames). A registry never mixes
/// the two.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Identity {
    /// Integer identity.
    Int(i64),
    /// String identity.
    Str(String),
}

impl Identity {
    /// Reads an identity from a JSON value.
    ///
    /// Returns `None` for `null` and for values that cannot key an entry.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Identity::Int),
            Value::String(s) => Some(Identity::Str(s.clone())),
            _ => None,
        }
    }

    /// Converts back to the JSON value it was read from.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Identity::Int(i) => Value::from(*i),
            Identity::Str(s) => Value::from(s.as_str()),
        }
    }

    /// Returns the integer form, if any.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Identity::Int(i) => Some(*i),
            Identity::Str(_) => None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Int(i) => write!(f, "{i}"),
            Identity::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Identity {
    fn from(value: i64) -> Self {
        Identity::Int(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Identity::Str(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Identity::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json() {
        assert_eq!(Identity::from_value(&json!(12)), Some(Identity::Int(12)));
        assert_eq!(
            Identity::from_value(&json!("alice")),
            Some(Identity::Str("alice".into()))
        );
        assert_eq!(Identity::from_value(&Value::Null), None);
        assert_eq!(Identity::from_value(&json!(1.5)), None);
        assert_eq!(Identity::from_value(&json!([1])), None);
    }

    #[test]
    fn int_and_string_are_distinct() {
        assert_ne!(Identity::from(42), Identity::from("42"));
    }

    #[test]
    fn value_roundtrip() {
        for id in [Identity::Int(-3), Identity::Str("bob".into())] {
            assert_eq!(Identity::from_value(&id.to_value()), Some(id));
        }
    }

    #[test]
    fn display() {
        assert_eq!(Identity::Int(5).to_string(), "5");
        assert_eq!(Identity::from("carol").to_string(), "carol");
    }
}
