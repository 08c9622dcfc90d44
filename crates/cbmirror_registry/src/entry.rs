//! Registry entries.
//!
//! An entry kind is a plain struct holding its declared fields, plus a
//! `#[serde(flatten)]` overflow map that carries any field the kind does not
//! know about. Unknown upstream fields therefore survive a load→commit
//! round trip unchanged.
//!
//! ```rust,ignore
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct CourtEntry {
//!     #[serde(default, skip_serializing_if = "Option::is_none")]
//!     id: Option<i64>,
//!     name: String,
//!     #[serde(flatten)]
//!     extra: Record,
//! }
//!
//! impl Entry for CourtEntry {
//!     const KIND: &'static str = "court";
//!     const FIELDS: &'static [&'static str] = &["id", "name"];
//!     const IDENTITY: Option<&'static str> = Some("id");
//!
//!     fn identity(&self) -> Option<Identity> {
//!         self.id.map(Identity::Int)
//!     }
//! }
//! ```

use crate::error::{EntryError, EntryResult};
use crate::identity::Identity;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A raw decoded record: field name to JSON value, in input order.
pub type Record = serde_json::Map<String, Value>;

/// One differing field between two entries.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Declared field name.
    pub field: &'static str,
    /// Value in the receiver.
    pub old: Value,
    /// Value in the argument.
    pub new: Value,
}

/// The declared fields that differ between two entries, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDiff(Vec<FieldChange>);

impl FieldDiff {
    /// Returns true if no field differs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of differing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Looks up the change for one field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0.iter().find(|change| change.field == field)
    }

    /// Names of the differing fields.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|change| change.field)
    }

    /// Iterates over the changes.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldChange> {
        self.0.iter()
    }
}

impl IntoIterator for FieldDiff {
    type Item = FieldChange;
    type IntoIter = std::vec::IntoIter<FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Compares the declared fields of two serialized entries.
fn diff_records(fields: &'static [&'static str], old: &Record, new: &Record) -> FieldDiff {
    let changes = fields
        .iter()
        .filter_map(|&field| {
            let before = old.get(field).unwrap_or(&Value::Null);
            let after = new.get(field).unwrap_or(&Value::Null);
            (before != after).then(|| FieldChange {
                field,
                old: before.clone(),
                new: after.clone(),
            })
        })
        .collect();
    FieldDiff(changes)
}

/// A record of one kind with a declared field set and optional identity.
///
/// Entries are built fresh from every fetched record and never mutated in
/// place. Equality covers every declared field; overflow fields are carried
/// but not compared.
pub trait Entry: Serialize + DeserializeOwned + Clone + fmt::Debug {
    /// Kind name, used in errors and logs.
    const KIND: &'static str;

    /// Declared fields, in serialization order.
    const FIELDS: &'static [&'static str];

    /// Name of the identity field, if the kind has one.
    const IDENTITY: Option<&'static str>;

    /// Reads the identity field.
    ///
    /// Returns `None` if the kind has no identity field or the entry was
    /// built from a record that lacked it.
    fn identity(&self) -> Option<Identity>;

    /// Declared field names.
    fn field_names() -> &'static [&'static str] {
        Self::FIELDS
    }

    /// Declared identity field name.
    fn identity_field() -> Option<&'static str> {
        Self::IDENTITY
    }

    /// Builds an entry from a raw record, normalizing reference fields.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::Shape`] if a declared field is missing or has
    /// the wrong shape.
    fn from_record(record: Record) -> EntryResult<Self> {
        serde_json::from_value(Value::Object(record)).map_err(|source| EntryError::Shape {
            kind: Self::KIND,
            source,
        })
    }

    /// Serializes every declared field plus the passthrough fields.
    fn to_record(&self) -> EntryResult<Record> {
        match serde_json::to_value(self) {
            Ok(Value::Object(record)) => Ok(record),
            Ok(_) => Err(EntryError::NotAnObject { kind: Self::KIND }),
            Err(source) => Err(EntryError::Shape {
                kind: Self::KIND,
                source,
            }),
        }
    }

    /// Lists the declared fields whose values differ from `other`.
    fn diff(&self, other: &Self) -> EntryResult<FieldDiff> {
        Ok(diff_records(
            Self::FIELDS,
            &self.to_record()?,
            &other.to_record()?,
        ))
    }

    /// Returns true if every declared field equals the one in `other`.
    fn equals(&self, other: &Self) -> EntryResult<bool> {
        Ok(self.diff(other)?.is_empty())
    }
}

/// A serialized entry tagged with its kind.
///
/// Snapshots let entries of unknown kind be compared at runtime; comparing
/// snapshots of different kinds fails with [`EntryError::KindMismatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySnapshot {
    kind: &'static str,
    fields: &'static [&'static str],
    record: Record,
}

impl EntrySnapshot {
    /// Takes a snapshot of an entry.
    pub fn of<E: Entry>(entry: &E) -> EntryResult<Self> {
        Ok(Self {
            kind: E::KIND,
            fields: E::FIELDS,
            record: entry.to_record()?,
        })
    }

    /// Kind of the snapshotted entry.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Serialized fields.
    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Consumes the snapshot, returning the serialized fields.
    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }

    fn check_kind(&self, other: &Self) -> EntryResult<()> {
        if self.kind == other.kind {
            Ok(())
        } else {
            Err(EntryError::KindMismatch {
                left: self.kind.to_string(),
                right: other.kind.to_string(),
            })
        }
    }

    /// Lists the declared fields whose values differ from `other`.
    ///
    /// # Errors
    ///
    /// Fails if `other` is a snapshot of a different kind.
    pub fn diff(&self, other: &Self) -> EntryResult<FieldDiff> {
        self.check_kind(other)?;
        Ok(diff_records(self.fields, &self.record, &other.record))
    }

    /// Returns true if no declared field differs from `other`.
    ///
    /// # Errors
    ///
    /// Fails if `other` is a snapshot of a different kind.
    pub fn equals(&self, other: &Self) -> EntryResult<bool> {
        Ok(self.diff(other)?.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::reference;
    use serde::Deserialize;

    /// Small identity-keyed kind used by the crate's unit tests.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Match {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub identifier: Option<i64>,
        pub status: String,
        #[serde(deserialize_with = "reference::de_string_list")]
        pub players: Vec<String>,
        #[serde(deserialize_with = "reference::de_opt_string")]
        pub court: Option<String>,
        #[serde(flatten)]
        pub extra: Record,
    }

    impl Entry for Match {
        const KIND: &'static str = "match";
        const FIELDS: &'static [&'static str] = &["identifier", "status", "players", "court"];
        const IDENTITY: Option<&'static str> = Some("identifier");

        fn identity(&self) -> Option<Identity> {
            self.identifier.map(Identity::Int)
        }
    }

    /// Kind without an identity field.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Note {
        pub text: String,
        #[serde(flatten)]
        pub extra: Record,
    }

    impl Entry for Note {
        const KIND: &'static str = "note";
        const FIELDS: &'static [&'static str] = &["text"];
        const IDENTITY: Option<&'static str> = None;

        fn identity(&self) -> Option<Identity> {
            None
        }
    }

    pub fn record(value: Value) -> Record {
        match value {
            Value::Object(record) => record,
            _ => panic!("test record must be an object"),
        }
    }

    pub fn match_record(id: i64, status: &str) -> Record {
        record(serde_json::json!({
            "identifier": id,
            "status": status,
            "players": ["http://host/api/players/alice/", "bob"],
            "court": "http://host/api/courts/1/",
        }))
    }
}
