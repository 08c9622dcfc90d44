//! Remote access abstraction.

use crate::error::{SyncError, SyncResult};
use cbmirror_registry::Record;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

/// Body of an outbound POST: flat field name to value.
pub type Payload = serde_json::Map<String, Value>;

/// Returns true if a POST response acknowledges the request.
///
/// The server acknowledges with `{"status": "ok"}`; anything else is a
/// failure.
#[must_use]
pub fn is_acknowledged(response: &Value) -> bool {
    response.get("status").and_then(Value::as_str) == Some("ok")
}

/// Fetches records from and posts notifications to the server.
///
/// Paths are relative to the server base URL (e.g. `api/games`).
pub trait RemoteAccess: Send + Sync {
    /// Performs a GET and returns the decoded JSON body.
    fn get(&self, path: &str) -> SyncResult<Value>;

    /// Performs a POST and returns the decoded JSON body.
    fn post(&self, path: &str, payload: &Payload) -> SyncResult<Value>;

    /// Fetches a list of records.
    ///
    /// # Errors
    ///
    /// Besides transport errors, fails with [`SyncError::Protocol`] if the
    /// body is not a JSON array of objects.
    fn fetch(&self, path: &str) -> SyncResult<Vec<Record>> {
        match self.get(path)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(record) => Ok(record),
                    other => Err(SyncError::Protocol(format!(
                        "expected record object from {path}, got {other}"
                    ))),
                })
                .collect(),
            other => Err(SyncError::Protocol(format!(
                "expected record list from {path}, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Posts a payload and requires the server to acknowledge it.
    ///
    /// # Errors
    ///
    /// Fails with [`SyncError::Rejected`] if the response is not
    /// `{"status": "ok"}`.
    fn deliver(&self, path: &str, payload: &Payload) -> SyncResult<()> {
        let response = self.post(path, payload)?;
        if is_acknowledged(&response) {
            Ok(())
        } else {
            Err(SyncError::Rejected(response.to_string()))
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A scripted remote for testing.
///
/// Each path can be given a standing response and a queue of one-shot
/// results that are consumed first. Unscripted paths answer with status
/// 404. Every call is recorded.
#[derive(Debug, Default)]
pub struct MockRemote {
    standing: Mutex<HashMap<String, Value>>,
    scripted: Mutex<HashMap<String, VecDeque<SyncResult<Value>>>>,
    gets: Mutex<Vec<String>>,
    posts: Mutex<Vec<(String, Payload)>>,
}

impl MockRemote {
    /// Creates a new mock remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response returned for `path` whenever nothing is scripted.
    pub fn set_response(&self, path: impl Into<String>, response: Value) {
        self.standing.lock().insert(path.into(), response);
    }

    /// Queues a one-shot result for `path`.
    pub fn push_result(&self, path: impl Into<String>, result: SyncResult<Value>) {
        self.scripted
            .lock()
            .entry(path.into())
            .or_default()
            .push_back(result);
    }

    /// Queues a one-shot `{"status": "ok"}` acknowledgement for `path`.
    pub fn push_ok(&self, path: impl Into<String>) {
        self.push_result(path, Ok(serde_json::json!({"status": "ok"})));
    }

    /// Queues a one-shot failure for `path`.
    pub fn push_error(&self, path: impl Into<String>, error: SyncError) {
        self.push_result(path, Err(error));
    }

    /// Paths requested with GET, in call order.
    pub fn gets(&self) -> Vec<String> {
        self.gets.lock().clone()
    }

    /// Paths and payloads posted, in call order.
    pub fn posts(&self) -> Vec<(String, Payload)> {
        self.posts.lock().clone()
    }

    /// Paths posted, in call order.
    pub fn post_paths(&self) -> Vec<String> {
        self.posts.lock().iter().map(|(path, _)| path.clone()).collect()
    }

    fn respond(&self, path: &str) -> SyncResult<Value> {
        if let Some(result) = self
            .scripted
            .lock()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
        {
            return result;
        }
        self.standing
            .lock()
            .get(path)
            .cloned()
            .ok_or(SyncError::Status(404))
    }
}

impl RemoteAccess for MockRemote {
    fn get(&self, path: &str) -> SyncResult<Value> {
        self.gets.lock().push(path.to_string());
        self.respond(path)
    }

    fn post(&self, path: &str, payload: &Payload) -> SyncResult<Value> {
        self.posts.lock().push((path.to_string(), payload.clone()));
        self.respond(path)
    }
}
