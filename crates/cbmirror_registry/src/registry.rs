//! Indexed, file-backed registries of one entry kind.
//!
//! A registry mirrors an upstream record set. Every [`Registry::rebuild`]
//! replaces the whole contents with entries built from the fresh records and
//! reports what changed through the registry's [`RegistryHooks`]:
//!
//! - `new_entry` for an identity that was not present before the rebuild
//! - `value_changed` once per differing declared field of a known identity
//!
//! Changes are always measured against the contents as they were before the
//! rebuild started, never against entries added earlier in the same pass.
//!
//! # Failure during rebuild
//!
//! A failing hook or a malformed record aborts the rebuild. The new
//! contents are only swapped in after the whole pass succeeds, so an aborted
//! rebuild leaves the visible contents untouched. Hooks that already ran are
//! not undone.

use crate::dir::{registry_file, write_atomic, CacheDir};
use crate::entry::{Entry, Record};
use crate::error::{EntryError, HookError, RegistryError, RegistryResult};
use crate::identity::Identity;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info_span, Span};

/// A single field transition reported to [`RegistryHooks::value_changed`].
#[derive(Debug)]
pub struct ValueChanged<'a, E> {
    /// Identity of the changed entry.
    pub identity: &'a Identity,
    /// Declared field that changed.
    pub field: &'static str,
    /// Serialized value before the rebuild.
    pub old: &'a Value,
    /// Serialized value after the rebuild.
    pub new: &'a Value,
    /// Entry as it was before the rebuild.
    pub previous: &'a E,
    /// Entry built from the incoming record.
    pub current: &'a E,
}

/// Change callbacks invoked synchronously during a rebuild.
///
/// Both methods default to doing nothing. Returning an error aborts the
/// rebuild with [`RegistryError::Hook`].
pub trait RegistryHooks<E: Entry> {
    /// Called when a rebuild sees an identity that was not present before.
    fn new_entry(&mut self, _entry: &E) -> Result<(), HookError> {
        Ok(())
    }

    /// Called once per declared field that differs for a known identity.
    fn value_changed(&mut self, _change: ValueChanged<'_, E>) -> Result<(), HookError> {
        Ok(())
    }
}

/// Hooks that ignore every change.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl<E: Entry> RegistryHooks<E> for NoHooks {}

/// Whether a rebuild reports changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildMode {
    /// First rebuild from disk; establishes the baseline without hooks.
    Initializing,
    /// Regular rebuild from upstream data; hooks fire.
    Live,
}

/// Counts describing one rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Entries held after the rebuild.
    pub entries: usize,
    /// Identities that were not present before.
    pub added: usize,
    /// Known identities with at least one changed field.
    pub changed: usize,
    /// Total number of changed fields.
    pub changed_fields: usize,
    /// Identities present before but missing from the new records.
    pub removed: usize,
    /// Records without an identity value, missing or `null`.
    pub anonymous: usize,
    /// Records whose identity repeated an earlier record in the same pass.
    pub duplicates: usize,
}

/// Configures and opens a [`Registry`].
pub struct RegistryBuilder<E: Entry> {
    name: String,
    hooks: Box<dyn RegistryHooks<E>>,
    span: Option<Span>,
}

impl<E: Entry> RegistryBuilder<E> {
    /// Sets the change hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: impl RegistryHooks<E> + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Sets the span the registry logs in.
    #[must_use]
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Opens the registry file `<name>.json` inside a locked cache directory.
    pub fn open_in(self, cache: &CacheDir) -> RegistryResult<Registry<E>> {
        let path = cache.registry_path(&self.name);
        self.open_file(path)
    }

    /// Opens the registry file `<name>.json` inside `dir`.
    pub fn open(self, dir: &Path) -> RegistryResult<Registry<E>> {
        let path = registry_file(dir, &self.name);
        self.open_file(path)
    }

    /// Opens a registry backed by an explicit file path.
    ///
    /// A missing file is created holding an empty list. The stored records
    /// are then rebuilt in [`RebuildMode::Initializing`], so no hook fires.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created, read or parsed, or if a stored
    /// record is not a valid entry.
    pub fn open_file(self, path: PathBuf) -> RegistryResult<Registry<E>> {
        let span = self
            .span
            .unwrap_or_else(|| info_span!("registry", kind = %self.name));
        let mut registry = Registry {
            name: self.name,
            path,
            entries: Vec::new(),
            index: HashMap::new(),
            hooks: self.hooks,
            span,
        };

        let records = registry.read_records()?;
        let summary = registry.rebuild_with(records, RebuildMode::Initializing)?;
        registry.span.in_scope(|| {
            debug!(entries = summary.entries, path = %registry.path.display(), "registry loaded");
        });
        Ok(registry)
    }
}

/// An ordered collection of entries of one kind, indexed by identity.
pub struct Registry<E: Entry> {
    name: String,
    path: PathBuf,
    entries: Vec<E>,
    index: HashMap<Identity, usize>,
    hooks: Box<dyn RegistryHooks<E>>,
    span: Span,
}

impl<E: Entry> Registry<E> {
    /// Starts configuring a registry called `name`.
    pub fn builder(name: impl Into<String>) -> RegistryBuilder<E> {
        RegistryBuilder {
            name: name.into(),
            hooks: Box::new(NoHooks),
            span: None,
        }
    }

    /// Opens `<dir>/<name>.json` with no hooks.
    pub fn open(name: impl Into<String>, dir: &Path) -> RegistryResult<Self> {
        Self::builder(name).open(dir)
    }

    /// Registry name (also the backing file stem).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared field names of the entry kind.
    #[must_use]
    pub fn data_layout(&self) -> &'static [&'static str] {
        E::FIELDS
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces the change hooks.
    pub fn set_hooks(&mut self, hooks: impl RegistryHooks<E> + 'static) {
        self.hooks = Box::new(hooks);
    }

    /// Replaces the span the registry logs in.
    pub fn set_span(&mut self, span: Span) {
        self.span = span;
    }

    /// Entries in rebuild order.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.entries.iter()
    }

    /// Entries in rebuild order, as a slice.
    #[must_use]
    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    /// Looks up an entry by identity.
    pub fn get(&self, identity: &Identity) -> Option<&E> {
        self.index.get(identity).map(|&pos| &self.entries[pos])
    }

    /// Looks up an entry by identity.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::NoIdentity`] if the kind has no identity
    /// field, or [`RegistryError::NotFound`] if no entry matches.
    pub fn lookup(&self, identity: &Identity) -> RegistryResult<&E> {
        if E::IDENTITY.is_none() {
            return Err(RegistryError::NoIdentity {
                kind: E::KIND.to_string(),
            });
        }
        self.get(identity).ok_or_else(|| RegistryError::NotFound {
            kind: E::KIND.to_string(),
            identity: identity.clone(),
        })
    }

    /// Returns true if [`lookup`](Self::lookup) would succeed.
    #[must_use]
    pub fn contains(&self, identity: &Identity) -> bool {
        self.get(identity).is_some()
    }

    /// Serializes every entry, in order.
    pub fn snapshot(&self) -> RegistryResult<Vec<Record>> {
        self.entries
            .iter()
            .map(|entry| entry.to_record().map_err(RegistryError::from))
            .collect()
    }

    /// Rebuilds the contents from freshly fetched records, firing hooks.
    pub fn rebuild<I>(&mut self, records: I) -> RegistryResult<RebuildSummary>
    where
        I: IntoIterator<Item = Record>,
    {
        self.rebuild_with(records, RebuildMode::Live)
    }

    /// Rebuilds the contents from `records`.
    ///
    /// Entries whose identity does not appear in `records` are dropped. If two
    /// records share an identity the later one wins and keeps the position of
    /// the first. Records lacking the identity field are kept but never
    /// reported to hooks. Records whose identity field is `null` are kept
    /// unindexed and reported to [`RegistryHooks::new_entry`] on every live
    /// rebuild.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed record or failing hook; the contents are
    /// then left as they were before the call.
    pub fn rebuild_with<I>(&mut self, records: I, mode: RebuildMode) -> RegistryResult<RebuildSummary>
    where
        I: IntoIterator<Item = Record>,
    {
        let _entered = self.span.enter();
        let mut entries: Vec<E> = Vec::new();
        let mut index: HashMap<Identity, usize> = HashMap::new();
        let mut changed_ids: HashSet<Identity> = HashSet::new();
        let mut summary = RebuildSummary::default();

        for record in records {
            let carries_identity =
                E::IDENTITY.is_some_and(|field| record.contains_key(field));
            let entry = E::from_record(record)?;

            if !carries_identity {
                summary.anonymous += 1;
                entries.push(entry);
                continue;
            }

            // A null identity is never indexed, so it is always new.
            let Some(identity) = entry.identity() else {
                summary.anonymous += 1;
                if mode == RebuildMode::Live {
                    debug!("new entry without identity");
                    self.hooks
                        .new_entry(&entry)
                        .map_err(|source| hook_error::<E>(source))?;
                }
                entries.push(entry);
                continue;
            };

            match self.index.get(&identity).map(|&pos| &self.entries[pos]) {
                None => {
                    summary.added += 1;
                    if mode == RebuildMode::Live {
                        debug!(%identity, "new entry");
                        self.hooks
                            .new_entry(&entry)
                            .map_err(|source| hook_error::<E>(source))?;
                    }
                }
                Some(previous) if mode == RebuildMode::Live => {
                    let diff = previous.diff(&entry)?;
                    if !diff.is_empty() {
                        changed_ids.insert(identity.clone());
                        summary.changed_fields += diff.len();
                    }
                    for change in diff.iter() {
                        debug!(%identity, field = change.field, "value changed");
                        self.hooks
                            .value_changed(ValueChanged {
                                identity: &identity,
                                field: change.field,
                                old: &change.old,
                                new: &change.new,
                                previous,
                                current: &entry,
                            })
                            .map_err(|source| hook_error::<E>(source))?;
                    }
                }
                Some(_) => {}
            }

            match index.get(&identity) {
                Some(&pos) => {
                    summary.duplicates += 1;
                    entries[pos] = entry;
                }
                None => {
                    index.insert(identity, entries.len());
                    entries.push(entry);
                }
            }
        }

        summary.changed = changed_ids.len();
        summary.removed = self
            .index
            .keys()
            .filter(|identity| !index.contains_key(*identity))
            .count();
        summary.entries = entries.len();

        self.entries = entries;
        self.index = index;

        if mode == RebuildMode::Live {
            debug!(
                entries = summary.entries,
                added = summary.added,
                changed = summary.changed,
                removed = summary.removed,
                "registry rebuilt"
            );
        }
        Ok(summary)
    }

    /// Writes every entry to the backing file as a pretty-printed JSON array.
    ///
    /// The file is replaced as a whole.
    ///
    /// # Errors
    ///
    /// Fails if an entry cannot be serialized or the file cannot be written.
    pub fn commit(&self) -> RegistryResult<()> {
        let records = self.snapshot()?;
        let data = serde_json::to_vec_pretty(&records).map_err(|source| EntryError::Shape {
            kind: E::KIND,
            source,
        })?;
        write_atomic(&self.path, &data).map_err(|source| RegistryError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.span.in_scope(|| debug!(entries = records.len(), "registry committed"));
        Ok(())
    }

    fn read_records(&self) -> RegistryResult<Vec<Record>> {
        if !self.path.exists() {
            fs::write(&self.path, b"[]").map_err(|source| RegistryError::Create {
                path: self.path.clone(),
                source,
            })?;
        }

        let data = fs::read(&self.path).map_err(|source| RegistryError::Load {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_slice(&data).map_err(|source| RegistryError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

fn hook_error<E: Entry>(source: HookError) -> RegistryError {
    RegistryError::Hook {
        kind: E::KIND.to_string(),
        source,
    }
}

impl<'a, E: Entry> IntoIterator for &'a Registry<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<E: Entry> std::fmt::Debug for Registry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .finish()
    }
}
