//! # cbmirror registry
//!
//! Local, file-backed mirrors of upstream record sets.
//!
//! This crate provides:
//! - The [`Entry`] trait: declared fields, optional identity, field diffing
//! - Reference normalization for fields that point at other records
//! - [`Registry`]: an ordered, identity-indexed collection rebuilt from
//!   fresh records, reporting changes through injected [`RegistryHooks`]
//! - [`CacheDir`]: the locked directory holding one JSON file per registry
//!
//! ## Key Invariants
//!
//! - At most one entry per identity in a registry
//! - The first rebuild after opening never fires hooks
//! - Changes are measured against the contents before the rebuild
//! - A rebuild mirrors the upstream set exactly, deletions included
//! - Nothing is written to disk until [`Registry::commit`]

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dir;
mod entry;
mod error;
mod identity;
pub mod reference;
mod registry;

pub use dir::{registry_file, CacheDir, REGISTRY_EXTENSION};
pub use entry::{Entry, EntrySnapshot, FieldChange, FieldDiff, Record};
pub use error::{EntryError, EntryResult, HookError, RegistryError, RegistryResult};
pub use identity::Identity;
pub use registry::{
    NoHooks, RebuildMode, RebuildSummary, Registry, RegistryBuilder, RegistryHooks, ValueChanged,
};
