//! # cbmirror testkit
//!
//! Test utilities for cbmirror.
//!
//! This crate provides:
//! - Temporary mirrors and a recording announcer
//! - Sample upstream records for every kind
//! - Property-based generators for reference shapes and records
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cbmirror_testkit::prelude::*;
//!
//! #[test]
//! fn announces_next_game() {
//!     let mirror = TestMirror::new();
//!     // ...
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod records;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::records::*;
}

pub use fixtures::*;
pub use generators::*;
pub use records::*;

pub use cbmirror_sync::MockRemote;
