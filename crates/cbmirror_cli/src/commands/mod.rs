//! CLI command implementations.

pub mod lookup;
pub mod notify;
pub mod show;
pub mod sync;
