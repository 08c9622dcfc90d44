//! # cbmirror localdb
//!
//! Local mirrors of the central server's record sets.
//!
//! This crate provides:
//! - Entry kinds for games, tournaments, players and announcements
//! - [`LocalDb`]: the four registries in one locked cache directory,
//!   updated from a [`RemoteAccess`](cbmirror_sync::RemoteAccess)
//! - [`GameHooks`]: announces a game when its status moves to `NEXT`
//! - Player sound effect sync
//! - Live game notifications queued for delivery
//!
//! ## Example
//!
//! ```rust,ignore
//! let config = MirrorConfig::new("/var/cache/cbmirror").with_server_url(url);
//! let remote = HttpTransport::from_config(&config.sync)?;
//! let mut db = LocalDb::open_with_announcer(&config, LogAnnouncer)?;
//! db.update_all(&remote);
//! db.commit_all()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod announcement;
mod config;
mod error;
mod game;
mod kind;
pub mod live;
mod localdb;
mod player;
pub mod sfx;
mod tournament;

pub use announcement::AnnouncementEntry;
pub use config::MirrorConfig;
pub use error::{LocalDbError, LocalDbResult};
pub use game::{Announcer, GameEntry, GameHooks, LogAnnouncer, STATUS_NEXT, STATUS_NOT_YET};
pub use kind::{sfx_data_path, RegistryKind};
pub use live::GameEnd;
pub use localdb::{LocalDb, UpdateReport};
pub use player::PlayerEntry;
pub use sfx::SfxReport;
pub use tournament::TournamentEntry;
