//! The local mirror: every registry in one locked cache directory.

use crate::announcement::AnnouncementEntry;
use crate::config::MirrorConfig;
use crate::error::{LocalDbError, LocalDbResult};
use crate::game::{Announcer, GameEntry, GameHooks};
use crate::kind::RegistryKind;
use crate::player::PlayerEntry;
use crate::sfx::{self, SfxReport};
use crate::tournament::TournamentEntry;
use cbmirror_registry::{CacheDir, Entry, Identity, RebuildSummary, Record, Registry};
use cbmirror_sync::RemoteAccess;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

/// Outcome of [`LocalDb::update_all`].
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Kinds that were fetched and rebuilt.
    pub updated: Vec<(RegistryKind, RebuildSummary)>,
    /// Kinds whose update failed, with the reason.
    pub failed: Vec<(RegistryKind, LocalDbError)>,
    /// Sound effect sync, when it ran.
    pub sfx: Option<SfxReport>,
}

impl UpdateReport {
    /// Returns true if every kind was updated.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Local mirror of the server's games, tournaments, players and
/// announcements.
///
/// The cache directory stays locked while the mirror is open.
pub struct LocalDb {
    cache: CacheDir,
    sfx_dir: Option<PathBuf>,
    games: Registry<GameEntry>,
    tournaments: Registry<TournamentEntry>,
    players: Registry<PlayerEntry>,
    announcements: Registry<AnnouncementEntry>,
}

fn open_registry<E: Entry>(cache: &CacheDir, kind: RegistryKind) -> LocalDbResult<Registry<E>> {
    let registry = Registry::builder(kind.registry_name())
        .span(info_span!("registry", kind = %kind))
        .open_in(cache)?;
    Ok(registry)
}

impl LocalDb {
    /// Opens the mirror, loading whatever the cache directory holds.
    ///
    /// # Errors
    ///
    /// Fails if the directory is locked by another process or a stored
    /// registry cannot be loaded.
    pub fn open(config: &MirrorConfig) -> LocalDbResult<Self> {
        let cache = CacheDir::open(config.cache_dir())?;
        Ok(Self {
            games: open_registry(&cache, RegistryKind::Games)?,
            tournaments: open_registry(&cache, RegistryKind::Tournaments)?,
            players: open_registry(&cache, RegistryKind::Players)?,
            announcements: open_registry(&cache, RegistryKind::Announcements)?,
            sfx_dir: config.sfx_dir.clone(),
            cache,
        })
    }

    /// Opens the mirror and announces games that become next.
    pub fn open_with_announcer(
        config: &MirrorConfig,
        announcer: impl Announcer + 'static,
    ) -> LocalDbResult<Self> {
        let mut db = Self::open(config)?;
        db.set_announcer(announcer);
        Ok(db)
    }

    /// Installs the announcer used by the game registry.
    pub fn set_announcer(&mut self, announcer: impl Announcer + 'static) {
        self.games.set_hooks(GameHooks::new(announcer));
    }

    /// Cache directory path.
    pub fn path(&self) -> &Path {
        self.cache.path()
    }

    /// Game registry.
    pub fn games(&self) -> &Registry<GameEntry> {
        &self.games
    }

    /// Tournament registry.
    pub fn tournaments(&self) -> &Registry<TournamentEntry> {
        &self.tournaments
    }

    /// Player registry.
    pub fn players(&self) -> &Registry<PlayerEntry> {
        &self.players
    }

    /// Announcement registry.
    pub fn announcements(&self) -> &Registry<AnnouncementEntry> {
        &self.announcements
    }

    /// Fetches one kind from the server and rebuilds its registry.
    ///
    /// Nothing is written to disk; see [`LocalDb::commit`].
    ///
    /// # Errors
    ///
    /// Fails if the fetch fails or a fetched record is malformed; the
    /// registry then keeps its previous contents.
    pub fn update<R: RemoteAccess + ?Sized>(
        &mut self,
        kind: RegistryKind,
        remote: &R,
    ) -> LocalDbResult<RebuildSummary> {
        let records = remote.fetch(kind.api_path())?;
        let summary = match kind {
            RegistryKind::Games => self.games.rebuild(records)?,
            RegistryKind::Tournaments => self.tournaments.rebuild(records)?,
            RegistryKind::Players => self.players.rebuild(records)?,
            RegistryKind::Announcements => self.announcements.rebuild(records)?,
        };
        Ok(summary)
    }

    /// Brings the local sound effect files in line with the player registry.
    ///
    /// # Errors
    ///
    /// Returns [`LocalDbError::NoSfxDir`] if no directory is configured.
    pub fn sync_sfx<R: RemoteAccess + ?Sized>(&self, remote: &R) -> LocalDbResult<SfxReport> {
        let dir = self.sfx_dir.as_deref().ok_or(LocalDbError::NoSfxDir)?;
        Ok(sfx::sync_players(remote, dir, &self.players))
    }

    /// Updates every kind, continuing past failures.
    ///
    /// Sound effects are synced after the players when a directory is
    /// configured and the player update succeeded.
    pub fn update_all<R: RemoteAccess + ?Sized>(&mut self, remote: &R) -> UpdateReport {
        let mut report = UpdateReport::default();

        for kind in RegistryKind::ALL {
            match self.update(kind, remote) {
                Ok(summary) => {
                    info!(
                        %kind,
                        entries = summary.entries,
                        added = summary.added,
                        changed = summary.changed,
                        removed = summary.removed,
                        "registry updated"
                    );
                    report.updated.push((kind, summary));
                }
                Err(e) => {
                    warn!(%kind, error = %e, "registry update failed");
                    report.failed.push((kind, e));
                }
            }
        }

        let players_updated = report
            .updated
            .iter()
            .any(|(kind, _)| *kind == RegistryKind::Players);
        if let (true, Some(dir)) = (players_updated, self.sfx_dir.as_deref()) {
            report.sfx = Some(sfx::sync_players(remote, dir, &self.players));
        }
        report
    }

    /// Writes one registry to disk.
    pub fn commit(&self, kind: RegistryKind) -> LocalDbResult<()> {
        match kind {
            RegistryKind::Games => self.games.commit()?,
            RegistryKind::Tournaments => self.tournaments.commit()?,
            RegistryKind::Players => self.players.commit()?,
            RegistryKind::Announcements => self.announcements.commit()?,
        }
        Ok(())
    }

    /// Writes every registry to disk.
    pub fn commit_all(&self) -> LocalDbResult<()> {
        for kind in RegistryKind::ALL {
            self.commit(kind)?;
        }
        Ok(())
    }

    /// Serialized contents of one registry, in order.
    pub fn snapshot(&self, kind: RegistryKind) -> LocalDbResult<Vec<Record>> {
        let records = match kind {
            RegistryKind::Games => self.games.snapshot()?,
            RegistryKind::Tournaments => self.tournaments.snapshot()?,
            RegistryKind::Players => self.players.snapshot()?,
            RegistryKind::Announcements => self.announcements.snapshot()?,
        };
        Ok(records)
    }

    /// Serialized entry of one registry by identity.
    ///
    /// # Errors
    ///
    /// Fails with a registry not-found error if no entry has `identity`.
    pub fn lookup(&self, kind: RegistryKind, identity: &Identity) -> LocalDbResult<Record> {
        let record = match kind {
            RegistryKind::Games => self.games.lookup(identity)?.to_record(),
            RegistryKind::Tournaments => self.tournaments.lookup(identity)?.to_record(),
            RegistryKind::Players => self.players.lookup(identity)?.to_record(),
            RegistryKind::Announcements => self.announcements.lookup(identity)?.to_record(),
        };
        Ok(record.map_err(cbmirror_registry::RegistryError::from)?)
    }

    /// Number of entries in one registry.
    pub fn len(&self, kind: RegistryKind) -> usize {
        match kind {
            RegistryKind::Games => self.games.len(),
            RegistryKind::Tournaments => self.tournaments.len(),
            RegistryKind::Players => self.players.len(),
            RegistryKind::Announcements => self.announcements.len(),
        }
    }
}

impl std::fmt::Debug for LocalDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalDb")
            .field("path", &self.cache.path())
            .field("games", &self.games.len())
            .field("tournaments", &self.tournaments.len())
            .field("players", &self.players.len())
            .field("announcements", &self.announcements.len())
            .finish()
    }
}
