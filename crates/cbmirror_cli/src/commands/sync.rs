//! Sync command implementation.

use cbmirror_localdb::{LocalDb, LogAnnouncer, MirrorConfig};
use cbmirror_sync::{HttpTransport, RemoteAccess};
use tracing::{info, warn};

/// Runs the sync command.
pub fn run(config: &MirrorConfig, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let remote = HttpTransport::from_config(&config.sync)?;
    if !remote.server_alive() {
        warn!(server = %config.sync.server_url, "server did not answer the probe");
    }

    let mut db = LocalDb::open_with_announcer(config, LogAnnouncer)?;
    let failed = sync_with(&mut db, &remote, dry_run)?;

    if failed > 0 {
        return Err(format!("{failed} registries failed to update").into());
    }
    Ok(())
}

/// Updates every registry and, unless `dry_run`, commits them.
///
/// Returns the number of registries that failed to update.
pub fn sync_with<R: RemoteAccess + ?Sized>(
    db: &mut LocalDb,
    remote: &R,
    dry_run: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let report = db.update_all(remote);

    for (kind, summary) in &report.updated {
        println!(
            "{kind:<14} {:>5} entries  +{} ~{} -{}",
            summary.entries, summary.added, summary.changed, summary.removed
        );
    }
    for (kind, error) in &report.failed {
        println!("{kind:<14} FAILED: {error}");
    }
    if let Some(sfx) = &report.sfx {
        println!(
            "{:<14} {:>5} checked  {} downloaded, {} failed",
            "sound effects", sfx.checked, sfx.downloaded, sfx.failed
        );
    }

    if dry_run {
        info!("dry run, nothing committed");
    } else {
        db.commit_all()?;
    }
    Ok(report.failed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbmirror_localdb::RegistryKind;
    use cbmirror_sync::MockRemote;
    use cbmirror_testkit::{game_record, listing, TestMirror};

    fn serve(remote: &MockRemote) {
        for kind in RegistryKind::ALL {
            remote.set_response(kind.api_path(), listing(Vec::new()));
        }
        remote.set_response(
            RegistryKind::Games.api_path(),
            listing([game_record(1, "NYET", Some("1"), &["alice", "bob"])]),
        );
    }

    #[test]
    fn sync_commits_unless_dry_run() {
        let mirror = TestMirror::new();
        let remote = MockRemote::new();
        serve(&remote);

        {
            let mut db = mirror.open();
            assert_eq!(sync_with(&mut db, &remote, true).unwrap(), 0);
        }
        assert!(mirror.open().games().is_empty());

        {
            let mut db = mirror.open();
            sync_with(&mut db, &remote, false).unwrap();
        }
        assert_eq!(mirror.open().games().len(), 1);
    }
}
