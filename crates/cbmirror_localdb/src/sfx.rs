//! Player sound effect files.
//!
//! Each player may have a sound effect stored on the server. The local copy
//! lives at `<sfx dir>/<username>` and is downloaded again whenever it is
//! missing or its MD5 differs from the player's `sfx_md5`.

use crate::error::{LocalDbError, LocalDbResult};
use crate::kind::sfx_data_path;
use crate::player::PlayerEntry;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cbmirror_sync::{is_acknowledged, RemoteAccess};
use md5::{Digest, Md5};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Counts describing one sound effect sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SfxReport {
    /// Players inspected.
    pub checked: usize,
    /// Files written.
    pub downloaded: usize,
    /// Players whose local file was already current.
    pub current: usize,
    /// Players the server has no sound effect for.
    pub missing: usize,
    /// Players whose sync failed.
    pub failed: usize,
}

/// Hex MD5 digest of `data`.
#[must_use]
pub fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", Md5::digest(data))
}

/// Local path of a player's sound effect.
///
/// # Errors
///
/// Returns [`LocalDbError::UnsafeUsername`] unless `username` is a single
/// plain path component, so the file always lands directly inside `dir`.
pub fn sfx_path(dir: &Path, username: &str) -> LocalDbResult<PathBuf> {
    let mut components = Path::new(username).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == username => Ok(dir.join(name)),
        _ => Err(LocalDbError::UnsafeUsername {
            username: username.to_string(),
        }),
    }
}

/// Returns true if the local file is missing or differs from `expected`.
///
/// # Errors
///
/// Fails if the file exists but cannot be read.
pub fn needs_download(path: &Path, expected: Option<&str>) -> LocalDbResult<bool> {
    match fs::read(path) {
        Ok(data) => Ok(expected != Some(md5_hex(&data).as_str())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
        Err(source) => Err(LocalDbError::Sfx {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Fetches one player's sound effect into `dir`.
///
/// Returns `false` if the server has no sound effect for the player.
///
/// # Errors
///
/// Fails on transport errors, unacknowledged responses, bad base64 or a
/// failed write.
pub fn download<R: RemoteAccess + ?Sized>(
    remote: &R,
    dir: &Path,
    username: &str,
) -> LocalDbResult<bool> {
    let path = sfx_path(dir, username)?;
    let response = remote.get(&sfx_data_path(username))?;
    if !is_acknowledged(&response) {
        return Err(cbmirror_sync::SyncError::Rejected(response.to_string()).into());
    }

    let encoded = match response.get("data") {
        Some(Value::String(encoded)) => encoded,
        _ => return Ok(false),
    };
    let data = STANDARD
        .decode(encoded)
        .map_err(|source| LocalDbError::SfxData {
            username: username.to_string(),
            source,
        })?;

    fs::create_dir_all(dir)
        .and_then(|()| fs::write(&path, data))
        .map_err(|source| LocalDbError::Sfx { path, source })?;
    Ok(true)
}

/// Brings every player's sound effect file up to date.
///
/// Failures are logged and counted per player; one bad player does not stop
/// the others.
pub fn sync_players<'a, R, I>(remote: &R, dir: &Path, players: I) -> SfxReport
where
    R: RemoteAccess + ?Sized,
    I: IntoIterator<Item = &'a PlayerEntry>,
{
    let mut report = SfxReport::default();

    for player in players {
        let Some(username) = player.username.as_deref() else {
            continue;
        };
        report.checked += 1;

        let outcome = sfx_path(dir, username)
            .and_then(|path| needs_download(&path, player.sfx_md5.as_deref()))
            .and_then(|stale| {
                if stale {
                    download(remote, dir, username).map(Some)
                } else {
                    Ok(None)
                }
            });

        match outcome {
            Ok(None) => report.current += 1,
            Ok(Some(true)) => {
                debug!(username, "sound effect downloaded");
                report.downloaded += 1;
            }
            Ok(Some(false)) => report.missing += 1,
            Err(e) => {
                warn!(username, error = %e, "sound effect sync failed");
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbmirror_registry::Entry;
    use cbmirror_sync::MockRemote;
    use serde_json::json;
    use tempfile::TempDir;

    fn player(username: &str, sfx_md5: Option<&str>) -> PlayerEntry {
        let Value::Object(record) = json!({
            "name": username,
            "display_name": username,
            "username": username,
            "sfx_md5": sfx_md5,
        }) else {
            unreachable!()
        };
        PlayerEntry::from_record(record).unwrap()
    }

    #[test]
    fn md5_of_known_input() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn missing_file_needs_download() {
        let dir = TempDir::new().unwrap();
        assert!(needs_download(&dir.path().join("alice"), None).unwrap());
    }

    #[test]
    fn matching_digest_is_current() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alice");
        fs::write(&path, b"abc").unwrap();

        assert!(!needs_download(&path, Some("900150983cd24fb0d6963f7d28e17f72")).unwrap());
        assert!(needs_download(&path, Some("0000")).unwrap());
        assert!(needs_download(&path, None).unwrap());
    }

    #[test]
    fn sync_downloads_stale_and_skips_current() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bob"), b"abc").unwrap();

        let remote = MockRemote::new();
        remote.set_response(
            sfx_data_path("alice"),
            json!({"status": "ok", "data": STANDARD.encode(b"boing")}),
        );
        remote.set_response(sfx_data_path("carol"), json!({"status": "ok", "data": null}));

        let players = [
            player("alice", Some(md5_hex(b"boing").as_str())),
            player("bob", Some("900150983cd24fb0d6963f7d28e17f72")),
            player("carol", None),
        ];
        let report = sync_players(&remote, dir.path(), &players);

        assert_eq!(
            report,
            SfxReport {
                checked: 3,
                downloaded: 1,
                current: 1,
                missing: 1,
                failed: 0,
            }
        );
        assert_eq!(fs::read(dir.path().join("alice")).unwrap(), b"boing");
        assert_eq!(
            remote.gets(),
            vec![sfx_data_path("alice"), sfx_data_path("carol")]
        );
    }

    #[test]
    fn only_plain_usernames_map_to_files() {
        let dir = Path::new("/srv/sfx");
        assert_eq!(sfx_path(dir, "alice").unwrap(), dir.join("alice"));
        for username in ["../escaped", "/etc/passwd", "a/b", "..", ".", ""] {
            assert!(
                matches!(
                    sfx_path(dir, username),
                    Err(LocalDbError::UnsafeUsername { .. })
                ),
                "{username:?} accepted"
            );
        }
    }

    #[test]
    fn escaping_username_is_never_written() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("sfx");
        let remote = MockRemote::new();
        remote.set_response(
            sfx_data_path("../escaped"),
            json!({"status": "ok", "data": STANDARD.encode(b"boing")}),
        );

        let report = sync_players(&remote, &dir, &[player("../escaped", None)]);

        assert_eq!(report.checked, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.downloaded, 0);
        assert!(!root.path().join("escaped").exists());
        assert!(remote.gets().is_empty());
    }

    #[test]
    fn bad_data_counts_as_failure() {
        let dir = TempDir::new().unwrap();
        let remote = MockRemote::new();
        remote.set_response(
            sfx_data_path("alice"),
            json!({"status": "ok", "data": "not base64!"}),
        );
        remote.set_response(sfx_data_path("bob"), json!({"status": "error"}));

        let report = sync_players(
            &remote,
            dir.path(),
            &[player("alice", None), player("bob", None)],
        );
        assert_eq!(report.failed, 2);
        assert!(!dir.path().join("alice").exists());
    }
}
