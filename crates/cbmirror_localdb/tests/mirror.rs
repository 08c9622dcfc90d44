//! End-to-end mirror behavior against a scripted server.

use cbmirror_localdb::sfx::md5_hex;
use cbmirror_localdb::{sfx_data_path, LocalDb, LocalDbError, RegistryKind};
use cbmirror_registry::{Identity, Record, RegistryError};
use cbmirror_sync::{MockRemote, SyncError};
use cbmirror_testkit::prelude::*;
use proptest::prelude::*;
use serde_json::json;
use std::fs;

fn serve_empty(remote: &MockRemote) {
    for kind in RegistryKind::ALL {
        remote.set_response(kind.api_path(), listing(Vec::new()));
    }
}

fn serve_games(remote: &MockRemote, games: Vec<Record>) {
    remote.set_response(RegistryKind::Games.api_path(), listing(games));
}

#[test]
fn update_commit_and_reload() {
    let mirror = TestMirror::new();
    let remote = MockRemote::new();
    serve_empty(&remote);
    serve_games(
        &remote,
        vec![
            game_record(1, "NYET", Some("1"), &["alice", "bob"]),
            game_record(2, "NYET", None, &["carol", "dave"]),
        ],
    );
    remote.set_response(
        RegistryKind::Tournaments.api_path(),
        listing([tournament_record(1, &[1, 2])]),
    );

    {
        let mut db = mirror.open();
        let report = db.update_all(&remote);
        assert!(report.is_complete());
        assert_eq!(db.len(RegistryKind::Games), 2);
        db.commit_all().unwrap();
    }

    let db = mirror.open();
    assert_eq!(db.games().len(), 2);
    let game = db.games().lookup(&Identity::Int(1)).unwrap();
    assert_eq!(game.players, vec!["alice", "bob"]);
    assert_eq!(game.court.as_deref(), Some("1"));
    assert_eq!(db.tournaments().lookup(&Identity::Int(1)).unwrap().games, vec![1, 2]);

    let stored = fs::read_to_string(mirror.config.cache_dir.join("game_registry.json")).unwrap();
    assert!(stored.contains("\"tournament\": 1"));
}

#[test]
fn next_game_is_announced_exactly_once() {
    let mirror = TestMirror::new();
    let remote = MockRemote::new();
    let (mut db, announcer) = mirror.open_recording();

    serve_games(
        &remote,
        vec![
            game_record(1, "NYET", Some("3"), &["alice", "bob"]),
            game_record(2, "NYET", None, &["carol", "dave"]),
            game_record(3, "NEXT", Some("1"), &["erin", "frank"]),
            game_record(4, "NYET", Some("2"), &["gina", "hal"]),
        ],
    );
    db.update(RegistryKind::Games, &remote).unwrap();
    assert!(announcer.calls().is_empty());

    serve_games(
        &remote,
        vec![
            game_record(1, "NEXT", Some("3"), &["alice", "bob"]),
            game_record(2, "NEXT", None, &["carol", "dave"]),
            game_record(3, "RUNNING", Some("1"), &["erin", "frank"]),
            game_record(4, "RUNNING", Some("2"), &["gina", "hal"]),
        ],
    );
    db.update(RegistryKind::Games, &remote).unwrap();
    db.update(RegistryKind::Games, &remote).unwrap();

    assert_eq!(
        announcer.calls(),
        vec![Announcement {
            court: "3".into(),
            players: vec!["alice".into(), "bob".into()],
        }]
    );
}

#[test]
fn announcement_uses_stored_court_and_players() {
    let mirror = TestMirror::new();
    let remote = MockRemote::new();
    let (mut db, announcer) = mirror.open_recording();

    serve_games(&remote, vec![game_record(1, "NYET", Some("1"), &["alice", "bob"])]);
    db.update(RegistryKind::Games, &remote).unwrap();

    serve_games(&remote, vec![game_record(1, "NEXT", Some("2"), &["alice", "carol"])]);
    db.update(RegistryKind::Games, &remote).unwrap();

    assert_eq!(
        announcer.calls(),
        vec![Announcement {
            court: "1".into(),
            players: vec!["alice".into(), "bob".into()],
        }]
    );
}

#[test]
fn court_assigned_with_next_status_is_not_announced() {
    let mirror = TestMirror::new();
    let remote = MockRemote::new();
    let (mut db, announcer) = mirror.open_recording();

    serve_games(&remote, vec![game_record(1, "NYET", None, &["alice"])]);
    db.update(RegistryKind::Games, &remote).unwrap();

    serve_games(&remote, vec![game_record(1, "NEXT", Some("2"), &["bob"])]);
    db.update(RegistryKind::Games, &remote).unwrap();

    assert!(announcer.calls().is_empty());
    assert_eq!(
        db.games().lookup(&Identity::Int(1)).unwrap().court.as_deref(),
        Some("2")
    );
}

#[test]
fn reopening_does_not_announce() {
    let mirror = TestMirror::new();
    let remote = MockRemote::new();
    {
        let mut db = mirror.open();
        serve_games(&remote, vec![game_record(1, "NEXT", Some("1"), &["alice"])]);
        db.update(RegistryKind::Games, &remote).unwrap();
        db.commit(RegistryKind::Games).unwrap();
    }

    let (db, announcer) = mirror.open_recording();
    assert_eq!(db.games().len(), 1);
    assert!(announcer.calls().is_empty());
}

#[test]
fn failing_announcer_keeps_previous_games() {
    let mirror = TestMirror::new();
    let remote = MockRemote::new();
    let (mut db, announcer) = mirror.open_recording();

    serve_games(&remote, vec![game_record(1, "NYET", Some("1"), &["alice"])]);
    db.update(RegistryKind::Games, &remote).unwrap();

    announcer.fail_next();
    serve_games(&remote, vec![game_record(1, "NEXT", Some("1"), &["alice"])]);
    let err = db.update(RegistryKind::Games, &remote).unwrap_err();

    assert!(matches!(
        err,
        LocalDbError::Registry(RegistryError::Hook { .. })
    ));
    assert_eq!(
        db.games().lookup(&Identity::Int(1)).unwrap().game_status,
        "NYET"
    );
}

#[test]
fn update_all_continues_past_failures() {
    let mirror = TestMirror::new();
    let remote = MockRemote::new();
    serve_empty(&remote);
    remote.push_error(RegistryKind::Games.api_path(), SyncError::Timeout);
    remote.set_response(
        RegistryKind::Tournaments.api_path(),
        json!({"detail": "not a list"}),
    );
    remote.set_response(
        RegistryKind::Announcements.api_path(),
        listing([announcement_record(1, "2", &["alice"])]),
    );

    let mut db = mirror.open();
    let report = db.update_all(&remote);

    let failed: Vec<RegistryKind> = report.failed.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(failed, vec![RegistryKind::Games, RegistryKind::Tournaments]);
    assert!(report.failed[0].1.is_transient());
    assert!(!report.failed[1].1.is_transient());
    assert_eq!(db.announcements().len(), 1);
}

#[test]
fn malformed_record_leaves_registry_unchanged() {
    let mirror = TestMirror::new();
    let remote = MockRemote::new();
    let mut db = mirror.open();

    remote.set_response(
        RegistryKind::Players.api_path(),
        listing([player_record("alice", None)]),
    );
    db.update(RegistryKind::Players, &remote).unwrap();

    let mut broken = player_record("bob", None);
    broken.remove("display_name");
    remote.set_response(
        RegistryKind::Players.api_path(),
        listing([player_record("carol", None), broken]),
    );
    assert!(db.update(RegistryKind::Players, &remote).is_err());
    assert!(db.players().contains(&Identity::from("alice")));
    assert!(!db.players().contains(&Identity::from("carol")));
}

#[test]
fn cache_directory_is_exclusive() {
    let mirror = TestMirror::new();
    let _db = mirror.open();
    let err = LocalDb::open(&mirror.config).unwrap_err();
    assert!(matches!(err, LocalDbError::Registry(RegistryError::Locked)));
}

#[test]
fn lookup_by_kind() {
    let mirror = TestMirror::new();
    let remote = MockRemote::new();
    let mut db = mirror.open();
    remote.set_response(
        RegistryKind::Players.api_path(),
        listing([player_record("alice", None)]),
    );
    db.update(RegistryKind::Players, &remote).unwrap();

    let identity = RegistryKind::Players.parse_identity("alice").unwrap();
    let record = db.lookup(RegistryKind::Players, &identity).unwrap();
    assert_eq!(record["display_name"], "alice");

    let missing = db
        .lookup(RegistryKind::Players, &Identity::from("zed"))
        .unwrap_err();
    assert!(matches!(missing, LocalDbError::Registry(ref e) if e.is_not_found()));
}

#[test]
fn player_update_syncs_sound_effects() {
    let mirror = TestMirror::new();
    let remote = MockRemote::new();
    serve_empty(&remote);
    remote.set_response(
        RegistryKind::Players.api_path(),
        listing([
            player_record("alice", Some(md5_hex(b"boing").as_str())),
            player_record("bob", None),
        ]),
    );
    remote.set_response(
        sfx_data_path("alice"),
        json!({"status": "ok", "data": "Ym9pbmc="}),
    );
    remote.set_response(sfx_data_path("bob"), json!({"status": "ok", "data": null}));

    let mut db = mirror.open();
    let report = db.update_all(&remote);

    let sfx = report.sfx.unwrap();
    assert_eq!(sfx.downloaded, 1);
    assert_eq!(sfx.missing, 1);
    assert_eq!(fs::read(mirror.sfx_dir().join("alice")).unwrap(), b"boing");

    let again = db.sync_sfx(&remote).unwrap();
    assert_eq!(again.current, 1);
}

#[test]
fn sound_effects_wait_for_player_update() {
    let mirror = TestMirror::new();
    let remote = MockRemote::new();
    serve_empty(&remote);
    remote.push_error(RegistryKind::Players.api_path(), SyncError::Timeout);

    let mut db = mirror.open();
    let report = db.update_all(&remote);
    assert!(report.sfx.is_none());

    let report = db.update_all(&remote);
    let sfx = report.sfx.unwrap();
    assert_eq!(sfx.downloaded + sfx.failed, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn identical_listing_is_silent(games in game_listing_strategy()) {
        let mirror = TestMirror::new();
        let remote = MockRemote::new();
        let (mut db, announcer) = mirror.open_recording();

        serve_games(&remote, games.clone());
        db.update(RegistryKind::Games, &remote).unwrap();
        let summary = db.update(RegistryKind::Games, &remote).unwrap();

        prop_assert_eq!(summary.entries, games.len());
        prop_assert_eq!(summary.added, 0);
        prop_assert_eq!(summary.changed, 0);
        prop_assert!(announcer.calls().is_empty());
    }
}
