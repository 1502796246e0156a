use std::fs;
use std::path::{Path, PathBuf};

use arena_core::bulk_edit::{BulkEdit, EditMode};
use arena_core::core_api::{
    CoreErrorCode, DeadRecordPolicy, Engine, SaveOptions, SaveStore, StoreConfig,
};
use arena_core::liveness::is_dead;
use arena_core::record::{EditableField, name_of};
use arena_core::roster::RosterQuery;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Value, json};
use tempfile::TempDir;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_path() -> PathBuf {
    workspace_root().join("tests/fixtures/sav.dat")
}

/// Copies the fixture into a scratch directory so saves do not touch it.
fn scratch_copy() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("sav.dat");
    fs::copy(fixture_path(), &path).expect("failed to copy fixture");
    (dir, path)
}

fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path).expect("file should be readable");
    serde_json::from_str(&text).expect("file should be valid JSON")
}

fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .expect("valid timestamp")
}

fn loaded_store() -> (TempDir, PathBuf, SaveStore) {
    let (dir, path) = scratch_copy();
    let mut store = SaveStore::new();
    store.load(&path).expect("fixture should load");
    (dir, path, store)
}

#[test]
fn load_prunes_dead_records_and_keeps_indices_stable() {
    let (_dir, _path, store) = loaded_store();
    let session = store.session().expect("loaded");

    assert_eq!(session.pruned_dead(), 3);
    assert_eq!(session.roster().len(), 6);
    assert_eq!(session.roster()[4], json!(42));

    let roster: Vec<(usize, String)> = store
        .iter_roster(None)
        .expect("loaded")
        .map(|(index, record)| (index, name_of(record)))
        .collect();
    assert_eq!(
        roster,
        vec![
            (0, "Aldric".to_string()),
            (1, "Lyra_2".to_string()),
            (2, "Corvin".to_string()),
            (3, "鐵拳".to_string()),
            (5, "_Scout".to_string()),
        ]
    );
}

#[test]
fn iter_roster_filters_by_team() {
    let (_dir, _path, store) = loaded_store();
    let indices: Vec<usize> = store
        .iter_roster(Some(0))
        .expect("loaded")
        .map(|(index, _)| index)
        .collect();
    assert_eq!(indices, vec![0, 1, 3]);

    let player: Vec<usize> = store
        .session()
        .expect("loaded")
        .player_roster()
        .map(|(index, _)| index)
        .collect();
    assert_eq!(player, indices);
}

#[test]
fn operations_before_load_are_state_errors() {
    let mut store = SaveStore::new();
    assert!(!store.is_loaded());

    let codes = [
        store.save(&SaveOptions::default()).map(|_| ()).unwrap_err().code,
        store.get_gold().map(|_| ()).unwrap_err().code,
        store.get_reputation().map(|_| ()).unwrap_err().code,
        store.query(&RosterQuery::default()).map(|_| ()).unwrap_err().code,
        store.iter_roster(None).map(|_| ()).unwrap_err().code,
    ];
    assert!(codes.iter().all(|code| *code == CoreErrorCode::State));

    assert_eq!(store.set_gold("5").unwrap_err().code, CoreErrorCode::State);
    assert_eq!(store.set_reputation("5").unwrap_err().code, CoreErrorCode::State);
    let edit = BulkEdit::new(EditMode::Add).with("level", "1");
    assert_eq!(store.bulk_edit(&[0], &edit).unwrap_err().code, CoreErrorCode::State);
}

#[test]
fn load_reports_io_and_parse_errors() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut store = SaveStore::new();

    let err = store
        .load(dir.path().join("missing.dat"))
        .expect_err("missing file should fail");
    assert_eq!(err.code, CoreErrorCode::Io);

    let broken = dir.path().join("broken.dat");
    fs::write(&broken, "{\"npcs\": [").expect("write broken fixture");
    let err = store.load(&broken).expect_err("truncated JSON should fail");
    assert_eq!(err.code, CoreErrorCode::Parse);

    let array = dir.path().join("array.dat");
    fs::write(&array, "[1, 2, 3]").expect("write array fixture");
    let err = store.load(&array).expect_err("non-object JSON should fail");
    assert_eq!(err.code, CoreErrorCode::Parse);
}

#[test]
fn failed_load_keeps_previous_save() {
    let (dir, path, mut store) = loaded_store();
    let broken = dir.path().join("broken.dat");
    fs::write(&broken, "not json").expect("write broken fixture");

    assert!(store.load(&broken).is_err());
    let session = store.session().expect("previous save should remain");
    assert_eq!(session.path(), Some(path.as_path()));
    assert_eq!(store.get_gold().expect("loaded"), Some(1500));
}

#[test]
fn missing_or_malformed_npcs_is_an_empty_roster() {
    let engine = Engine::new();
    for text in [r#"{"wealth":3}"#, r#"{"wealth":3,"npcs":{"a":1}}"#] {
        let session = engine.open_str(text).expect("object should parse");
        assert!(session.roster().is_empty());
        assert_eq!(session.iter_roster(None).count(), 0);
        assert_eq!(session.document()["npcs"], json!([]));
    }
}

#[test]
fn unedited_save_round_trips_except_dead_records() {
    let (_dir, path, store) = loaded_store();
    let mut expected = read_json(&fixture_path());

    store
        .save(&SaveOptions::default().without_backup())
        .expect("save should succeed");

    let npcs = expected["npcs"].as_array_mut().expect("npcs array");
    npcs.retain(|npc| !is_dead(npc));
    let written = read_json(&path);
    assert_eq!(written, expected);

    let keys = |v: &Value| -> Vec<String> {
        v.as_object().expect("object").keys().cloned().collect()
    };
    assert_eq!(keys(&written), keys(&expected));
}

#[test]
fn save_is_compact_and_keeps_non_ascii_literal() {
    let (_dir, path, store) = loaded_store();
    store
        .save(&SaveOptions::default().without_backup())
        .expect("save should succeed");

    let text = fs::read_to_string(&path).expect("saved file readable");
    assert!(text.contains("鐵拳"));
    assert!(text.contains("黑荊棘"));
    assert!(!text.contains("\\u"));
    assert!(!text.contains('\n'));
    assert!(!text.contains(": "));
    assert!(text.starts_with("{\"version\":\"1.0.3\",\"wealth\":1500"));
}

#[test]
fn save_writes_timestamped_backup_of_destination() {
    let (dir, path, store) = loaded_store();
    let original = fs::read(&path).expect("fixture readable");

    let report = store
        .save_at(&SaveOptions::default(), fixed_time())
        .expect("save should succeed");

    let expected_backup = dir.path().join("sav.dat.bak.20240102-030405");
    assert_eq!(report.destination, path);
    assert_eq!(report.backup.as_deref(), Some(expected_backup.as_path()));
    assert_eq!(fs::read(&expected_backup).expect("backup readable"), original);
    assert_ne!(fs::read(&path).expect("save readable"), original);
}

#[test]
fn blocked_backup_does_not_stop_the_save() {
    let (dir, path, store) = loaded_store();
    fs::create_dir(dir.path().join("sav.dat.bak.20240102-030405"))
        .expect("failed to create blocking directory");

    let report = store
        .save_at(&SaveOptions::default(), fixed_time())
        .expect("save should succeed without a backup");

    assert_eq!(report.destination, path);
    assert_eq!(report.backup, None);
    let written = read_json(&path);
    assert_eq!(written["npcs"].as_array().map(Vec::len), Some(6));
}

#[test]
fn unknown_numbers_keep_their_exact_text() {
    let (dir, _path) = scratch_copy();
    let path = dir.path().join("numbers.dat");
    let text = concat!(
        r#"{"wealth":10,"npcs":[],"#,
        r#""ratio":923.8829120510785,"tiny":1.0715660391465826e-75,"#,
        r#""big":18446744073709551616,"neg":-0.5}"#
    );
    fs::write(&path, text).expect("failed to write save");

    let mut store = SaveStore::new();
    store.load(&path).expect("save should load");
    store
        .save(&SaveOptions::default().without_backup())
        .expect("save should succeed");

    let written = fs::read_to_string(&path).expect("saved file readable");
    assert_eq!(written, text);
}

#[test]
fn save_as_new_path_skips_backup_and_leaves_source() {
    let (dir, path, store) = loaded_store();
    let original = fs::read(&path).expect("fixture readable");
    let out = dir.path().join("sav_edited.dat");

    let report = store
        .save_at(&SaveOptions::to_path(&out), fixed_time())
        .expect("save should succeed");

    assert_eq!(report.destination, out);
    assert_eq!(report.backup, None);
    assert_eq!(fs::read(&path).expect("source readable"), original);
    assert_eq!(read_json(&out)["wealth"], json!(1500));
}

#[test]
fn save_without_backup_option() {
    let (dir, _path, store) = loaded_store();
    let report = store
        .save_at(&SaveOptions::default().without_backup(), fixed_time())
        .expect("save should succeed");
    assert_eq!(report.backup, None);
    assert!(!dir.path().join("sav.dat.bak.20240102-030405").exists());
}

#[test]
fn save_to_unwritable_destination_is_io_error() {
    let (dir, _path, store) = loaded_store();
    let out = dir.path().join("no-such-dir").join("sav.dat");
    let err = store
        .save(&SaveOptions::to_path(out))
        .expect_err("missing parent directory should fail");
    assert_eq!(err.code, CoreErrorCode::Io);
}

#[test]
fn session_without_path_needs_explicit_destination() {
    let session = Engine::new()
        .open_str(r#"{"wealth":1,"npcs":[]}"#)
        .expect("object should parse");
    let err = session
        .save(&SaveOptions::default())
        .expect_err("no destination");
    assert_eq!(err.code, CoreErrorCode::State);
}

#[test]
fn gold_and_reputation_setters_coerce_and_clamp() {
    let (_dir, path, mut store) = loaded_store();
    assert_eq!(store.get_gold().expect("loaded"), Some(1500));
    assert_eq!(store.get_reputation().expect("loaded"), Some(320));

    assert_eq!(store.set_gold("-5").expect("loaded"), 0);
    assert_eq!(store.get_gold().expect("loaded"), Some(0));
    assert_eq!(store.set_gold("abc").expect("loaded"), 0);
    assert_eq!(store.set_gold("42").expect("loaded"), 42);
    assert_eq!(store.set_reputation(" 77 ").expect("loaded"), 77);

    store
        .save(&SaveOptions::default().without_backup())
        .expect("save should succeed");
    let written = read_json(&path);
    assert_eq!(written["wealth"], json!(42));
    assert_eq!(written["reputation"], json!(77));
}

#[test]
fn bulk_edit_persists_through_save() {
    let (_dir, path, mut store) = loaded_store();
    let edit = BulkEdit::new(EditMode::Add)
        .with_field(EditableField::Level, "3")
        .with_field(EditableField::PotentialPoint, "-10")
        .with_field(EditableField::Strength, "1");
    let count = store.bulk_edit(&[0, 3, 4], &edit).expect("edit should apply");
    assert_eq!(count, 2);

    let summaries = store
        .query(&RosterQuery {
            team: Some(0),
            ..RosterQuery::default()
        })
        .expect("loaded");
    let aldric = summaries.iter().find(|s| s.index == 0).expect("Aldric listed");
    assert_eq!(aldric.level, 15);
    assert_eq!(aldric.potential_point, 0);
    assert_eq!(aldric.base_stats.strength, 15);
    let fist = summaries.iter().find(|s| s.index == 3).expect("鐵拳 listed");
    assert_eq!(fist.level, 8);
    assert_eq!(fist.base_stats.strength, 1);

    store
        .save(&SaveOptions::default().without_backup())
        .expect("save should succeed");
    let written = read_json(&path);
    assert_eq!(written["npcs"][0]["level"], json!(15));
    assert_eq!(written["npcs"][0]["equipment"]["weapon"], json!("gladius"));
    assert_eq!(written["npcs"][3]["potentialPoint"], json!(0));
    assert_eq!(written["npcs"][4], json!(42));
}

#[test]
fn query_uses_default_order() {
    let (_dir, _path, store) = loaded_store();
    let names: Vec<String> = store
        .query(&RosterQuery::default())
        .expect("loaded")
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Aldric", "Lyra_2", "鐵拳", "Corvin", "_Scout"]);
}

#[test]
fn retain_policy_keeps_dead_records_in_document() {
    let (_dir, path) = scratch_copy();
    let mut store = SaveStore::with_config(StoreConfig {
        dead_records: DeadRecordPolicy::Retain,
        ..StoreConfig::default()
    });
    store.load(&path).expect("fixture should load");

    let session = store.session().expect("loaded");
    assert_eq!(session.pruned_dead(), 0);
    assert_eq!(session.roster().len(), 9);
    let listed: Vec<usize> = session.iter_roster(None).map(|(i, _)| i).collect();
    assert_eq!(listed, vec![0, 1, 3, 4, 8]);

    store
        .save(&SaveOptions::default().without_backup())
        .expect("save should succeed");
    assert_eq!(read_json(&path), read_json(&fixture_path()));
}

#[test]
fn retained_dead_records_are_not_bulk_edit_targets() {
    let (_dir, path) = scratch_copy();
    let mut store = SaveStore::with_config(StoreConfig {
        dead_records: DeadRecordPolicy::Retain,
        ..StoreConfig::default()
    });
    store.load(&path).expect("fixture should load");

    let edit = BulkEdit::new(EditMode::Set).with_field(EditableField::Level, "1");
    let count = store.bulk_edit(&[1, 2, 6], &edit).expect("edit should apply");
    assert_eq!(count, 1);

    let roster = store.session().expect("loaded").roster();
    assert_eq!(roster[1]["level"], json!(1));
    assert_eq!(roster[2]["level"], json!(20));
    assert_eq!(roster[6]["level"], json!(3));
}

#[test]
fn custom_keys_and_player_team() {
    let (_dir, path) = scratch_copy();
    let mut store = SaveStore::with_config(StoreConfig {
        gold_key: "day".to_string(),
        player_team: 1,
        ..StoreConfig::default()
    });
    store.load(&path).expect("fixture should load");

    assert_eq!(store.get_gold().expect("loaded"), Some(47));
    let player: Vec<usize> = store
        .session()
        .expect("loaded")
        .player_roster()
        .map(|(i, _)| i)
        .collect();
    assert_eq!(player, vec![2, 5]);
}
