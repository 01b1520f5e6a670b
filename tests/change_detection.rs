//! Integration tests for the change detector and its history store.
//!
//! Most tests run against `MemoryStorage`; the persistence tests use a
//! temporary directory so the record really goes through the filesystem.

use std::sync::Arc;

use notifier::history::{HistoryLoad, HistoryStore, MAX_HISTORY};
use notifier::models::Notice;
use notifier::pipeline::{ChangeDetector, Detection};
use notifier::storage::{LocalStorage, MemoryStorage};

fn notice(id: &str) -> Notice {
    Notice::new(format!("공지 {id}"), format!("https://example.com/{id}"))
}

fn notices(ids: &[&str]) -> Vec<Notice> {
    ids.iter().map(|id| notice(id)).collect()
}

fn urls(notices: &[Notice]) -> Vec<String> {
    notices.iter().map(|n| n.url.clone()).collect()
}

fn detector(storage: &Arc<MemoryStorage>) -> ChangeDetector<Arc<MemoryStorage>> {
    ChangeDetector::new(HistoryStore::new(Arc::clone(storage)))
}

// ---------------------------------------------------------------------------
// First run
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_run_reports_nothing_and_records_everything() {
    let storage = Arc::new(MemoryStorage::new());
    let detector = detector(&storage);

    let detection = detector.detect(&notices(&["u1", "u2"])).await;

    assert_eq!(detection, Detection::Bootstrap { recorded: 2 });
    assert_eq!(urls(&detector.known().await), urls(&notices(&["u1", "u2"])));
    assert_eq!(storage.write_count(), 1);
}

#[tokio::test]
async fn first_run_with_nothing_observed_still_writes_a_record() {
    let storage = Arc::new(MemoryStorage::new());
    let detector = detector(&storage);

    assert!(detector.get_new_notices(&[]).await.is_empty());
    assert_eq!(storage.write_count(), 1);
    assert!(detector.known().await.is_empty());
}

#[tokio::test]
async fn first_run_bootstrap_is_bounded() {
    let storage = Arc::new(MemoryStorage::new());
    let detector = detector(&storage);
    let observed: Vec<Notice> = (0..60).map(|i| notice(&i.to_string())).collect();

    let detection = detector.detect(&observed).await;

    assert_eq!(detection, Detection::Bootstrap { recorded: MAX_HISTORY });
    let known = detector.known().await;
    assert_eq!(known.len(), MAX_HISTORY);
    assert_eq!(known[0].url, observed[0].url);
}

// ---------------------------------------------------------------------------
// Steady state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn three_runs_end_to_end() {
    let storage = Arc::new(MemoryStorage::new());
    let detector = detector(&storage);

    // Run 1: baseline.
    assert!(detector.get_new_notices(&notices(&["u1", "u2"])).await.is_empty());

    // Run 2: u3 appears on top.
    let new = detector.get_new_notices(&notices(&["u3", "u1", "u2"])).await;
    assert_eq!(urls(&new), urls(&notices(&["u3"])));
    assert_eq!(
        urls(&detector.known().await),
        urls(&notices(&["u3", "u1", "u2"]))
    );

    // Run 3: same page again.
    let writes = storage.write_count();
    assert!(detector.get_new_notices(&notices(&["u3", "u1", "u2"])).await.is_empty());
    assert_eq!(storage.write_count(), writes);
}

#[tokio::test]
async fn empty_observation_leaves_history_untouched() {
    let storage = Arc::new(MemoryStorage::new());
    let detector = detector(&storage);
    detector.get_new_notices(&notices(&["u1", "u2"])).await;
    let before = storage.snapshot();

    let detection = detector.detect(&[]).await;

    assert_eq!(detection, Detection::Unchanged);
    assert!(detector.get_new_notices(&[]).await.is_empty());
    assert_eq!(storage.write_count(), 1);
    assert_eq!(storage.snapshot(), before);
}

#[tokio::test]
async fn new_notices_keep_observed_order() {
    let storage = Arc::new(MemoryStorage::new());
    let detector = detector(&storage);
    detector.get_new_notices(&notices(&["a"])).await;

    let new = detector
        .get_new_notices(&notices(&["d", "c", "a", "b"]))
        .await;

    assert_eq!(urls(&new), urls(&notices(&["d", "c", "b"])));
    assert_eq!(
        urls(&detector.known().await),
        urls(&notices(&["d", "c", "b", "a"]))
    );
}

#[tokio::test]
async fn identity_is_the_url_only() {
    let storage = Arc::new(MemoryStorage::new());
    let detector = detector(&storage);
    detector.get_new_notices(&notices(&["u1"])).await;

    let renamed = vec![Notice::new("제목 변경됨", "https://example.com/u1").with_date("2025.07.22")];
    assert!(detector.get_new_notices(&renamed).await.is_empty());
}

#[tokio::test]
async fn history_never_exceeds_bound() {
    let storage = Arc::new(MemoryStorage::new());
    let detector = detector(&storage);
    detector.get_new_notices(&notices(&["seed"])).await;

    for batch in 0..12 {
        let observed: Vec<Notice> = (0..5)
            .map(|i| notice(&format!("b{batch}-{i}")))
            .collect();
        let new = detector.get_new_notices(&observed).await;
        assert_eq!(new.len(), 5);
        assert!(detector.known().await.len() <= MAX_HISTORY);
    }

    let known = detector.known().await;
    assert_eq!(known.len(), MAX_HISTORY);
    assert_eq!(known[0].url, "https://example.com/b11-0");
}

#[tokio::test]
async fn evicted_notice_is_reported_again() {
    let storage = Arc::new(MemoryStorage::new());
    let detector = ChangeDetector::new(HistoryStore::with_max_entries(Arc::clone(&storage), 2));

    detector.get_new_notices(&notices(&["old"])).await;
    detector.get_new_notices(&notices(&["n1", "n2"])).await;

    let new = detector.get_new_notices(&notices(&["old"])).await;
    assert_eq!(urls(&new), urls(&notices(&["old"])));
}

// ---------------------------------------------------------------------------
// Degraded storage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn corrupt_record_behaves_like_first_run() {
    let storage = Arc::new(MemoryStorage::with_bytes("not json at all"));
    let detector = detector(&storage);

    let detection = detector.detect(&notices(&["u1"])).await;

    assert_eq!(detection, Detection::Bootstrap { recorded: 1 });
    assert_eq!(urls(&detector.known().await), urls(&notices(&["u1"])));
}

#[tokio::test]
async fn failed_write_does_not_lose_detection() {
    let storage = Arc::new(MemoryStorage::new());
    let detector = detector(&storage);
    detector.get_new_notices(&notices(&["u1"])).await;

    storage.fail_writes(true);
    let new = detector.get_new_notices(&notices(&["u2", "u1"])).await;
    assert_eq!(urls(&new), urls(&notices(&["u2"])));

    // Nothing was persisted, so the next run sees u2 again.
    storage.fail_writes(false);
    let again = detector.get_new_notices(&notices(&["u2", "u1"])).await;
    assert_eq!(urls(&again), urls(&notices(&["u2"])));
}

// ---------------------------------------------------------------------------
// Filesystem persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    {
        let detector = ChangeDetector::new(HistoryStore::new(LocalStorage::in_dir(
            dir.path(),
            "history.json",
        )));
        detector.get_new_notices(&notices(&["u1", "u2"])).await;
    }

    let store = HistoryStore::new(LocalStorage::in_dir(dir.path(), "history.json"));
    let HistoryLoad::Loaded(record) = store.load_record().await else {
        panic!("history file should be readable");
    };
    assert_eq!(urls(&record.notices), urls(&notices(&["u1", "u2"])));
    assert!(record.last_updated.is_some());

    let detector = ChangeDetector::new(store);
    let new = detector.get_new_notices(&notices(&["u3", "u1", "u2"])).await;
    assert_eq!(urls(&new), urls(&notices(&["u3"])));
}

#[tokio::test]
async fn history_file_uses_writer_key_for_author() {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::in_dir(dir.path(), "history.json");
    let store = HistoryStore::new(storage);

    store
        .save(&[notice("u1").with_author("학사지원팀")])
        .await;

    let raw = std::fs::read_to_string(dir.path().join("history.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["notices"][0]["writer"], "학사지원팀");
    assert!(value["last_updated"].is_string());
}
