//! Snapshot persistence

use crate::test_utils::*;
use tempfile::TempDir;

#[test]
fn open_missing_path_creates_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    let store = Store::open(&path).unwrap();
    assert!(store.is_empty());
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw, json!({"docs": [], "indexes": {}}));
}

#[test]
fn save_and_reopen_round_trips_types_and_positions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    {
        let store = Store::open(&path).unwrap();
        store.index("kind", false, false).unwrap();
        for (kind, n) in [("a", 1), ("b", 2), ("a", 3)] {
            store
                .insert(doc(json!({"kind": kind, "n": n, "ratio": 0.5, "ok": true, "none": null})))
                .unwrap();
        }
        store.remove(&query(json!({"n": 2})));
        store.save(&path).unwrap();
    }

    let store = Store::open(&path).unwrap();
    assert_eq!(store.len(), 2);
    let d = &store.documents()[1];
    assert_eq!(d.get("n"), Some(&Value::Int(3)));
    assert_eq!(d.get("ratio"), Some(&Value::Float(0.5)));
    assert_eq!(d.get("ok"), Some(&Value::Bool(true)));
    assert_eq!(d.get("none"), Some(&Value::Null));
    assert!(d.relevance().is_none());
    assert_eq!(
        store.index_info("kind").unwrap().lookup(&Value::from("a")),
        &[0, 1]
    );
    assert_positions_match_scan(&store);
}

#[test]
fn found_relevance_is_never_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    let store = Store::open(&path).unwrap();
    store.insert(doc(json!({"a": 1}))).unwrap();
    let _ = store.find(&Query::new());
    store.save(&path).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("_relevance"));
}
