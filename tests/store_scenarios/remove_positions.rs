//! Remove and index renumbering

use crate::test_utils::*;

#[test]
fn remaining_positions_match_scan_and_lookups() {
    let store = Store::new();
    store.index("n", true, true).unwrap();
    store.index("bucket", false, false).unwrap();
    for n in 0..20 {
        store
            .insert(doc(json!({"n": n, "bucket": n % 3, "drop": n % 4 == 1 || n == 0})))
            .unwrap();
    }

    let removed = store.remove(&query(json!({"drop": true})));
    assert_eq!(removed, 6);
    assert_eq!(store.len(), 14);
    assert_positions_match_scan(&store);

    for d in store.documents() {
        let n = d.get("n").unwrap().clone();
        let hits = store.find(&Query::new().eq("n", n.clone()));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].get("n"), Some(&n));
    }
}

#[test]
fn remove_with_operators_and_no_match() {
    let store = store_with(vec![json!({"age": 10}), json!({"age": 40}), json!({"age": 70})]);
    store.index("age", false, false).unwrap();
    assert_eq!(store.remove(&query(json!({"age": {"$gte": 40}}))), 2);
    assert_eq!(store.remove(&query(json!({"age": 99}))), 0);
    assert_eq!(store.len(), 1);
    assert_positions_match_scan(&store);
}

#[test]
fn removed_values_disappear_from_indexes() {
    let store = store_with(vec![json!({"tag": "a"}), json!({"tag": "b"})]);
    store.index("tag", false, false).unwrap();
    store.remove(&query(json!({"tag": "a"})));
    let index = store.index_info("tag").unwrap();
    assert_eq!(index.key_count(), 1);
    assert_eq!(index.lookup(&Value::from("b")), &[0]);
}

#[test]
fn inserts_after_remove_land_at_the_end() {
    let store = store_with(vec![json!({"k": 1}), json!({"k": 2}), json!({"k": 3})]);
    store.index("k", true, false).unwrap();
    store.remove(&query(json!({"k": 2})));
    store.insert(doc(json!({"k": 4}))).unwrap();
    assert_eq!(store.index_info("k").unwrap().lookup(&Value::Int(4)), &[2]);
    assert_positions_match_scan(&store);
}
