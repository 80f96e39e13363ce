//! Insert and find

use crate::test_utils::*;

#[test]
fn insert_then_find_by_id_returns_the_input_plus_id() {
    let store = Store::new();
    let input = doc(json!({"title": "note", "tags": ["a", "b"], "meta": {"v": 2}}));
    let stored = store.insert(input.clone()).unwrap();
    let id = stored.id().unwrap();

    let found = store.find(&Query::by_id(&id));
    assert_eq!(found.len(), 1);

    let mut expected = input;
    expected.set_id(&id);
    let mut got = found[0].clone();
    got.set_relevance(None);
    assert_eq!(got, expected);
}

#[test]
fn identifiers_are_unique_lowercase_hex() {
    let store = Store::new();
    let ids: Vec<String> = (0..100)
        .map(|i| {
            store
                .insert(Document::new().with("i", i))
                .unwrap()
                .id()
                .unwrap()
                .to_string()
        })
        .collect();
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), 100);
    assert!(ids.iter().all(|id| {
        id.len() == 40
            && id
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    }));
}

#[test]
fn unique_scenario_second_x_is_rejected() {
    let store = store_with(vec![json!({"a": "x"}), json!({"a": "y"})]);
    store.index("a", true, false).unwrap();

    let err = store.insert(doc(json!({"a": "x"}))).unwrap_err();
    assert!(matches!(err, Error::UniqueViolation { ref field, .. } if field == "a"));
    assert_eq!(store.len(), 2);
}

#[test]
fn required_field_insert_leaves_store_unchanged() {
    let store = store_with(vec![json!({"sku": 1})]);
    store.index("sku", false, true).unwrap();
    let before = store.documents();

    assert!(store.insert(doc(json!({"name": "no sku"}))).is_err());
    assert_eq!(store.documents(), before);
    assert!(store.verify_indexes());
}

#[test]
fn find_all_carries_relevance_marker() {
    let store = store_with(vec![json!({"a": 1}), json!({"b": 2}), json!({})]);
    let all = store.find(&Query::new());
    assert_eq!(all.len(), store.len());
    assert!(all.iter().all(|d| d.relevance().is_some()));
    assert!(all.iter().all(|d| d.to_json().get("_relevance").is_some()));
}

#[test]
fn indexed_and_unindexed_stores_answer_alike() {
    let rows = vec![
        json!({"city": "Oslo", "pop": 700}),
        json!({"city": "Bergen", "pop": 285}),
        json!({"city": "Oslo", "pop": 10}),
        json!({"city": "oslo", "pop": 1}),
    ];
    let plain = store_with(rows.clone());
    let indexed = store_with(rows);
    indexed.index("city", false, false).unwrap();

    for q in [
        json!({"city": "Oslo"}),
        json!({"city": {"$regex": "/^oslo$/i"}}),
        json!({"city": "Oslo", "pop": {"$gt": 100}}),
        json!({"city": "Nowhere"}),
    ] {
        let strip = |docs: Vec<Document>| -> Vec<Value> {
            docs.into_iter()
                .map(|d| d.get("pop").cloned().unwrap_or(Value::Null))
                .collect()
        };
        assert_eq!(
            strip(plain.find(&query(q.clone()))),
            strip(indexed.find(&query(q.clone()))),
            "query {}",
            q
        );
    }
}

#[test]
fn malformed_regex_is_an_error_value() {
    let err = Query::from_json(json!({"a": {"$regex": "/[/"}})).unwrap_err();
    assert!(err.is_malformed_input());
}

#[test]
fn partial_match_mode_returns_non_full_matches() {
    let store = store_with(vec![
        json!({"color": "red", "size": "L"}),
        json!({"color": "red", "size": "S"}),
        json!({"color": "blue", "size": "S"}),
    ]);
    let q = query(json!({"color": "red", "size": "L"}));
    let partial = store.find_with(&q, false);
    assert_eq!(partial.len(), 1);
    assert_eq!(partial[0].get("size"), Some(&Value::from("S")));
    assert_eq!(partial[0].get("color"), Some(&Value::from("red")));
}
