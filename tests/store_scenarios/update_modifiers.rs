//! Update and modifiers

use crate::test_utils::*;

#[test]
fn add_counter_five_then_ten() {
    let store = store_with(vec![json!({"name": "c"})]);
    let q = query(json!({"name": "c"}));
    let u = update(json!({"$add": {"counter": 5}}));

    let first = store.update(&q, &u, UpdateOptions::default()).unwrap();
    assert_eq!(first[0].get("counter"), Some(&Value::Int(5)));
    let second = store.update(&q, &u, UpdateOptions::default()).unwrap();
    assert_eq!(second[0].get("counter"), Some(&Value::Int(10)));
}

#[test]
fn upsert_with_no_match_inserts_exactly_one() {
    let store = store_with(vec![json!({"name": "other"})]);
    let out = store
        .update(
            &query(json!({"name": "new"})),
            &update(json!({"$set": {"name": "new"}, "$add": {"n": 2}})),
            UpdateOptions::new().upsert(true),
        )
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(store.len(), 2);
    let found = store.find(&query(json!({"name": "new", "n": 2})));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), out[0].id());
}

#[test]
fn upsert_replacement_uses_the_update_value() {
    let store = Store::new();
    let out = store
        .update(
            &query(json!({"k": 1})),
            &update(json!({"k": 1, "v": "fresh"})),
            UpdateOptions::new().upsert(true),
        )
        .unwrap();
    assert_eq!(out[0].get("v"), Some(&Value::from("fresh")));
    assert!(out[0].id().is_some());
}

#[test]
fn upsert_respects_index_constraints() {
    let store = Store::new();
    store.index("email", true, true).unwrap();
    let err = store
        .update(
            &query(json!({"name": "x"})),
            &update(json!({"$set": {"name": "x"}})),
            UpdateOptions::new().upsert(true),
        )
        .unwrap_err();
    assert!(matches!(err, Error::MissingRequiredField { .. }));
    assert!(store.is_empty());
}

#[test]
fn reserved_fields_in_replacement_are_rejected() {
    let store = store_with(vec![json!({"a": 1})]);
    assert!(Update::from_json(json!({"_id": "forged"})).is_err());

    let forged = Update::replace(Document::new().with("_id", "forged"));
    let err = store
        .update(&query(json!({"a": 1})), &forged, UpdateOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::ReservedField(_)));
    assert_eq!(store.documents()[0].get("a"), Some(&Value::Int(1)));
}

#[test]
fn modifiers_combine_on_one_document() {
    let store = store_with(vec![json!({"k": "x", "price": 10, "qty": 3, "tmp": true})]);
    let out = store
        .update(
            &query(json!({"k": "x"})),
            &update(json!({
                "$multiply": {"price": 2},
                "$subtract": {"qty": 1},
                "$divide": {"missing": 4},
                "$remove": {"tmp": 1}
            })),
            UpdateOptions::default(),
        )
        .unwrap();
    let d = &out[0];
    assert_eq!(d.get("price"), Some(&Value::Int(20)));
    assert_eq!(d.get("qty"), Some(&Value::Int(2)));
    assert_eq!(d.get("missing"), Some(&Value::Int(0)));
    assert!(!d.contains("tmp"));
    assert_eq!(d.get("k"), Some(&Value::from("x")));
}

#[test]
fn multi_update_aborts_midway_without_rollback() {
    let store = Store::new();
    store.index("code", true, false).unwrap();
    for code in ["a", "b", "c"] {
        store.insert(doc(json!({"grp": 1, "code": code}))).unwrap();
    }
    let err = store
        .update(
            &query(json!({"grp": 1})),
            &update(json!({"$set": {"code": "z"}})),
            UpdateOptions::new().multi(true),
        )
        .unwrap_err();
    assert!(err.is_constraint_violation());

    let codes: Vec<Value> = store
        .documents()
        .iter()
        .map(|d| d.get("code").cloned().unwrap_or(Value::Null))
        .collect();
    assert_eq!(codes, vec![Value::from("z"), Value::from("b"), Value::from("c")]);
    assert_positions_match_scan(&store);
}
