//! Full-text relevance

use crate::test_utils::*;

#[test]
fn denser_match_scores_higher() {
    let store = store_with(vec![
        json!({"title": "this is a test"}),
        json!({"title": "this is a test of a test"}),
    ]);
    let found = store.find(&query(json!({"title": {"$fulltext": "test is a"}})));
    assert_eq!(found.len(), 2);
    let first = found[0].relevance().unwrap();
    let second = found[1].relevance().unwrap();
    assert_eq!(found[1].get("title"), Some(&Value::from("this is a test of a test")));
    assert!(second > first);
    // Fractional, not an integer count
    assert!(first.fract() > 0.0);
}

#[test]
fn stopwords_only_query_matches_nothing() {
    let store = store_with(vec![json!({"title": "this is it"})]);
    assert!(store
        .find(&query(json!({"title": {"$fulltext": "this is it"}})))
        .is_empty());
}

#[test]
fn fulltext_combines_with_other_fields() {
    let store = store_with(vec![
        json!({"lang": "en", "body": "rust memory safety"}),
        json!({"lang": "de", "body": "rust ohne garbage collector"}),
    ]);
    let found = store.find(&Query::new().eq("lang", "en").fulltext("body", "Rust"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get("lang"), Some(&Value::from("en")));
    assert!(found[0].relevance().unwrap() > 2.0);
}
