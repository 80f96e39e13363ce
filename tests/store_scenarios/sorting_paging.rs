//! Natural sort and paging

use crate::test_utils::*;

fn names(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .map(|d| d.get("name").and_then(Value::as_str).unwrap_or("").to_string())
        .collect()
}

#[test]
fn skip_one_of_limit_two_is_second_smallest() {
    let store = store_with(vec![
        json!({"name": "c", "score": 30}),
        json!({"name": "a", "score": 5}),
        json!({"name": "d", "score": 100}),
        json!({"name": "b", "score": 12}),
    ]);
    let all = store.find(&Query::new());
    let sorted = store.sort(&SortSpec::lowest_first("score"), &all);
    let page = store.skip(1, &store.limit(2, &sorted));
    assert_eq!(names(&page), vec!["b"]);
}

#[test]
fn highest_first_and_missing_fields() {
    let store = store_with(vec![
        json!({"name": "v2", "ver": "v2"}),
        json!({"name": "none"}),
        json!({"name": "v10", "ver": "v10"}),
        json!({"name": "v1", "ver": "v1"}),
    ]);
    let all = store.find(&Query::new());
    let sorted = store.sort(&SortSpec::highest_first("ver"), &all);
    assert_eq!(names(&sorted), vec!["v10", "v2", "v1", "none"]);
}

#[test]
fn sort_spec_from_json() {
    let spec = SortSpec::from_json(json!({"when": "lowest_first"})).unwrap();
    let store = store_with(vec![
        json!({"name": "later", "when": "2024-05-01"}),
        json!({"name": "earlier", "when": "2023-12-31"}),
    ]);
    let sorted = store.sort(&spec, &store.find(&Query::new()));
    assert_eq!(names(&sorted), vec!["earlier", "later"]);
}

#[test]
fn paging_does_not_touch_the_store() {
    let store = store_with(vec![json!({"name": "a"}), json!({"name": "b"})]);
    let all = store.find(&Query::new());
    assert!(store.limit(0, &all).is_empty());
    assert!(store.skip(5, &all).is_empty());
    assert_eq!(store.len(), 2);
}
