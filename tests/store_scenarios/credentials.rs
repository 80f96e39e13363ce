//! Unique + required indexes used for credential lookups

use crate::test_utils::*;

fn accounts() -> Store {
    let store = Store::new();
    store.index("email", true, true).unwrap();
    store.index("pw", false, true).unwrap();
    store
        .insert(doc(json!({"email": "user@domain.com", "pw": "tesasdft"})))
        .unwrap();
    store
}

#[test]
fn login_with_right_and_wrong_password() {
    let store = accounts();
    let wrong = store.find(&query(json!({"email": "user@domain.com", "pw": ""})));
    assert!(wrong.is_empty());
    let right = store.find(&query(json!({"email": "user@domain.com", "pw": "tesasdft"})));
    assert_eq!(right.len(), 1);
    assert_eq!(right[0].relevance(), Some(2.0));
}

#[test]
fn duplicate_email_and_missing_password_are_rejected() {
    let store = accounts();
    let dup = store
        .insert(doc(json!({"email": "user@domain.com", "pw": "other"})))
        .unwrap_err();
    assert!(matches!(dup, Error::UniqueViolation { .. }));
    let missing = store
        .insert(doc(json!({"email": "new@domain.com"})))
        .unwrap_err();
    assert!(matches!(missing, Error::MissingRequiredField { ref field } if field == "pw"));
    assert_eq!(store.len(), 1);
}

#[test]
fn password_change_keeps_email_unique() {
    let store = accounts();
    store
        .update(
            &query(json!({"email": "user@domain.com"})),
            &update(json!({"$set": {"pw": "n3w"}})),
            UpdateOptions::default(),
        )
        .unwrap();
    assert_eq!(
        store
            .find(&query(json!({"email": "user@domain.com", "pw": "n3w"})))
            .len(),
        1
    );
    assert_positions_match_scan(&store);
}
