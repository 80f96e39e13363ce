//! Helpers shared by the store scenarios

pub use serde_json::json;
pub use shelfdb::{
    Document, Error, Query, SortSpec, Store, Update, UpdateOptions, Value,
};

/// Build a document from a JSON object literal
pub fn doc(value: serde_json::Value) -> Document {
    Document::from_json(value).unwrap()
}

/// Build a query from a JSON object literal
pub fn query(value: serde_json::Value) -> Query {
    Query::from_json(value).unwrap()
}

/// Build an update from a JSON object literal
pub fn update(value: serde_json::Value) -> Update {
    Update::from_json(value).unwrap()
}

/// A store holding the given documents, in order
pub fn store_with(docs: Vec<serde_json::Value>) -> Store {
    let store = Store::new();
    for d in docs {
        store.insert(doc(d)).unwrap();
    }
    store
}

/// Check every index against a manual scan of the documents
///
/// For each stored document and each indexed field it holds, the index
/// lookup for its value must contain the document's position.
pub fn assert_positions_match_scan(store: &Store) {
    assert!(store.verify_indexes());
    let docs = store.documents();
    for field in store.index_fields() {
        let index = store.index_info(&field).unwrap();
        for (pos, d) in docs.iter().enumerate() {
            match d.get(&field) {
                Some(v) => assert!(
                    index.lookup(v).contains(&pos),
                    "field {} value {} missing position {}",
                    field,
                    v,
                    pos
                ),
                None => assert!(index
                    .entries()
                    .iter()
                    .all(|e| !e.positions().contains(&pos))),
            }
        }
    }
}
