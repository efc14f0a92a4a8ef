use std::thread;

use entity_store::{EntityStore, Fields, FileStorage, InMemoryStorage, Record, Storage};
use serde_json::json;

use crate::support::fields;

const THREADS: usize = 8;
const ROUNDS: usize = 25;

/// Every thread creates its own records and bumps its own counter field on
/// one shared record. Nothing may be lost in memory or in storage.
fn hammer<S: Storage + Clone>(storage: S) {
    let store = EntityStore::open("Project", storage.clone()).unwrap();
    let shared = store.create(fields(json!({ "name": "shared" }))).unwrap();

    thread::scope(|scope| {
        for t in 0..THREADS {
            let store = &store;
            let shared_id = shared.id.as_str();
            scope.spawn(move || {
                for round in 0..ROUNDS {
                    store
                        .create(fields(json!({ "thread": t, "round": round })))
                        .unwrap();

                    let mut data = Fields::new();
                    data.insert(format!("t{t}"), json!(round));
                    store.update(shared_id, data).unwrap().unwrap();
                }
            });
        }
    });

    let expected = 1 + THREADS * ROUNDS;
    assert_eq!(store.count().unwrap(), expected);

    let raw = storage.read(store.storage_key()).unwrap().unwrap();
    let persisted: Vec<Record> = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted.len(), expected);

    let mut ids: Vec<&str> = persisted.iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), expected);

    let current = store.get(&shared.id).unwrap().unwrap();
    for t in 0..THREADS {
        assert_eq!(current.fields.get(&format!("t{t}")), Some(&json!(ROUNDS - 1)));
    }
    let stored = persisted.iter().find(|r| r.id == shared.id).unwrap();
    assert_eq!(stored, &current);

    let reopened = EntityStore::open("Project", storage).unwrap();
    assert_eq!(reopened.count().unwrap(), expected);
}

#[test]
fn concurrent_writers_lose_nothing_in_memory() {
    hammer(InMemoryStorage::new());
}

#[test]
fn concurrent_writers_lose_nothing_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    hammer(FileStorage::open(dir.path()).unwrap());
}
