use entity_store::{
    Entities, EntityStore, FileStorage, InMemoryStorage, RegistryOptions, Storage, StoreError,
};
use serde_json::json;

use crate::support::fields;

#[test]
fn round_trip_preserves_order_and_content() {
    let storage = InMemoryStorage::new();
    let store = EntityStore::open("Project", storage.clone()).unwrap();
    for n in 0..5 {
        store
            .create(fields(json!({ "n": n, "tags": ["roof", n.to_string()] })))
            .unwrap();
    }
    let before = store.find(&Default::default()).unwrap();

    let reopened = EntityStore::open("Project", storage.clone()).unwrap();
    assert_eq!(reopened.find(&Default::default()).unwrap(), before);

    let raw = storage.read("mock_project").unwrap().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 5);
}

#[test]
fn file_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let entities =
            Entities::open(FileStorage::open(dir.path()).unwrap(), RegistryOptions::default())
                .unwrap();
        entities
            .clients()
            .create(fields(json!({ "name": "Acme Roofing" })))
            .unwrap();
    }

    assert!(dir.path().join("mock_client.json").exists());
    let entities =
        Entities::open(FileStorage::open(dir.path()).unwrap(), RegistryOptions::default())
            .unwrap();
    let clients = entities.clients().list(None, None).unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].fields["name"], "Acme Roofing");
}

#[test]
fn corrupted_collection_is_reported() {
    let storage = InMemoryStorage::new();
    storage.write("mock_client", "[{\"id\": 1}").unwrap();
    let err = Entities::open(storage, RegistryOptions::default()).err().unwrap();
    assert!(matches!(err, StoreError::Corrupted { ref key, .. } if key == "mock_client"));
}

#[test]
fn quota_failure_leaves_store_unchanged() {
    let store = EntityStore::open("Project", InMemoryStorage::with_quota(256)).unwrap();
    store.create(fields(json!({ "n": 1 }))).unwrap();

    let err = store
        .create(fields(json!({ "notes": "x".repeat(512) })))
        .unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
    assert_eq!(store.count().unwrap(), 1);
}
