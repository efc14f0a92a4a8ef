#![cfg(feature = "emitter")]

use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;

use entity_store::ChangeKind;
use serde_json::json;

use crate::support::{fields, store};

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn listeners_receive_record_ids() {
    let projects = store("Project");
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    projects
        .on_change(ChangeKind::Created, move |id| {
            let _ = tx.lock().unwrap().send(("created", id));
        })
        .unwrap();

    let (deleted_tx, deleted_rx) = mpsc::channel();
    let deleted_tx = Mutex::new(deleted_tx);
    projects
        .on_change(ChangeKind::Deleted, move |id| {
            let _ = deleted_tx.lock().unwrap().send(id);
        })
        .unwrap();

    let record = projects.create(fields(json!({ "name": "x" }))).unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), ("created", record.id.clone()));

    projects.delete(&record.id).unwrap();
    assert_eq!(deleted_rx.recv_timeout(WAIT).unwrap(), record.id);
}

#[test]
fn missed_deletes_do_not_notify() {
    let projects = store("Project");
    let (tx, rx) = mpsc::channel::<String>();
    let tx = Mutex::new(tx);
    projects
        .on_change(ChangeKind::Deleted, move |id| {
            let _ = tx.lock().unwrap().send(id);
        })
        .unwrap();

    assert!(!projects.delete("missing").unwrap());
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}
