use entity_store::Filters;
use serde_json::json;

use crate::support::{fields, store};

fn created_dates(order: &str) -> Vec<String> {
    let store = store("Project");
    for n in 0..20 {
        store.create(fields(json!({ "n": n }))).unwrap();
    }
    store
        .list(Some(order), None)
        .unwrap()
        .into_iter()
        .map(|r| r.created_date)
        .collect()
}

#[test]
fn newest_first_is_non_increasing() {
    let dates = created_dates("-created_date");
    assert!(dates.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn oldest_first_is_non_decreasing() {
    let dates = created_dates("created_date");
    assert!(dates.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn descending_mirrors_ascending() {
    let store = store("Client");
    for name in ["b", "a", "c", "a"] {
        store.create(fields(json!({ "name": name }))).unwrap();
    }
    let ascending: Vec<String> = store
        .list(Some("name"), None)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    let mut descending: Vec<String> = store
        .list(Some("-name"), None)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    descending.reverse();
    assert_eq!(ascending, descending);
}

#[test]
fn limit_applies_after_sorting() {
    let store = store("ProjectCost");
    for amount in [300, 100, 200] {
        store.create(fields(json!({ "amount": amount }))).unwrap();
    }
    let top = store
        .query(&Filters::new(), Some("-amount"), Some(2))
        .unwrap();
    let amounts: Vec<i64> = top
        .iter()
        .map(|r| r.fields["amount"].as_i64().unwrap())
        .collect();
    assert_eq!(amounts, vec![300, 200]);
}
