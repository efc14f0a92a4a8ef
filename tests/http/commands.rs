use chrono::Duration;
use entity_store::{FallbackPolicy, TokenVerifier};
use serde_json::{json, Value};

use crate::support::{bearer, entities, entities_with_demo_login, fields, start_server};

async fn post(base: &str, command: &str, auth: Option<&str>, input: Value) -> (u16, Value) {
    let mut request = reqwest::Client::new()
        .post(format!("{base}/{command}"))
        .json(&input);
    if let Some(auth) = auth {
        request = request.header("Authorization", auth);
    }
    let resp = request.send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn health_lists_entities() {
    let base = start_server(entities(), TokenVerifier::unsigned(), FallbackPolicy::default()).await;
    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["ok"], true);
    let names: Vec<&str> = body["entities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(names.contains(&"ProjectDetails"));
    assert!(names.contains(&"User"));
    assert!(body["stored"].as_array().unwrap().is_empty());
    let commands = body["commands"].as_array().unwrap();
    assert!(commands.contains(&json!("user.me")));
}

#[tokio::test]
async fn health_reports_stored_collections() {
    let entities = entities();
    entities.clients().create(fields(json!({ "name": "Acme" }))).unwrap();
    let base = start_server(entities, TokenVerifier::unsigned(), FallbackPolicy::default()).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["stored"], json!(["mock_client"]));
}

#[tokio::test]
async fn create_needs_a_verified_session() {
    let verifier = TokenVerifier::unsigned();
    let auth = bearer(&verifier, "pm-1", Duration::hours(1));
    let base = start_server(entities(), verifier, FallbackPolicy::default()).await;
    let client = reqwest::Client::new();
    let input = json!({ "entity": "Client", "data": { "name": "Acme" } });

    let resp = client
        .post(format!("{base}/entity.create"))
        .json(&input)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{base}/entity.create"))
        .header("Authorization", "Bearer garbage!")
        .json(&input)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{base}/entity.create"))
        .header("Authorization", &auth)
        .json(&input)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["name"], "Acme");

    let listed: Value = client
        .post(format!("{base}/entity.list"))
        .json(&json!({ "entity": "Client" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["records"][0]["id"], created["id"]);
}

#[tokio::test]
async fn unknown_command_and_entity_are_404() {
    let base = start_server(entities(), TokenVerifier::unsigned(), FallbackPolicy::default()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/nonexistent"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(format!("{base}/entity.list"))
        .json(&json!({ "entity": "Invoice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("Invoice"));
}

#[tokio::test]
async fn two_clients_keep_their_own_identity() {
    let entities = entities_with_demo_login(true);
    for (email, role) in [("pm@roofco.test", "project_manager"), ("ann@roofco.test", "client")] {
        entities
            .users()
            .create(fields(json!({ "email": email, "role": role })))
            .unwrap();
    }
    let base = start_server(entities, TokenVerifier::signed("roof-secret"), FallbackPolicy::default()).await;

    let (status, pm) = post(&base, "user.login", None, json!({ "email": "pm@roofco.test" })).await;
    assert_eq!(status, 200);
    let (status, ann) = post(&base, "user.login", None, json!({ "email": "ann@roofco.test" })).await;
    assert_eq!(status, 200);

    let pm_auth = format!("Bearer {}", pm["token"].as_str().unwrap());
    let ann_auth = format!("Bearer {}", ann["token"].as_str().unwrap());

    let (status, me) = post(&base, "user.me", Some(pm_auth.as_str()), json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(me["user"]["email"], "pm@roofco.test");

    let (status, me) = post(&base, "user.me", Some(ann_auth.as_str()), json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(me["user"]["email"], "ann@roofco.test");

    let (status, body) = post(&base, "user.me", None, json!({})).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = post(&base, "entity.list", None, json!({ "entity": "User" })).await;
    assert_eq!(status, 401);
    let (status, users) =
        post(&base, "entity.list", Some(pm_auth.as_str()), json!({ "entity": "User" })).await;
    assert_eq!(status, 200);
    assert_eq!(users["count"], 2);
}

#[tokio::test]
async fn login_is_off_unless_demo_login_is_enabled() {
    let entities = entities();
    entities
        .users()
        .create(fields(json!({ "email": "pm@roofco.test" })))
        .unwrap();
    let base = start_server(entities, TokenVerifier::unsigned(), FallbackPolicy::default()).await;

    let (status, body) = post(&base, "user.login", None, json!({ "email": "pm@roofco.test" })).await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Forbidden");
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let base = start_server(entities(), TokenVerifier::unsigned(), FallbackPolicy::default()).await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/entity.list"))
        .header("Content-Type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].is_string());
}
