use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration, Utc};
use entity_store::{FallbackPolicy, TokenVerifier};
use serde_json::{json, Value};

use crate::support::{bearer, entities, fields, start_server};

async fn get(base: &str, query: &str, auth: Option<&str>) -> (u16, Value) {
    let client = reqwest::Client::new();
    let mut request = client.get(format!("{base}/api/projects/list{query}"));
    if let Some(auth) = auth {
        request = request.header("Authorization", auth);
    }
    let resp = request.send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn lists_projection_with_filters() {
    let entities = entities();
    let details = entities.project_details();
    details
        .create(fields(json!({ "name": "Maple", "project_status": "active", "client_id": "c1" })))
        .unwrap();
    details
        .create(fields(json!({ "name": "Oak", "project_status": "scheduled", "client_id": "c1" })))
        .unwrap();
    details
        .create(fields(json!({ "name": "Pine", "project_status": "complete", "client_id": "c2" })))
        .unwrap();

    let verifier = TokenVerifier::unsigned();
    let auth = bearer(&verifier, "pm-1", Duration::hours(1));
    let base = start_server(entities, verifier, FallbackPolicy::default()).await;

    let (status, body) = get(
        &base,
        "?client_id=c1&project_status=active,scheduled&order=name",
        Some(auth.as_str()),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 2);
    assert_eq!(body["source"], "supabase");
    assert_eq!(body["table"], "ProjectDetails");
    assert_eq!(body["projects"][0]["name"], "Maple");
    assert_eq!(body["projects"][1]["name"], "Oak");
    assert_eq!(
        body["filters"],
        json!({ "client_id": "c1", "project_status__in": ["active", "scheduled"] })
    );
    assert!(body["message"].as_str().unwrap().contains('2'));

    let (_, body) = get(&base, "?limit=1&order=-name", Some(auth.as_str())).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["projects"][0]["name"], "Pine");

    let (_, body) = get(&base, "?limit=abc", Some(auth.as_str())).await;
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn falls_back_to_base_table() {
    let entities = entities();
    entities
        .projects()
        .create(fields(json!({ "name": "Base only", "project_type": "repair" })))
        .unwrap();

    let verifier = TokenVerifier::unsigned();
    let auth = bearer(&verifier, "pm-1", Duration::hours(1));
    let base = start_server(entities, verifier, FallbackPolicy::BaseTableOnEmpty).await;

    let (status, body) = get(&base, "?project_type=repair", Some(auth.as_str())).await;
    assert_eq!(status, 200);
    assert_eq!(body["table"], "Project");
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn fallback_can_be_disabled() {
    let entities = entities();
    entities
        .projects()
        .create(fields(json!({ "name": "Base only" })))
        .unwrap();

    let verifier = TokenVerifier::unsigned();
    let auth = bearer(&verifier, "pm-1", Duration::hours(1));
    let base = start_server(entities, verifier, FallbackPolicy::Disabled).await;

    let (_, body) = get(&base, "", Some(auth.as_str())).await;
    assert_eq!(body["table"], "ProjectDetails");
    assert_eq!(body["count"], 0);
    assert_eq!(body["projects"], json!([]));
}

#[tokio::test]
async fn rejects_missing_expired_and_garbage_tokens() {
    let verifier = TokenVerifier::unsigned();
    let expired = bearer(&verifier, "pm-1", -Duration::minutes(5));
    let base = start_server(entities(), verifier, FallbackPolicy::default()).await;

    let (status, body) = get(&base, "", None).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["message"].is_string());

    let (status, _) = get(&base, "", Some(expired.as_str())).await;
    assert_eq!(status, 401);

    let (status, _) = get(&base, "", Some("Bearer %%%")).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn accepts_legacy_prefixed_tokens() {
    let exp = (Utc::now() + Duration::hours(1)).timestamp_millis();
    let payload = format!(r#"{{"userId":"u1","role":"client","exp":{exp}}}"#);
    let auth = format!("Bearer Bearer.{}", STANDARD.encode(payload));

    let base = start_server(entities(), TokenVerifier::unsigned(), FallbackPolicy::default()).await;
    let (status, _) = get(&base, "", Some(auth.as_str())).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn accepts_prefixed_header_without_space() {
    let exp = (Utc::now() + Duration::hours(1)).timestamp();
    let payload = format!(r#"{{"userId":"u1","role":"client","exp":{exp}}}"#);
    let auth = format!("Bearer.{}", STANDARD.encode(payload));

    let base = start_server(entities(), TokenVerifier::unsigned(), FallbackPolicy::default()).await;
    let (status, _) = get(&base, "", Some(auth.as_str())).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn repeated_filter_is_a_json_400() {
    let verifier = TokenVerifier::unsigned();
    let auth = bearer(&verifier, "pm-1", Duration::hours(1));
    let base = start_server(entities(), verifier, FallbackPolicy::default()).await;

    let (status, body) = get(
        &base,
        "?project_status=active&project_status=complete",
        Some(auth.as_str()),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].as_str().unwrap().contains("project_status"));
}

#[tokio::test]
async fn signed_mode_rejects_forgeries() {
    let signer = TokenVerifier::signed("roof-secret");
    let good = bearer(&signer, "pm-1", Duration::hours(1));
    let forged = bearer(&TokenVerifier::unsigned(), "pm-1", Duration::hours(1));

    let base = start_server(entities(), signer, FallbackPolicy::default()).await;
    assert_eq!(get(&base, "", Some(good.as_str())).await.0, 200);
    assert_eq!(get(&base, "", Some(forged.as_str())).await.0, 401);
}

#[tokio::test]
async fn required_signing_without_secret_is_500() {
    let auth = bearer(&TokenVerifier::unsigned(), "pm-1", Duration::hours(1));
    let base = start_server(
        entities(),
        TokenVerifier::new(None, true),
        FallbackPolicy::default(),
    )
    .await;

    let (status, body) = get(&base, "", Some(auth.as_str())).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Server misconfiguration");
    assert!(body["hint"].is_string());
}

#[tokio::test]
async fn other_methods_are_405() {
    let base = start_server(entities(), TokenVerifier::unsigned(), FallbackPolicy::default()).await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/projects/list"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Method not allowed");
}
