use chrono::{Duration, Utc};
use entity_store::http::{self, AppState};
use entity_store::{
    commands, Claims, Entities, FallbackPolicy, Fields, InMemoryStorage, RegistryOptions,
    TokenVerifier,
};
use serde_json::Value;

pub fn fields(value: Value) -> Fields {
    value.as_object().cloned().unwrap_or_default()
}

pub fn entities() -> Entities<InMemoryStorage> {
    entities_with_demo_login(false)
}

pub fn entities_with_demo_login(demo_login: bool) -> Entities<InMemoryStorage> {
    Entities::open(
        InMemoryStorage::new(),
        RegistryOptions {
            demo_login,
            ..RegistryOptions::default()
        },
    )
    .unwrap()
}

/// Bind to port 0 and return the base URL.
pub async fn start_server(
    entities: Entities<InMemoryStorage>,
    tokens: TokenVerifier,
    fallback: FallbackPolicy,
) -> String {
    let state = AppState::new(commands::service(entities, tokens), fallback);
    let app = http::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn bearer(verifier: &TokenVerifier, user_id: &str, expires_in: Duration) -> String {
    let claims = Claims::new(user_id, Some("admin".into()), Utc::now() + expires_in);
    format!("Bearer {}", verifier.issue(&claims).unwrap())
}
