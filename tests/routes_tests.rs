mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::*;
use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use ua_forge::routes::{self, AppState, ACCESS_KEY_HEADER};
use ua_forge::session::KeyType;
use ua_forge::store::{Generation, MemoryStore};
use ua_forge::{AppType, DeviceModel, GeneratedUserAgent, Synthesizer};

fn store() -> Arc<MemoryStore> {
    let mut expired = access_key("k-expired", KeyType::User);
    expired.expires_at = Some(Utc::now() - Duration::days(1));

    let store = MemoryStore::new(
        vec![DeviceModel::new("iPhone 12")],
        vec![ios("17.2.1", "21C62", 100.0)],
        vec![app(AppType::Instagram, "324.0", Some("7001234"), 100.0)],
        vec![languages(languages_json())],
    )
    .with_access_keys(vec![access_key("k-user", KeyType::User), expired]);

    Arc::new(store)
}

async fn client(store: Arc<MemoryStore>) -> Client {
    let state = AppState::new(store, Synthesizer::default());
    let rocket = rocket::build().attach(routes::stage(state));

    Client::tracked(rocket).await.expect("valid rocket instance")
}

fn key(value: &'static str) -> Header<'static> {
    Header::new(ACCESS_KEY_HEADER, value)
}

#[rocket::async_test]
async fn generation_requires_an_access_key() {
    let client = client(store()).await;

    let response = client.get("/ua/ios").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body = response.into_string().await.unwrap_or_default();
    assert!(body.contains("access key header missing"), "{body}");

    let response = client.get("/ua/ios").header(key("bogus")).dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client.get("/ua/ios").header(key("k-expired")).dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body = response.into_string().await.unwrap_or_default();
    assert!(body.contains("expired"), "{body}");
}

#[rocket::async_test]
async fn generates_and_records_history() {
    let store = store();
    let client = client(store.clone()).await;

    let response = client
        .get("/ua/ios?app=instagram&count=3&seed=9")
        .header(key("k-user"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let generated: Vec<GeneratedUserAgent> = response.into_json().await.expect("json body");
    assert_eq!(generated.len(), 3);
    for ua in &generated {
        assert_eq!(ua.app_type, AppType::Instagram);
        assert!(ua.user_agent.starts_with("Mozilla/5.0 (iPhone; CPU iPhone OS 17_2_1"));
        if let Some(fbrv) = &ua.fbrv {
            assert!(fbrv.starts_with("7001234"));
        }
    }

    assert_eq!(store.generations.read().await.len(), 3);
    let history: Vec<Generation> = client
        .get("/ua/history?limit=2")
        .header(key("k-user"))
        .dispatch()
        .await
        .into_json()
        .await
        .expect("json body");
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|g| g.user_name == "k-user-owner" && g.platform == "ios"));
}

#[rocket::async_test]
async fn seeded_requests_are_reproducible() {
    let client = client(store()).await;

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let body: Vec<GeneratedUserAgent> = client
            .get("/ua/ios?count=4&seed=123")
            .header(key("k-user"))
            .dispatch()
            .await
            .into_json()
            .await
            .expect("json body");
        bodies.push(body);
    }

    assert_eq!(bodies[0], bodies[1]);
}

#[rocket::async_test]
async fn bad_parameters_are_rejected() {
    let client = client(store()).await;

    let response = client.get("/ua/ios?app=tiktok").header(key("k-user")).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client.get("/ua/ios?count=0").header(key("k-user")).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client.get("/ua/ios?count=101").header(key("k-user")).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn missing_catalog_data_is_unprocessable() {
    let store = store();
    let client = client(store.clone()).await;

    let response = client
        .get("/ua/ios?app=facebook")
        .header(key("k-user"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let body = response.into_string().await.unwrap_or_default();
    assert!(body.contains("app version"), "{body}");
    assert!(store.generations.read().await.is_empty());
}
