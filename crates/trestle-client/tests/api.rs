//! Client calls against a Trestle app served over TCP.

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use trestle::middleware::Response;
use trestle::prelude::*;
use trestle_client::{ApiClient, ClientError, Unpacked};

#[derive(Debug, PartialEq, Deserialize)]
struct Letter {
    letter: String,
}

fn letter(value: &str) -> serde_json::Value {
    json!({"letter": value})
}

async fn index(action: Action) -> TrestleResult<Response> {
    let page = action
        .query("page")
        .and_then(|page| page.parse().ok())
        .unwrap_or(1);
    action.expose(&WillPaginatePage::new(vec![letter("c"), letter("d")], page, 2, 5))
}

async fn show(action: Action) -> TrestleResult<Response> {
    match action.param("id") {
        Some("a") => action.expose(&letter("a")),
        _ => Err(ApiError::named("not_found").with_message("No such letter.").into()),
    }
}

async fn spawn_app() -> String {
    let letters = Arc::new(Controller::builder("letters").version(1).build());
    let router = ApiRouter::new()
        .mount(
            ApiScope::new()
                .version(1)
                .get("/letters", Endpoint::new(&letters, "index", index))
                .get("/letters/{id}", Endpoint::new(&letters, "show", show)),
        )
        .unwrap();
    let app = Arc::new(App::new(Settings::for_environment("production"), router));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(trestle::serve(app, listener));
    address.to_string()
}

#[tokio::test]
async fn test_paginated_collection_is_rebuilt() {
    let host = spawn_app().await;
    let letters = ApiClient::builder(host).version(1).endpoint("letters").build().unwrap();

    let page = letters
        .get::<Letter>("", &[("page", "2")])
        .await
        .unwrap()
        .into_page()
        .unwrap();
    assert_eq!(page.current_page, 2);
    assert_eq!(page.per_page, 2);
    assert_eq!(page.total_entries, 5);
    assert_eq!(page.items[0], Letter { letter: "c".into() });
}

#[tokio::test]
async fn test_single_object_is_unpacked() {
    let host = spawn_app().await;
    let letters = ApiClient::builder(host).version(1).endpoint("letters").build().unwrap();

    let unpacked = letters.get::<Letter>("a", &[]).await.unwrap();
    assert_eq!(unpacked, Unpacked::One(Letter { letter: "a".into() }));
}

#[tokio::test]
async fn test_error_envelope_raises_registered_kind() {
    let host = spawn_app().await;
    let letters = ApiClient::builder(host).version(1).endpoint("letters").build().unwrap();

    let error = letters.get::<Letter>("z", &[]).await.unwrap_err();
    let error = match error {
        ClientError::Api(error) => error,
        other => panic!("expected an API error, got {other:?}"),
    };
    assert_eq!(error.name(), "not_found");
    assert_eq!(error.class_name(), "NotFound");
    assert_eq!(error.message(), "The requested resource could not be found.");
}

#[tokio::test]
async fn test_unversioned_path_is_not_found() {
    let host = spawn_app().await;
    let letters = ApiClient::builder(host).endpoint("letters").build().unwrap();

    let error = letters.get::<Letter>("", &[]).await.unwrap_err();
    assert_eq!(error.as_api().map(ApiError::name), Some("not_found"));
}
